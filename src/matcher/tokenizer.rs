//! Allocation-free path tokenizer.

use smallvec::SmallVec;

/// Default bound on the number of segments tokenized from one path.
pub const DEFAULT_MAX_SEGMENTS: usize = 32;

/// One segment of a request path as a byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSpan {
    /// Byte offset of the first character
    pub start: usize,
    /// Length in bytes; zero for the gap between consecutive slashes
    pub len: usize,
}

impl PathSpan {
    /// Span covering `start..start + len`.
    #[inline]
    #[must_use]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// The segment text within `path`.
    #[inline]
    #[must_use]
    pub fn text<'p>(&self, path: &'p str) -> &'p str {
        &path[self.start..self.start + self.len]
    }

    /// Whether the segment is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Caller-owned segment buffer. Paths up to [`DEFAULT_MAX_SEGMENTS`] deep
/// never touch the heap; the buffer can be reused across calls.
pub type SegmentBuffer = SmallVec<[PathSpan; DEFAULT_MAX_SEGMENTS]>;

/// Split `path` on `/` into `buffer`, returning the number of segments.
///
/// The leading `/` is skipped. Consecutive slashes yield zero-length
/// segments; a single trailing slash yields nothing. Tokenization stops
/// after `max_segments` segments and the rest of the path is not examined.
///
/// # Example
///
/// ```rust
/// use pathroute::matcher::{tokenize, SegmentBuffer};
///
/// let mut buffer = SegmentBuffer::new();
/// let path = "/a//b/";
/// assert_eq!(tokenize(path, 32, &mut buffer), 3);
/// assert_eq!(buffer[0].text(path), "a");
/// assert!(buffer[1].is_empty());
/// assert_eq!(buffer[2].text(path), "b");
/// ```
pub fn tokenize(path: &str, max_segments: usize, buffer: &mut SegmentBuffer) -> usize {
    buffer.clear();
    let mut start = usize::from(path.starts_with('/'));
    let mut rest = &path[start..];

    while buffer.len() < max_segments {
        match rest.find('/') {
            Some(end) => {
                buffer.push(PathSpan::new(start, end));
                start += end + 1;
                rest = &path[start..];
            }
            None => {
                if !rest.is_empty() {
                    buffer.push(PathSpan::new(start, rest.len()));
                }
                break;
            }
        }
    }
    buffer.len()
}

/// Whether tokenizing stopped at the bound with path text left over.
///
/// Slashes after the last span do not count, so `/a//` is not truncated
/// but `/a/b` tokenized with a bound of one is.
#[must_use]
pub fn is_truncated(path: &str, spans: &[PathSpan]) -> bool {
    let end = spans
        .last()
        .map_or_else(|| usize::from(path.starts_with('/')), |span| span.start + span.len);
    path.get(end..).is_some_and(|rest| rest.bytes().any(|b| b != b'/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(path: &str, max: usize) -> Vec<&str> {
        let mut buffer = SegmentBuffer::new();
        tokenize(path, max, &mut buffer);
        buffer.iter().map(|s| s.text(path)).collect()
    }

    #[test]
    fn root_has_no_segments() {
        assert!(texts("/", 32).is_empty());
        assert!(texts("", 32).is_empty());
    }

    #[test]
    fn splits_segments() {
        assert_eq!(texts("/moo/bar", 32), vec!["moo", "bar"]);
        assert_eq!(texts("/moo/bar/", 32), vec!["moo", "bar"]);
        assert_eq!(texts("/moo//bar", 32), vec!["moo", "", "bar"]);
        assert_eq!(texts("//", 32), vec![""]);
    }

    #[test]
    fn stops_at_bound() {
        assert_eq!(texts("/a/b/c/d", 2), vec!["a", "b"]);
    }

    #[test]
    fn detects_text_past_the_bound() {
        let mut buffer = SegmentBuffer::new();
        let path = format!("/a{}b", "/".repeat(40));
        tokenize(&path, 32, &mut buffer);
        assert!(is_truncated(&path, &buffer));

        tokenize("/a/b/c", 2, &mut buffer);
        assert!(is_truncated("/a/b/c", &buffer));
        tokenize("/a/b/c", 3, &mut buffer);
        assert!(!is_truncated("/a/b/c", &buffer));
        tokenize("/a//", 1, &mut buffer);
        assert!(!is_truncated("/a//", &buffer));
        tokenize("/", 32, &mut buffer);
        assert!(!is_truncated("/", &buffer));
        tokenize("/x", 0, &mut buffer);
        assert!(is_truncated("/x", &buffer));
    }

    #[test]
    fn spans_point_into_path() {
        let mut buffer = SegmentBuffer::new();
        tokenize("/v1/v2/v3", 32, &mut buffer);
        assert_eq!(buffer[1], PathSpan::new(4, 2));
    }
}
