//! Incremental path writer used while binding a template.
//!
//! Values equal to their default are buffered instead of written. The
//! buffer is flushed when a later value has to be written, and dropped if
//! nothing follows, so trailing default segments vanish from the output.

use super::LinkOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentState {
    Beginning,
    Inside,
}

#[derive(Debug)]
struct Buffered {
    text: String,
    encode: bool,
}

#[derive(Debug)]
pub(crate) struct UriBuildingContext {
    uri: String,
    buffer: Vec<Buffered>,
    buffer_state: SegmentState,
    uri_state: SegmentState,
    last_value_offset: Option<usize>,
    query: String,
}

impl UriBuildingContext {
    pub(crate) fn new() -> Self {
        Self {
            uri: String::new(),
            buffer: Vec::new(),
            buffer_state: SegmentState::Beginning,
            uri_state: SegmentState::Beginning,
            last_value_offset: None,
            query: String::new(),
        }
    }

    /// Write `value`, flushing anything buffered first. An empty value is
    /// only allowed as a whole segment.
    pub(crate) fn accept(&mut self, value: &str, encode_slashes: bool) -> bool {
        if value.is_empty() {
            if self.uri_state == SegmentState::Inside || self.buffer_state == SegmentState::Inside {
                return false;
            }
            self.buffer_state = SegmentState::Inside;
            return true;
        }

        for buffered in std::mem::take(&mut self.buffer) {
            if buffered.encode {
                encode_into(&mut self.uri, &buffered.text, true);
            } else {
                self.uri.push_str(&buffered.text);
            }
        }

        if self.uri_state == SegmentState::Beginning
            && self.buffer_state == SegmentState::Beginning
            && !self.uri.is_empty()
        {
            self.uri.push('/');
        }

        self.buffer_state = SegmentState::Inside;
        self.uri_state = SegmentState::Inside;
        self.last_value_offset = Some(self.uri.len());

        match value.strip_prefix('/') {
            Some(rest) if self.uri.is_empty() => {
                self.uri.push('/');
                encode_into(&mut self.uri, rest, encode_slashes);
            }
            _ => encode_into(&mut self.uri, value, encode_slashes),
        }
        true
    }

    /// Hold a default-valued `value` until something after it is written.
    pub(crate) fn buffer(&mut self, value: &str) -> bool {
        if value.is_empty() {
            if self.buffer_state == SegmentState::Inside {
                return false;
            }
            self.buffer_state = SegmentState::Inside;
            return true;
        }

        if self.uri_state == SegmentState::Inside {
            return self.accept(value, true);
        }

        if self.uri_state == SegmentState::Beginning && self.buffer_state == SegmentState::Beginning {
            if !self.uri.is_empty() || !self.buffer.is_empty() {
                self.buffer.push(Buffered {
                    text: "/".to_string(),
                    encode: false,
                });
            }
            self.buffer_state = SegmentState::Inside;
        }

        self.buffer.push(Buffered {
            text: value.to_string(),
            encode: true,
        });
        true
    }

    /// Retract the last written value (the separator before an absent
    /// optional parameter).
    pub(crate) fn remove_last_value(&mut self) {
        if let Some(offset) = self.last_value_offset.take() {
            self.uri.truncate(offset);
        }
    }

    pub(crate) fn end_segment(&mut self) {
        self.buffer_state = SegmentState::Beginning;
        self.uri_state = SegmentState::Beginning;
    }

    /// Append `key=value` to the query string. Empty values are skipped.
    pub(crate) fn append_query(&mut self, key: &str, value: &str, lowercase: bool) -> bool {
        if value.is_empty() {
            return false;
        }
        self.query.push(if self.query.is_empty() { '?' } else { '&' });
        if lowercase {
            encode_into(&mut self.query, &key.to_lowercase(), true);
            self.query.push('=');
            encode_into(&mut self.query, &value.to_lowercase(), true);
        } else {
            encode_into(&mut self.query, key, true);
            self.query.push('=');
            encode_into(&mut self.query, value, true);
        }
        true
    }

    /// The generated path and query. Buffered defaults are dropped.
    pub(crate) fn finish(self, options: &LinkOptions) -> String {
        let mut path = if self.uri.starts_with('/') {
            self.uri
        } else {
            let mut rooted = String::with_capacity(self.uri.len() + 1);
            rooted.push('/');
            rooted.push_str(&self.uri);
            rooted
        };
        if options.lowercase_urls {
            path = path.to_lowercase();
        }
        if options.append_trailing_slash && !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(&self.query);
        path
    }
}

fn encode_into(out: &mut String, value: &str, encode_slashes: bool) {
    if encode_slashes {
        out.push_str(&urlencoding::encode(value));
        return;
    }
    for (i, piece) in value.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(&urlencoding::encode(piece));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_buffered_values_are_dropped() {
        let mut ctx = UriBuildingContext::new();
        assert!(ctx.accept("Home", true));
        ctx.end_segment();
        assert!(ctx.buffer("Index"));
        ctx.end_segment();
        assert_eq!(ctx.finish(&LinkOptions::default()), "/Home");
    }

    #[test]
    fn buffered_values_flush_before_later_values() {
        let mut ctx = UriBuildingContext::new();
        assert!(ctx.buffer("Home"));
        ctx.end_segment();
        assert!(ctx.buffer("Index"));
        ctx.end_segment();
        assert!(ctx.accept("5", true));
        ctx.end_segment();
        assert_eq!(ctx.finish(&LinkOptions::default()), "/Home/Index/5");
    }

    #[test]
    fn empty_value_rejected_inside_segment() {
        let mut ctx = UriBuildingContext::new();
        assert!(ctx.accept("5", true));
        assert!(ctx.accept(".", true));
        assert!(!ctx.accept("", true));
        ctx.remove_last_value();
        ctx.end_segment();
        assert_eq!(ctx.finish(&LinkOptions::default()), "/5");
    }

    #[test]
    fn slashes_encoded_unless_disabled() {
        let mut ctx = UriBuildingContext::new();
        assert!(ctx.accept("a/b c", true));
        assert_eq!(ctx.finish(&LinkOptions::default()), "/a%2Fb%20c");

        let mut ctx = UriBuildingContext::new();
        assert!(ctx.accept("a/b c", false));
        assert_eq!(ctx.finish(&LinkOptions::default()), "/a/b%20c");
    }

    #[test]
    fn query_and_options() {
        let mut ctx = UriBuildingContext::new();
        assert!(ctx.accept("Products", true));
        assert!(ctx.append_query("Page", "Two", false));
        assert!(!ctx.append_query("empty", "", false));
        assert!(ctx.append_query("q", "a&b", false));
        let options = LinkOptions {
            lowercase_urls: true,
            append_trailing_slash: true,
            ..LinkOptions::default()
        };
        assert_eq!(ctx.finish(&options), "/products/?Page=Two&q=a%26b");
    }
}
