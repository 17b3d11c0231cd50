//! Two-pass matcher for a single route pattern.

use super::tokenizer::{is_truncated, tokenize, PathSpan, SegmentBuffer, DEFAULT_MAX_SEGMENTS};
use crate::pattern::{ParameterPart, Part, PathSegment, RoutePattern};
use crate::text::{ends_with_ignore_case, eq_ignore_case, rfind_ignore_case};
use crate::values::{RouteValue, RouteValueDictionary};
use smallvec::SmallVec;
use std::sync::Arc;

/// Matches request paths against one [`RoutePattern`].
///
/// The first pass rejects without allocating; the second pass captures
/// values. Only the second pass writes to the caller's value map, and only
/// once the path is known to match (complex segments excepted, which can
/// still fail while capturing; the caller discards the map in that case).
#[derive(Debug, Clone)]
pub struct RoutePatternMatcher {
    pattern: Arc<RoutePattern>,
    defaults: RouteValueDictionary,
    has_default: SmallVec<[bool; 8]>,
}

impl RoutePatternMatcher {
    /// Matcher using the pattern's own defaults.
    #[must_use]
    pub fn new(pattern: Arc<RoutePattern>) -> Self {
        let defaults = pattern.defaults().clone();
        Self::with_defaults(pattern, defaults)
    }

    /// Matcher with an explicit defaults map.
    #[must_use]
    pub fn with_defaults(pattern: Arc<RoutePattern>, defaults: RouteValueDictionary) -> Self {
        let has_default = pattern
            .segments()
            .iter()
            .map(|segment| {
                segment
                    .single_parameter()
                    .is_some_and(|p| has_value(defaults.get(&p.name)))
            })
            .collect();
        Self {
            pattern,
            defaults,
            has_default,
        }
    }

    /// The pattern being matched.
    #[must_use]
    pub fn pattern(&self) -> &Arc<RoutePattern> {
        &self.pattern
    }

    /// Tokenize `path` and match it, adding captured values to `values`.
    pub fn try_match(&self, path: &str, values: &mut RouteValueDictionary) -> bool {
        let mut buffer = SegmentBuffer::new();
        let bound = DEFAULT_MAX_SEGMENTS.max(self.pattern.segments().len() + 1);
        tokenize(path, bound, &mut buffer);
        self.try_match_tokenized(path, &buffer, values)
    }

    /// Match and return the captured values.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteValueDictionary> {
        let mut values = RouteValueDictionary::new();
        self.try_match(path, &mut values).then_some(values)
    }

    /// Match an already-tokenized path.
    pub fn try_match_tokenized(&self, path: &str, spans: &[PathSpan], values: &mut RouteValueDictionary) -> bool {
        let segments = self.pattern.segments();

        // Text past the tokenizer bound is only consumed by a catch-all.
        if is_truncated(path, spans) && self.pattern.catch_all_index().map_or(true, |index| index >= spans.len()) {
            return false;
        }

        // Pass 1: reject without capturing.
        let mut i = 0;
        for span in spans {
            let Some(segment) = segments.get(i) else {
                // Only empty segments may follow the end of the pattern.
                if span.is_empty() {
                    continue;
                }
                return false;
            };

            if let Some(parameter) = segment.single_parameter() {
                if parameter.is_catch_all() {
                    break;
                }
                if span.is_empty() && !self.has_default[i] && !parameter.is_optional() {
                    return false;
                }
            } else if let Some(text) = segment.single().and_then(Part::text) {
                if !eq_ignore_case(text, span.text(path)) {
                    return false;
                }
            } else if span.is_empty() {
                return false;
            }
            i += 1;
        }

        // Pattern segments the path did not reach.
        for (index, segment) in segments.iter().enumerate().skip(i) {
            let Some(parameter) = segment.single_parameter() else {
                return false;
            };
            if parameter.is_catch_all() {
                break;
            }
            if !self.has_default[index] && !parameter.is_optional() {
                return false;
            }
        }

        // Pass 2: capture.
        let mut consumed = 0;
        for (index, span) in spans.iter().enumerate() {
            let Some(segment) = segments.get(index) else {
                break;
            };
            consumed = index + 1;

            if let Some(parameter) = segment.single_parameter() {
                if parameter.is_catch_all() {
                    let captured = &path[span.start..];
                    if !captured.is_empty() {
                        values.insert(parameter.name(), captured);
                    } else {
                        self.insert_default(parameter, values);
                    }
                    consumed = index;
                    break;
                }
                if span.is_empty() {
                    self.insert_default(parameter, values);
                } else {
                    values.insert(parameter.name(), span.text(path));
                }
            } else if !segment.is_simple() && !match_complex_segment(segment, span.text(path), values) {
                return false;
            }
        }

        for segment in segments.iter().skip(consumed) {
            if let Some(parameter) = segment.single_parameter() {
                if !values.contains_key(parameter.name()) {
                    self.insert_default(parameter, values);
                }
            }
        }

        for (key, value) in self.defaults.iter() {
            if has_value(Some(value)) {
                values.try_add(key, value.clone());
            }
        }

        true
    }

    fn insert_default(&self, parameter: &ParameterPart, values: &mut RouteValueDictionary) {
        if let Some(default) = self.defaults.get(parameter.name()).filter(|v| has_value(Some(v))) {
            values.insert(parameter.name(), default.clone());
        }
    }
}

fn has_value(value: Option<&RouteValue>) -> bool {
    !matches!(value, None | Some(RouteValue::Null))
}

/// Match a segment with two or more parts, writing captures on success.
///
/// When the segment ends in `<separator>{optional?}` the full match is tried
/// first, then the match without the optional parameter and its separator.
pub(crate) fn match_complex_segment(segment: &PathSegment, text: &str, values: &mut RouteValueDictionary) -> bool {
    let parts = segment.parts();
    let last = parts.len() - 1;

    let trailing_optional = parts[last].as_parameter().is_some_and(ParameterPart::is_optional);
    if trailing_optional {
        if let Part::Separator(separator) = &parts[last - 1] {
            if match_complex_segment_core(parts, text, values, last) {
                return true;
            }
            if ends_with_ignore_case(text, separator) || last < 2 {
                return false;
            }
            return match_complex_segment_core(parts, text, values, last - 2);
        }
    }
    match_complex_segment_core(parts, text, values, last)
}

/// Right-to-left scan anchored on literals, starting at `parts[start]`.
fn match_complex_segment_core(parts: &[Part], text: &str, values: &mut RouteValueDictionary, start: usize) -> bool {
    let mut captured: SmallVec<[(&str, &str); 4]> = SmallVec::new();
    let mut last_index = text.len();
    let mut pending: Option<&ParameterPart> = None;
    let mut last_literal: Option<&str> = None;

    for index in (0..=start).rev() {
        let part = &parts[index];
        let mut new_last_index = last_index;

        match part {
            Part::Parameter(parameter) => pending = Some(parameter),
            Part::Literal(literal) | Part::Separator(literal) => {
                last_literal = Some(literal);

                // A pending parameter needs at least one character.
                let search_end = if pending.is_some() {
                    match text[..last_index].char_indices().next_back() {
                        Some((boundary, _)) => boundary,
                        None => return false,
                    }
                } else {
                    last_index
                };
                if search_end == 0 {
                    return false;
                }

                let Some(found) = rfind_ignore_case(&text[..search_end], literal) else {
                    return false;
                };

                // The right-most part, if literal, must reach the end of the segment.
                if index == start && found + literal.len() != text.len() {
                    return false;
                }
                new_last_index = found;
            }
        }

        if let Some(parameter) = pending {
            let take = match (last_literal, part.is_parameter()) {
                (Some(literal), false) => Some((new_last_index + literal.len(), last_index)),
                (_, _) if index == 0 => Some((0, last_index)),
                _ => None,
            };
            if let Some((from, to)) = take {
                if from >= to {
                    // Parameters inside complex segments cannot be empty.
                    return false;
                }
                captured.push((parameter.name(), &text[from..to]));
                pending = None;
                last_literal = None;
            }
        }

        last_index = new_last_index;
    }

    // A leading literal must consume the segment to its left edge.
    if last_index == 0 || parts[0].is_parameter() {
        for (name, value) in captured {
            values.insert(name, value);
        }
        return true;
    }
    false
}
