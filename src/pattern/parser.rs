//! Route template parser.
//!
//! Grammar (informally):
//!
//! ```text
//! template  := ["~"] ["/"] segment ("/" segment)* ["/"]
//! segment   := (literal | "{" parameter "}")+
//! parameter := ["*" | "**"] name (":" constraint)* ["=" default] ["?"]
//! ```
//!
//! `{{` and `}}` escape a literal brace, both in literal text and inside a
//! parameter (so a regex constraint can write `\d{{3}}`).

use super::types::{ParameterKind, ParameterPart, ParameterPolicyReference, Part, PathSegment};
use crate::error::PatternError;
use crate::text::eq_ignore_case;
use crate::values::RouteValue;

/// Output of the syntactic pass, before out-of-line values are merged.
#[derive(Debug)]
pub(crate) struct ParsedTemplate {
    pub(crate) raw_text: String,
    pub(crate) segments: Vec<PathSegment>,
}

/// Parse `template` into segments and validate segment-level rules.
pub(crate) fn parse_template(template: &str) -> Result<ParsedTemplate, PatternError> {
    let trimmed = if let Some(rest) = template.strip_prefix("~/") {
        rest
    } else if template.starts_with('~') {
        return Err(PatternError::InvalidTilde {
            template: template.to_string(),
        });
    } else {
        template.strip_prefix('/').unwrap_or(template)
    };

    let mut segments = Vec::new();
    if !trimmed.is_empty() {
        let texts = split_segments(trimmed, template)?;
        let last = texts.len() - 1;
        for (index, text) in texts.into_iter().enumerate() {
            if text.is_empty() {
                if index == last {
                    // single trailing '/'
                    break;
                }
                return Err(PatternError::EmptySegment {
                    template: template.to_string(),
                });
            }
            segments.push(parse_segment(text, template)?);
        }
    }

    validate(&segments)?;

    Ok(ParsedTemplate {
        raw_text: template.to_string(),
        segments,
    })
}

/// Split on `/` outside parameters.
fn split_segments<'a>(text: &'a str, template: &str) -> Result<Vec<&'a str>, PatternError> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_parameter = false;
    let mut i = 0;
    while i < bytes.len() {
        match (bytes[i], in_parameter) {
            (b'{', false) if bytes.get(i + 1) == Some(&b'{') => i += 1,
            (b'{', false) => in_parameter = true,
            (b'}', true) if bytes.get(i + 1) == Some(&b'}') => i += 1,
            (b'{', true) if bytes.get(i + 1) == Some(&b'{') => i += 1,
            (b'}', true) => in_parameter = false,
            (b'}', false) if bytes.get(i + 1) == Some(&b'}') => i += 1,
            (b'/', false) => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if in_parameter {
        return Err(PatternError::MismatchedBrace {
            template: template.to_string(),
        });
    }
    out.push(&text[start..]);
    Ok(out)
}

fn parse_segment(text: &str, template: &str) -> Result<PathSegment, PatternError> {
    let mismatched = || PatternError::MismatchedBrace {
        template: template.to_string(),
    };

    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err(mismatched()),
            '{' => {
                if !literal.is_empty() {
                    parts.push(literal_part(std::mem::take(&mut literal))?);
                }
                let mut inner = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                            chars.next();
                            inner.push('{');
                        }
                        '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                            chars.next();
                            inner.push('}');
                        }
                        '{' => return Err(mismatched()),
                        '}' => {
                            closed = true;
                            break;
                        }
                        other => inner.push(other),
                    }
                }
                if !closed {
                    return Err(mismatched());
                }
                parts.push(Part::Parameter(parse_parameter(&inner)?));
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        parts.push(literal_part(literal)?);
    }

    Ok(PathSegment { parts })
}

fn literal_part(text: String) -> Result<Part, PatternError> {
    if text.contains('?') {
        return Err(PatternError::InvalidLiteral { literal: text });
    }
    Ok(Part::Literal(text))
}

/// Parse the text between `{` and `}`.
pub(crate) fn parse_parameter(text: &str) -> Result<ParameterPart, PatternError> {
    let mut rest = text;

    let (mut kind, encode_slashes) = if let Some(r) = rest.strip_prefix("**") {
        rest = r;
        (ParameterKind::CatchAll, false)
    } else if let Some(r) = rest.strip_prefix('*') {
        rest = r;
        (ParameterKind::CatchAll, true)
    } else {
        (ParameterKind::Standard, true)
    };

    let name_end = rest.find([':', '=']).unwrap_or(rest.len());
    let mut name = &rest[..name_end];
    rest = &rest[name_end..];

    let mut policies = Vec::new();
    while let Some(after) = rest.strip_prefix(':') {
        let end = constraint_end(after);
        policies.push(ParameterPolicyReference::deferred(&after[..end]));
        rest = &after[end..];
    }

    let mut default = None;
    let mut optional = false;
    if let Some(value) = rest.strip_prefix('=') {
        default = Some(value);
    } else if rest == "?" {
        // `{x:regex(...)?}`
        optional = true;
    }

    // Otherwise a trailing '?' sits at the end of whatever came last.
    if !optional {
        if let Some(d) = default {
            if let Some(stripped) = d.strip_suffix('?') {
                default = Some(stripped);
                optional = true;
            }
        } else if let Some(last) = policies.last_mut() {
            if let Some(content) = last.content().and_then(|c| c.strip_suffix('?')).map(str::to_string) {
                *last = ParameterPolicyReference::deferred(content);
                optional = true;
            }
        } else if let Some(stripped) = name.strip_suffix('?') {
            name = stripped;
            optional = true;
        }
    }

    if name.is_empty() || name.contains(['{', '}', '/', '?', '*']) {
        return Err(PatternError::InvalidParameterName { name: name.to_string() });
    }

    if optional {
        if kind == ParameterKind::CatchAll {
            return Err(PatternError::OptionalCatchAll { name: name.to_string() });
        }
        if default.is_some() {
            return Err(PatternError::OptionalWithDefault { name: name.to_string() });
        }
        kind = ParameterKind::Optional;
    }

    Ok(ParameterPart {
        name: name.to_string(),
        default: default.map(RouteValue::from),
        kind,
        encode_slashes,
        policies,
    })
}

/// Length of the constraint token at the start of `text`.
///
/// A token ends at the next `:` or `=`. Once a `(` has been seen the token
/// runs to the first `)` that is followed by `:`, `=`, `?` at the end, or
/// the end of the text, so arguments may contain those characters.
fn constraint_end(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b':' | b'=' => return i,
            b'(' => {
                let mut j = i + 1;
                while j < bytes.len() {
                    if bytes[j] == b')' {
                        let next = bytes.get(j + 1).copied();
                        let at_end = next.is_none() || (next == Some(b'?') && j + 2 == bytes.len());
                        if at_end || next == Some(b':') || next == Some(b'=') {
                            return j + 1;
                        }
                    }
                    j += 1;
                }
                return bytes.len();
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Cross-segment and segment-shape rules.
fn validate(segments: &[PathSegment]) -> Result<(), PatternError> {
    let mut seen: Vec<&str> = Vec::new();
    let last_segment = segments.len().saturating_sub(1);

    for (segment_index, segment) in segments.iter().enumerate() {
        let parts = &segment.parts;
        for (i, part) in parts.iter().enumerate() {
            let Part::Parameter(parameter) = part else {
                continue;
            };

            if seen.iter().any(|n| eq_ignore_case(n, &parameter.name)) {
                return Err(PatternError::DuplicateParameter {
                    name: parameter.name.clone(),
                });
            }
            seen.push(&parameter.name);

            if parameter.is_catch_all() && (segment_index != last_segment || parts.len() != 1) {
                return Err(PatternError::CatchAllMisplaced {
                    name: parameter.name.clone(),
                });
            }

            if i > 0 && parts[i - 1].is_parameter() {
                return Err(PatternError::ConsecutiveParameters {
                    segment: segment_text(segment),
                });
            }

            if parameter.is_optional() && parts.len() > 1 {
                if i != parts.len() - 1 {
                    return Err(PatternError::OptionalNotLast {
                        name: parameter.name.clone(),
                    });
                }
                if let Some(literal) = parts[i - 1].text() {
                    if literal != "." {
                        return Err(PatternError::OptionalNotPrecededByPeriod {
                            name: parameter.name.clone(),
                            literal: literal.to_string(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

/// Turn the `.` before a trailing optional parameter into a separator.
pub(crate) fn mark_separators(segments: &mut [PathSegment]) {
    for segment in segments {
        let len = segment.parts.len();
        if len < 2 {
            continue;
        }
        let trailing_optional = segment.parts[len - 1]
            .as_parameter()
            .is_some_and(ParameterPart::is_optional);
        if trailing_optional {
            if let Part::Literal(text) = &segment.parts[len - 2] {
                let text = text.clone();
                segment.parts[len - 2] = Part::Separator(text);
            }
        }
    }
}

fn segment_text(segment: &PathSegment) -> String {
    let mut out = String::new();
    for part in &segment.parts {
        match part {
            Part::Literal(t) | Part::Separator(t) => out.push_str(t),
            Part::Parameter(p) => {
                out.push('{');
                out.push_str(&p.name);
                out.push('}');
            }
        }
    }
    out
}
