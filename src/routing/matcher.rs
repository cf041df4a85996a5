//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile a path template (`/usuarios/<id>/editar`) into segments
//! - Match a request path positionally against those segments
//! - Capture wildcard values for the handler
//!
//! # Design Decisions
//! - Leading and trailing `/` are ignored on both sides
//! - Segment counts must be equal, no prefix or catch-all matching
//! - A wildcard matches exactly one non-empty segment
//! - Literal segments are case-sensitive
//! - No regex, matching is a single zip over segments

use std::fmt;

use thiserror::Error;

/// Errors raised while compiling a path pattern.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern must start with '/': {0:?}")]
    MissingLeadingSlash(String),

    #[error("malformed wildcard segment {segment:?} in pattern {pattern:?}")]
    MalformedWildcard { pattern: String, segment: String },
}

/// One `/`-separated piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// `<name>`: matches any single non-empty segment.
    Wildcard(String),
}

/// Split a path into its segments the way patterns and requests agree on.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim_matches('/').split('/')
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        }

        let segments = segments(pattern)
            .map(|segment| {
                if let Some(name) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                    if name.is_empty() || name.contains(['<', '>']) {
                        return Err(PatternError::MalformedWildcard {
                            pattern: pattern.to_string(),
                            segment: segment.to_string(),
                        });
                    }
                    Ok(Segment::Wildcard(name.to_string()))
                } else if segment.contains(['<', '>']) {
                    Err(PatternError::MalformedWildcard {
                        pattern: pattern.to_string(),
                        segment: segment.to_string(),
                    })
                } else {
                    Ok(Segment::Literal(segment.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Match `path`, returning the wildcard captures on success.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let parts: Vec<&str> = segments(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Wildcard(_) if part.is_empty() => return None,
                Segment::Wildcard(name) => params.push(name, part),
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Wildcard captures, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: Vec<(String, String)>,
}

impl Params {
    fn push(&mut self, name: &str, value: &str) {
        self.values.push((name.to_string(), value.to_string()));
    }

    /// Capture by placeholder name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Capture by position among the wildcards.
    pub fn nth(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
