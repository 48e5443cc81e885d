//! Registered match templates: literal and capture segments with an
//! optional trailing wildcard.
//!
//! A pattern performs no scoring. Two patterns that both match a path are
//! tied, and the route table breaks the tie by registration order alone,
//! so callers register specific routes before catch-alls.

use crate::captures::Captures;
use crate::error::PatternError;
use crate::path;

const CAPTURE_MARKER: char = ':';
const WILDCARD: &str = "*";

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly (both sides decoded).
    Literal(String),
    /// Binds the request segment's value under the capture name,
    /// unconditionally.
    Capture(String),
}

/// A compiled match template.
///
/// Compiled once at registration end and immutable afterwards; matching
/// borrows the pattern and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
    wildcard: bool,
}

impl Pattern {
    /// Compiles a pattern string.
    ///
    /// Segment syntax: `:name` captures, a final bare `*` matches any
    /// remaining suffix, everything else is a literal. Redundant slashes
    /// normalize away exactly as they do for request paths.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let parts = path::segments(raw);
        let count = parts.len();

        let mut segments = Vec::with_capacity(count);
        let mut wildcard = false;

        for (index, part) in parts.into_iter().enumerate() {
            if part == WILDCARD {
                if index + 1 != count {
                    return Err(PatternError::wildcard_not_last(raw));
                }
                wildcard = true;
            } else if let Some(name) = part.strip_prefix(CAPTURE_MARKER) {
                if name.is_empty() {
                    return Err(PatternError::empty_capture_name(raw));
                }
                segments.push(Segment::Capture(name.to_string()));
            } else {
                segments.push(Segment::Literal(part));
            }
        }

        Ok(Self { segments, wildcard })
    }

    /// Number of concrete (non-wildcard) segments the pattern consumes.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the pattern ends in the wildcard segment.
    pub fn has_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Matches the pattern against decoded request segments.
    ///
    /// Returns the captures and remainder on success, `None` on any length
    /// or literal mismatch. Without a wildcard the lengths must be equal;
    /// with one, the pattern may consume a prefix and the rest becomes the
    /// remainder.
    pub fn matches(&self, parts: &[String]) -> Option<Captures> {
        if self.wildcard {
            if parts.len() < self.segments.len() {
                return None;
            }
        } else if parts.len() != self.segments.len() {
            return None;
        }

        let mut values = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    values.push((name.clone(), part.clone()));
                }
            }
        }

        let remainder = parts[self.segments.len()..].to_vec();
        Some(Captures::new(values, remainder))
    }
}
