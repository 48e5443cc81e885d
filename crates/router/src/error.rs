use micro_match::PatternError;
use thiserror::Error;

/// The failure type handlers surface to the error boundary.
///
/// Anything convertible into a boxed error works with `?` inside handlers;
/// the boundary stringifies it for the generic failure response.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RouterBuildError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("socket route {pattern:?} registered without an upgrader")]
    MissingUpgrader { pattern: String },
}

impl RouterBuildError {
    pub(crate) fn invalid_pattern<S: ToString>(pattern: S, source: PatternError) -> Self {
        Self::InvalidPattern { pattern: pattern.to_string(), source }
    }

    pub(crate) fn missing_upgrader<S: ToString>(pattern: S) -> Self {
        Self::MissingUpgrader { pattern: pattern.to_string() }
    }
}
