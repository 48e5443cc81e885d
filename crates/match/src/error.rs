use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("wildcard segment `*` must be the final segment in {pattern:?}")]
    WildcardNotLast { pattern: String },

    #[error("capture segment `:` needs a name in {pattern:?}")]
    EmptyCaptureName { pattern: String },
}

impl PatternError {
    pub(crate) fn wildcard_not_last<S: ToString>(pattern: S) -> Self {
        Self::WildcardNotLast { pattern: pattern.to_string() }
    }

    pub(crate) fn empty_capture_name<S: ToString>(pattern: S) -> Self {
        Self::EmptyCaptureName { pattern: pattern.to_string() }
    }
}
