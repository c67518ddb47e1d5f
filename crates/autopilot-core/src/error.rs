use crate::types::Method;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutopilotError {
    #[error("timed out after {seconds}s while waiting for {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("couldn't retrieve exit status for token {0}, possibly timed out")]
    StatusMissing(String),

    #[error("more than one exit status for token {0}, refusing to pick one")]
    StatusAmbiguous(String),

    #[error("non-zero exit status: {0}")]
    NonZeroExit(i32),

    #[error("could not find regex {0} in output")]
    NoMatch(String),

    #[error("no bracketed address on screen to substitute into {0}")]
    NoAddress(String),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("step {step} ({method}) is the last action: nothing tells when it completes")]
    MalformedSequence { step: usize, method: Method },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("slide {slide}: {reason}")]
    Deck { slide: u32, reason: String },

    #[error("{0}")]
    Bootstrap(String),

    #[error("{program} failed: {reason}")]
    Backend { program: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl AutopilotError {
    pub(crate) fn backend(program: &str, reason: impl Into<String>) -> Self {
        AutopilotError::Backend {
            program: program.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AutopilotError>;
