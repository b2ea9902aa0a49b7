pub mod locators;
pub mod page;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::browser::HostError;

pub use locators::{SelectorMap, WordleLocators};
pub use page::WordlePage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    Resolution,
    Assertion,
}

#[derive(Debug, thiserror::Error)]
pub enum WordleError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("Word must be {expected} letters, got: {word}")]
    InvalidWord { expected: usize, word: String },
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("no notification became visible within {waited:?}")]
    NotificationMissing { waited: Duration },
    #[error("{what}: expected {expected}, got {actual}")]
    Assertion {
        what: String,
        expected: String,
        actual: String,
    },
}

impl WordleError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::InvalidWord { .. } => ErrorKind::Validation,
            Self::Host(_) | Self::NotificationMissing { .. } => ErrorKind::Resolution,
            Self::Assertion { .. } => ErrorKind::Assertion,
        }
    }

    pub(crate) fn assertion(
        what: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::Assertion {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WordleError>;
