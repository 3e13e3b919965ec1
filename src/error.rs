use std::fmt;

use parse_display::Display;
use serde::{Deserialize, Serialize};

/// Failure reported by a collaborator while loading categories or cards.
///
/// Cloned into every slot of the window it failed, so it only keeps rendered text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("{message}")]
pub struct LoadError {
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Captures the `Display` text of `e` and of its source, if any.
    pub fn from_error(e: &(dyn std::error::Error + 'static)) -> Self {
        Self {
            message: e.to_string(),
            source: e.source().map(|s| s.to_string()),
        }
    }

    pub fn with_source(mut self, source: impl fmt::Display) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn source_message(&self) -> Option<&str> {
        self.source.as_deref()
    }
}
impl std::error::Error for LoadError {}

impl From<String> for LoadError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
impl From<&str> for LoadError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// An [`Options`](crate::Options) value that the engine refuses to run with.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[display("`{0}` must be greater than zero")]
pub struct OptionsError(pub &'static str);

impl std::error::Error for OptionsError {}
