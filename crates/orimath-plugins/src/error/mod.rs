//! Domain errors raised by plugin registration and execution.
//!
//! Registration problems ([`PluginError`]) are returned to the caller that
//! assembles the descriptor set. Execution problems are split in two: a
//! plugin reports its own failure as a [`PluginFailure`], and the runner wraps
//! that (or a caught panic) into an [`ExecutionError`] carrying the plugin id.
//! Execution errors are reported and contained; they never abort a run.

use std::error::Error as StdError;

use thiserror::Error;

/// Errors arising while assembling the descriptor set.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A descriptor failed validation.
    #[error("invalid plugin descriptor: {message}")]
    InvalidDescriptor {
        /// Description of the validation failure.
        message: String,
    },

    /// Two plugins in one discovery pass declared the same identifier.
    #[error("plugin '{id}' is already registered")]
    DuplicateId {
        /// Identifier that was registered twice.
        id: String,
    },

    /// The requested plugin was not found in the registry.
    #[error("plugin '{id}' not found in registry")]
    NotFound {
        /// Identifier that was looked up.
        id: String,
    },

    /// A discovery source could not enumerate its plugins.
    #[error("plugin source '{source_name}' failed: {message}")]
    Discovery {
        /// Name of the failing source.
        source_name: String,
        /// Human-readable failure description.
        message: String,
    },
}

/// Failure reported by a plugin's entry point.
///
/// # Example
///
/// ```
/// use orimath_plugins::PluginFailure;
///
/// let failure = PluginFailure::new("paper model unavailable");
/// assert_eq!(failure.to_string(), "paper model unavailable");
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PluginFailure {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl PluginFailure {
    /// Creates a failure with a human-readable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a failure wrapping an underlying error.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A contained failure of one plugin during a run.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The entry point returned an error.
    #[error("plugin '{id}' failed: {source}")]
    Failed {
        /// Identifier of the failing plugin.
        id: String,
        /// Failure reported by the plugin.
        #[source]
        source: PluginFailure,
    },

    /// The entry point panicked.
    #[error("plugin '{id}' panicked: {message}")]
    Panicked {
        /// Identifier of the failing plugin.
        id: String,
        /// Panic payload rendered as text.
        message: String,
    },
}

impl ExecutionError {
    /// Returns the identifier of the plugin that failed.
    #[must_use]
    pub fn plugin_id(&self) -> &str {
        match self {
            Self::Failed { id, .. } | Self::Panicked { id, .. } => id,
        }
    }
}

/// Errors raised when marshalling work onto the presentation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The presentation loop has been torn down; the request was dropped.
    #[error("presentation loop is closed")]
    Closed,

    /// The dispatched work panicked on the presentation context.
    #[error("dispatched work panicked")]
    Panicked,
}
