//! Log output selection.
//!
//! Parsed from `--log-format` / `ORIMATH_LOG_FORMAT`; case is ignored.

use strum::{Display, EnumString};

/// How diagnostics are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, fields flattened.
    Json,
    /// Terse single-line text for terminals.
    #[default]
    Compact,
}

impl LogFormat {
    /// Whether events are emitted as machine-readable records.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}
