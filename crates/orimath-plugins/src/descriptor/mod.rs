//! Plugin identity and presentation metadata.
//!
//! Every discovered plugin is paired with a [`PluginDescriptor`]: a stable
//! identifier used for ordering, plus a display name and description used
//! only when the host enumerates plugins (for example in a plugin management
//! view). Descriptors are created once per discovery pass and never change
//! afterwards.

use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// Discovery pool a plugin belongs to.
///
/// The two pools are disjoint and ordered independently, each against its
/// own preference list.
///
/// # Example
///
/// ```
/// use orimath_plugins::PluginKind;
///
/// assert_eq!(PluginKind::View.as_str(), "view");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginKind {
    /// Domain logic: tools, effects, workspace wiring.
    General,
    /// Contributes presentation units (view models) to the host shell.
    View,
}

impl PluginKind {
    /// Both pools in execution order.
    pub const ALL: [Self; 2] = [Self::General, Self::View];

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::View => "view",
        }
    }
}

impl std::fmt::Display for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration record a plugin publishes about itself.
///
/// When no explicit id is declared the registry derives one from the
/// implementing type.
///
/// # Example
///
/// ```
/// use orimath_plugins::PluginMetadata;
///
/// let meta = PluginMetadata::new("Toolbox", "Tool switcher on the left edge.")
///     .with_id("orimath.toolbox");
/// assert_eq!(meta.id(), Some("orimath.toolbox"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    display_name: String,
    description: String,
}

impl PluginMetadata {
    /// Creates metadata with a display name and description.
    #[must_use]
    pub fn new(display_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            display_name: display_name.into(),
            description: description.into(),
        }
    }

    /// Declares an explicit identifier instead of the type-derived one.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the explicitly declared identifier, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the human-readable description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Identity and metadata of one discovered plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    id: String,
    display_name: String,
    description: String,
    kind: PluginKind,
}

impl PluginDescriptor {
    /// Builds a descriptor, preferring the metadata's explicit id over
    /// `fallback_id`.
    #[must_use]
    pub fn from_metadata(
        fallback_id: impl Into<String>,
        metadata: PluginMetadata,
        kind: PluginKind,
    ) -> Self {
        let PluginMetadata {
            id,
            display_name,
            description,
        } = metadata;
        Self {
            id: id.unwrap_or_else(|| fallback_id.into()),
            display_name,
            description,
            kind,
        }
    }

    /// Builds a descriptor for plugin type `P`, deriving the id from the
    /// type path unless the metadata declares one.
    ///
    /// # Example
    ///
    /// ```
    /// use orimath_plugins::{PluginDescriptor, PluginKind, PluginMetadata};
    ///
    /// struct MeasureView;
    ///
    /// let descriptor = PluginDescriptor::for_plugin::<MeasureView>(
    ///     PluginMetadata::new("Measure", "Shows the selected point."),
    ///     PluginKind::View,
    /// );
    /// assert!(descriptor.id().ends_with("MeasureView"));
    /// ```
    #[must_use]
    pub fn for_plugin<P: ?Sized>(metadata: PluginMetadata, kind: PluginKind) -> Self {
        Self::from_metadata(std::any::type_name::<P>(), metadata, kind)
    }

    /// Validates the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidDescriptor`] if the id is blank or has
    /// surrounding whitespace.
    pub fn validate(&self) -> Result<(), PluginError> {
        let trimmed = self.id.trim();
        if trimmed.is_empty() {
            return Err(PluginError::InvalidDescriptor {
                message: String::from("plugin id must not be empty"),
            });
        }
        if trimmed.len() != self.id.len() {
            return Err(PluginError::InvalidDescriptor {
                message: format!("plugin id '{}' has surrounding whitespace", self.id),
            });
        }
        Ok(())
    }

    /// Returns the stable identifier.
    #[must_use]
    pub const fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the human-readable description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the discovery pool.
    #[must_use]
    pub const fn kind(&self) -> PluginKind {
        self.kind
    }
}
