//! Render configuration.
//!
//! ```ignore
//! // Defaults: mount id "app", stale attributes kept
//! let config = RenderConfig::default();
//!
//! // Builder style
//! let config = RenderConfig::default()
//!     .with_default_mount_id("root")
//!     .with_stale_attributes(StaleAttributes::Clear);
//!
//! // From SPARK_VDOM_MOUNT_ID / SPARK_VDOM_STALE_ATTRIBUTES
//! let config = RenderConfig::from_env();
//! ```

use std::env;

/// Environment variable overriding [`RenderConfig::default_mount_id`].
pub const MOUNT_ID_ENV: &str = "SPARK_VDOM_MOUNT_ID";

/// Environment variable overriding [`RenderConfig::stale_attributes`] (`keep` | `clear`).
pub const STALE_ATTRIBUTES_ENV: &str = "SPARK_VDOM_STALE_ATTRIBUTES";

/// What the reconciler does with attributes present in the old node but
/// missing from the new one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaleAttributes {
    /// Leave them on the live node. Attributes are overwrite-only.
    #[default]
    Keep,
    /// Remove them (and unbind stale handlers).
    Clear,
}

impl StaleAttributes {
    /// Parse `keep` / `clear` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keep" => Some(Self::Keep),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

/// Renderer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// `id` of the element `notify(None)` re-renders.
    pub default_mount_id: String,
    pub stale_attributes: StaleAttributes,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_mount_id: "app".to_string(),
            stale_attributes: StaleAttributes::Keep,
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(id) = lookup(MOUNT_ID_ENV).filter(|id| !id.trim().is_empty()) {
            config.default_mount_id = id.trim().to_string();
        }

        if let Some(raw) = lookup(STALE_ATTRIBUTES_ENV) {
            match StaleAttributes::parse(&raw) {
                Some(policy) => config.stale_attributes = policy,
                None => log::warn!(
                    "ignoring {STALE_ATTRIBUTES_ENV}={raw:?}: expected `keep` or `clear`"
                ),
            }
        }

        config
    }

    pub fn with_default_mount_id(mut self, id: impl Into<String>) -> Self {
        self.default_mount_id = id.into();
        self
    }

    pub fn with_stale_attributes(mut self, policy: StaleAttributes) -> Self {
        self.stale_attributes = policy;
        self
    }
}
