use serde::Deserialize;

use crate::resource_location::DEFAULT_NAMESPACE;
use crate::{RegistryError, ResourceLocation};

/// Settings for a [`RegistryContext`](crate::RegistryContext).
///
/// Every field has a default, so an empty document is a valid config:
///
/// ```rust
/// use modpack_registry::RegistryConfig;
///
/// let config = RegistryConfig::from_toml_str(r#"default_namespace = "modpack""#).unwrap();
/// assert_eq!(config.root_key.as_str(), "modpack:root");
/// assert_eq!(config.default_namespace, "modpack");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Key of the root registry, the first half of every key returned by
    /// `register_registry`.
    pub root_key: ResourceLocation,
    /// Namespace given to builder names and keys that omit one.
    pub default_namespace: String,
}

impl RegistryConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, RegistryError> {
        let config: Self = toml::from_str(source)?;
        if config.default_namespace.is_empty()
            || ResourceLocation::new(&config.default_namespace, "").is_err()
        {
            return Err(RegistryError::InvalidResourceLocation {
                field: "default_namespace",
                value: config.default_namespace,
            });
        }
        Ok(config)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root_key: ResourceLocation::from_parts("modpack", "root"),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}
