use thiserror::Error;

/// Boxed error produced by a fallible default value factory.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while validating or building registries.
///
/// None of these escape [`RegistryContext::init`](crate::RegistryContext::init):
/// a failed builder is logged and reported in its
/// [`BuildOutcome`](crate::BuildOutcome) while the remaining builders still run.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A field that must hold a `namespace:path` identifier held something else.
    #[error("invalid {field}: expected a resource location, got {value:?}")]
    InvalidResourceLocation { field: &'static str, value: String },

    /// A builder was queued without one of its required fields.
    #[error("missing {field}: the builder never set it")]
    MissingField { field: &'static str },

    /// The default value factory of a registry failed.
    #[error("default value for registry {registry} failed: {source}")]
    DefaultValue {
        registry: String,
        #[source]
        source: BoxError,
    },

    /// The registry configuration could not be parsed.
    #[error("invalid registry config: {0}")]
    Config(#[from] toml::de::Error),
}

impl RegistryError {
    /// The builder field this error is about, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            RegistryError::InvalidResourceLocation { field, .. }
            | RegistryError::MissingField { field } => Some(field),
            RegistryError::DefaultValue { .. } | RegistryError::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_resource_location_display() {
        let err = RegistryError::InvalidResourceLocation {
            field: "registry_name",
            value: "bad id".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid registry_name: expected a resource location, got \"bad id\""
        );
        assert_eq!(err.field(), Some("registry_name"));
    }

    #[test]
    fn test_missing_field_display() {
        let err = RegistryError::MissingField {
            field: "default_value",
        };
        assert_eq!(err.to_string(), "missing default_value: the builder never set it");
    }

    #[test]
    fn test_default_value_keeps_source() {
        let err = RegistryError::DefaultValue {
            registry: "modpack:items".to_string(),
            source: "no stone today".into(),
        };
        assert_eq!(
            err.to_string(),
            "default value for registry modpack:items failed: no stone today"
        );
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("no stone today"));
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_error_trait() {
        let err: &dyn std::error::Error = &RegistryError::MissingField {
            field: "registry_name",
        };
        assert_eq!(err.to_string(), "missing registry_name: the builder never set it");
    }
}
