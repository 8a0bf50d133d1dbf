//! Namespaced identifiers used as registry keys.
//!
//! A [`ResourceLocation`] has the textual form `namespace:path`. Namespaces may
//! contain `[a-z0-9_.-]`, paths additionally allow `/`. A string without a
//! namespace resolves to [`DEFAULT_NAMESPACE`].

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::Deserialize;

use crate::RegistryError;

/// Namespace assumed when an identifier does not name one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

const SEPARATOR: char = ':';

/// A validated `namespace:path` identifier.
///
/// Stored in canonical form so that the registry key and the display form
/// are the same string.
///
/// Equality, ordering and hashing only look at the canonical string, which
/// lets maps keyed by `ResourceLocation` be queried with a plain `&str`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct ResourceLocation {
    location: String,
    split: usize,
}

impl ResourceLocation {
    /// Builds an identifier from its two parts.
    pub fn new(namespace: &str, path: &str) -> Result<Self, RegistryError> {
        if !is_valid_namespace(namespace) || !is_valid_path(path) {
            return Err(RegistryError::InvalidResourceLocation {
                field: "resource_location",
                value: format!("{namespace}{SEPARATOR}{path}"),
            });
        }
        Ok(Self::from_parts(namespace, path))
    }

    /// Parses the single `namespace:path` form, defaulting to [`DEFAULT_NAMESPACE`].
    pub fn parse(location: &str) -> Result<Self, RegistryError> {
        Self::parse_with_namespace(location, DEFAULT_NAMESPACE)
    }

    /// Parses the single form, using `default_namespace` when none is given.
    pub fn parse_with_namespace(
        location: &str,
        default_namespace: &str,
    ) -> Result<Self, RegistryError> {
        Self::parse_field(location, default_namespace, "resource_location")
    }

    /// Parses `location`, reporting a failure against the named field.
    pub(crate) fn parse_field(
        location: &str,
        default_namespace: &str,
        field: &'static str,
    ) -> Result<Self, RegistryError> {
        let (namespace, path) = decompose(location, default_namespace);
        if !is_valid_namespace(namespace) || !is_valid_path(path) {
            return Err(RegistryError::InvalidResourceLocation {
                field,
                value: location.to_string(),
            });
        }
        Ok(Self::from_parts(namespace, path))
    }

    /// Joins parts the caller already knows to be valid.
    pub(crate) fn from_parts(namespace: &str, path: &str) -> Self {
        Self {
            location: format!("{namespace}{SEPARATOR}{path}"),
            split: namespace.len(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.location[..self.split]
    }

    pub fn path(&self) -> &str {
        &self.location[self.split + 1..]
    }

    /// The canonical `namespace:path` string.
    pub fn as_str(&self) -> &str {
        &self.location
    }
}

impl PartialEq for ResourceLocation {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for ResourceLocation {}

impl Hash for ResourceLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

impl PartialOrd for ResourceLocation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceLocation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location.cmp(&other.location)
    }
}

impl Borrow<str> for ResourceLocation {
    fn borrow(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

impl AsRef<str> for ResourceLocation {
    fn as_ref(&self) -> &str {
        &self.location
    }
}

impl FromStr for ResourceLocation {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceLocation {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceLocation> for String {
    fn from(value: ResourceLocation) -> Self {
        value.location
    }
}

/// Returns `true` if `location` parses as a resource location.
///
/// ```rust
/// use modpack_registry::is_valid_resource_location;
///
/// assert!(is_valid_resource_location("modpack:items"));
/// assert!(is_valid_resource_location("stone"));
/// assert!(!is_valid_resource_location("bad id"));
/// ```
pub fn is_valid_resource_location(location: &str) -> bool {
    let (namespace, path) = decompose(location, DEFAULT_NAMESPACE);
    is_valid_namespace(namespace) && is_valid_path(path)
}

fn decompose<'a>(location: &'a str, default_namespace: &'a str) -> (&'a str, &'a str) {
    match location.split_once(SEPARATOR) {
        Some(("", path)) => (default_namespace, path),
        Some((namespace, path)) => (namespace, path),
        None => (default_namespace, location),
    }
}

fn is_valid_namespace(namespace: &str) -> bool {
    namespace.chars().all(|c| {
        c == '_' || c == '-' || c == '.' || c.is_ascii_lowercase() || c.is_ascii_digit()
    })
}

fn is_valid_path(path: &str) -> bool {
    path.chars().all(|c| {
        c == '_'
            || c == '-'
            || c == '.'
            || c == '/'
            || c.is_ascii_lowercase()
            || c.is_ascii_digit()
    })
}

/// Two-level key pairing the registry an entry lives in with its own name.
///
/// [`RegistryContext::register_registry`](crate::RegistryContext::register_registry)
/// returns one whose `registry` is the root registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub registry: ResourceLocation,
    pub location: ResourceLocation,
}

impl ResourceKey {
    pub fn new(registry: ResourceLocation, location: ResourceLocation) -> Self {
        Self { registry, location }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKey[{} / {}]", self.registry, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_namespaced() {
        let loc = ResourceLocation::parse("modpack:items").unwrap();
        assert_eq!(loc.namespace(), "modpack");
        assert_eq!(loc.path(), "items");
        assert_eq!(loc.to_string(), "modpack:items");
    }

    #[test]
    fn test_parse_defaults_namespace() {
        let loc = ResourceLocation::parse("stone").unwrap();
        assert_eq!(loc.as_str(), "minecraft:stone");

        let loc = ResourceLocation::parse(":stone").unwrap();
        assert_eq!(loc.as_str(), "minecraft:stone");

        let loc = ResourceLocation::parse_with_namespace("stone", "modpack").unwrap();
        assert_eq!(loc.as_str(), "modpack:stone");
    }

    #[test]
    fn test_two_part_constructor() {
        let loc = ResourceLocation::new("modpack", "root").unwrap();
        assert_eq!(loc, "modpack:root".parse::<ResourceLocation>().unwrap());
        assert!(ResourceLocation::new("Mod", "root").is_err());
        assert!(ResourceLocation::new("modpack", "a:b").is_err());
    }

    #[test]
    fn test_path_allows_slashes() {
        let loc = ResourceLocation::parse("modpack:tools/pickaxe").unwrap();
        assert_eq!(loc.path(), "tools/pickaxe");
        assert!(!is_valid_resource_location("mod/pack:tools"));
    }

    #[test]
    fn test_rejects_invalid_characters() {
        assert!(!is_valid_resource_location("bad id"));
        assert!(!is_valid_resource_location("Modpack:items"));
        assert!(!is_valid_resource_location("modpack:items:extra"));
        assert!(!is_valid_resource_location("modpack:ä"));
    }

    #[test]
    fn test_parse_error_names_field_and_value() {
        let err = ResourceLocation::parse_field("bad id", DEFAULT_NAMESPACE, "registry_name")
            .unwrap_err();
        match err {
            RegistryError::InvalidResourceLocation { field, value } => {
                assert_eq!(field, "registry_name");
                assert_eq!(value, "bad id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resource_key_display() {
        let key = ResourceKey::new(
            ResourceLocation::parse("modpack:root").unwrap(),
            ResourceLocation::parse("modpack:items").unwrap(),
        );
        assert_eq!(key.to_string(), "ResourceKey[modpack:root / modpack:items]");
    }
}
