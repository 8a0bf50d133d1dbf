//! Deferred registry declarations.
//!
//! Scripts describe the registries they want with a [`RegistryBuilder`] and
//! queue it while the new-registry notification runs. Nothing is validated
//! until the builder is drained by
//! [`RegistryContext::build_all`](crate::RegistryContext::build_all).

use std::fmt;
use std::hash::Hash;

use crate::registry_error::BoxError;
use crate::{RegistryContext, RegistryError, ResourceKey, ResourceLocation};

/// Producer of a registry's default value, run once at build time.
pub type DefaultFactory<T> = Box<dyn FnOnce() -> Result<T, BoxError> + Send>;

/// A queued registry declaration whose value type has been erased.
///
/// Lets builders for registries of different value types share one queue.
pub trait PendingRegistry: Send {
    /// The name the declaration asks for, as given (unvalidated).
    fn registry_name(&self) -> Option<&str>;

    /// Validates the declaration and registers the resulting registry.
    fn build(self: Box<Self>, context: &mut RegistryContext) -> Result<ResourceKey, RegistryError>;
}

/// Chainable declaration of a registry.
///
/// ```rust
/// use modpack_registry::{RegistryBuilder, RegistryContext};
///
/// let mut context = RegistryContext::new();
/// context.queue(
///     RegistryBuilder::new()
///         .set_registry_name("modpack:items")
///         .set_default_key("modpack:none")
///         .set_default_value(|| "air".to_string()),
/// );
/// context.init();
///
/// let items = context.get_registry::<String>("modpack:items").unwrap();
/// let items = items.read().unwrap();
/// assert_eq!(items.get("modpack:none").map(String::as_str), Some("air"));
/// ```
pub struct RegistryBuilder<T> {
    registry_name: Option<String>,
    default_key: Option<String>,
    default_value: Option<DefaultFactory<T>>,
}

impl<T> Default for RegistryBuilder<T> {
    fn default() -> Self {
        Self {
            registry_name: None,
            default_key: None,
            default_value: None,
        }
    }
}

impl<T> RegistryBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_registry_name(mut self, registry_name: impl Into<String>) -> Self {
        self.registry_name = Some(registry_name.into());
        self
    }

    pub fn set_default_key(mut self, default_key: impl Into<String>) -> Self {
        self.default_key = Some(default_key.into());
        self
    }

    /// Sets the producer of the default entry's value.
    ///
    /// A panic inside the producer rejects the builder like a returned error.
    pub fn set_default_value(
        mut self,
        default_value: impl FnOnce() -> T + Send + 'static,
    ) -> Self {
        self.default_value = Some(Box::new(move || Ok(default_value())));
        self
    }

    /// Sets a producer that may fail; a failure rejects the whole builder.
    pub fn set_default_value_with<E>(
        mut self,
        default_value: impl FnOnce() -> Result<T, E> + Send + 'static,
    ) -> Self
    where
        E: Into<BoxError>,
    {
        self.default_value = Some(Box::new(move || default_value().map_err(Into::into)));
        self
    }

    pub fn registry_name(&self) -> Option<&str> {
        self.registry_name.as_deref()
    }

    pub fn default_key(&self) -> Option<&str> {
        self.default_key.as_deref()
    }

    /// Checks every field, `default_key` before `registry_name`, and hands back
    /// the parsed parts.
    pub(crate) fn into_parts(
        self,
        default_namespace: &str,
    ) -> Result<(ResourceLocation, ResourceLocation, DefaultFactory<T>), RegistryError> {
        let default_key = self.default_key.ok_or(RegistryError::MissingField {
            field: "default_key",
        })?;
        let default_key =
            ResourceLocation::parse_field(&default_key, default_namespace, "default_key")?;

        let registry_name = self.registry_name.ok_or(RegistryError::MissingField {
            field: "registry_name",
        })?;
        let registry_name =
            ResourceLocation::parse_field(&registry_name, default_namespace, "registry_name")?;

        let default_value = self.default_value.ok_or(RegistryError::MissingField {
            field: "default_value",
        })?;

        Ok((registry_name, default_key, default_value))
    }
}

impl<T> fmt::Debug for RegistryBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("registry_name", &self.registry_name)
            .field("default_key", &self.default_key)
            .field("default_value", &self.default_value.is_some())
            .finish()
    }
}

impl<T> PendingRegistry for RegistryBuilder<T>
where
    T: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn registry_name(&self) -> Option<&str> {
        self.registry_name.as_deref()
    }

    fn build(self: Box<Self>, context: &mut RegistryContext) -> Result<ResourceKey, RegistryError> {
        context.try_build_registry(*self)
    }
}

/// FIFO queue of pending registry declarations.
#[derive(Default)]
pub struct BuilderQueue {
    builders: Vec<Box<dyn PendingRegistry>>,
}

impl BuilderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, builder: impl PendingRegistry + 'static) {
        self.builders.push(Box::new(builder));
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Names of the queued declarations, in queue order.
    pub fn names(&self) -> impl Iterator<Item = Option<&str>> {
        self.builders.iter().map(|builder| builder.registry_name())
    }

    /// Empties the queue, returning its builders in insertion order.
    pub(crate) fn take(&mut self) -> Vec<Box<dyn PendingRegistry>> {
        std::mem::take(&mut self.builders)
    }

    pub(crate) fn clear(&mut self) {
        self.builders.clear();
    }
}

impl fmt::Debug for BuilderQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
