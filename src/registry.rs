//! Bidirectional keyed registries.
//!
//! A [`Registry`] maps [`ResourceLocation`] keys to values and values back to
//! their keys. Registration is last-write-wins in both directions.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::ResourceLocation;

/// A registry shared between its owner and the root registry.
pub type SharedRegistry<T> = Arc<RwLock<Registry<T>>>;

/// Bidirectional table from resource locations to values.
///
/// # Reverse entries on overwrite
///
/// Re-registering a key replaces its forward entry but leaves the reverse
/// entry of the replaced value in place, so [`Registry::get_key`] on the old
/// value still answers with the key it was last registered under.
///
/// # Examples
///
/// ```rust
/// use modpack_registry::{Registry, ResourceLocation};
///
/// let stone = ResourceLocation::parse("minecraft:stone").unwrap();
/// let mut blocks = Registry::new();
/// blocks.register(stone.clone(), 1u32);
///
/// assert_eq!(blocks.get("minecraft:stone"), Some(&1));
/// assert_eq!(blocks.get_key(&1), Some(&stone));
/// ```
#[derive(Debug, Clone)]
pub struct Registry<T> {
    by_key: HashMap<ResourceLocation, T>,
    by_value: HashMap<T, ResourceLocation>,
    default_key: Option<ResourceLocation>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            by_key: HashMap::new(),
            by_value: HashMap::new(),
            default_key: None,
        }
    }
}

impl<T: Clone + Eq + Hash> Registry<T> {
    /// Creates an empty registry with no default entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with one entry under `default_key`.
    ///
    /// The returned registry is never empty, and [`Registry::get_or_default`]
    /// falls back to that entry.
    pub fn create(default_key: ResourceLocation, default_value: T) -> Self {
        let mut registry = Self::new();
        registry.register(default_key.clone(), default_value);
        registry.default_key = Some(default_key);
        registry
    }

    /// Looks up a value by the canonical `namespace:path` form of its key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&T> {
        self.by_key.get(key.as_ref())
    }

    /// Looks up the key a value was last registered under.
    pub fn get_key(&self, value: &T) -> Option<&ResourceLocation> {
        self.by_value.get(value)
    }

    /// Inserts `value` under `key`, overwriting any earlier entry in either direction.
    pub fn register(&mut self, key: ResourceLocation, value: T) {
        tracing::trace!(key = %key, "registering entry");
        self.by_value.insert(value.clone(), key.clone());
        self.by_key.insert(key, value);
    }

    /// Looks up `key`, falling back to the default entry.
    pub fn get_or_default(&self, key: impl AsRef<str>) -> Option<&T> {
        self.get(key).or_else(|| self.default_value())
    }

    /// The key the registry was seeded with by [`Registry::create`].
    pub fn default_key(&self) -> Option<&ResourceLocation> {
        self.default_key.as_ref()
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default_key.as_ref().and_then(|key| self.by_key.get(key))
    }

    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.by_key.contains_key(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ResourceLocation> {
        self.by_key.keys()
    }

    /// Iterates over forward entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceLocation, &T)> {
        self.by_key.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.by_key.clear();
        self.by_value.clear();
    }
}

/// Type-erased handle to a [`SharedRegistry`], compared by identity.
///
/// This is the value type of the root registry, so reverse lookups there
/// find a registry instance rather than an equal-looking one.
#[derive(Clone)]
pub struct RegistryHandle {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl RegistryHandle {
    pub fn new<T: Send + Sync + 'static>(registry: &SharedRegistry<T>) -> Self {
        Self {
            inner: registry.clone(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Recovers the typed registry, or `None` if it holds another value type.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<SharedRegistry<T>> {
        self.inner.clone().downcast::<RwLock<Registry<T>>>().ok()
    }

    /// Name of the value type the registry holds.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.inner) as *const ()
    }
}

impl PartialEq for RegistryHandle {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for RegistryHandle {}

impl Hash for RegistryHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryHandle")
            .field("type_name", &self.type_name)
            .field("addr", &self.addr())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
