//! The composition root tying registries, declarations and listeners together.
//!
//! A [`RegistryContext`] owns the root registry (the registry of registries)
//! and runs the two-phase protocol:
//!
//! 1. **Declare**: [`RegistryContext::declare`] hands the builder queue to every
//!    new-registry listener, which may queue [`RegistryBuilder`]s. Builders can
//!    also be queued directly with [`RegistryContext::queue`].
//! 2. **Build**: [`RegistryContext::build_all`] drains the queue in insertion
//!    order and registers each resulting registry in the root registry.
//!
//! [`RegistryContext::init`] runs both phases in one synchronous pass. A
//! builder that fails is logged and reported in its [`BuildOutcome`]; it never
//! stops the remaining builders.

use std::any::Any;
use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use crate::builder::{BuilderQueue, PendingRegistry};
use crate::registry_event::{LifecycleEvent, NewRegistryEvent};
use crate::{
    Registry, RegistryBuilder, RegistryConfig, RegistryError, RegistryEvent, RegistryHandle,
    ResourceKey, ResourceLocation, SharedRegistry,
};

/// Listener invoked with every new-registry notification.
pub type NewRegistryListener = Box<dyn FnMut(&mut NewRegistryEvent<'_>) + Send>;

type TraceCallback = Arc<dyn Fn(&RegistryEvent) + Send + Sync>;

/// Result of building one queued declaration.
#[derive(Debug)]
pub struct BuildOutcome {
    /// The registry name the builder carried, as given.
    pub name: Option<String>,
    /// The root-registry key on success, the reason otherwise.
    pub result: Result<ResourceKey, RegistryError>,
}

impl BuildOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn key(&self) -> Option<&ResourceKey> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&RegistryError> {
        self.result.as_ref().err()
    }
}

/// Process-scoped registry state: the root registry, the builder queue and
/// the listeners that fill it.
pub struct RegistryContext {
    config: RegistryConfig,
    root: Registry<RegistryHandle>,
    builders: BuilderQueue,
    listeners: Vec<NewRegistryListener>,
    trace: Option<TraceCallback>,
}

impl Default for RegistryContext {
    fn default() -> Self {
        Self::with_config(RegistryConfig::default())
    }
}

impl RegistryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            root: Registry::new(),
            builders: BuilderQueue::new(),
            listeners: Vec::new(),
            trace: None,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback invoked for every declare/build step.
    pub fn set_trace_callback(
        &mut self,
        callback: impl Fn(&RegistryEvent) + Send + Sync + 'static,
    ) {
        self.trace = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&mut self) {
        self.trace = None;
    }

    fn emit_event(&self, event: &RegistryEvent) {
        if let Some(callback) = self.trace.as_ref() {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Root registry
    // -------------------------------------------------------------------------------------------------

    /// Key of the root registry itself.
    pub fn root_key(&self) -> &ResourceLocation {
        &self.config.root_key
    }

    /// The registry of registries.
    pub fn root(&self) -> &Registry<RegistryHandle> {
        &self.root
    }

    /// Looks up the registry registered under `name`.
    ///
    /// Returns `None` when nothing is registered under `name` or when the
    /// registry there holds values of another type.
    pub fn get_registry<T: Send + Sync + 'static>(
        &self,
        name: impl AsRef<str>,
    ) -> Option<SharedRegistry<T>> {
        let name = name.as_ref();
        let handle = self.root.get(name)?;
        let registry = handle.downcast::<T>();
        if registry.is_none() {
            tracing::debug!(
                registry = name,
                stored = handle.type_name(),
                requested = std::any::type_name::<T>(),
                "registry holds another value type"
            );
        }
        registry
    }

    /// Looks up the name a registry instance was registered under.
    pub fn get_registry_key<T: Send + Sync + 'static>(
        &self,
        registry: &SharedRegistry<T>,
    ) -> Option<&ResourceLocation> {
        self.root.get_key(&RegistryHandle::new(registry))
    }

    /// Registers `registry` in the root registry under `name`.
    ///
    /// Returns the two-level key `(root key, name)`. An existing registry under
    /// the same name is replaced.
    pub fn register_registry<T: Send + Sync + 'static>(
        &mut self,
        name: ResourceLocation,
        registry: &SharedRegistry<T>,
    ) -> ResourceKey {
        tracing::debug!(
            registry = %name,
            value_type = std::any::type_name::<T>(),
            "registering registry"
        );
        self.root.register(name.clone(), RegistryHandle::new(registry));
        ResourceKey::new(self.config.root_key.clone(), name)
    }

    /// Creates a shared registry seeded with its default entry.
    pub fn create_registry<T: Clone + Eq + Hash>(
        default_key: ResourceLocation,
        default_value: T,
    ) -> SharedRegistry<T> {
        Arc::new(RwLock::new(Registry::create(default_key, default_value)))
    }

    // -------------------------------------------------------------------------------------------------
    // Building
    // -------------------------------------------------------------------------------------------------

    /// Validates `builder`, runs its default value factory and registers the
    /// resulting registry. Nothing is logged.
    ///
    /// A panicking factory is reported as [`RegistryError::DefaultValue`].
    pub fn try_build_registry<T>(
        &mut self,
        builder: RegistryBuilder<T>,
    ) -> Result<ResourceKey, RegistryError>
    where
        T: Clone + Eq + Hash + Send + Sync + 'static,
    {
        let (name, default_key, default_value) =
            builder.into_parts(&self.config.default_namespace)?;
        let value = panic::catch_unwind(AssertUnwindSafe(default_value))
            .unwrap_or_else(|payload| Err(panic_message(payload).into()))
            .map_err(|source| RegistryError::DefaultValue {
                registry: name.to_string(),
                source,
            })?;
        let registry = Self::create_registry(default_key, value);
        Ok(self.register_registry(name, &registry))
    }

    /// Builds one registry, logging a failure instead of propagating it.
    pub fn build_registry<T>(&mut self, builder: RegistryBuilder<T>) -> BuildOutcome
    where
        T: Clone + Eq + Hash + Send + Sync + 'static,
    {
        let name = builder.registry_name().map(str::to_owned);
        let result = self.try_build_registry(builder);
        self.record(name, result)
    }

    fn record(
        &self,
        name: Option<String>,
        result: Result<ResourceKey, RegistryError>,
    ) -> BuildOutcome {
        match &result {
            Ok(key) => {
                tracing::info!(registry = %key.location, "registry built");
                self.emit_event(&RegistryEvent::Built {
                    name: key.location.to_string(),
                });
            }
            Err(e) => {
                tracing::error!(
                    registry = name.as_deref().unwrap_or("<unset>"),
                    error = %e,
                    "failed to build registry"
                );
                self.emit_event(&RegistryEvent::BuildFailed {
                    name: name.clone(),
                    reason: e.to_string(),
                });
            }
        }
        BuildOutcome { name, result }
    }

    // -------------------------------------------------------------------------------------------------
    // Declaring
    // -------------------------------------------------------------------------------------------------

    /// Adds a listener for new-registry notifications. Listeners run in the
    /// order they were added.
    pub fn on_new_registry(
        &mut self,
        listener: impl FnMut(&mut NewRegistryEvent<'_>) + Send + 'static,
    ) {
        self.listeners.push(Box::new(listener));
    }

    /// Queues a builder for the next build pass.
    pub fn queue(&mut self, builder: impl PendingRegistry + 'static) {
        let name = builder.registry_name().map(str::to_owned);
        tracing::debug!(
            registry = name.as_deref().unwrap_or("<unset>"),
            "queueing registry builder"
        );
        self.builders.push(builder);
        self.emit_event(&RegistryEvent::Queued { name });
    }

    /// Builders waiting for the next build pass.
    pub fn pending(&self) -> &BuilderQueue {
        &self.builders
    }

    /// Sends the new-registry notification with the builder queue attached and
    /// returns how many builders are queued afterwards.
    pub fn declare(&mut self) -> usize {
        let before = self.builders.len();
        let mut event = NewRegistryEvent::with_queue(&mut self.builders);
        for listener in self.listeners.iter_mut() {
            listener(&mut event);
        }
        for name in self.builders.names().skip(before) {
            tracing::debug!(
                registry = name.unwrap_or("<unset>"),
                "listener queued registry builder"
            );
            self.emit_event(&RegistryEvent::Queued {
                name: name.map(str::to_owned),
            });
        }
        let queued = self.builders.len();
        tracing::debug!(queued, "new-registry listeners done");
        self.emit_event(&RegistryEvent::NewRegistry {
            queued: Some(queued),
        });
        queued
    }

    /// Sends the new-registry notification without a builder queue.
    pub fn announce(&mut self) {
        let mut event = NewRegistryEvent::bare();
        for listener in self.listeners.iter_mut() {
            listener(&mut event);
        }
        self.emit_event(&RegistryEvent::NewRegistry { queued: None });
    }

    /// Drains the queue in insertion order, building every declaration.
    pub fn build_all(&mut self) -> Vec<BuildOutcome> {
        let pending = self.builders.take();
        let count = pending.len();
        let mut outcomes = Vec::with_capacity(count);

        for builder in pending {
            let name = builder.registry_name().map(str::to_owned);
            let result = builder.build(self);
            outcomes.push(self.record(name, result));
        }

        self.emit_event(&RegistryEvent::Drained { count });
        outcomes
    }

    /// Declares then builds in one pass, leaving the queue empty.
    ///
    /// Calling it again with nothing declared does nothing.
    pub fn init(&mut self) -> Vec<BuildOutcome> {
        self.declare();
        let outcomes = self.build_all();
        let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
        if !outcomes.is_empty() {
            tracing::info!(built = outcomes.len() - failed, failed, "registries initialised");
        }
        outcomes
    }

    /// Entry point for the host's lifecycle events.
    pub fn dispatch(&mut self, event: LifecycleEvent) -> Vec<BuildOutcome> {
        match event {
            LifecycleEvent::Init => self.init(),
            LifecycleEvent::NewRegistry => {
                self.announce();
                Vec::new()
            }
        }
    }

    /// Forgets every registry and pending builder.
    ///
    /// Listeners and the trace callback stay installed. Registries already
    /// handed out remain valid.
    pub fn reset(&mut self) {
        self.emit_event(&RegistryEvent::Reset {});
        self.root.clear();
        self.builders.clear();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => format!("default value factory panicked: {message}"),
        Err(payload) => match payload.downcast_ref::<&str>() {
            Some(message) => format!("default value factory panicked: {message}"),
            None => "default value factory panicked".to_string(),
        },
    }
}

impl fmt::Debug for RegistryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryContext")
            .field("config", &self.config)
            .field("registries", &self.root.len())
            .field("pending", &self.builders)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
