//! # Modpack Registry
//!
//! Keyed registries for modpack scripts, declared first and built later.
//!
//! Scripts declare the registries they need with a [`RegistryBuilder`] while
//! a new-registry notification runs. When the host fires its `init` event the
//! [`RegistryContext`] builds every declaration in the order it was queued and
//! files the result in its root registry, the registry of registries.
//!
//! ## Quick Start
//!
//! ```rust
//! use modpack_registry::{LifecycleEvent, RegistryBuilder, RegistryContext};
//!
//! let mut context = RegistryContext::new();
//!
//! // Declare
//! context.on_new_registry(|event| {
//!     event.queue(
//!         RegistryBuilder::new()
//!             .set_registry_name("modpack:items")
//!             .set_default_key("modpack:none")
//!             .set_default_value(|| "air".to_string()),
//!     );
//! });
//!
//! // Build
//! let outcomes = context.dispatch(LifecycleEvent::Init);
//! assert!(outcomes[0].is_ok());
//!
//! let items = context.get_registry::<String>("modpack:items").unwrap();
//! assert_eq!(
//!     items.read().unwrap().get("modpack:none").map(String::as_str),
//!     Some("air")
//! );
//! ```
//!
//! ## Features
//!
//! - **Bidirectional**: every [`Registry`] answers key to value and value to key
//! - **Best effort**: a malformed builder is logged and skipped, the rest still build
//! - **Typed**: registries of different value types live side by side in the root
//! - **Tracing support**: `tracing` logs plus an optional [`RegistryEvent`] callback
//!
//! ## Main Types
//!
//! - [`ResourceLocation`] - `namespace:path` identifiers used as keys
//! - [`Registry`] - the bidirectional table
//! - [`RegistryBuilder`] - deferred registry declaration
//! - [`RegistryContext`] - root registry, builder queue and listeners
//! - [`define_registry_context!`] - a process-wide context behind free functions

mod builder;
mod config;
mod context;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod resource_location;

// Re-export the main public API
pub use builder::{BuilderQueue, DefaultFactory, PendingRegistry, RegistryBuilder};
pub use config::RegistryConfig;
pub use context::{BuildOutcome, NewRegistryListener, RegistryContext};
pub use registry::{Registry, RegistryHandle, SharedRegistry};
pub use registry_error::{BoxError, RegistryError};
pub use registry_event::{LifecycleEvent, NewRegistryEvent, RegistryEvent};
pub use resource_location::{
    is_valid_resource_location, ResourceKey, ResourceLocation, DEFAULT_NAMESPACE,
};
