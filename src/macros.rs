//! Macros for process-wide registry contexts.
//!
//! Scripts that cannot thread a [`RegistryContext`](crate::RegistryContext)
//! through every call can declare one static context per module instead.

/// Creates a module holding one process-wide [`RegistryContext`](crate::RegistryContext).
///
/// The macro generates a module containing:
/// - a `LazyLock<Mutex<RegistryContext>>` static (module-private)
/// - free functions delegating to the context
/// - `with_context` for everything the free functions do not cover
///
/// # Examples
///
/// ```rust
/// use modpack_registry::{define_registry_context, RegistryBuilder};
///
/// define_registry_context!(modpack);
///
/// modpack::on_new_registry(|event| {
///     event.queue(
///         RegistryBuilder::new()
///             .set_registry_name("modpack:items")
///             .set_default_key("modpack:none")
///             .set_default_value(|| 0u32),
///     );
/// });
///
/// let outcomes = modpack::init();
/// assert!(outcomes.iter().all(|outcome| outcome.is_ok()));
///
/// let items = modpack::get_registry::<u32>("modpack:items").unwrap();
/// assert_eq!(items.read().unwrap().get("modpack:none"), Some(&0));
/// ```
///
/// # Deadlocks
///
/// Listeners and trace callbacks run while the context lock is held. They
/// must NOT call back into the same module's functions.
#[macro_export]
macro_rules! define_registry_context {
    ($name:ident) => {
        pub mod $name {
            use std::sync::{LazyLock, Mutex, MutexGuard};

            use $crate::{
                BuildOutcome, LifecycleEvent, NewRegistryEvent, PendingRegistry, RegistryContext,
                RegistryEvent, SharedRegistry,
            };

            // Context storage (module-private)
            static CONTEXT: LazyLock<Mutex<RegistryContext>> =
                LazyLock::new(|| Mutex::new(RegistryContext::new()));

            fn lock() -> MutexGuard<'static, RegistryContext> {
                // Poisoning only means a listener panicked mid-pass; the
                // context itself is still consistent.
                CONTEXT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
            }

            /// Run `f` with exclusive access to the context.
            pub fn with_context<R>(f: impl FnOnce(&mut RegistryContext) -> R) -> R {
                f(&mut lock())
            }

            /// Queue a builder for the next build pass.
            pub fn queue(builder: impl PendingRegistry + 'static) {
                lock().queue(builder)
            }

            /// Add a new-registry listener.
            pub fn on_new_registry(
                listener: impl FnMut(&mut NewRegistryEvent<'_>) + Send + 'static,
            ) {
                lock().on_new_registry(listener)
            }

            /// Declare and build every pending registry.
            pub fn init() -> Vec<BuildOutcome> {
                lock().init()
            }

            /// Forward a host lifecycle event.
            pub fn dispatch(event: LifecycleEvent) -> Vec<BuildOutcome> {
                lock().dispatch(event)
            }

            /// Look up a built registry by name.
            pub fn get_registry<T: Send + Sync + 'static>(name: &str) -> Option<SharedRegistry<T>> {
                lock().get_registry(name)
            }

            /// Forget every registry and pending builder.
            pub fn reset() {
                lock().reset()
            }

            /// Set a tracing callback for declare/build steps.
            pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
                lock().set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                lock().clear_trace_callback()
            }
        }
    };
}
