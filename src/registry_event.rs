use std::fmt;
use std::str::FromStr;

use crate::builder::{BuilderQueue, PendingRegistry};

/// Events emitted by a [`RegistryContext`](crate::RegistryContext) while it
/// declares and builds registries.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
///
/// # Examples
///
/// ```rust
/// use modpack_registry::RegistryEvent;
///
/// let event = RegistryEvent::Queued { name: Some("modpack:items".to_string()) };
/// assert_eq!(event.to_string(), "queued { name: modpack:items }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A builder was appended to the queue.
    Queued {
        /// The registry name the builder carries, if it set one.
        name: Option<String>,
    },

    /// The new-registry notification went out to listeners.
    NewRegistry {
        /// Number of builders queued once every listener ran, `None` when no
        /// queue was attached.
        queued: Option<usize>,
    },

    /// A registry was built and registered in the root registry.
    Built {
        /// The registry name.
        name: String,
    },

    /// A builder was rejected.
    BuildFailed {
        /// The registry name the builder carried, if any.
        name: Option<String>,
        /// Rendered error.
        reason: String,
    },

    /// The builder queue was drained.
    Drained {
        /// How many builders were processed.
        count: usize,
    },

    /// The root registry and builder queue were cleared.
    Reset {},
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::Queued { name } => {
                write!(f, "queued {{ name: {} }}", name.as_deref().unwrap_or("<unset>"))
            }
            RegistryEvent::NewRegistry { queued: Some(queued) } => {
                write!(f, "new registry {{ queued: {} }}", queued)
            }
            RegistryEvent::NewRegistry { queued: None } => write!(f, "new registry {{}}"),
            RegistryEvent::Built { name } => write!(f, "built {{ name: {} }}", name),
            RegistryEvent::BuildFailed { name, reason } => write!(
                f,
                "build failed {{ name: {}, reason: {} }}",
                name.as_deref().unwrap_or("<unset>"),
                reason
            ),
            RegistryEvent::Drained { count } => write!(f, "drained {{ count: {} }}", count),
            RegistryEvent::Reset {} => write!(f, "Resetting the registries"),
        }
    }
}

/// Payload handed to new-registry listeners.
///
/// During [`RegistryContext::init`](crate::RegistryContext::init) the live
/// builder queue is attached and listeners declare registries through
/// [`NewRegistryEvent::queue`]. The bare notification sent by
/// [`RegistryContext::announce`](crate::RegistryContext::announce) carries no
/// queue.
pub struct NewRegistryEvent<'a> {
    builders: Option<&'a mut BuilderQueue>,
}

impl<'a> NewRegistryEvent<'a> {
    pub(crate) fn with_queue(builders: &'a mut BuilderQueue) -> Self {
        Self {
            builders: Some(builders),
        }
    }

    pub(crate) fn bare() -> Self {
        Self { builders: None }
    }

    /// Whether builders queued through this event will be built.
    pub fn accepts_builders(&self) -> bool {
        self.builders.is_some()
    }

    /// Queues a builder for the build pass that follows this notification.
    ///
    /// Returns `false` and drops the builder when the event carries no queue.
    pub fn queue(&mut self, builder: impl PendingRegistry + 'static) -> bool {
        match self.builders.as_deref_mut() {
            Some(builders) => {
                builders.push(builder);
                true
            }
            None => {
                tracing::warn!(
                    name = builder.registry_name().unwrap_or("<unset>"),
                    "new-registry event has no builder queue; dropping builder"
                );
                false
            }
        }
    }

    /// Number of builders queued so far, `None` without a queue.
    pub fn queued(&self) -> Option<usize> {
        self.builders.as_deref().map(BuilderQueue::len)
    }
}

/// Host lifecycle events the registry layer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The host finished loading scripts; declared registries get built.
    Init,
    /// Plain new-registry notification with no builder queue.
    NewRegistry,
}

impl LifecycleEvent {
    /// Event name as the host's event bus spells it.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Init => "init",
            LifecycleEvent::NewRegistry => "newRegistry",
        }
    }
}

impl FromStr for LifecycleEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(LifecycleEvent::Init),
            "newRegistry" => Ok(LifecycleEvent::NewRegistry),
            other => Err(format!("unknown lifecycle event: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegistryBuilder;

    #[test]
    fn test_registry_event_display() {
        let event = RegistryEvent::Built {
            name: "modpack:items".to_string(),
        };
        assert_eq!(event.to_string(), "built { name: modpack:items }");

        let event = RegistryEvent::BuildFailed {
            name: None,
            reason: "missing registry_name".to_string(),
        };
        assert_eq!(
            event.to_string(),
            "build failed { name: <unset>, reason: missing registry_name }"
        );

        let event = RegistryEvent::NewRegistry { queued: Some(2) };
        assert_eq!(event.to_string(), "new registry { queued: 2 }");

        let event = RegistryEvent::NewRegistry { queued: None };
        assert_eq!(event.to_string(), "new registry {}");

        assert_eq!(RegistryEvent::Drained { count: 3 }.to_string(), "drained { count: 3 }");
    }

    #[test]
    fn test_registry_event_clone() {
        let event = RegistryEvent::Queued { name: None };
        assert_eq!(event.clone(), event);
    }

    #[test]
    fn test_new_registry_event_queues_into_attached_queue() {
        let mut queue = BuilderQueue::new();
        let mut event = NewRegistryEvent::with_queue(&mut queue);

        assert!(event.accepts_builders());
        assert!(event.queue(RegistryBuilder::<u8>::new().set_registry_name("modpack:a")));
        assert_eq!(event.queued(), Some(1));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_bare_event_drops_builders() {
        let mut event = NewRegistryEvent::bare();

        assert!(!event.accepts_builders());
        assert!(!event.queue(RegistryBuilder::<u8>::new()));
        assert_eq!(event.queued(), None);
    }

    #[test]
    fn test_lifecycle_event_names() {
        assert_eq!("init".parse::<LifecycleEvent>(), Ok(LifecycleEvent::Init));
        assert_eq!(
            "newRegistry".parse::<LifecycleEvent>(),
            Ok(LifecycleEvent::NewRegistry)
        );
        assert!("tick".parse::<LifecycleEvent>().is_err());
        assert_eq!(LifecycleEvent::Init.name(), "init");
    }
}
