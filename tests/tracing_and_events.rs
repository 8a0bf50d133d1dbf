//! Integration tests for tracing and event monitoring.
//!
//! The trace callback sees every step of the declare/build protocol, which
//! lets callers watch failures without scraping log output.

use modpack_registry::{LifecycleEvent, RegistryBuilder, RegistryContext, RegistryEvent};
use std::sync::{Arc, Mutex};

fn traced(context: &mut RegistryContext) -> Arc<Mutex<Vec<RegistryEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    context.set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.clone());
    });
    events
}

fn valid(name: &str) -> RegistryBuilder<u16> {
    RegistryBuilder::new()
        .set_registry_name(name)
        .set_default_key("modpack:none")
        .set_default_value(|| 0)
}

#[test]
fn test_basic_tracing() {
    let mut context = RegistryContext::new();
    let events = traced(&mut context);

    context.queue(valid("modpack:a"));
    context.init();

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        [
            RegistryEvent::Queued {
                name: Some("modpack:a".to_string())
            },
            RegistryEvent::NewRegistry { queued: Some(1) },
            RegistryEvent::Built {
                name: "modpack:a".to_string()
            },
            RegistryEvent::Drained { count: 1 },
        ]
    );
}

#[test]
fn test_trace_build_failure() {
    let mut context = RegistryContext::new();
    let events = traced(&mut context);

    context.queue(valid("bad id"));
    context.init();

    let captured = events.lock().unwrap();
    match &captured[2] {
        RegistryEvent::BuildFailed { name, reason } => {
            assert_eq!(name.as_deref(), Some("bad id"));
            assert!(reason.contains("registry_name"));
            assert!(reason.contains("bad id"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(context.root().is_empty());
}

#[test]
fn test_trace_unnamed_builder() {
    let mut context = RegistryContext::new();
    let events = traced(&mut context);

    context.queue(RegistryBuilder::<u16>::new().set_default_key("modpack:none"));
    context.init();

    let captured = events.lock().unwrap();
    assert_eq!(captured[0], RegistryEvent::Queued { name: None });
    assert!(matches!(
        &captured[2],
        RegistryEvent::BuildFailed { name: None, .. }
    ));
}

#[test]
fn test_trace_listener_queue_count() {
    let mut context = RegistryContext::new();
    let events = traced(&mut context);
    context.on_new_registry(|event| {
        event.queue(valid("modpack:a"));
        event.queue(valid("modpack:b"));
    });

    context.declare();

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        [
            RegistryEvent::Queued {
                name: Some("modpack:a".to_string())
            },
            RegistryEvent::Queued {
                name: Some("modpack:b".to_string())
            },
            RegistryEvent::NewRegistry { queued: Some(2) },
        ]
    );
}

#[test]
fn test_trace_listener_queue_after_direct_queue() {
    let mut context = RegistryContext::new();
    context.queue(valid("modpack:direct"));
    let events = traced(&mut context);
    context.on_new_registry(|event| {
        event.queue(valid("modpack:listener"));
    });

    context.init();

    let captured = events.lock().unwrap();
    assert_eq!(
        captured[..2],
        [
            RegistryEvent::Queued {
                name: Some("modpack:listener".to_string())
            },
            RegistryEvent::NewRegistry { queued: Some(2) },
        ]
    );
    assert_eq!(captured.len(), 5);
}

#[test]
fn test_trace_bare_notification() {
    let mut context = RegistryContext::new();
    let events = traced(&mut context);

    context.dispatch(LifecycleEvent::NewRegistry);

    let captured = events.lock().unwrap();
    assert_eq!(*captured, [RegistryEvent::NewRegistry { queued: None }]);
}

#[test]
fn test_trace_empty_init() {
    let mut context = RegistryContext::new();
    let events = traced(&mut context);

    context.init();

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        [
            RegistryEvent::NewRegistry { queued: Some(0) },
            RegistryEvent::Drained { count: 0 },
        ]
    );
}

#[test]
fn test_clear_trace_callback() {
    let mut context = RegistryContext::new();
    let events = traced(&mut context);

    context.reset();
    context.clear_trace_callback();
    context.queue(valid("modpack:a"));
    context.init();

    let captured = events.lock().unwrap();
    assert_eq!(*captured, [RegistryEvent::Reset {}]);
}
