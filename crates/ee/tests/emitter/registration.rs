//! Tests for `on` / `one` and their bulk forms.

use std::sync::Arc;

use ee::{EventEmitter, Listener};

use super::support::{calls, entries, make_log, record};

// ============================================================================
// Recurring listeners
// ============================================================================

#[test]
fn on_returns_the_registered_listener() {
    let ee: EventEmitter<i32, i32> = EventEmitter::new();
    let log = make_log();
    let listener = record(&log, "a");

    let returned = ee.on("foo", listener.clone());
    assert!(returned.ptr_eq(&listener));

    ee.emit("foo", &0);
    assert_eq!(calls(&log, "a"), 1);
    ee.emit("foo", &0);
    assert_eq!(calls(&log, "a"), 2);
}

#[test]
fn listeners_fire_in_registration_order() {
    let ee: EventEmitter<i32, i32> = EventEmitter::new();
    let log = make_log();

    ee.on("foo", record(&log, "a"));
    ee.on("foo", record(&log, "b"));
    ee.on("foo", record(&log, "c"));
    ee.emit("foo", &1);

    assert_eq!(entries(&log), vec!["a", "b", "c"]);
}

#[test]
fn on_many_registers_each_entry_and_returns_the_emitter() {
    let ee: EventEmitter<i32, i32> = EventEmitter::new();
    let log = make_log();
    let shared = {
        let log = Arc::clone(&log);
        Listener::from_fn(move |n: &i32| log.lock().unwrap().push(format!("got {n}")))
    };

    let returned = ee.on_many([
        ("foo", Some(shared.clone())),
        ("bar", Some(shared.clone())),
        ("baz", None),
    ]);
    assert!(std::ptr::eq(returned, &ee));

    ee.emit("foo", &1);
    ee.emit("bar", &2);
    ee.emit("foo", &3);

    assert_eq!(entries(&log), vec!["got 1", "got 2", "got 3"]);
    assert!(!ee.has("baz"), "None entries are skipped");
}

#[test]
fn on_many_chains() {
    let ee: EventEmitter<i32, i32> = EventEmitter::new();
    let log = make_log();

    ee.on_many([("foo", Some(record(&log, "a")))])
        .on_many([("foo", Some(record(&log, "b")))]);
    ee.emit("foo", &0);

    assert_eq!(entries(&log), vec!["a", "b"]);
}

// ============================================================================
// One-time listeners
// ============================================================================

#[test]
fn one_fires_on_the_first_emit_only() {
    let ee: EventEmitter<i32, i32> = EventEmitter::new();
    let log = make_log();

    ee.on("x", record(&log, "A"));
    ee.one("x", record(&log, "B"));

    ee.emit("x", &0);
    assert_eq!(ee.count("x"), 1);
    ee.emit("x", &0);

    assert_eq!(calls(&log, "A"), 2);
    assert_eq!(calls(&log, "B"), 1);
}

#[test]
fn one_between_recurring_listeners() {
    let ee: EventEmitter<i32, i32> = EventEmitter::new();
    let log = make_log();

    ee.on("foo", record(&log, "a"));
    ee.one("foo", record(&log, "once"));
    ee.on("foo", record(&log, "c"));

    ee.emit("foo", &0);
    assert_eq!(ee.count("foo"), 2);
    ee.emit("foo", &0);

    assert_eq!(entries(&log), vec!["a", "once", "c", "a", "c"]);
}

#[test]
fn multiple_one_time_listeners_fire_once_each() {
    let ee: EventEmitter<i32, i32> = EventEmitter::new();
    let log = make_log();

    ee.one("foo", record(&log, "f1"));
    ee.one("foo", record(&log, "f2"));
    ee.emit("foo", &0);
    ee.emit("foo", &0);

    assert_eq!(calls(&log, "f1"), 1);
    assert_eq!(calls(&log, "f2"), 1);
    assert_eq!(ee.count("foo"), 0);
    assert!(!ee.has("foo"));
}

#[test]
fn same_listener_registered_once_twice_fires_twice() {
    let ee: EventEmitter<i32, i32> = EventEmitter::new();
    let log = make_log();
    let listener = record(&log, "f");

    ee.one("foo", listener.clone());
    ee.one("foo", listener);
    ee.emit("foo", &0);
    ee.emit("foo", &0);

    assert_eq!(calls(&log, "f"), 2);
    assert_eq!(ee.count("foo"), 0);
}

#[test]
fn one_many_registers_one_time_listeners() {
    let ee: EventEmitter<i32, i32> = EventEmitter::new();
    let log = make_log();

    ee.one_many([("foo", Some(record(&log, "a"))), ("bar", Some(record(&log, "b")))]);
    ee.emit("foo", &0);
    ee.emit("foo", &0);
    ee.emit("bar", &0);

    assert_eq!(entries(&log), vec!["a", "b"]);
    assert!(!ee.has_any());
}

// ============================================================================
// Registration during emit
// ============================================================================

#[test]
fn listener_added_during_emit_is_reached_by_the_same_emit() {
    let ee: Arc<EventEmitter<i32, i32>> = Arc::new(EventEmitter::new());
    let log = make_log();

    {
        let ee_clone = Arc::clone(&ee);
        let log_clone = Arc::clone(&log);
        ee.one(
            "foo",
            Listener::from_fn(move |_: &i32| {
                log_clone.lock().unwrap().push("first".to_string());
                ee_clone.on("foo", record(&log_clone, "late"));
            }),
        );
    }

    ee.emit("foo", &0);
    assert_eq!(entries(&log), vec!["first", "late"]);
    assert_eq!(ee.count("foo"), 1);
}

#[test]
fn listener_added_to_another_event_during_emit_waits_for_its_emit() {
    let ee: Arc<EventEmitter<i32, i32>> = Arc::new(EventEmitter::new());
    let log = make_log();

    {
        let ee_clone = Arc::clone(&ee);
        let log_clone = Arc::clone(&log);
        ee.on(
            "foo",
            Listener::from_fn(move |_: &i32| {
                ee_clone.on("bar", record(&log_clone, "bar"));
            }),
        );
    }

    ee.emit("foo", &0);
    assert!(entries(&log).is_empty());
    ee.emit("bar", &0);
    assert_eq!(entries(&log), vec!["bar"]);
}
