use std::sync::Arc;
use std::thread;

use crate::clash::{ClashApi, ClashError, DelayProbe, MockApi};

#[test]
fn first_fetch_seeds_three_groups() {
    let api = MockApi::new();
    let snapshot = api.fetch_snapshot().expect("fetch");
    assert_eq!(
        snapshot.groups(),
        ["Proxy Group A", "Proxy Group B", "Proxy Group C"]
    );

    let a = snapshot.get("Proxy Group A").expect("group A");
    assert_eq!(a.now, "Proxy-1");
    assert_eq!(a.all.len(), 7);

    let b = snapshot.get("Proxy Group B").expect("group B");
    assert_eq!(b.proxy_type, "URLTest");
    assert_eq!(b.now, "Auto-2");

    let c = snapshot.get("Proxy Group C").expect("group C");
    assert_eq!(c.all.len(), 8);
}

#[test]
fn select_mutates_the_table_for_later_fetches() {
    let api = MockApi::new();
    api.fetch_snapshot().expect("seed");
    api.select("Proxy Group A", "Proxy-4").expect("select");

    let snapshot = api.fetch_snapshot().expect("refetch");
    assert_eq!(snapshot.get("Proxy Group A").expect("group").now, "Proxy-4");
    // Other groups untouched.
    assert_eq!(snapshot.get("Proxy Group B").expect("group").now, "Auto-2");
}

#[test]
fn select_reports_missing_member_and_group() {
    let api = MockApi::new();
    api.fetch_snapshot().expect("seed");

    let err = api.select("Proxy Group A", "Proxy-99").unwrap_err();
    assert!(matches!(&err, ClashError::NotFound(_)));
    assert_eq!(
        err.to_string(),
        "proxy Proxy-99 not found in group Proxy Group A"
    );

    let err = api.select("Nope", "Proxy-1").unwrap_err();
    assert_eq!(err.to_string(), "group Nope not found");
}

#[test]
fn select_before_any_fetch_finds_nothing() {
    let api = MockApi::new();
    let err = api.select("Proxy Group A", "Proxy-2").unwrap_err();
    assert!(matches!(err, ClashError::NotFound(_)));
}

#[test]
fn delay_probe_is_deterministic_per_member() {
    let api = MockApi::new();
    api.fetch_snapshot().expect("seed");
    let probe = DelayProbe::default();

    let first = api
        .measure_delay("Proxy Group A", "Proxy-3", &probe)
        .expect("probe");
    let again = api
        .measure_delay("Proxy Group A", "Proxy-3", &probe)
        .expect("probe");
    assert_eq!(first, again);

    let other = api
        .measure_delay("Proxy Group A", "Proxy-5", &probe)
        .expect("probe");
    assert_ne!(first, other);

    let err = api
        .measure_delay("Proxy Group A", "Proxy-99", &probe)
        .unwrap_err();
    assert!(matches!(err, ClashError::NotFound(_)));
}

#[test]
fn concurrent_readers_and_writers_stay_consistent() {
    let api = Arc::new(MockApi::new());
    api.fetch_snapshot().expect("seed");

    let members = ["Proxy-1", "Proxy-2", "Proxy-3"];
    let mut handles = Vec::new();
    for member in members {
        let api = Arc::clone(&api);
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                api.select("Proxy Group A", member).expect("select");
                let snapshot = api.fetch_snapshot().expect("fetch");
                let now = &snapshot.get("Proxy Group A").expect("group").now;
                assert!(members.contains(&now.as_str()));
            }
        }));
    }
    for handle in handles {
        handle.join().expect("join");
    }

    let snapshot = api.fetch_snapshot().expect("final fetch");
    let now = &snapshot.get("Proxy Group A").expect("group").now;
    assert!(members.contains(&now.as_str()));
}
