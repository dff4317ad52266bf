mod common;

use common::{ids_of, joined, msg, msgs};
use feedfold::{Entry, LiveFeed};

#[test]
fn test_append_within_capacity() {
    let mut feed = LiveFeed::new(5);
    for entry in msgs("m", 1..=3) {
        feed.append(entry);
    }
    assert_eq!(feed.len(), 3);
    assert_eq!(ids_of(feed.entries()), vec!["m1", "m2", "m3"]);
}

#[test]
fn test_overflow_drops_oldest_message() {
    let mut feed = LiveFeed::new(10);
    for entry in msgs("m", 1..=11) {
        feed.append(entry);
    }
    assert_eq!(feed.len(), 10);
    let expected: Vec<String> = (2..=11).map(|i| format!("m{i}")).collect();
    assert_eq!(ids_of(feed.entries()), expected);
    assert_eq!(feed.first_anchor(), Some((0, "m2")));
}

#[test]
fn test_status_behind_anchor_is_evicted_instead_of_anchor() {
    let mut feed = LiveFeed::new(5);
    feed.append(msg("m1"));
    feed.append(joined("bob"));
    for entry in msgs("m", 2..=5) {
        feed.append(entry);
    }
    assert_eq!(ids_of(feed.entries()), vec!["m1", "m2", "m3", "m4", "m5"]);
}

#[test]
fn test_trailing_status_does_not_protect_anchor() {
    let mut feed = LiveFeed::new(5);
    for entry in msgs("m", 1..=5) {
        feed.append(entry);
    }
    feed.append(joined("bob"));
    // m2 is a valid head, so the plain oldest entry goes.
    assert_eq!(ids_of(feed.entries()), vec!["m2", "m3", "m4", "m5", "-"]);
}

#[test]
fn test_run_of_statuses_behind_anchor() {
    let mut feed = LiveFeed::new(3);
    feed.append(msg("m1"));
    feed.append(joined("a"));
    feed.append(joined("b"));
    feed.append(joined("c"));
    feed.append(joined("d"));
    assert_eq!(ids_of(feed.entries()), vec!["m1", "-", "-"]);
    assert!(feed.entries()[0].is_anchor());
}

#[test]
fn test_status_head_is_drained_first() {
    let mut feed = LiveFeed::new(3);
    feed.append(joined("a"));
    feed.append(joined("b"));
    feed.append(msg("m1"));
    feed.append(msg("m2"));
    assert_eq!(ids_of(feed.entries()), vec!["-", "m1", "m2"]);
    feed.append(msg("m3"));
    assert_eq!(ids_of(feed.entries()), vec!["m1", "m2", "m3"]);
}

#[test]
fn test_capacity_one_keeps_anchor() {
    let mut feed = LiveFeed::new(1);
    feed.append(msg("m1"));
    feed.append(joined("bob"));
    assert_eq!(ids_of(feed.entries()), vec!["m1"]);
    feed.append(msg("m2"));
    assert_eq!(ids_of(feed.entries()), vec!["m2"]);
}

#[test]
fn test_reset_replaces_and_bounds() {
    let mut feed = LiveFeed::new(4);
    feed.append(msg("old"));
    feed.reset(msgs("m", 1..=6));
    assert_eq!(ids_of(feed.entries()), vec!["m3", "m4", "m5", "m6"]);
}

#[test]
fn test_reset_empty() {
    let mut feed = LiveFeed::new(4);
    feed.append(msg("m1"));
    feed.reset(Vec::<Entry>::new());
    assert!(feed.is_empty());
    assert_eq!(feed.first_anchor(), None);
}

#[test]
fn test_first_anchor_skips_statuses() {
    let mut feed = LiveFeed::new(10);
    feed.append(joined("a"));
    feed.append(msg("m1"));
    assert_eq!(feed.first_anchor(), Some((1, "m1")));
    assert_eq!(feed.position_of("m1"), Some(1));
    assert_eq!(feed.position_of("nope"), None);
}
