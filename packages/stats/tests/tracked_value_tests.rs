use netlint_stats::TrackedValue;
use serde_json::json;

#[test]
fn test_reads_are_counted_per_key() {
    let tracked = TrackedValue::wrap(json!({"userId": 1, "title": "delectus"}));

    let _ = tracked.get("userId");
    let _ = tracked.get("userId");
    let _ = tracked.get("title");

    let stats = tracked.stats();
    assert_eq!(stats.count("userId"), 2);
    assert_eq!(stats.count("title"), 1);
}

#[test]
fn test_untouched_keys_report_zero() {
    let tracked = TrackedValue::wrap(json!({"id": 1, "done": false}));

    let stats = tracked.stats();
    assert_eq!(stats.count("id"), 0);
    assert_eq!(stats.count("done"), 0);
    // Both keys still appear in the tree.
    assert_eq!(stats.len(), 2);
}

#[test]
fn test_missing_key_access_is_counted_not_an_error() {
    let tracked = TrackedValue::wrap(json!({"id": 1}));

    assert!(tracked.get("nope").is_none());
    assert!(tracked.get("nope").is_none());

    let stats = tracked.stats();
    assert_eq!(stats.count("nope"), 2);
    // Missing keys have no nested tree.
    assert!(stats.inner("nope").is_none());
}

#[test]
fn test_reads_and_writes_share_one_counter() {
    let tracked = TrackedValue::wrap(json!({"id": 1}));

    let _ = tracked.get("id");
    tracked.set("id", json!(2));

    assert_eq!(tracked.stats().count("id"), 2);
    assert_eq!(tracked.get("id").and_then(|v| v.as_value()), Some(json!(2)));
}

#[test]
fn test_stats_query_never_increments() {
    let tracked = TrackedValue::wrap(json!({"a": {"b": 1}}));

    let first = tracked.stats();
    let second = tracked.stats();
    assert_eq!(first, second);

    // A deep query is still a pure side channel.
    let _ = tracked.stats();
    assert_eq!(tracked.stats().count("a"), 0);
}

#[test]
fn test_array_elements_counted_by_index() {
    let tracked = TrackedValue::wrap(json!([10, 20, 30]));

    let _ = tracked.get_index(0);
    let _ = tracked.get_index(2);
    let _ = tracked.get_index(2);

    let stats = tracked.stats();
    assert_eq!(stats.count("0"), 1);
    assert_eq!(stats.count("1"), 0);
    assert_eq!(stats.count("2"), 2);
}

#[test]
fn test_nested_levels_are_independently_instrumented() {
    let tracked = TrackedValue::wrap(json!({"todo": {"title": "x", "done": false}}));

    let todo = tracked.get("todo").unwrap();
    let _ = todo.get("title");

    let stats = tracked.stats();
    assert_eq!(stats.count("todo"), 1);
    let inner = stats.inner("todo").unwrap();
    assert_eq!(inner.count("title"), 1);
    assert_eq!(inner.count("done"), 0);
}

#[test]
fn test_distributivity_over_object_paths() {
    let tracked = TrackedValue::wrap(json!({
        "a": {"b": {"c": 1, "d": 2}, "e": 3}
    }));

    let a = tracked.get("a").unwrap();
    let b = a.get("b").unwrap();
    let _ = b.get("c");

    // stats(root).a.inner.b == stats(root.a).b, for every path.
    let from_root = tracked.stats();
    let via_a = a.stats();
    assert_eq!(from_root.inner("a"), Some(&via_a));
    assert_eq!(via_a.inner("b"), Some(&b.stats()));
    assert_eq!(
        from_root.inner("a").and_then(|s| s.inner("b")),
        Some(&b.stats())
    );
}

#[test]
fn test_distributivity_over_array_paths() {
    let tracked = TrackedValue::wrap(json!({"items": [{"id": 1}, {"id": 2}]}));

    let items = tracked.get("items").unwrap();
    let first = items.get_index(0).unwrap();
    let _ = first.get("id");

    let from_root = tracked.stats();
    assert_eq!(from_root.inner("items"), Some(&items.stats()));
    assert_eq!(
        from_root.inner("items").and_then(|s| s.inner("0")),
        Some(&first.stats())
    );
}

#[test]
fn test_clones_share_counters() {
    let tracked = TrackedValue::wrap(json!({"id": 1}));
    let handed_out = tracked.clone();

    let _ = handed_out.get("id");

    assert_eq!(tracked.stats().count("id"), 1);
}

#[test]
fn test_set_wraps_the_new_child() {
    let tracked = TrackedValue::wrap(json!({"data": 1}));

    tracked.set("data", json!({"nested": true}));
    let data = tracked.get("data").unwrap();
    let _ = data.get("nested");

    let stats = tracked.stats();
    assert_eq!(stats.count("data"), 2);
    assert_eq!(stats.inner("data").unwrap().count("nested"), 1);
}

#[test]
fn test_out_of_range_array_write_counts_but_does_not_extend() {
    let tracked = TrackedValue::wrap(json!([1, 2]));

    tracked.set_index(5, json!(9));

    assert_eq!(tracked.len(), 2);
    assert_eq!(tracked.stats().count("5"), 1);
}

#[test]
fn test_to_value_round_trips_structure() {
    let original = json!({"a": [1, {"b": null}], "c": "s"});
    let tracked = TrackedValue::wrap(original.clone());

    let _ = tracked.get("a");

    assert_eq!(tracked.to_value(), original);
}
