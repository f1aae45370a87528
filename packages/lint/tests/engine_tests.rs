use std::sync::{Arc, Mutex};
use std::time::Duration;

use netlint::{
    DuplicateResponsesOverrides, LintConfig, NetLint, OverFetchingOverrides,
    QueryInLoopOverrides, RuleConfig,
};
use serde_json::json;

type Urls = Arc<Mutex<Vec<String>>>;

fn url_sink() -> (Arc<dyn Fn(&str) + Send + Sync>, Urls) {
    let urls: Urls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&urls);
    (
        Arc::new(move |url: &str| sink.lock().unwrap().push(url.to_string())),
        urls,
    )
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_rule_fires_on_the_second_identical_response() {
    let (cb, reported) = url_sink();
    let lint = NetLint::new(LintConfig {
        duplicate_responses: RuleConfig::Custom(DuplicateResponsesOverrides {
            cb: Some(cb),
        }),
        ..Default::default()
    });
    let url = "http://localhost:3000/todos/1";
    let body = json!({"userId": 1, "id": 1, "title": "delectus"});

    lint.on_call(url);
    let _ = lint.on_response(url, body.clone());
    assert!(reported.lock().unwrap().is_empty());

    lint.on_call(url);
    let _ = lint.on_response(url, body);
    assert_eq!(*reported.lock().unwrap(), vec![url.to_string()]);
    assert_eq!(lint.stats().duplicate_hits, 1);
}

#[tokio::test(start_paused = true)]
async fn test_loop_rule_reports_through_the_engine() {
    let reports: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let lint = NetLint::new(LintConfig {
        query_in_loop: RuleConfig::Custom(QueryInLoopOverrides {
            cb: Some(Arc::new(move |urls: &[String]| {
                sink.lock().unwrap().push(urls.to_vec());
            })),
            ..Default::default()
        }),
        ..Default::default()
    });

    for i in 1..=3 {
        lint.on_call(&format!("http://localhost:3000/todos/{i}"));
    }
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(reports.lock().unwrap().len(), 1);
    assert_eq!(reports.lock().unwrap()[0].len(), 3);
    assert_eq!(lint.stats().loop_reports, 1);
    assert_eq!(lint.observed_urls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_response_is_tracked_only_when_over_fetching_is_enabled() {
    let lint = NetLint::new(LintConfig {
        over_fetching: RuleConfig::On,
        ..Default::default()
    });
    let response = lint.on_response("http://localhost:3000/todos/1", json!({"id": 1}));
    assert!(response.tracked().is_some());

    let lint = NetLint::new(LintConfig::default());
    let response = lint.on_response("http://localhost:3000/todos/1", json!({"id": 1}));
    assert!(response.tracked().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_response_is_still_overfetch_analyzed() {
    let (overfetch_cb, flagged) = url_sink();
    let (duplicate_cb, duplicates) = url_sink();
    let lint = NetLint::new(LintConfig {
        duplicate_responses: RuleConfig::Custom(DuplicateResponsesOverrides {
            cb: Some(duplicate_cb),
        }),
        over_fetching: RuleConfig::Custom(OverFetchingOverrides {
            cb: Some(overfetch_cb),
            ..Default::default()
        }),
        ..Default::default()
    });
    let url = "http://localhost:3000/todos/1";
    let body = json!({"a": 1, "b": 2, "c": 3});

    // Identical responses; neither tracker gets read, so both decodes are
    // independently judged underused.
    let _ = lint.on_response(url, body.clone());
    let _ = lint.on_response(url, body);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(duplicates.lock().unwrap().len(), 1);
    assert_eq!(flagged.lock().unwrap().len(), 2);
    assert_eq!(lint.stats().overfetch_flags, 2);
}

#[tokio::test(start_paused = true)]
async fn test_tracked_reads_avert_the_overfetch_report() {
    let (cb, flagged) = url_sink();
    let lint = NetLint::new(LintConfig {
        over_fetching: RuleConfig::Custom(OverFetchingOverrides {
            cb: Some(cb),
            ..Default::default()
        }),
        ..Default::default()
    });

    let response = lint.on_response(
        "http://localhost:3000/todos/1",
        json!({"id": 1, "title": "x"}),
    );
    let tracked = response.tracked().unwrap();
    let _ = tracked.get("id");
    let _ = tracked.get("title");

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(flagged.lock().unwrap().is_empty());
}

// A failure in one rule's callback must not prevent the other rules'
// detections for the same response.
#[tokio::test(start_paused = true)]
async fn test_panicking_duplicate_callback_does_not_suppress_other_rules() {
    let (overfetch_cb, flagged) = url_sink();
    let lint = NetLint::new(LintConfig {
        duplicate_responses: RuleConfig::Custom(DuplicateResponsesOverrides {
            cb: Some(Arc::new(|_: &str| panic!("user callback failure"))),
        }),
        over_fetching: RuleConfig::Custom(OverFetchingOverrides {
            cb: Some(overfetch_cb),
            ..Default::default()
        }),
        ..Default::default()
    });
    let url = "http://localhost:3000/todos/1";
    let body = json!({"a": 1, "b": 2, "c": 3});

    let _ = lint.on_response(url, body.clone());
    // The duplicate callback panics on the second identical response; the
    // unwind propagates to the caller, after the other rules ran.
    let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        lint.on_response(url, body)
    }));
    assert!(unwound.is_err());
    assert_eq!(lint.stats().duplicate_hits, 1);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    // Both decodes, the duplicate included, were still overfetch-analyzed.
    assert_eq!(flagged.lock().unwrap().len(), 2);
    assert_eq!(lint.stats().overfetch_flags, 2);
}

#[tokio::test(start_paused = true)]
async fn test_unparseable_url_still_runs_duplicate_detection() {
    let (cb, reported) = url_sink();
    let lint = NetLint::new(LintConfig {
        duplicate_responses: RuleConfig::Custom(DuplicateResponsesOverrides {
            cb: Some(cb),
        }),
        query_in_loop: RuleConfig::On,
        ..Default::default()
    });
    let url = "definitely not a url";

    // Excluded from family matching only; nothing panics.
    lint.on_call(url);
    let _ = lint.on_response(url, json!({"ok": true}));
    lint.on_call(url);
    let _ = lint.on_response(url, json!({"ok": true}));

    assert_eq!(*reported.lock().unwrap(), vec![url.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_unparseable_url_is_still_overfetch_analyzed() {
    let (cb, flagged) = url_sink();
    let lint = NetLint::new(LintConfig {
        query_in_loop: RuleConfig::On,
        over_fetching: RuleConfig::Custom(OverFetchingOverrides {
            cb: Some(cb),
            ..Default::default()
        }),
        ..Default::default()
    });
    let url = "definitely not a url";

    lint.on_call(url);
    let response = lint.on_response(url, json!({"a": 1, "b": 2, "c": 3}));
    assert!(response.tracked().is_some());

    // Nothing read the body, so the unread-field check still flags it.
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(*flagged.lock().unwrap(), vec![url.to_string()]);
    assert_eq!(lint.stats().overfetch_flags, 1);
}

#[tokio::test(start_paused = true)]
async fn test_stats_count_calls_and_responses() {
    let lint = NetLint::new(LintConfig::all_on());

    lint.on_call("http://localhost:3000/todos/1");
    lint.on_call("http://localhost:3000/todos/2");
    let _ = lint.on_response("http://localhost:3000/todos/1", json!({"id": 1}));

    let stats = lint.stats();
    assert_eq!(stats.calls, 2);
    assert_eq!(stats.responses, 1);
    assert_eq!(stats.duplicate_hits, 0);
}

#[tokio::test(start_paused = true)]
async fn test_sessions_are_independent() {
    let (cb_a, reported_a) = url_sink();
    let (cb_b, reported_b) = url_sink();
    let make = |cb| {
        NetLint::new(LintConfig {
            duplicate_responses: RuleConfig::Custom(DuplicateResponsesOverrides {
                cb: Some(cb),
            }),
            ..Default::default()
        })
    };
    let lint_a = make(cb_a);
    let lint_b = make(cb_b);
    let url = "http://localhost:3000/todos/1";
    let body = json!({"id": 1});

    let _ = lint_a.on_response(url, body.clone());
    let _ = lint_a.on_response(url, body.clone());
    // Session B has never seen the response before.
    let _ = lint_b.on_response(url, body);

    assert_eq!(reported_a.lock().unwrap().len(), 1);
    assert!(reported_b.lock().unwrap().is_empty());
}
