use livecheck::testing::ScriptedClient;
use livecheck::{Diagnostic, DiagnosticsView, Severity};
use pretty_assertions::assert_eq;

fn message(file: &str, line: u32, severity: Severity, caption: &str) -> Diagnostic {
    Diagnostic {
        file: file.to_string(),
        line,
        column: 0,
        severity,
        caption: caption.to_string(),
        text: format!("{caption} body"),
    }
}

#[test]
fn test_only_owned_file_is_displayed() {
    let mut client = ScriptedClient::new();
    let mut view = DiagnosticsView::new("/a.lean");
    view.activate(&mut client);

    client.publish(vec![
        message("/a.lean", 3, Severity::Error, "first"),
        message("/b.lean", 1, Severity::Warning, "other file"),
        message("/a.lean", 1, Severity::Information, "second"),
    ]);
    assert!(view.poll());

    let captions: Vec<&str> = view.displayed().iter().map(|d| d.caption.as_str()).collect();
    assert_eq!(captions, vec!["first", "second"]);
}

#[test]
fn test_each_batch_replaces_the_previous_one() {
    let mut client = ScriptedClient::new();
    let mut view = DiagnosticsView::new("/a.lean");
    view.activate(&mut client);

    client.publish(vec![
        message("/a.lean", 1, Severity::Error, "a"),
        message("/a.lean", 2, Severity::Error, "b"),
    ]);
    view.poll();
    client.publish(vec![message("/a.lean", 7, Severity::Warning, "c")]);
    assert!(view.poll());
    assert_eq!(
        view.displayed(),
        &[message("/a.lean", 7, Severity::Warning, "c")]
    );

    client.publish(vec![message("/b.lean", 7, Severity::Warning, "elsewhere")]);
    assert!(view.poll());
    assert!(view.displayed().is_empty());
}

#[test]
fn test_identical_batch_reports_no_change() {
    let mut client = ScriptedClient::new();
    let mut view = DiagnosticsView::new("/a.lean");
    view.activate(&mut client);

    let batch = vec![message("/a.lean", 1, Severity::Error, "a")];
    client.publish(batch.clone());
    assert!(view.poll());
    client.publish(batch);
    assert!(!view.poll());
}

#[test]
fn test_activate_subscribes_exactly_once() {
    let mut client = ScriptedClient::new();
    let mut view = DiagnosticsView::new("/a.lean");

    view.activate(&mut client);
    view.activate(&mut client);
    assert!(view.is_subscribed());
    assert_eq!(client.subscriber_count(), 1);
}

#[test]
fn test_batches_after_deactivate_have_no_effect() {
    let mut client = ScriptedClient::new();
    let mut view = DiagnosticsView::new("/a.lean");
    view.activate(&mut client);

    client.publish(vec![message("/a.lean", 1, Severity::Error, "before")]);
    view.poll();
    let before = view.displayed().to_vec();

    view.deactivate();
    view.deactivate();
    client.publish(vec![message("/a.lean", 2, Severity::Error, "after")]);

    assert!(!view.poll());
    assert_eq!(view.displayed(), before.as_slice());
    assert!(!view.is_subscribed());
    assert_eq!(client.subscriber_count(), 0);
}

#[test]
fn test_late_activation_sees_current_snapshot() {
    let mut client = ScriptedClient::new();
    client.publish(vec![message("/a.lean", 4, Severity::Warning, "already there")]);

    let mut view = DiagnosticsView::new("/a.lean");
    view.activate(&mut client);
    assert!(view.poll());
    assert_eq!(view.displayed().len(), 1);
}
