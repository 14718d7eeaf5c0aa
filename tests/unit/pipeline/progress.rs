use super::*;

#[test]
fn percent_never_decreases() {
    let (mut rep, rx) = ProgressReporter::channel();
    rep.progress(10, "a");
    rep.progress(5, "b");
    rep.progress(200, "c");
    let got: Vec<u8> = rx.try_iter().map(|e| e.percent).collect();
    assert_eq!(got, vec![10, 10, 100]);
}

#[test]
fn done_is_terminal_and_final() {
    let (mut rep, rx) = ProgressReporter::channel();
    rep.progress(50, "half");
    rep.done("saved");
    rep.progress(60, "late");
    rep.error("late error");
    let events: Vec<ProgressEvent> = rx.try_iter().collect();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        ProgressEvent {
            percent: 100,
            message: "saved".to_string(),
            state: RunState::Done,
        }
    );
    assert!(rep.is_finished());
}

#[test]
fn error_keeps_last_percent() {
    let (mut rep, rx) = ProgressReporter::channel();
    rep.progress(40, "working");
    rep.error("disk full");
    let last = rx.try_iter().last().unwrap();
    assert_eq!(last.percent, 40);
    assert_eq!(last.state, RunState::Error);
    assert_eq!(last.message, "disk full");
}

#[test]
fn disconnected_receiver_is_ignored() {
    let (mut rep, rx) = ProgressReporter::channel();
    drop(rx);
    rep.progress(1, "nobody listening");
    rep.done("still fine");
    assert!(rep.is_finished());
}

#[test]
fn state_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&RunState::Done).unwrap(), "\"done\"");
    assert!(!RunState::Running.is_terminal());
    assert!(RunState::Error.is_terminal());
}

#[test]
fn status_keeps_current_percent() {
    let (mut rep, rx) = ProgressReporter::channel();
    rep.progress(75, "item");
    rep.status("Encoding video...");
    let last = rx.try_iter().last().unwrap();
    assert_eq!(last.percent, 75);
    assert_eq!(last.state, RunState::Running);
}
