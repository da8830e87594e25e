use std::time::Duration;

use pretty_assertions::assert_eq;
use surefact_core::{
    update, JobController, JobPhase, Msg, SessionEvent, Severity, StageDescriptor, StageRegistry,
    StreamEvent, FALLBACK_STAGE_NAME, LOG_CAPACITY,
};

fn event(event: StreamEvent) -> Msg {
    Msg::Stream(SessionEvent::new(1, event))
}

fn frame(raw: &str) -> Msg {
    event(StreamEvent::Message(surefact_core::parse_message(raw)))
}

fn running() -> JobController {
    let (controller, _) = update(JobController::new(), Msg::StartRequested("topic".to_string()));
    controller
}

#[test]
fn ordinal_never_moves_backwards() {
    let mut controller = running();
    let mut seen = Vec::new();
    for raw in ["STAGE:4", "STAGE:2", "STAGE:3b", "STAGE:4", "STAGE:1", "STAGE:6", "STAGE:5"] {
        let (next, _) = update(controller, frame(raw));
        controller = next;
        seen.push(controller.view().stage_ordinal);
    }

    assert_eq!(seen, vec![4, 4, 4, 4, 4, 6, 6]);
    assert_eq!(controller.view().stage_name.as_deref(), Some("Synthesis"));
    // Every frame is still logged, rewinding or not.
    assert_eq!(controller.view().logs.len(), 7);
}

#[test]
fn sub_stage_renames_without_advancing() {
    let controller = running();
    let (controller, _) = update(controller, frame("STAGE:3"));
    let (controller, _) = update(controller, frame("STAGE:3b"));

    let view = controller.view();
    assert_eq!(view.stage_ordinal, 3);
    assert_eq!(view.stage_name.as_deref(), Some("Recursive Deepening"));
}

#[test]
fn unknown_stage_keeps_ordinal_but_is_logged() {
    let controller = running();
    let (controller, _) = update(controller, frame("STAGE:2"));
    let (controller, effects) = update(controller, frame("STAGE:9"));

    assert!(effects.is_empty());
    let view = controller.view();
    assert_eq!(view.phase, JobPhase::Running);
    assert_eq!(view.stage_ordinal, 2);
    assert_eq!(view.stage_name.as_deref(), Some(FALLBACK_STAGE_NAME));
    assert_eq!(view.logs.last().map(|entry| entry.text.as_str()), Some("STAGE:9"));
}

#[test]
fn error_stage_frames_are_flagged_but_keep_running() {
    let controller = running();
    let (controller, _) = update(controller, frame("STAGE:5:ERROR:No valid docs"));
    let (controller, _) = update(controller, frame("STAGE:6:Traceback (most recent call last)"));
    let (controller, _) = update(controller, frame("ERROR:not a stage frame"));

    let view = controller.view();
    assert_eq!(view.phase, JobPhase::Running);
    assert_eq!(view.stage_ordinal, 6);
    let severities: Vec<_> = view.logs.iter().map(|entry| entry.severity).collect();
    assert_eq!(severities, vec![Severity::Error, Severity::Error, Severity::Info]);
}

#[test]
fn opaque_lines_only_feed_the_log() {
    let controller = running();
    let (controller, _) = update(controller, frame("Searching arXiv for 4 queries"));

    let view = controller.view();
    assert_eq!(view.stage_ordinal, 1);
    assert_eq!(view.logs.len(), 1);
    assert_eq!(view.headline, "Searching arXiv for 4 queries");
}

#[test]
fn artifact_is_stored_byte_for_byte() {
    let content = "# Title: colon\\n\n| a | b |\n```rust\nfn x() {}\n``` ";
    let controller = running();
    let (controller, _) = update(controller, frame(&format!("FINAL_PAPER_CONTENT:{content}")));
    assert_eq!(controller.view().artifact.as_deref(), Some(content));

    let (controller, _) = update(controller, frame("FINAL_PAPER_CONTENT:second"));
    assert_eq!(controller.view().artifact.as_deref(), Some("second"));
}

#[test]
fn log_is_capped_at_capacity() {
    let mut controller = running();
    for i in 0..=LOG_CAPACITY {
        let (next, _) = update(controller, frame(&format!("line {i}")));
        controller = next;
    }

    let logs = controller.view().logs;
    assert_eq!(logs.len(), LOG_CAPACITY);
    assert_eq!(logs[0].text, "line 1");
    assert_eq!(logs[LOG_CAPACITY - 1].text, format!("line {LOG_CAPACITY}"));
}

#[test]
fn progress_fraction_tracks_ordinal() {
    let idle = JobController::new();
    assert_eq!(idle.progress_fraction(), 0.0);

    let controller = running();
    assert_eq!(controller.progress_fraction(), 1.0 / 8.0);
    let (controller, _) = update(controller, frame("STAGE:6"));
    assert_eq!(controller.progress_fraction(), 0.75);
    assert_eq!(controller.view().percent, 75);
    let (controller, _) = update(controller, frame("STAGE:8"));
    assert_eq!(controller.progress_fraction(), 1.0);
    assert_eq!(controller.view().percent, 100);
}

#[test]
fn custom_registry_drives_names_and_total() {
    let registry = StageRegistry::new(vec![
        StageDescriptor::new("fetch", "Fetching", 1),
        StageDescriptor::new("fetch-retry", "Fetching again", 1),
        StageDescriptor::new("write", "Writing", 2),
    ]);
    let mut controller = JobController::with_registry(registry);
    controller.start("topic").unwrap();

    let (controller, _) = update(controller, frame("STAGE:fetch-retry"));
    assert_eq!(controller.view().stage_name.as_deref(), Some("Fetching again"));
    assert_eq!(controller.progress_fraction(), 0.5);

    let (controller, _) = update(controller, frame("STAGE:write"));
    assert_eq!(controller.progress_fraction(), 1.0);
    assert_eq!(controller.view().stage_total, 2);
}

#[test]
fn abandoned_reconnect_is_reported_as_error_entry() {
    let controller = running();
    let (controller, effects) = update(
        controller,
        event(StreamEvent::ReconnectScheduled {
            attempt: 1,
            delay: Duration::from_secs(3),
        }),
    );
    assert!(effects.is_empty());
    assert!(controller.view().logs.is_empty());

    let (controller, _) = update(controller, event(StreamEvent::TransportError("reset".into())));
    assert!(controller.view().logs.is_empty());

    let (controller, _) = update(
        controller,
        event(StreamEvent::ReconnectAbandoned { attempts: 10 }),
    );
    let view = controller.view();
    assert_eq!(view.phase, JobPhase::Running);
    assert_eq!(view.logs.len(), 1);
    assert_eq!(view.logs[0].severity, Severity::Error);
    assert!(view.logs[0].text.contains("10 reconnection attempts"));
}
