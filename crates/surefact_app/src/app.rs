use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use surefact_core::{update, JobController, JobPhase, Msg};
use surefact_engine::{StreamEngine, StreamSettings};
use surefact_logging::sf_info;

use crate::effects::EffectRunner;
use crate::render::ProgressPrinter;

const POLL_INTERVAL: Duration = Duration::from_millis(75);

pub struct RunOutcome {
    pub report: Option<PathBuf>,
    pub artifact_received: bool,
}

/// Drives one job from start to completion, printing progress to stdout.
pub fn run(
    topic: &str,
    settings: StreamSettings,
    output_dir: PathBuf,
) -> anyhow::Result<RunOutcome> {
    let engine = StreamEngine::new(settings).context("invalid stream settings")?;
    let mut runner = EffectRunner::new(engine, output_dir);
    let mut printer = ProgressPrinter::default();

    let (mut controller, effects) =
        update(JobController::new(), Msg::StartRequested(topic.to_string()));
    if controller.phase() != JobPhase::Running {
        anyhow::bail!("research topic must not be empty");
    }
    runner.enqueue(effects);
    sf_info!("Job started topic_len={}", topic.len());

    loop {
        if let Some(event) = runner.next_event(POLL_INTERVAL) {
            let (next, effects) = update(controller, Msg::Stream(event));
            controller = next;
            runner.enqueue(effects);
        }
        if controller.consume_dirty() {
            for line in printer.render(&controller.view()) {
                println!("{line}");
            }
        }
        if controller.phase() == JobPhase::Complete {
            break;
        }
    }

    Ok(RunOutcome {
        report: runner.last_report().map(PathBuf::from),
        artifact_received: controller
            .session()
            .and_then(|session| session.artifact())
            .is_some(),
    })
}
