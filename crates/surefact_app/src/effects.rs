use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use surefact_core::{Effect, SessionEvent};
use surefact_engine::{ReportWriter, StreamEngine};
use surefact_logging::{sf_error, sf_info};

type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Carries controller effects out to the stream engine and the filesystem.
pub struct EffectRunner {
    engine: StreamEngine,
    reports: ReportWriter,
    completed_utc: Clock,
    last_report: Option<PathBuf>,
}

impl EffectRunner {
    pub fn new(engine: StreamEngine, output_dir: impl Into<PathBuf>) -> Self {
        let reports = ReportWriter::new(output_dir);
        sf_info!("Reports will be written to {:?}", reports.dir());
        Self {
            engine,
            reports,
            completed_utc: Arc::new(|| Utc::now().to_rfc3339()),
            last_report: None,
        }
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: Clock) -> Self {
        self.completed_utc = clock;
        self
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenStream {
                    session_id,
                    start_directive,
                } => {
                    sf_info!("OpenStream session={}", session_id);
                    self.engine.open(session_id, start_directive);
                }
                Effect::CloseStream { session_id } => {
                    sf_info!("CloseStream session={}", session_id);
                    self.engine.close(session_id);
                }
                Effect::PublishArtifact {
                    session_id,
                    topic,
                    content,
                } => {
                    sf_info!(
                        "PublishArtifact session={} content_len={}",
                        session_id,
                        content.len()
                    );
                    self.write_report(&topic, &content);
                }
            }
        }
    }

    pub fn next_event(&self, timeout: Duration) -> Option<SessionEvent> {
        self.engine.recv_timeout(timeout)
    }

    pub fn last_report(&self) -> Option<&Path> {
        self.last_report.as_deref()
    }

    fn write_report(&mut self, topic: &str, content: &str) {
        let completed_utc = (self.completed_utc)();
        match self.reports.publish(topic, &completed_utc, content) {
            Ok(path) => {
                sf_info!("Report written to {:?}", path);
                self.last_report = Some(path);
            }
            Err(err) => sf_error!("Report not written: {}", err),
        }
    }
}
