use surefact_core::{ConnectionState, JobPhase, JobViewModel, Severity};

/// Turns successive view models into terminal lines, printing only what changed.
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    last_stage: Option<u8>,
    last_headline: Option<String>,
    last_connection: ConnectionState,
    last_phase: JobPhase,
    has_connected: bool,
}

impl ProgressPrinter {
    pub fn render(&mut self, view: &JobViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        if view.connection != self.last_connection {
            if let Some(line) = self.connection_line(view.connection) {
                lines.push(line);
            }
            self.last_connection = view.connection;
        }

        if view.phase == JobPhase::Running && self.last_stage != Some(view.stage_ordinal) {
            self.last_stage = Some(view.stage_ordinal);
            lines.push(format!(
                "[{:>3}%] Stage {}/{}: {}",
                view.percent,
                view.stage_ordinal,
                view.stage_total,
                view.stage_name.as_deref().unwrap_or_default()
            ));
        }

        if let Some(latest) = view.logs.last() {
            if self.last_headline.as_deref() != Some(view.headline.as_str()) {
                self.last_headline = Some(view.headline.clone());
                match latest.severity {
                    Severity::Error => lines.push(format!("    !! {}", latest.text)),
                    Severity::Info if !view.headline.trim().is_empty() => {
                        lines.push(format!("       {}", view.headline.trim()))
                    }
                    Severity::Info => {}
                }
            }
        }

        if view.phase != self.last_phase {
            if view.phase == JobPhase::Complete {
                lines.push("[100%] Research complete.".to_string());
            }
            self.last_phase = view.phase;
        }

        lines
    }

    /// Called only when the connection state actually changed.
    fn connection_line(&mut self, current: ConnectionState) -> Option<String> {
        match (self.last_connection, current) {
            (ConnectionState::Open, ConnectionState::Disconnected) => {
                Some("       connection lost, waiting to reconnect".to_string())
            }
            (_, ConnectionState::Open) => {
                let line = if self.has_connected {
                    "       reconnected"
                } else {
                    "       connected"
                };
                self.has_connected = true;
                Some(line.to_string())
            }
            _ => None,
        }
    }
}
