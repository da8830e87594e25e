use surefact_logging::{sf_debug, sf_info, sf_warn};

use crate::log_buffer::{LogBuffer, Severity};
use crate::protocol::{start_directive, stage_severity, ServerMessage};
use crate::stage::{StageRegistry, FALLBACK_STAGE_NAME};
use crate::view_model::{headline, JobViewModel};
use crate::{ConnectionState, Effect, JobError, SessionEvent, SessionId, StreamEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    Running,
    Complete,
}

/// One research run. Replaced wholesale by the next start; never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSession {
    id: SessionId,
    topic: String,
    stage_ordinal: u8,
    stage_name: &'static str,
    logs: LogBuffer,
    artifact: Option<String>,
}

impl JobSession {
    fn new(id: SessionId, topic: String, registry: &StageRegistry) -> Self {
        let (stage_ordinal, stage_name) = registry
            .first()
            .map(|stage| (stage.ordinal, stage.display_name))
            .unwrap_or((1, FALLBACK_STAGE_NAME));
        Self {
            id,
            topic,
            stage_ordinal,
            stage_name,
            logs: LogBuffer::default(),
            artifact: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn stage_ordinal(&self) -> u8 {
        self.stage_ordinal
    }

    pub fn stage_name(&self) -> &'static str {
        self.stage_name
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }
}

/// Owns the current job and applies stream events to it, strictly in the
/// order they are handed in.
#[derive(Debug, Clone, PartialEq)]
pub struct JobController {
    registry: StageRegistry,
    phase: JobPhase,
    session: Option<JobSession>,
    connection: ConnectionState,
    next_session_id: SessionId,
    dirty: bool,
}

impl Default for JobController {
    fn default() -> Self {
        Self::with_registry(StageRegistry::research_pipeline())
    }
}

impl JobController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: StageRegistry) -> Self {
        Self {
            registry,
            phase: JobPhase::Idle,
            session: None,
            connection: ConnectionState::Disconnected,
            next_session_id: 1,
            dirty: false,
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&JobSession> {
        self.session.as_ref()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Starts a fresh session. A running session is replaced and its stream
    /// closed; a complete one must be reset first.
    pub fn start(&mut self, topic: &str) -> Result<Vec<Effect>, JobError> {
        if topic.trim().is_empty() {
            return Err(JobError::InvalidInput);
        }
        if self.phase == JobPhase::Complete {
            return Err(JobError::ResetRequired);
        }

        let mut effects = Vec::with_capacity(2);
        if let Some(previous) = self.session.take() {
            sf_info!(
                "Replacing running session {} with a new start",
                previous.id
            );
            effects.push(Effect::CloseStream {
                session_id: previous.id,
            });
        }

        let session_id = self.next_session_id;
        self.next_session_id += 1;
        let session = JobSession::new(session_id, topic.to_string(), &self.registry);
        sf_info!(
            "Session {} started topic_len={}",
            session_id,
            session.topic.len()
        );
        effects.push(Effect::OpenStream {
            session_id,
            start_directive: start_directive(&session.topic),
        });

        self.session = Some(session);
        self.phase = JobPhase::Running;
        self.connection = ConnectionState::Disconnected;
        self.dirty = true;
        Ok(effects)
    }

    /// Applies a connection-manager report. Reports for any session other
    /// than the current one are dropped.
    pub fn handle_event(&mut self, event: SessionEvent) -> Vec<Effect> {
        let current = self.session.as_ref().map(JobSession::id);
        if current != Some(event.session_id) {
            sf_debug!(
                "Dropping event for stale session {} (current {:?})",
                event.session_id,
                current
            );
            return Vec::new();
        }

        match event.event {
            StreamEvent::Connection(state) => {
                if self.connection != state {
                    sf_debug!(
                        "Session {} connection {:?} -> {:?}",
                        event.session_id,
                        self.connection,
                        state
                    );
                    self.connection = state;
                    self.dirty = true;
                }
                Vec::new()
            }
            StreamEvent::Message(message) => self.on_message(message),
            StreamEvent::TransportError(detail) => {
                sf_warn!("Session {} transport error: {}", event.session_id, detail);
                Vec::new()
            }
            StreamEvent::ReconnectScheduled { attempt, delay } => {
                sf_info!(
                    "Session {} reconnect attempt {} in {:?}",
                    event.session_id,
                    attempt,
                    delay
                );
                Vec::new()
            }
            StreamEvent::ReconnectAbandoned { attempts } => {
                sf_warn!(
                    "Session {} abandoned reconnecting after {} attempts",
                    event.session_id,
                    attempts
                );
                if self.phase == JobPhase::Running {
                    self.append_log(
                        format!("Connection lost: gave up after {attempts} reconnection attempts"),
                        Severity::Error,
                    );
                }
                Vec::new()
            }
        }
    }

    /// Applies one parsed server frame to the running session.
    pub fn on_message(&mut self, message: ServerMessage) -> Vec<Effect> {
        if self.phase != JobPhase::Running {
            sf_debug!("Ignoring {:?} while {:?}", message, self.phase);
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        self.dirty = true;
        match message {
            ServerMessage::Completion => {
                self.phase = JobPhase::Complete;
                sf_info!("Session {} complete", session.id);
                let mut effects = vec![Effect::CloseStream {
                    session_id: session.id,
                }];
                if let Some(content) = session.artifact.clone() {
                    effects.push(Effect::PublishArtifact {
                        session_id: session.id,
                        topic: session.topic.clone(),
                        content,
                    });
                }
                effects
            }
            ServerMessage::Artifact { content } => {
                if session.artifact.is_some() {
                    sf_warn!("Session {} received a second artifact", session.id);
                }
                session.artifact = Some(content);
                Vec::new()
            }
            ServerMessage::Stage { code, raw } => {
                let resolved = self.registry.resolve(&code, session.stage_ordinal);
                // Out-of-order frames must not rewind visible progress.
                if resolved.ordinal >= session.stage_ordinal {
                    session.stage_ordinal = resolved.ordinal;
                    session.stage_name = resolved.display_name;
                }
                let severity = stage_severity(&raw);
                session.logs.append(raw, severity);
                Vec::new()
            }
            ServerMessage::Opaque { raw } => {
                session.logs.append(raw, Severity::Info);
                Vec::new()
            }
        }
    }

    /// Discards a complete session. No-op in any other phase.
    pub fn reset(&mut self) -> Vec<Effect> {
        if self.phase != JobPhase::Complete {
            sf_debug!("Ignoring reset while {:?}", self.phase);
            return Vec::new();
        }
        self.phase = JobPhase::Idle;
        self.connection = ConnectionState::Disconnected;
        self.dirty = true;
        self.session
            .take()
            .map(|session| {
                vec![Effect::CloseStream {
                    session_id: session.id,
                }]
            })
            .unwrap_or_default()
    }

    /// Current ordinal over the registry total, clamped to `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        let total = self.registry.total();
        match &self.session {
            Some(session) if total > 0 => {
                (f64::from(session.stage_ordinal) / f64::from(total)).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    pub fn view(&self) -> JobViewModel {
        let session = self.session.as_ref();
        let progress = self.progress_fraction();
        JobViewModel {
            phase: self.phase,
            connection: self.connection,
            topic: session.map(|s| s.topic.clone()),
            stage_name: session.map(|s| s.stage_name.to_string()),
            stage_ordinal: session.map(|s| s.stage_ordinal).unwrap_or(0),
            stage_total: self.registry.total(),
            progress,
            percent: (progress * 100.0).round() as u8,
            headline: headline(session.and_then(|s| s.logs.latest())),
            logs: session.map(|s| s.logs.snapshot()).unwrap_or_default(),
            artifact: session.and_then(|s| s.artifact.clone()),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn append_log(&mut self, text: String, severity: Severity) {
        if let Some(session) = self.session.as_mut() {
            session.logs.append(text, severity);
            self.dirty = true;
        }
    }
}
