use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use surefact_core::{SessionEvent, SessionId};
use surefact_logging::{sf_debug, sf_error};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::manager::{ChannelEventSink, ConnectionManager, EventSink};
use crate::transport::{Connector, WsConnector};
use crate::{StreamError, StreamSettings};

enum EngineCommand {
    Open {
        session_id: SessionId,
        start_directive: String,
    },
    Close {
        session_id: SessionId,
    },
}

struct ActiveSession {
    session_id: SessionId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ActiveSession {
    /// Stops the manager, including any reconnect timer it is waiting on.
    fn discard(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Handle to the background thread that hosts connection managers.
///
/// At most one session is live: opening a new one discards the previous
/// manager together with its pending reconnect.
pub struct StreamEngine {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<SessionEvent>,
}

impl StreamEngine {
    pub fn new(settings: StreamSettings) -> Result<Self, StreamError> {
        let url = settings.validate()?;
        let connector = Arc::new(WsConnector::new(url, settings.bearer_token.clone()));
        Ok(Self::with_connector(settings, connector))
    }

    pub fn with_connector(settings: StreamSettings, connector: Arc<dyn Connector>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    sf_error!("Failed to start stream runtime: {}", err);
                    return;
                }
            };
            let mut active: Option<ActiveSession> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Open {
                        session_id,
                        start_directive,
                    } => {
                        if let Some(previous) = active.take() {
                            sf_debug!(
                                "Discarding session {} for session {}",
                                previous.session_id,
                                session_id
                            );
                            previous.discard();
                        }
                        let cancel = CancellationToken::new();
                        let manager = ConnectionManager::new(
                            session_id,
                            start_directive,
                            &settings,
                            connector.clone(),
                            sink.clone(),
                            cancel.clone(),
                        );
                        let task = runtime.spawn(manager.run());
                        active = Some(ActiveSession {
                            session_id,
                            cancel,
                            task,
                        });
                    }
                    EngineCommand::Close { session_id } => {
                        // Cancel without aborting so the close handshake completes.
                        match active.take() {
                            Some(current) if current.session_id == session_id => {
                                current.cancel.cancel();
                            }
                            other => active = other,
                        }
                    }
                }
            }
            if let Some(current) = active.take() {
                current.discard();
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn open(&self, session_id: SessionId, start_directive: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Open {
            session_id,
            start_directive: start_directive.into(),
        });
    }

    pub fn close(&self, session_id: SessionId) {
        let _ = self.cmd_tx.send(EngineCommand::Close { session_id });
    }

    pub fn try_recv(&self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SessionEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
