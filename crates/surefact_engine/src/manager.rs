use std::sync::{mpsc, Arc};
use std::time::Duration;

use surefact_core::{
    parse_message, ConnectionState, ServerMessage, SessionEvent, SessionId, StreamEvent,
};
use surefact_logging::{sf_debug, sf_info, sf_warn};
use tokio_util::sync::CancellationToken;

use crate::transport::{Connector, Link};
use crate::{ReconnectPolicy, StreamError, StreamSettings};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: SessionEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<SessionEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

enum Next {
    Cancelled,
    Frame(Result<Option<String>, StreamError>),
}

/// Drives the transport of a single job session, including reconnects.
///
/// The start directive goes out on the first successful open and is never
/// repeated on a reconnect. Reconnection stops for good once the completion
/// sentinel has been forwarded or the cancellation token fires.
pub struct ConnectionManager {
    session_id: SessionId,
    connector: Arc<dyn Connector>,
    sink: Arc<dyn EventSink>,
    policy: ReconnectPolicy,
    connect_timeout: Duration,
    idle_timeout: Option<Duration>,
    cancel: CancellationToken,
    state: ConnectionState,
    pending_start: Option<String>,
    completed: bool,
    attempts: u32,
}

impl ConnectionManager {
    pub fn new(
        session_id: SessionId,
        start_directive: String,
        settings: &StreamSettings,
        connector: Arc<dyn Connector>,
        sink: Arc<dyn EventSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session_id,
            connector,
            sink,
            policy: settings.reconnect.clone(),
            connect_timeout: settings.connect_timeout,
            idle_timeout: settings.idle_timeout,
            cancel,
            state: ConnectionState::Disconnected,
            pending_start: Some(start_directive),
            completed: false,
            attempts: 0,
        }
    }

    /// Runs until the job completes, the token is cancelled, or the
    /// reconnect budget is spent.
    pub async fn run(mut self) {
        loop {
            self.connect_and_serve().await;
            self.set_state(ConnectionState::Disconnected);

            // Decided when the closure is observed, never ahead of time.
            if self.completed || self.cancel.is_cancelled() {
                break;
            }
            let attempt = self.attempts + 1;
            if !self.policy.allows(attempt) {
                sf_warn!(
                    "Session {} giving up after {} reconnect attempts",
                    self.session_id,
                    self.attempts
                );
                self.emit(StreamEvent::ReconnectAbandoned {
                    attempts: self.attempts,
                });
                break;
            }
            self.attempts = attempt;

            let delay = self.policy.delay_for(attempt);
            self.emit(StreamEvent::ReconnectScheduled { attempt, delay });
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        sf_debug!("Session {} connection manager finished", self.session_id);
    }

    async fn connect_and_serve(&mut self) {
        self.set_state(ConnectionState::Connecting);
        let connected = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return,
            result = tokio::time::timeout(self.connect_timeout, self.connector.connect()) => result,
        };
        let mut link = match connected {
            Ok(Ok(link)) => link,
            Ok(Err(err)) => {
                self.report_error(err);
                return;
            }
            Err(_) => {
                self.report_error(StreamError::ConnectTimeout(self.connect_timeout));
                return;
            }
        };

        self.attempts = 0;
        self.set_state(ConnectionState::Open);

        if let Some(directive) = self.pending_start.take() {
            if let Err(err) = link.send(&directive).await {
                // Never delivered, so the next open may still send it.
                self.pending_start = Some(directive);
                self.report_error(err);
                return;
            }
            sf_info!("Session {} start directive sent", self.session_id);
        }

        self.serve(link.as_mut()).await;
    }

    async fn serve(&mut self, link: &mut dyn Link) {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Next::Cancelled,
                frame = recv_frame(link, self.idle_timeout) => Next::Frame(frame),
            };

            match next {
                Next::Cancelled => {
                    sf_debug!("Session {} closing on request", self.session_id);
                    self.set_state(ConnectionState::Closing);
                    link.close().await;
                    return;
                }
                Next::Frame(Ok(Some(text))) => {
                    if self.forward(&text) {
                        self.set_state(ConnectionState::Closing);
                        link.close().await;
                        return;
                    }
                }
                Next::Frame(Ok(None)) => {
                    sf_info!("Session {} stream closed by peer", self.session_id);
                    return;
                }
                Next::Frame(Err(err)) => {
                    self.report_error(err);
                    link.close().await;
                    return;
                }
            }
        }
    }

    /// Parses and forwards one frame; true once the job is complete.
    fn forward(&mut self, text: &str) -> bool {
        let message = parse_message(text);
        let done = message == ServerMessage::Completion;
        self.emit(StreamEvent::Message(message));
        if done {
            self.completed = true;
        }
        done
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            self.state = state;
            self.emit(StreamEvent::Connection(state));
        }
    }

    fn report_error(&self, err: StreamError) {
        sf_warn!("Session {} transport error: {}", self.session_id, err);
        self.emit(StreamEvent::TransportError(err.to_string()));
    }

    fn emit(&self, event: StreamEvent) {
        self.sink.emit(SessionEvent::new(self.session_id, event));
    }
}

async fn recv_frame(
    link: &mut dyn Link,
    idle_timeout: Option<Duration>,
) -> Result<Option<String>, StreamError> {
    let frame = match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, link.recv())
            .await
            .map_err(|_| StreamError::Idle(limit))?,
        None => link.recv().await,
    };
    frame.transpose()
}
