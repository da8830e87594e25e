use std::time::Duration;

use crate::protocol::ServerMessage;

/// Allocated by the controller for every accepted start.
pub type SessionId = u64;

/// Transport lifecycle as seen by the connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
    Closing,
}

/// What a connection manager reports about its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Connection(ConnectionState),
    Message(ServerMessage),
    /// Logged only; the following close drives reconnection.
    TransportError(String),
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// The manager gave up after `attempts` consecutive failed reconnects.
    ReconnectAbandoned { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session_id: SessionId,
    pub event: StreamEvent,
}

impl SessionEvent {
    pub fn new(session_id: SessionId, event: StreamEvent) -> Self {
        Self { session_id, event }
    }
}
