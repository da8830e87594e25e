use crate::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the job stream; the directive goes out on the first successful
    /// handshake only.
    OpenStream {
        session_id: SessionId,
        start_directive: String,
    },
    /// Stop reconnecting and close the stream of `session_id`.
    CloseStream { session_id: SessionId },
    /// A completed job's report, for whoever archives it.
    PublishArtifact {
        session_id: SessionId,
        topic: String,
        content: String,
    },
}
