//! Surefact core: pure job state machine for the research progress stream.
mod effect;
mod error;
mod event;
mod log_buffer;
mod msg;
mod protocol;
mod stage;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::JobError;
pub use event::{ConnectionState, SessionEvent, SessionId, StreamEvent};
pub use log_buffer::{LogBuffer, LogEntry, Severity, LOG_CAPACITY};
pub use msg::Msg;
pub use protocol::{
    parse_message, stage_severity, start_directive, ServerMessage, ARTIFACT_PREFIX,
    COMPLETION_SENTINEL, STAGE_PREFIX, START_PREFIX,
};
pub use stage::{StageDescriptor, StageRegistry, FALLBACK_STAGE_NAME};
pub use state::{JobController, JobPhase, JobSession};
pub use update::update;
pub use view_model::{JobViewModel, IDLE_HEADLINE};
