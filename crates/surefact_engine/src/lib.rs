//! Surefact engine: job stream transport, reconnection and report output.
mod engine;
mod error;
mod manager;
mod persist;
mod report;
mod settings;
mod transport;

pub use engine::StreamEngine;
pub use error::StreamError;
pub use manager::{ChannelEventSink, ConnectionManager, EventSink};
pub use persist::{ensure_output_dir, PersistError, ReportWriter};
pub use report::{build_report_document, report_filename};
pub use settings::{ReconnectPolicy, StreamSettings};
pub use transport::{Connector, Link, WsConnector};
