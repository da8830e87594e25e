#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a research topic.
    StartRequested(String),
    /// User dismissed a completed job.
    ResetRequested,
    /// Connection manager report for some session.
    Stream(crate::SessionEvent),
}
