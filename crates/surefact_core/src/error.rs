use thiserror::Error;

/// Rejections raised by [`crate::JobController::start`]. Nothing else in the
/// core fails; transport and protocol trouble surfaces as state instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("research topic must not be empty")]
    InvalidInput,
    #[error("previous job is complete; reset before starting another")]
    ResetRequired,
}
