use crate::log_buffer::LogEntry;
use crate::protocol::STAGE_PREFIX;
use crate::{ConnectionState, JobPhase};

/// Shown before the first progress line arrives.
pub const IDLE_HEADLINE: &str = "INITIALIZING...";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobViewModel {
    pub phase: JobPhase,
    pub connection: ConnectionState,
    pub topic: Option<String>,
    pub stage_name: Option<String>,
    pub stage_ordinal: u8,
    pub stage_total: u8,
    pub progress: f64,
    pub percent: u8,
    /// Latest log line cleaned up for a single-line status display.
    pub headline: String,
    pub logs: Vec<LogEntry>,
    pub artifact: Option<String>,
    pub dirty: bool,
}

pub(crate) fn headline(latest: Option<&LogEntry>) -> String {
    let Some(entry) = latest else {
        return IDLE_HEADLINE.to_string();
    };
    entry
        .text
        .replacen(STAGE_PREFIX, "", 1)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    fn entry(text: &str) -> LogEntry {
        LogEntry {
            text: text.to_string(),
            severity: Severity::Info,
        }
    }

    #[test]
    fn headline_strips_prefix_and_punctuation() {
        assert_eq!(headline(Some(&entry("STAGE:4:scored 12 docs!"))), "4scored 12 docs");
        assert_eq!(headline(Some(&entry("Searching arXiv..."))), "Searching arXiv");
    }

    #[test]
    fn headline_defaults_when_empty() {
        assert_eq!(headline(None), IDLE_HEADLINE);
    }
}
