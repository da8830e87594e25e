//! Line protocol spoken over the job stream.
//!
//! Server frames are classified by literal prefix; anything unrecognised is
//! kept as an opaque log line so a malformed frame can never end a job.

use crate::log_buffer::Severity;

pub const COMPLETION_SENTINEL: &str = "DONE";
pub const ARTIFACT_PREFIX: &str = "FINAL_PAPER_CONTENT:";
pub const STAGE_PREFIX: &str = "STAGE:";
pub const START_PREFIX: &str = "START:";

const ERROR_MARKERS: [&str; 2] = ["error:", "traceback"];

/// A classified server → client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Terminal frame of a job.
    Completion,
    /// The finished report, verbatim.
    Artifact { content: String },
    /// Stage progress; `raw` is the whole frame for log display.
    Stage { code: String, raw: String },
    /// Any other text.
    Opaque { raw: String },
}

pub fn parse_message(raw: &str) -> ServerMessage {
    if raw == COMPLETION_SENTINEL {
        return ServerMessage::Completion;
    }
    if let Some(content) = raw.strip_prefix(ARTIFACT_PREFIX) {
        return ServerMessage::Artifact {
            content: content.to_string(),
        };
    }
    if let Some(rest) = raw.strip_prefix(STAGE_PREFIX) {
        let code = rest.split(':').next().unwrap_or_default();
        return ServerMessage::Stage {
            code: code.to_string(),
            raw: raw.to_string(),
        };
    }
    ServerMessage::Opaque {
        raw: raw.to_string(),
    }
}

/// Severity of a stage frame: error when it carries `ERROR:` or `traceback`
/// in any letter case.
pub fn stage_severity(raw: &str) -> Severity {
    let lowered = raw.to_lowercase();
    if ERROR_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        Severity::Error
    } else {
        Severity::Info
    }
}

/// The client → server frame that starts a job.
pub fn start_directive(topic: &str) -> String {
    format!("{START_PREFIX}{topic}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_must_match_exactly() {
        assert_eq!(parse_message("DONE"), ServerMessage::Completion);
        assert_eq!(
            parse_message("DONE "),
            ServerMessage::Opaque {
                raw: "DONE ".to_string()
            }
        );
        assert!(matches!(parse_message("done"), ServerMessage::Opaque { .. }));
    }

    #[test]
    fn artifact_content_is_verbatim() {
        let raw = "FINAL_PAPER_CONTENT: # Title: part\\n\n* item ";
        assert_eq!(
            parse_message(raw),
            ServerMessage::Artifact {
                content: " # Title: part\\n\n* item ".to_string()
            }
        );
        assert_eq!(
            parse_message("FINAL_PAPER_CONTENT:"),
            ServerMessage::Artifact {
                content: String::new()
            }
        );
    }

    #[test]
    fn stage_code_stops_at_next_colon() {
        assert_eq!(
            parse_message("STAGE:3b"),
            ServerMessage::Stage {
                code: "3b".to_string(),
                raw: "STAGE:3b".to_string()
            }
        );
        assert_eq!(
            parse_message("STAGE:4:scored 12 docs"),
            ServerMessage::Stage {
                code: "4".to_string(),
                raw: "STAGE:4:scored 12 docs".to_string()
            }
        );
        assert_eq!(
            parse_message("STAGE:"),
            ServerMessage::Stage {
                code: String::new(),
                raw: "STAGE:".to_string()
            }
        );
    }

    #[test]
    fn other_lines_are_opaque() {
        for raw in ["ERROR:No valid docs", "COMPLETE", "", "stage:1", " STAGE:1"] {
            assert_eq!(
                parse_message(raw),
                ServerMessage::Opaque {
                    raw: raw.to_string()
                }
            );
        }
    }

    #[test]
    fn error_markers_are_case_insensitive() {
        assert_eq!(stage_severity("STAGE:5:ERROR:No valid docs"), Severity::Error);
        assert_eq!(stage_severity("STAGE:3:Traceback (most recent call last)"), Severity::Error);
        assert_eq!(stage_severity("STAGE:3:error: boom"), Severity::Error);
        assert_eq!(stage_severity("STAGE:3:errors were fine"), Severity::Info);
        assert_eq!(stage_severity("STAGE:3"), Severity::Info);
    }

    #[test]
    fn start_directive_carries_topic_unchanged() {
        assert_eq!(start_directive("Microplastics: a review"), "START:Microplastics: a review");
    }
}
