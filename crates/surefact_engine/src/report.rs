use std::fmt::Write;

use sha2::{Digest, Sha256};

const MAX_STEM_LEN: usize = 80;

/// Deterministic, filesystem-safe name for a report:
/// `{sanitized_topic}--{short_hash(topic)}.md`.
pub fn report_filename(topic: &str) -> String {
    format!("{}--{}.md", sanitize_topic(topic), short_hash(topic))
}

/// Prepends front matter to a finished report body. The body is kept verbatim.
pub fn build_report_document(topic: &str, completed_utc: &str, body: &str) -> String {
    let word_count = body.split_whitespace().count();
    // Front matter is line oriented; a newline in the topic would break it.
    let topic_line = topic.replace(['\r', '\n'], " ");
    format!(
        "---\ntopic: {topic}\ncompleted_utc: {completed_utc}\nword_count: {word_count}\n---\n\n{body}",
        topic = topic_line.trim(),
    )
}

fn sanitize_topic(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.trim().chars() {
        let c = if is_forbidden(c) || c.is_whitespace() { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }

    let mut stem = compacted.trim_matches(&['_', '.'][..]).to_string();
    if stem.is_empty() {
        stem = "report".to_string();
    }
    if stem.len() > MAX_STEM_LEN {
        let mut end = MAX_STEM_LEN;
        while !stem.is_char_boundary(end) {
            end -= 1;
        }
        stem.truncate(end);
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
