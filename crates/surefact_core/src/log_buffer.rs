use std::collections::VecDeque;

/// Number of progress lines retained per job.
pub const LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub text: String,
    pub severity: Severity,
}

/// Bounded FIFO of progress lines; the oldest line is evicted on overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(LOG_CAPACITY)
    }
}

impl LogBuffer {
    /// A zero capacity is bumped to one so `latest` stays meaningful.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, text: impl Into<String>, severity: Severity) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            text: text.into(),
            severity,
        });
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_evicts_oldest_first() {
        let mut buffer = LogBuffer::default();
        for i in 0..=LOG_CAPACITY {
            buffer.append(format!("line {i}"), Severity::Info);
        }

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), LOG_CAPACITY);
        assert_eq!(snapshot[0].text, "line 1");
        assert_eq!(snapshot[LOG_CAPACITY - 1].text, format!("line {LOG_CAPACITY}"));
        assert!(snapshot.iter().all(|entry| entry.text != "line 0"));
    }

    #[test]
    fn latest_tracks_last_append() {
        let mut buffer = LogBuffer::new(2);
        assert!(buffer.latest().is_none());
        assert!(buffer.is_empty());

        buffer.append("a", Severity::Info);
        buffer.append("b", Severity::Error);
        buffer.append("c", Severity::Info);

        assert_eq!(buffer.latest().map(|entry| entry.text.as_str()), Some("c"));
        assert_eq!(
            buffer.snapshot().iter().map(|entry| entry.severity).collect::<Vec<_>>(),
            vec![Severity::Error, Severity::Info]
        );
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut buffer = LogBuffer::new(0);
        buffer.append("only", Severity::Info);
        buffer.append("newest", Severity::Info);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().unwrap().text, "newest");
    }
}
