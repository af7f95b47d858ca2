//! Timestamped log of readings and errors.
//!
//! Entries are appended in the order events arrive, so readings and error
//! reports interleave exactly as the cycles completed.

use chrono::{DateTime, Utc};

use rtuscope_common::PollEvent;

/// What a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A successful reading.
    Reading,
    /// A connect or read failure.
    Error,
}

/// One line of the visible history.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// When the event was consumed.
    pub timestamp: DateTime<Utc>,
    pub kind: EntryKind,
    pub text: String,
}

impl LogEntry {
    /// Render the entry as a display line.
    pub fn render(&self) -> String {
        let ts = self.timestamp.format("%H:%M:%S%.3f");
        match self.kind {
            EntryKind::Reading => format!("{} {}", ts, self.text),
            EntryKind::Error => format!("{} ERROR {}", ts, self.text),
        }
    }
}

/// Append-only history of poll events.
#[derive(Debug, Default)]
pub struct ReadingLog {
    entries: Vec<LogEntry>,
    errors: usize,
}

impl ReadingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, stamped with the current time.
    pub fn push(&mut self, event: &PollEvent) -> &LogEntry {
        let (kind, text) = match event {
            PollEvent::DataReceived(text) => (EntryKind::Reading, text.clone()),
            PollEvent::Error(text) => (EntryKind::Error, text.clone()),
        };
        self.push_at(Utc::now(), kind, text)
    }

    /// Append with an explicit timestamp.
    pub fn push_at(
        &mut self,
        timestamp: DateTime<Utc>,
        kind: EntryKind,
        text: String,
    ) -> &LogEntry {
        if kind == EntryKind::Error {
            self.errors += 1;
        }
        self.entries.push(LogEntry {
            timestamp,
            kind,
            text,
        });
        self.entries.last().unwrap()
    }

    /// All entries in arrival order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The most recent successful reading, if any.
    pub fn last_reading(&self) -> Option<&LogEntry> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.kind == EntryKind::Reading)
    }

    /// Number of error entries seen so far.
    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Number of successful readings seen so far.
    pub fn reading_count(&self) -> usize {
        self.entries.len() - self.errors
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_interleave_in_arrival_order() {
        let mut log = ReadingLog::new();
        log.push(&PollEvent::DataReceived("1 2 3".to_string()));
        log.push(&PollEvent::Error("Read timed out after 1000 ms".to_string()));
        log.push(&PollEvent::DataReceived("4 5 6".to_string()));

        let kinds: Vec<EntryKind> = log.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EntryKind::Reading, EntryKind::Error, EntryKind::Reading]
        );
        assert_eq!(log.entries()[1].text, "Read timed out after 1000 ms");
    }

    #[test]
    fn test_counts() {
        let mut log = ReadingLog::new();
        assert!(log.is_empty());

        log.push(&PollEvent::Error("boom".to_string()));
        log.push(&PollEvent::DataReceived("7".to_string()));
        log.push(&PollEvent::Error("boom again".to_string()));

        assert_eq!(log.len(), 3);
        assert_eq!(log.error_count(), 2);
        assert_eq!(log.reading_count(), 1);
    }

    #[test]
    fn test_last_reading_skips_errors() {
        let mut log = ReadingLog::new();
        assert!(log.last_reading().is_none());

        log.push(&PollEvent::DataReceived("1 1 1".to_string()));
        log.push(&PollEvent::Error("boom".to_string()));

        assert_eq!(log.last_reading().unwrap().text, "1 1 1");
    }

    #[test]
    fn test_render_marks_errors() {
        let mut log = ReadingLog::new();
        let ts = "2026-08-27T10:00:00Z".parse().unwrap();

        let line = log
            .push_at(ts, EntryKind::Reading, "10 20".to_string())
            .render();
        assert_eq!(line, "10:00:00.000 10 20");

        let line = log
            .push_at(ts, EntryKind::Error, "port gone".to_string())
            .render();
        assert_eq!(line, "10:00:00.000 ERROR port gone");
    }
}
