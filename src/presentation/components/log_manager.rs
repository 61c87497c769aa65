use chrono::{DateTime, Local};
use std::collections::VecDeque;
use tracing::Level;

const MAX_LOG_SIZE: usize = 200;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, message: String) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message,
        }
    }

    pub fn format_timestamp(&self) -> String {
        self.timestamp.format("%H:%M:%S%.3f").to_string()
    }
}

pub struct LogManager {
    logs: VecDeque<LogEntry>,
    show_trace: bool,
}

impl LogManager {
    pub fn new() -> Self {
        Self {
            logs: VecDeque::with_capacity(MAX_LOG_SIZE),
            show_trace: false,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.logs.len() >= MAX_LOG_SIZE {
            self.logs.pop_front();
        }
        self.logs.push_back(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = LogEntry>) {
        for entry in entries {
            self.push(entry);
        }
    }

    pub fn show_trace_mut(&mut self) -> &mut bool {
        &mut self.show_trace
    }

    pub fn filtered_logs(&self) -> impl Iterator<Item = &LogEntry> {
        let show_trace = self.show_trace;
        self.logs
            .iter()
            .filter(move |entry| show_trace || entry.level != Level::TRACE)
    }

    pub fn clear(&mut self) {
        self.logs.clear();
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_newest_entries() {
        let mut manager = LogManager::new();
        manager.extend((0..MAX_LOG_SIZE + 5).map(|i| LogEntry::new(Level::INFO, i.to_string())));

        assert_eq!(manager.len(), MAX_LOG_SIZE);
        assert_eq!(manager.filtered_logs().next().map(|e| e.message.as_str()), Some("5"));
    }

    #[test]
    fn trace_entries_are_hidden_by_default() {
        let mut manager = LogManager::new();
        manager.push(LogEntry::new(Level::TRACE, "codec".to_string()));
        manager.push(LogEntry::new(Level::DEBUG, "echo".to_string()));

        assert_eq!(manager.filtered_logs().count(), 1);
        *manager.show_trace_mut() = true;
        assert_eq!(manager.filtered_logs().count(), 2);
    }
}
