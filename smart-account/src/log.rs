use std::fmt;
use std::sync::{Arc, Mutex};

use crate::lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLevel {
    Info,
    /// Balance read-outs, highlighted by front ends.
    Important,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LineLevel,
    pub text: String,
}

#[derive(Debug, Default)]
struct Inner {
    lines: Vec<LogLine>,
    loading: Option<String>,
}

/// User-facing activity feed plus the current loading indicator. Clones share
/// the same feed, so several managers can write to one log.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    inner: Arc<Mutex<Inner>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: LineLevel, text: String) {
        lock(&self.inner).lines.push(LogLine { level, text });
    }

    pub fn add_line(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!("{text}");
        self.push(LineLevel::Info, text);
    }

    pub fn important(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!("{text}");
        self.push(LineLevel::Important, text);
    }

    /// Clear the loading indicator and record `context` followed by the raw
    /// error text.
    pub fn fail(&self, context: &str, err: &dyn fmt::Display) {
        tracing::error!(error = %err, "{context}");
        let mut inner = lock(&self.inner);
        inner.loading = None;
        inner.lines.push(LogLine {
            level: LineLevel::Error,
            text: context.to_string(),
        });
        inner.lines.push(LogLine {
            level: LineLevel::Error,
            text: err.to_string(),
        });
    }

    pub fn set_loading(&self, text: impl Into<String>) {
        lock(&self.inner).loading = Some(text.into());
    }

    pub fn clear_loading(&self) {
        lock(&self.inner).loading = None;
    }

    pub fn loading(&self) -> Option<String> {
        lock(&self.inner).loading.clone()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        lock(&self.inner).lines.clone()
    }

    /// Line texts only, oldest first.
    pub fn texts(&self) -> Vec<String> {
        lock(&self.inner)
            .lines
            .iter()
            .map(|l| l.text.clone())
            .collect()
    }

    pub fn contains(&self, text: &str) -> bool {
        lock(&self.inner).lines.iter().any(|l| l.text == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_clears_loading() {
        let log = ActivityLog::new();
        log.set_loading("Creating session");
        log.fail("Error creating session", &"bundler unreachable");
        assert_eq!(log.loading(), None);
        let lines = log.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.level == LineLevel::Error));
        assert_eq!(lines[1].text, "bundler unreachable");
    }

    #[test]
    fn test_clones_share_lines() {
        let log = ActivityLog::new();
        let other = log.clone();
        other.important("Smart account balance: 7");
        assert!(log.contains("Smart account balance: 7"));
        assert_eq!(log.lines()[0].level, LineLevel::Important);
    }
}
