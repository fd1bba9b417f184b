//! Screen log buffer
//!
//! Holds the messages shown by the on-screen overlay, newest first. Collection does not
//! depend on log levels or on whether the overlay is hidden; hiding only affects what
//! the overlay is given to display.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::settings::SettingsStore;

/// A single overlay message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenLogMessage {
    /// Unique message id
    pub id: String,
    pub text: String,
    /// Optional second line shown in smaller type
    pub details: Option<String>,
    /// When the message was added
    pub created_at: DateTime<Utc>,
}

impl ScreenLogMessage {
    /// Create a message with a fresh id
    pub fn new(text: impl Into<String>, details: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            details,
            created_at: Utc::now(),
        }
    }
}

/// Thread-safe, newest-first list of overlay messages
pub struct ScreenLogBuffer {
    enabled: bool,
    messages: Mutex<VecDeque<ScreenLogMessage>>,
    /// Maximum messages kept; the oldest are dropped past this
    capacity: Option<usize>,
    settings: Arc<SettingsStore>,
}

impl ScreenLogBuffer {
    /// Create an empty buffer; a capacity of `Some(0)` is treated as unbounded
    pub fn new(enabled: bool, capacity: Option<usize>, settings: Arc<SettingsStore>) -> Self {
        Self {
            enabled,
            messages: Mutex::new(VecDeque::new()),
            capacity: capacity.filter(|&capacity| capacity > 0),
            settings,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ScreenLogMessage>> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a message at the front
    ///
    /// Returns the new message id, or `None` when the harness is disabled.
    pub fn append(&self, text: impl Into<String>, details: Option<String>) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let message = ScreenLogMessage::new(text, details);
        let id = message.id.clone();

        let mut messages = self.lock();
        messages.push_front(message);
        if let Some(capacity) = self.capacity {
            messages.truncate(capacity);
        }

        Some(id)
    }

    /// Remove every message
    pub fn clear(&self) {
        if !self.enabled {
            return;
        }
        self.lock().clear();
    }

    /// Remove the message with this id; no-op if absent
    pub fn remove(&self, id: &str) {
        if !self.enabled {
            return;
        }
        let mut messages = self.lock();
        if let Some(index) = messages.iter().position(|m| m.id == id) {
            messages.remove(index);
        }
    }

    /// All collected messages, newest first
    pub fn messages(&self) -> Vec<ScreenLogMessage> {
        self.lock().iter().cloned().collect()
    }

    /// Messages the overlay should display: none while hidden, otherwise all
    pub fn visible_messages(&self) -> Vec<ScreenLogMessage> {
        if self.is_hidden() {
            return Vec::new();
        }
        self.messages()
    }

    /// Whether the overlay is hidden by the current settings
    pub fn is_hidden(&self) -> bool {
        self.settings.read(|settings| settings.hide_screen_logs)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl std::fmt::Debug for ScreenLogBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenLogBuffer")
            .field("enabled", &self.enabled)
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsRecord;
    use tempfile::TempDir;

    fn buffer(temp_dir: &TempDir, enabled: bool, capacity: Option<usize>) -> ScreenLogBuffer {
        let store = Arc::new(SettingsStore::new(
            temp_dir.path().join("harness_settings.json"),
            enabled,
            SettingsRecord::default(),
        ));
        ScreenLogBuffer::new(enabled, capacity, store)
    }

    fn texts(buffer: &ScreenLogBuffer) -> Vec<String> {
        buffer.messages().into_iter().map(|m| m.text).collect()
    }

    #[test]
    fn test_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = buffer(&temp_dir, true, None);

        buffer.append("a", None);
        buffer.append("b", Some("details".to_string()));

        assert_eq!(texts(&buffer), vec!["b", "a"]);
        assert_eq!(buffer.messages()[0].details.as_deref(), Some("details"));
        assert_eq!(buffer.messages()[1].details, None);
    }

    #[test]
    fn test_ids_are_unique() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = buffer(&temp_dir, true, None);

        let a = buffer.append("same", None).unwrap();
        let b = buffer.append("same", None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = buffer(&temp_dir, true, None);

        buffer.append("a", None);
        let b = buffer.append("b", None).unwrap();
        buffer.append("c", None);

        buffer.remove(&b);
        assert_eq!(texts(&buffer), vec!["c", "a"]);

        buffer.remove("no-such-id");
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = buffer(&temp_dir, true, None);

        buffer.append("a", None);
        buffer.append("b", None);
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = buffer(&temp_dir, true, Some(3));

        for i in 0..5 {
            buffer.append(format!("msg {}", i), None);
        }

        assert_eq!(texts(&buffer), vec!["msg 4", "msg 3", "msg 2"]);
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = buffer(&temp_dir, true, Some(0));

        for i in 0..5 {
            buffer.append(format!("msg {}", i), None);
        }

        assert_eq!(buffer.capacity(), None);
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_concurrent_append_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = Arc::new(buffer(&temp_dir, true, None));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let buffer = Arc::clone(&buffer);
                std::thread::spawn(move || {
                    let mut kept = Vec::new();
                    for j in 0..20 {
                        let id = buffer.append(format!("{}-{}", i, j), None).unwrap();
                        if j % 2 == 0 {
                            buffer.remove(&id);
                        } else {
                            kept.push(id);
                        }
                    }
                    kept
                })
            })
            .collect();

        let mut kept: Vec<String> = Vec::new();
        for handle in handles {
            kept.extend(handle.join().unwrap());
        }

        // Every odd append survives exactly once; every even one is gone
        let messages = buffer.messages();
        assert_eq!(messages.len(), 8 * 10);
        let mut ids: Vec<String> = messages.into_iter().map(|m| m.id).collect();
        ids.sort();
        kept.sort();
        assert_eq!(ids, kept);
    }

    #[test]
    fn test_collects_while_hidden() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = buffer(&temp_dir, true, None);

        buffer.settings.set_hide_screen_logs(true);
        buffer.append("a", None);
        buffer.append("b", None);

        assert!(buffer.is_hidden());
        assert!(buffer.visible_messages().is_empty());
        assert_eq!(buffer.len(), 2);

        buffer.settings.set_hide_screen_logs(false);
        assert!(!buffer.is_hidden());
        assert_eq!(buffer.visible_messages(), buffer.messages());
        assert_eq!(texts(&buffer), vec!["b", "a"]);
    }

    #[test]
    fn test_disabled_buffer_ignores_appends() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = buffer(&temp_dir, false, None);

        assert!(buffer.append("a", None).is_none());
        assert!(buffer.is_empty());
    }
}
