//! The conversation log.
//!
//! One ordered transcript serves both the request context (last N exchanged
//! messages) and the display (last M messages of any kind). Clearing the log
//! clears both views at once.

use std::sync::{Arc, Mutex, MutexGuard};

use davood_types::chat::{LogEntry, Message};

/// Number of exchanged messages sent upstream as context.
pub const CONTEXT_WINDOW: usize = 10;

/// Log shared between the session client and the presentation loop.
///
/// The lock is never held across an `.await`.
pub type SharedLog = Arc<Mutex<ConversationLog>>;

/// Lock a shared log, recovering the data if a previous holder panicked.
pub fn lock_log(log: &SharedLog) -> MutexGuard<'_, ConversationLog> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Ordered transcript, oldest first, trimmed from the front.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    entries: Vec<LogEntry>,
    retain: usize,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new(CONTEXT_WINDOW)
    }
}

impl ConversationLog {
    /// Create an empty log keeping the newest `retain` entries (never fewer
    /// than the context window). Older entries survive trimming only while
    /// they belong to the newest context window of exchanged messages.
    pub fn new(retain: usize) -> Self {
        Self {
            entries: Vec::new(),
            retain: retain.max(CONTEXT_WINDOW),
        }
    }

    /// Wrap this log for sharing.
    pub fn shared(self) -> SharedLog {
        Arc::new(Mutex::new(self))
    }

    /// Append the two halves of a successful round trip.
    pub fn push_exchange(&mut self, user: Message, assistant: Message) {
        self.entries.push(LogEntry::exchanged(user));
        self.entries.push(LogEntry::exchanged(assistant));
        self.trim();
    }

    /// Append a message that never reached (or came from) the backend.
    pub fn push_local(&mut self, message: Message) {
        self.entries.push(LogEntry::local(message));
        self.trim();
    }

    /// Replace the contents, e.g. with a restored transcript.
    pub fn replace(&mut self, entries: Vec<LogEntry>) {
        self.entries = entries;
        self.trim();
    }

    /// The most recent `n` exchanged messages, in chronological order.
    pub fn context_window(&self, n: usize) -> Vec<Message> {
        let mut recent: Vec<Message> = self
            .entries
            .iter()
            .rev()
            .filter(|entry| entry.exchanged)
            .take(n)
            .map(|entry| entry.message.clone())
            .collect();
        recent.reverse();
        recent
    }

    /// The most recent `m` entries regardless of origin.
    pub fn display_window(&self, m: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(m);
        &self.entries[start..]
    }

    /// Change how many entries are kept, trimming immediately if needed.
    pub fn set_retention(&mut self, retain: usize) {
        self.retain = retain.max(CONTEXT_WINDOW);
        self.trim();
    }

    pub fn retention(&self) -> usize {
        self.retain
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn trim(&mut self) {
        let Some(display_start) = self.entries.len().checked_sub(self.retain) else {
            return;
        };
        if display_start == 0 {
            return;
        }
        // Index of the oldest exchanged entry still inside the context window.
        let context_start = self
            .entries
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, entry)| entry.exchanged)
            .nth(CONTEXT_WINDOW - 1)
            .map_or(0, |(index, _)| index);

        let mut index = 0;
        self.entries.retain(|entry| {
            let keep = index >= display_start || (entry.exchanged && index >= context_start);
            index += 1;
            keep
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(log: &mut ConversationLog, n: usize) {
        log.push_exchange(
            Message::user(format!("q{n}")),
            Message::assistant(format!("a{n}")),
        );
    }

    #[test]
    fn test_context_window_keeps_most_recent_in_order() {
        let mut log = ConversationLog::new(100);
        for n in 0..8 {
            exchange(&mut log, n);
        }
        let context = log.context_window(CONTEXT_WINDOW);
        assert_eq!(context.len(), 10);
        let contents: Vec<&str> = context.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["q3", "a3", "q4", "a4", "q5", "a5", "q6", "a6", "q7", "a7"]
        );
    }

    #[test]
    fn test_context_window_skips_local_entries() {
        let mut log = ConversationLog::new(100);
        exchange(&mut log, 0);
        log.push_local(Message::user("offline question"));
        log.push_local(Message::assistant("offline answer"));
        exchange(&mut log, 1);

        let context = log.context_window(CONTEXT_WINDOW);
        assert_eq!(context.len(), 4);
        assert!(context.iter().all(|m| !m.content.starts_with("offline")));
        assert_eq!(log.display_window(100).len(), 6);
    }

    #[test]
    fn test_display_window_is_tail_slice() {
        let mut log = ConversationLog::new(100);
        for n in 0..3 {
            exchange(&mut log, n);
        }
        let tail: Vec<&str> = log
            .display_window(2)
            .iter()
            .map(|e| e.message.content.as_str())
            .collect();
        assert_eq!(tail, vec!["q2", "a2"]);
        assert_eq!(log.display_window(50).len(), 6);
    }

    #[test]
    fn test_retention_never_drops_below_context_window() {
        let mut log = ConversationLog::new(2);
        assert_eq!(log.retention(), CONTEXT_WINDOW);
        for n in 0..10 {
            exchange(&mut log, n);
        }
        assert_eq!(log.len(), CONTEXT_WINDOW);
        assert_eq!(log.entries()[0].message.content, "q5");
    }

    #[test]
    fn test_local_entries_never_starve_context() {
        let mut log = ConversationLog::new(2);
        for n in 0..5 {
            exchange(&mut log, n);
        }
        log.push_local(Message::user("offline question"));
        log.push_local(Message::assistant("offline answer"));

        let context = log.context_window(CONTEXT_WINDOW);
        assert_eq!(context.len(), CONTEXT_WINDOW);
        assert_eq!(context[0].content, "q0");
        assert_eq!(log.display_window(2)[1].message.content, "offline answer");
    }

    #[test]
    fn test_many_failures_keep_context_and_stay_bounded() {
        let mut log = ConversationLog::new(100);
        for n in 0..12 {
            exchange(&mut log, n);
        }
        for n in 0..200 {
            log.push_local(Message::assistant(format!("fallback {n}")));
        }

        let context = log.context_window(CONTEXT_WINDOW);
        assert_eq!(context.len(), CONTEXT_WINDOW);
        assert_eq!(context[0].content, "q7");
        assert_eq!(context[9].content, "a11");
        assert_eq!(log.len(), 100 + CONTEXT_WINDOW);
        assert!(log.display_window(100).iter().all(|e| !e.exchanged));
    }

    #[test]
    fn test_set_retention_trims_front() {
        let mut log = ConversationLog::new(100);
        for n in 0..20 {
            exchange(&mut log, n);
        }
        log.set_retention(12);
        assert_eq!(log.len(), 12);
        assert_eq!(log.entries().last().unwrap().message.content, "a19");
    }

    #[test]
    fn test_clear_empties_both_views() {
        let mut log = ConversationLog::new(100);
        exchange(&mut log, 0);
        log.push_local(Message::assistant("welcome"));
        log.clear();
        assert!(log.is_empty());
        assert!(log.context_window(CONTEXT_WINDOW).is_empty());
        assert!(log.display_window(100).is_empty());
    }
}
