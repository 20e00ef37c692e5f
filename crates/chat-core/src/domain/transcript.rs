//! Transcript and roster views.

use crate::protocol::frames::ChatEvent;

/// Ordered history of chat events observed during the current session.
///
/// Append-only while a session is live; events appear in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    events: Vec<ChatEvent>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event at the end.
    pub fn append(&mut self, event: ChatEvent) {
        self.events.push(event);
    }

    /// Drops every event.  Called when a new session starts.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatEvent> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[ChatEvent] {
        &self.events
    }
}

/// Users currently connected to the room, as last reported.
///
/// The roster is only ever replaced wholesale; join/leave notices in the
/// transcript never patch it.  Server order is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    users: Vec<String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole roster with `users`.
    pub fn replace(&mut self, users: Vec<String>) {
        self.users = users;
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.iter().any(|u| u == username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.users.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_keeps_append_order() {
        let mut t = Transcript::new();
        t.append(ChatEvent::new("a", "a: 1"));
        t.append(ChatEvent::new("b", "b: 2"));
        t.append(ChatEvent::new("c", "c: 3"));

        let texts: Vec<&str> = t.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(texts, vec!["a: 1", "b: 2", "c: 3"]);
    }

    #[test]
    fn test_transcript_clear_empties_history() {
        let mut t = Transcript::new();
        t.append(ChatEvent::new("a", "a: 1"));
        t.clear();
        assert!(t.is_empty());
    }

    #[test]
    fn test_roster_replace_discards_previous_users() {
        let mut r = Roster::new();
        r.replace(vec!["alice".into(), "bobby".into()]);
        r.replace(vec!["carol".into()]);

        assert_eq!(r.as_slice(), ["carol".to_string()]);
        assert!(!r.contains("alice"));
        assert!(r.contains("carol"));
    }
}
