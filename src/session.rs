use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub author: Author,
    pub text: String, // shown verbatim, newlines included
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(author: Author, text: impl Into<String>) -> Self {
        Message {
            id: Uuid::new_v4(),
            author,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Message::new(Author::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Message::new(Author::Assistant, text)
    }
}

/// Append-only message log for one run of the program.
///
/// Always holds at least the greeting it was created with; messages are never
/// edited or removed once pushed.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub id: Uuid,
    messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Transcript {
    pub fn new(greeting: impl Into<String>) -> Self {
        let now = Utc::now();
        Transcript {
            id: Uuid::new_v4(),
            messages: vec![Message::assistant(greeting)],
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.last_activity_at = Utc::now();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_starts_with_assistant_greeting() {
        let transcript = Transcript::new("Hello there");
        assert_eq!(transcript.messages().len(), 1);
        assert_eq!(transcript.messages()[0].author, Author::Assistant);
        assert_eq!(transcript.messages()[0].text, "Hello there");
    }

    #[test]
    fn push_keeps_insertion_order() {
        let mut transcript = Transcript::new("hi");
        transcript.push(Message::user("first\nsecond line"));
        transcript.push(Message::assistant("reply"));

        let authors: Vec<Author> = transcript.messages().iter().map(|m| m.author).collect();
        assert_eq!(authors, vec![Author::Assistant, Author::User, Author::Assistant]);
        assert_eq!(transcript.messages()[1].text, "first\nsecond line");
        assert!(transcript.last_activity_at >= transcript.created_at);
    }

    #[test]
    fn message_ids_are_unique() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id, b.id);
    }
}
