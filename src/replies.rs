//! Inbound reply abstraction.
//!
//! Assignees can answer a published judgement from the external chat by
//! sending a literal "1" or "2". The engine polls a [`ReplySource`] for
//! new messages and keeps a highwater offset so a message is processed at
//! most once.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// One inbound text message with sender identity.
#[derive(Debug, Clone)]
pub struct InboundReply {
    /// Monotonically increasing position in the source's update stream
    pub offset: i64,
    /// Sender's contact handle, when the source knows it (e.g. "@amira")
    pub sender_handle: Option<String>,
    /// Sender's direct-message address
    pub sender_chat_id: String,
    pub text: String,
}

impl InboundReply {
    #[must_use]
    pub fn new(offset: i64, sender_chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            offset,
            sender_handle: None,
            sender_chat_id: sender_chat_id.into(),
            text: text.into(),
        }
    }

    /// Attach the sender's contact handle.
    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.sender_handle = Some(handle.into());
        self
    }
}

/// Abstraction for the inbound message stream.
#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Fetch messages with offsets strictly greater than `after_offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unreachable; the engine retries
    /// on the next poll tick.
    async fn poll(&self, after_offset: i64) -> Result<Vec<InboundReply>>;
}

/// Mock reply source fed from a queue.
///
/// # Example
///
/// ```rust,ignore
/// let source = MockReplySource::new();
/// source.push(InboundReply::new(1, "777", "1"));
/// ```
#[derive(Debug, Default)]
pub struct MockReplySource {
    replies: Mutex<Vec<InboundReply>>,
}

impl MockReplySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next poll.
    pub fn push(&self, reply: InboundReply) {
        self.replies.lock().unwrap().push(reply);
    }
}

#[async_trait]
impl ReplySource for MockReplySource {
    async fn poll(&self, after_offset: i64) -> Result<Vec<InboundReply>> {
        Ok(self
            .replies
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.offset > after_offset)
            .cloned()
            .collect())
    }
}
