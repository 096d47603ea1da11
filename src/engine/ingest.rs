//! Inbound reply ingestion.
//!
//! Maps a sender identity to the assignee of a published, still-pending
//! judgement and turns a literal "1" or "2" into a forfeit selection.
//! Anything else from a recognized sender earns a polite rejection
//! notice; messages from unrecognized senders are dropped silently.

use super::Engine;
use crate::model::TaskStatus;
use crate::notify::NotifyEvent;
use crate::replies::InboundReply;
use tracing::{debug, warn};

impl Engine {
    /// Poll the reply source and handle every new message.
    ///
    /// Advances the highwater offset past everything received, so a
    /// malformed message is rejected at most once. Returns the number of
    /// replies that resolved to a forfeit selection.
    pub async fn process_replies(&mut self) -> usize {
        let replies = match self.deps.replies.poll(self.reply_offset).await {
            Ok(replies) => replies,
            Err(error) => {
                warn!(%error, "reply poll failed");
                return 0;
            }
        };

        let mut selected = 0;
        for reply in replies {
            self.reply_offset = self.reply_offset.max(reply.offset);
            if self.handle_reply(&reply).await {
                selected += 1;
            }
        }
        selected
    }

    /// Handle one inbound message. Returns whether it selected a forfeit.
    pub async fn handle_reply(&mut self, reply: &InboundReply) -> bool {
        let pending = self.tasks.iter().find(|t| {
            t.status == TaskStatus::JudgementPending
                && t.judgement_published
                && self.member(&t.assignee_id).is_some_and(|m| {
                    m.matches_sender(
                        reply.sender_handle.as_deref(),
                        Some(reply.sender_chat_id.as_str()),
                    )
                })
        });
        let Some(task) = pending else {
            debug!(sender = %reply.sender_chat_id, "reply from sender with no pending judgement");
            return false;
        };
        let task_id = task.id.clone();
        let candidate_ids: Vec<String> =
            task.generated_forfeits.iter().map(|f| f.id.clone()).collect();

        let choice = match reply.text.trim() {
            "1" => candidate_ids.first().cloned(),
            "2" => candidate_ids.get(1).cloned(),
            other => {
                debug!(task = %task_id, text = other, "malformed judgement reply");
                self.emit(NotifyEvent::InvalidSelection {
                    chat_id: reply.sender_chat_id.clone(),
                })
                .await;
                return false;
            }
        };

        match choice {
            Some(forfeit_id) => match self.select_forfeit(&task_id, &forfeit_id).await {
                Ok(()) => true,
                Err(error) => {
                    warn!(task = %task_id, %error, "reply selection rejected");
                    false
                }
            },
            None => false,
        }
    }
}
