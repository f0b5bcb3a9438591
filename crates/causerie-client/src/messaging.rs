//! Sending messages.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use causerie_shared::time::format_display_timestamp;
use causerie_shared::{ChatId, MessageId, UserId};
use causerie_store::Message;

use crate::context::AppContext;
use crate::error::ChatError;

/// UI-facing view of one message: ids and timestamp rendered as strings,
/// the reply reference flattened to an empty string when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: String,
    pub sender: String,
    pub content: String,
    pub timestamp: String,
    pub reply_to: String,
}

impl From<&Message> for MessageRecord {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.to_string(),
            sender: m.sender_id.to_string(),
            content: m.content.clone(),
            timestamp: format_display_timestamp(m.timestamp),
            reply_to: m
                .reply_to
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Result of sending a message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub record: MessageRecord,
}

/// Validate, persist and index a new message.
///
/// The reply reference is stored as given: its target is never checked
/// against the message store, so it may point at a deleted or nonexistent
/// message and readers must tolerate that.
pub fn send_message(
    ctx: &AppContext,
    chat_id: &ChatId,
    sender_id: &UserId,
    reply_to: Option<MessageId>,
    content: &str,
) -> Result<SentMessage, ChatError> {
    ctx.conversations
        .find_by_id(chat_id)?
        .ok_or_else(|| ChatError::ChatNotFound(chat_id.clone()))?;

    let sender = ctx
        .identity
        .find_by_username(sender_id.as_str())?
        .ok_or_else(|| ChatError::SenderNotFound(sender_id.to_string()))?;

    let message = Message {
        id: MessageId::new(),
        conversation_id: chat_id.clone(),
        sender_id: sender.id(),
        reply_to,
        content: content.to_string(),
        timestamp: Utc::now(),
        reactions: HashMap::new(),
    };

    let message = ctx.gateway.persist_message(message)?;
    ctx.gateway
        .touch_conversation_on_new_message(chat_id, &message.id)?;
    info!(chat = %chat_id, message = %message.id, sender = %message.sender_id, "sent message");

    Ok(SentMessage {
        chat_id: chat_id.clone(),
        record: MessageRecord::from(&message),
    })
}
