//! Conversation history and keyword search.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use causerie_shared::{ChatId, MessageId, UserId};

use crate::context::AppContext;
use crate::error::ChatError;
use crate::messaging::MessageRecord;

/// Outcome of viewing a conversation's history.  An empty conversation is a
/// normal state the UI renders as such, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum HistoryOutcome {
    NoMessagesYet,
    Messages {
        records: Vec<MessageRecord>,
        /// Per message, the reacting users and their emoji.  Messages
        /// without reactions are omitted.
        reactions: HashMap<MessageId, HashMap<UserId, String>>,
    },
}

/// Outcome of a keyword search over a conversation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SearchOutcome {
    NoMatches { chat_id: ChatId, keyword: String },
    Matches { records: Vec<MessageRecord> },
}

/// Materialize and return a conversation's messages, oldest first.
///
/// The optional filters narrow what the gateway materializes; ordering is a
/// stable sort on the creation timestamp, so same-instant messages keep
/// their materialized order.
pub fn view_history(
    ctx: &AppContext,
    chat_id: &ChatId,
    sender_filter: Option<&UserId>,
    message_filter: Option<&MessageId>,
) -> Result<HistoryOutcome, ChatError> {
    ctx.conversations
        .find_by_id(chat_id)?
        .ok_or_else(|| ChatError::ChatNotFound(chat_id.clone()))?;

    ctx.gateway
        .materialize_messages_for(chat_id, sender_filter, message_filter)?;

    let mut messages = ctx.messages.find_by_conversation(chat_id)?;
    messages.sort_by_key(|m| m.timestamp);

    if messages.is_empty() {
        debug!(chat = %chat_id, "history is empty");
        return Ok(HistoryOutcome::NoMessagesYet);
    }

    let mut reactions = HashMap::new();
    for message in &messages {
        if !message.reactions.is_empty() {
            reactions.insert(message.id.clone(), message.reactions.clone());
        }
    }
    let records = messages.iter().map(MessageRecord::from).collect();

    Ok(HistoryOutcome::Messages { records, reactions })
}

/// Case-insensitive substring search over the conversation's materialized
/// messages.
pub fn search_history(
    ctx: &AppContext,
    chat_id: &ChatId,
    keyword: &str,
) -> Result<SearchOutcome, ChatError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(ChatError::EmptyKeyword);
    }

    ctx.conversations
        .find_by_id(chat_id)?
        .ok_or_else(|| ChatError::ChatNotFound(chat_id.clone()))?;

    let needle = keyword.to_lowercase();
    let records: Vec<MessageRecord> = ctx
        .messages
        .find_by_conversation(chat_id)?
        .iter()
        .filter(|m| m.content.to_lowercase().contains(&needle))
        .map(MessageRecord::from)
        .collect();

    if records.is_empty() {
        return Ok(SearchOutcome::NoMatches {
            chat_id: chat_id.clone(),
            keyword: keyword.to_string(),
        });
    }
    Ok(SearchOutcome::Matches { records })
}
