//! Conversation resolution: find-or-create direct chats, create groups.

use serde::Serialize;
use tracing::{debug, info};

use causerie_shared::color::pick_conversation_color;
use causerie_shared::constants::{GROUP_MIN_PARTICIPANTS, GROUP_NAME_MAX_CHARS};
use causerie_shared::{ChatId, MessageId, UserId};
use causerie_store::Conversation;

use crate::context::AppContext;
use crate::error::ChatError;

/// Result of opening (or creating) a direct chat.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedChat {
    pub chat_id: ChatId,
    pub participants: Vec<UserId>,
    pub message_ids: Vec<MessageId>,
}

/// Result of creating a group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedGroup {
    pub chat_id: ChatId,
    pub name: String,
    pub participants: Vec<UserId>,
}

/// Resolve a username to its canonical id: identity store first, then a
/// durable load through the gateway.
pub(crate) fn resolve_user_id(ctx: &AppContext, username: &str) -> Result<UserId, ChatError> {
    if let Some(user) = ctx.identity.find_by_username(username)? {
        return Ok(user.id());
    }
    if ctx.gateway.load_user_into_store(username)? {
        if let Some(id) = ctx.gateway.resolve_user_id_by_username(username)? {
            return Ok(id);
        }
    }
    Err(ChatError::UserNotFound(username.to_string()))
}

/// Find the existing direct chat between the two users, or create one.
///
/// Calling this twice with the same pair returns the same conversation id
/// both times.
pub fn open_direct_chat(
    ctx: &AppContext,
    current_username: &str,
    target_username: &str,
) -> Result<OpenedChat, ChatError> {
    let current_id = ctx
        .identity
        .find_by_username(current_username)?
        .map(|u| u.id())
        .ok_or(ChatError::SessionExpired)?;
    let target_id = resolve_user_id(ctx, target_username)?;

    // A chat needs two distinct participants.
    if current_id == target_id {
        return Err(ChatError::SelfChat);
    }

    ctx.gateway.refresh_conversations_for(&current_id)?;

    let mut wanted = vec![current_id.clone(), target_id.clone()];
    wanted.sort();

    // First match in iteration order wins; comparison uses a sorted copy so
    // the stored participant order is never disturbed.
    for conversation in ctx.conversations.find_all()? {
        if conversation.sorted_participants() == wanted {
            debug!(chat = %conversation.id, "reusing existing direct chat");
            return Ok(OpenedChat {
                chat_id: conversation.id,
                participants: conversation.participants,
                message_ids: conversation.message_ids,
            });
        }
    }

    let conversation = Conversation {
        id: ChatId::new(),
        name: target_username.to_string(),
        participants: vec![current_id, target_id],
        message_ids: Vec::new(),
        last_activity: None,
        color: pick_conversation_color(),
    };
    let conversation = ctx.gateway.persist_conversation(conversation)?;
    info!(chat = %conversation.id, target = %target_username, "created direct chat");

    Ok(OpenedChat {
        chat_id: conversation.id,
        participants: conversation.participants,
        message_ids: conversation.message_ids,
    })
}

/// Create a named group conversation.
///
/// Unlike direct chats, groups are never silently reused: an existing group
/// with the same participant set and the same name is a conflict.
pub fn create_group(
    ctx: &AppContext,
    current_username: &str,
    participant_usernames: &[String],
    group_name: &str,
) -> Result<CreatedGroup, ChatError> {
    let current_id = ctx
        .identity
        .find_by_username(current_username)?
        .map(|u| u.id())
        .ok_or(ChatError::SessionExpired)?;

    if participant_usernames.is_empty() {
        return Err(ChatError::NoParticipants);
    }

    // Creator plus deduplicated invitees: exactly two people is the shape of
    // a direct chat and must go through open_direct_chat.
    let mut member_names: Vec<&str> = vec![current_username];
    for name in participant_usernames {
        if !member_names.contains(&name.as_str()) {
            member_names.push(name);
        }
    }
    if member_names.len() == 2 {
        return Err(ChatError::PairNotAGroup);
    }

    let name = group_name.trim();
    if name.is_empty() {
        return Err(ChatError::EmptyGroupName);
    }
    if name.chars().count() > GROUP_NAME_MAX_CHARS {
        return Err(ChatError::GroupNameTooLong {
            max: GROUP_NAME_MAX_CHARS,
        });
    }

    let requested = participant_usernames.len();
    let max = ctx.config.effective_max_group_size();
    if requested < GROUP_MIN_PARTICIPANTS {
        return Err(ChatError::TooFewParticipants {
            requested,
            min: GROUP_MIN_PARTICIPANTS,
        });
    }
    if requested > max {
        return Err(ChatError::TooManyParticipants { requested, max });
    }

    // Resolve every invitee before creating anything; one unknown username
    // aborts the whole operation.
    let mut participants = vec![current_id.clone()];
    for username in participant_usernames {
        let id = resolve_user_id(ctx, username)?;
        if !participants.contains(&id) {
            participants.push(id);
        }
    }

    ctx.gateway.refresh_conversations_for(&current_id)?;

    let mut wanted = participants.clone();
    wanted.sort();
    for conversation in ctx.conversations.find_all()? {
        if conversation.sorted_participants() == wanted && conversation.name == name {
            return Err(ChatError::DuplicateGroupName(name.to_string()));
        }
    }

    let conversation = Conversation {
        id: ChatId::new(),
        name: name.to_string(),
        participants,
        message_ids: Vec::new(),
        last_activity: None,
        color: pick_conversation_color(),
    };
    let conversation = ctx.gateway.persist_conversation(conversation)?;
    info!(
        chat = %conversation.id,
        name = %conversation.name,
        members = conversation.participants.len(),
        "created group"
    );

    Ok(CreatedGroup {
        chat_id: conversation.id,
        name: conversation.name,
        participants: conversation.participants,
    })
}
