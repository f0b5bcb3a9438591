//! Group membership: add and remove participants, rename the group.

use tracing::info;

use causerie_shared::constants::{GROUP_MIN_PARTICIPANTS, GROUP_NAME_MAX_CHARS};
use causerie_shared::ChatId;
use causerie_store::Conversation;

use crate::chats::resolve_user_id;
use crate::context::AppContext;
use crate::error::ChatError;

fn conversation_or_not_found(
    ctx: &AppContext,
    chat_id: &ChatId,
) -> Result<Conversation, ChatError> {
    ctx.conversations
        .find_by_id(chat_id)?
        .ok_or_else(|| ChatError::ChatNotFound(chat_id.clone()))
}

/// Add a user to a group conversation.
pub fn add_member(ctx: &AppContext, chat_id: &ChatId, username: &str) -> Result<(), ChatError> {
    let conversation = conversation_or_not_found(ctx, chat_id)?;

    if username.trim().is_empty() {
        return Err(ChatError::EmptyUsername);
    }
    let user_id = resolve_user_id(ctx, username)?;

    if conversation.is_participant(&user_id) {
        return Err(ChatError::AlreadyMember(username.to_string()));
    }

    let max = ctx.config.effective_max_group_size();
    if conversation.participants.len() >= max {
        return Err(ChatError::CapacityReached { max });
    }

    ctx.gateway.add_participant(chat_id, &user_id)?;
    info!(chat = %chat_id, user = %user_id, "added member");
    Ok(())
}

/// Remove a user from a group conversation.
///
/// A group never shrinks below the minimum: removal is refused once the
/// current size is at (or somehow below) it, so groups bottom out at exactly
/// three members.
pub fn remove_member(ctx: &AppContext, chat_id: &ChatId, username: &str) -> Result<(), ChatError> {
    let conversation = conversation_or_not_found(ctx, chat_id)?;

    if username.trim().is_empty() {
        return Err(ChatError::EmptyUsername);
    }
    let user_id = resolve_user_id(ctx, username)?;

    if !conversation.is_participant(&user_id) {
        return Err(ChatError::NotAMember(username.to_string()));
    }

    if conversation.participants.len() <= GROUP_MIN_PARTICIPANTS {
        return Err(ChatError::BelowMinimum {
            min: GROUP_MIN_PARTICIPANTS,
        });
    }

    ctx.gateway.remove_participant(chat_id, &user_id)?;
    info!(chat = %chat_id, user = %user_id, "removed member");
    Ok(())
}

/// Rename a group conversation.
pub fn rename_group(ctx: &AppContext, chat_id: &ChatId, new_name: &str) -> Result<(), ChatError> {
    conversation_or_not_found(ctx, chat_id)?;

    let name = new_name.trim();
    if name.is_empty() {
        return Err(ChatError::EmptyGroupName);
    }
    if name.chars().count() > GROUP_NAME_MAX_CHARS {
        return Err(ChatError::GroupNameTooLong {
            max: GROUP_NAME_MAX_CHARS,
        });
    }

    ctx.gateway.rename_conversation(chat_id, name)?;
    info!(chat = %chat_id, name = %name, "renamed group");
    Ok(())
}
