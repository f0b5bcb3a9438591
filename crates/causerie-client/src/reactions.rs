//! Per-message reactions: one emoji per user, last write wins.

use tracing::debug;

use causerie_shared::{MessageId, UserId};

use crate::context::AppContext;
use crate::error::ChatError;

/// Set the user's reaction on a message, replacing any earlier one.
pub fn add_reaction(
    ctx: &AppContext,
    message_id: &MessageId,
    user_id: &UserId,
    emoji: &str,
) -> Result<(), ChatError> {
    let mut message = ctx
        .messages
        .find_by_id(message_id)?
        .ok_or_else(|| ChatError::MessageNotFound(message_id.clone()))?;

    message.reactions.insert(user_id.clone(), emoji.to_string());
    ctx.gateway.persist_message(message)?;
    debug!(message = %message_id, user = %user_id, emoji = %emoji, "reaction set");
    Ok(())
}

/// Remove the user's reaction from a message.  Removing a reaction that was
/// never set is a no-op.
pub fn remove_reaction(
    ctx: &AppContext,
    message_id: &MessageId,
    user_id: &UserId,
) -> Result<(), ChatError> {
    let mut message = ctx
        .messages
        .find_by_id(message_id)?
        .ok_or_else(|| ChatError::MessageNotFound(message_id.clone()))?;

    message.reactions.remove(user_id);
    ctx.gateway.persist_message(message)?;
    debug!(message = %message_id, user = %user_id, "reaction removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chats::open_direct_chat;
    use crate::messaging::send_message;
    use crate::testutil::{context_with_users, TestContext};
    use causerie_shared::ChatId;
    use causerie_store::MessageRepository;

    fn one_message(fx: &TestContext) -> (ChatId, MessageId) {
        let chat = open_direct_chat(&fx.ctx, "alice", "bob").unwrap().chat_id;
        let sent = send_message(&fx.ctx, &chat, &"alice".into(), None, "hi").unwrap();
        (chat, MessageId::parse(&sent.record.id).unwrap())
    }

    #[test]
    fn second_reaction_replaces_the_first() {
        let fx = context_with_users(&["alice", "bob"]);
        let (_, message_id) = one_message(&fx);

        add_reaction(&fx.ctx, &message_id, &"bob".into(), "👍").unwrap();
        add_reaction(&fx.ctx, &message_id, &"bob".into(), "🎉").unwrap();

        let message = fx.messages.find_by_id(&message_id).unwrap().unwrap();
        assert_eq!(message.reactions.len(), 1);
        assert_eq!(
            message.reactions.get(&"bob".into()),
            Some(&"🎉".to_string())
        );
    }

    #[test]
    fn reactions_from_different_users_coexist() {
        let fx = context_with_users(&["alice", "bob"]);
        let (_, message_id) = one_message(&fx);

        add_reaction(&fx.ctx, &message_id, &"alice".into(), "😂").unwrap();
        add_reaction(&fx.ctx, &message_id, &"bob".into(), "👍").unwrap();

        let message = fx.messages.find_by_id(&message_id).unwrap().unwrap();
        assert_eq!(message.reactions.len(), 2);
    }

    #[test]
    fn removing_an_absent_reaction_is_a_no_op() {
        let fx = context_with_users(&["alice", "bob"]);
        let (_, message_id) = one_message(&fx);

        remove_reaction(&fx.ctx, &message_id, &"bob".into()).unwrap();

        add_reaction(&fx.ctx, &message_id, &"bob".into(), "👍").unwrap();
        remove_reaction(&fx.ctx, &message_id, &"bob".into()).unwrap();
        remove_reaction(&fx.ctx, &message_id, &"bob".into()).unwrap();

        let message = fx.messages.find_by_id(&message_id).unwrap().unwrap();
        assert!(message.reactions.is_empty());
    }

    #[test]
    fn unknown_message_is_rejected() {
        let fx = context_with_users(&["alice", "bob"]);
        assert!(matches!(
            add_reaction(&fx.ctx, &MessageId::new(), &"bob".into(), "👍"),
            Err(ChatError::MessageNotFound(_))
        ));
        assert!(matches!(
            remove_reaction(&fx.ctx, &MessageId::new(), &"bob".into()),
            Err(ChatError::MessageNotFound(_))
        ));
    }
}
