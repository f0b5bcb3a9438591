//! Capability ports consumed by the use-case layer.
//!
//! One small trait per persistence concern.  The in-memory repositories in
//! [`crate::memory`] implement the first three; [`crate::gateway`] implements
//! the durable bridge.  The use-case layer receives all four as
//! `Arc<dyn ...>` handles, so tests can substitute in-memory fakes per case.

use causerie_shared::{ChatId, MessageId, UserId};

use crate::error::Result;
use crate::models::{Conversation, Message, User};

/// Lookup and caching of user records by username.
pub trait IdentityStore: Send + Sync {
    fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    fn save(&self, user: User) -> Result<()>;
}

/// CRUD over conversation records, refreshed from durable storage on demand.
///
/// Iteration order of [`find_all`](ConversationRepository::find_all) is the
/// order conversations were saved in; callers rely on it being stable.
pub trait ConversationRepository: Send + Sync {
    fn find_by_id(&self, id: &ChatId) -> Result<Option<Conversation>>;
    fn find_all(&self) -> Result<Vec<Conversation>>;
    fn save(&self, conversation: Conversation) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// CRUD over message records scoped to a conversation.
pub trait MessageRepository: Send + Sync {
    fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>>;
    fn find_by_conversation(&self, conversation_id: &ChatId) -> Result<Vec<Message>>;
    fn save(&self, message: Message) -> Result<()>;
    /// Returns `true` if a message was actually removed.
    fn delete_by_id(&self, id: &MessageId) -> Result<bool>;
    fn clear(&self) -> Result<()>;
}

/// Bridge to the durable store.
///
/// The refresh/materialize operations replace repository contents from
/// durable rows; the persist family writes through to both sides so the
/// working snapshot never lags what was just written.
pub trait SyncGateway: Send + Sync {
    /// Reload the conversation repository with this user's conversations.
    fn refresh_conversations_for(&self, user_id: &UserId) -> Result<()>;

    /// Copy a user record from durable storage into the identity store.
    /// Returns `false` when no such user exists.
    fn load_user_into_store(&self, username: &str) -> Result<bool>;

    /// Map a username to its canonical id, if the user exists durably.
    fn resolve_user_id_by_username(&self, username: &str) -> Result<Option<UserId>>;

    /// Write a new conversation durably and into the repository.
    fn persist_conversation(&self, conversation: Conversation) -> Result<Conversation>;

    /// Write a message durably and into the repository.  Also used to
    /// rewrite an existing message after its reaction map changed.
    fn persist_message(&self, message: Message) -> Result<Message>;

    /// Record a newly sent message on its conversation: set last activity to
    /// the message timestamp and append the id to the message index.
    fn touch_conversation_on_new_message(
        &self,
        chat_id: &ChatId,
        message_id: &MessageId,
    ) -> Result<()>;

    /// Delete a message and its reactions, durably and from the repository.
    /// The owning conversation's message index keeps the id: the index is
    /// append-only and readers tolerate entries with no backing message.
    fn delete_message(&self, id: &MessageId) -> Result<()>;

    fn add_participant(&self, chat_id: &ChatId, user_id: &UserId) -> Result<()>;
    fn remove_participant(&self, chat_id: &ChatId, user_id: &UserId) -> Result<()>;
    fn rename_conversation(&self, chat_id: &ChatId, name: &str) -> Result<()>;

    /// Replace the message repository contents with this conversation's
    /// durable messages, optionally narrowed by sender or message id.
    fn materialize_messages_for(
        &self,
        chat_id: &ChatId,
        sender_filter: Option<&UserId>,
        message_filter: Option<&MessageId>,
    ) -> Result<()>;
}
