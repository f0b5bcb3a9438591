//! Durable-store bridge.
//!
//! [`SqliteGateway`] implements [`SyncGateway`] on top of the SQLite
//! [`Database`].  Refresh and materialize operations replace the in-memory
//! repository contents from durable rows; the persist family writes through
//! to both sides so the working snapshot never lags what was just written.

use std::sync::{Arc, Mutex};

use tracing::debug;

use causerie_shared::{ChatId, MessageId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Conversation, Message, User};
use crate::ports::{ConversationRepository, IdentityStore, MessageRepository, SyncGateway};

/// SQLite-backed sync gateway.
pub struct SqliteGateway {
    db: Mutex<Database>,
    identity: Arc<dyn IdentityStore>,
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl SqliteGateway {
    pub fn new(
        db: Database,
        identity: Arc<dyn IdentityStore>,
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            db: Mutex::new(db),
            identity,
            conversations,
            messages,
        }
    }

    /// Provision a user on the durable side, as signup would.
    pub fn seed_user(&self, user: User) -> Result<()> {
        let db = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        db.upsert_user(&user)
    }

    fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let db = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&db)
    }

    /// Reload the cached copy of one conversation from its durable rows.
    fn recache_conversation(&self, chat_id: &ChatId) -> Result<()> {
        let conversation = self.with_db(|db| db.get_conversation(chat_id))?;
        self.conversations.save(conversation)
    }
}

impl SyncGateway for SqliteGateway {
    fn refresh_conversations_for(&self, user_id: &UserId) -> Result<()> {
        let mine = self.with_db(|db| db.get_conversations_for_user(user_id))?;
        debug!(user = %user_id, count = mine.len(), "refreshing conversation snapshot");

        self.conversations.clear()?;
        for conversation in mine {
            self.conversations.save(conversation)?;
        }
        Ok(())
    }

    fn load_user_into_store(&self, username: &str) -> Result<bool> {
        match self.with_db(|db| db.get_user_by_username(username)) {
            Ok(user) => {
                self.identity.save(user)?;
                Ok(true)
            }
            Err(StoreError::NotFound) => Ok(false),
            Err(other) => Err(other),
        }
    }

    fn resolve_user_id_by_username(&self, username: &str) -> Result<Option<UserId>> {
        match self.with_db(|db| db.get_user_by_username(username)) {
            Ok(user) => Ok(Some(user.id())),
            Err(StoreError::NotFound) => Ok(None),
            Err(other) => Err(other),
        }
    }

    fn persist_conversation(&self, conversation: Conversation) -> Result<Conversation> {
        self.with_db(|db| db.upsert_conversation(&conversation))?;
        self.conversations.save(conversation.clone())?;
        Ok(conversation)
    }

    fn persist_message(&self, message: Message) -> Result<Message> {
        self.with_db(|db| db.upsert_message(&message))?;
        self.messages.save(message.clone())?;
        Ok(message)
    }

    fn touch_conversation_on_new_message(
        &self,
        chat_id: &ChatId,
        message_id: &MessageId,
    ) -> Result<()> {
        self.with_db(|db| {
            let sent_at = db.get_message(message_id)?.timestamp;
            db.touch_conversation(chat_id, message_id, sent_at)
        })?;
        self.recache_conversation(chat_id)
    }

    fn delete_message(&self, id: &MessageId) -> Result<()> {
        self.with_db(|db| db.delete_message_row(id))?;
        self.messages.delete_by_id(id)?;
        Ok(())
    }

    fn add_participant(&self, chat_id: &ChatId, user_id: &UserId) -> Result<()> {
        self.with_db(|db| db.add_participant_row(chat_id, user_id))?;
        self.recache_conversation(chat_id)
    }

    fn remove_participant(&self, chat_id: &ChatId, user_id: &UserId) -> Result<()> {
        self.with_db(|db| db.remove_participant_row(chat_id, user_id))?;
        self.recache_conversation(chat_id)
    }

    fn rename_conversation(&self, chat_id: &ChatId, name: &str) -> Result<()> {
        self.with_db(|db| db.rename_conversation_row(chat_id, name))?;
        self.recache_conversation(chat_id)
    }

    fn materialize_messages_for(
        &self,
        chat_id: &ChatId,
        sender_filter: Option<&UserId>,
        message_filter: Option<&MessageId>,
    ) -> Result<()> {
        let selected = self.with_db(|db| {
            db.get_messages_for_conversation(chat_id, sender_filter, message_filter)
        })?;
        debug!(chat = %chat_id, count = selected.len(), "materializing message snapshot");

        self.messages.clear()?;
        for message in selected {
            self.messages.save(message)?;
        }
        Ok(())
    }
}
