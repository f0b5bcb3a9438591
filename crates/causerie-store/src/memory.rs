//! In-memory implementations of the persistence ports.
//!
//! The three repositories are the working cache layer in production,
//! hydrated by the sync gateway, and double as the fakes behind use-case
//! tests.  [`MemoryGateway`] additionally keeps the durable side in process
//! memory, for tests and for running without a database file.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use causerie_shared::{ChatId, MessageId, UserId};

use crate::error::{Result, StoreError};
use crate::models::{Conversation, Message, User};
use crate::ports::{
    ConversationRepository, IdentityStore, MessageRepository, SyncGateway,
};

// ---------------------------------------------------------------------------
// Identity store
// ---------------------------------------------------------------------------

/// Users currently known to the client, keyed by username.
#[derive(Default)]
pub struct MemoryIdentityStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(users.get(username).cloned())
    }

    fn save(&self, user: User) -> Result<()> {
        let mut users = self.users.write().map_err(|_| StoreError::LockPoisoned)?;
        users.insert(user.username.clone(), user);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Conversation repository
// ---------------------------------------------------------------------------

/// Conversation snapshot for the current user.
///
/// Backed by a `Vec` rather than a map: `find_all` must return conversations
/// in the order they were saved, because the resolver takes the first
/// participant-set match and the recency ranker relies on a stable base
/// order for conversations without activity.
#[derive(Default)]
pub struct MemoryConversationRepository {
    conversations: RwLock<Vec<Conversation>>,
}

impl MemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationRepository for MemoryConversationRepository {
    fn find_by_id(&self, id: &ChatId) -> Result<Option<Conversation>> {
        let conversations = self
            .conversations
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(conversations.iter().find(|c| &c.id == id).cloned())
    }

    fn find_all(&self) -> Result<Vec<Conversation>> {
        let conversations = self
            .conversations
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(conversations.clone())
    }

    fn save(&self, conversation: Conversation) -> Result<()> {
        let mut conversations = self
            .conversations
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        match conversations.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => conversations.push(conversation),
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut conversations = self
            .conversations
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        conversations.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Message repository
// ---------------------------------------------------------------------------

/// Message snapshot for the currently open conversation.
#[derive(Default)]
pub struct MemoryMessageRepository {
    messages: RwLock<Vec<Message>>,
}

impl MemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageRepository for MemoryMessageRepository {
    fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>> {
        let messages = self.messages.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(messages.iter().find(|m| &m.id == id).cloned())
    }

    fn find_by_conversation(&self, conversation_id: &ChatId) -> Result<Vec<Message>> {
        let messages = self.messages.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    fn save(&self, message: Message) -> Result<()> {
        let mut messages = self.messages.write().map_err(|_| StoreError::LockPoisoned)?;
        match messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => *existing = message,
            None => messages.push(message),
        }
        Ok(())
    }

    fn delete_by_id(&self, id: &MessageId) -> Result<bool> {
        let mut messages = self.messages.write().map_err(|_| StoreError::LockPoisoned)?;
        let before = messages.len();
        messages.retain(|m| &m.id != id);
        Ok(messages.len() < before)
    }

    fn clear(&self) -> Result<()> {
        let mut messages = self.messages.write().map_err(|_| StoreError::LockPoisoned)?;
        messages.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Sync gateway whose durable side is process memory.
///
/// Behaves exactly like the SQLite-backed gateway from the use-case layer's
/// point of view, which makes it the substitute of choice in tests and in
/// ephemeral sessions that never touch disk.
pub struct MemoryGateway {
    durable_users: RwLock<HashMap<String, User>>,
    durable_conversations: RwLock<Vec<Conversation>>,
    durable_messages: RwLock<Vec<Message>>,
    identity: Arc<dyn IdentityStore>,
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl MemoryGateway {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            durable_users: RwLock::new(HashMap::new()),
            durable_conversations: RwLock::new(Vec::new()),
            durable_messages: RwLock::new(Vec::new()),
            identity,
            conversations,
            messages,
        }
    }

    /// Provision a user on the durable side, as signup would.
    pub fn seed_user(&self, user: User) -> Result<()> {
        let mut users = self
            .durable_users
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        users.insert(user.username.clone(), user);
        Ok(())
    }

    fn durable_conversation(&self, chat_id: &ChatId) -> Result<Conversation> {
        let conversations = self
            .durable_conversations
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        conversations
            .iter()
            .find(|c| &c.id == chat_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn store_durable_conversation(&self, conversation: Conversation) -> Result<()> {
        let mut conversations = self
            .durable_conversations
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        match conversations.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => conversations.push(conversation),
        }
        Ok(())
    }
}

impl SyncGateway for MemoryGateway {
    fn refresh_conversations_for(&self, user_id: &UserId) -> Result<()> {
        let mine: Vec<Conversation> = {
            let conversations = self
                .durable_conversations
                .read()
                .map_err(|_| StoreError::LockPoisoned)?;
            conversations
                .iter()
                .filter(|c| c.is_participant(user_id))
                .cloned()
                .collect()
        };

        self.conversations.clear()?;
        for conversation in mine {
            self.conversations.save(conversation)?;
        }
        Ok(())
    }

    fn load_user_into_store(&self, username: &str) -> Result<bool> {
        let user = {
            let users = self
                .durable_users
                .read()
                .map_err(|_| StoreError::LockPoisoned)?;
            users.get(username).cloned()
        };

        match user {
            Some(user) => {
                self.identity.save(user)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn resolve_user_id_by_username(&self, username: &str) -> Result<Option<UserId>> {
        let users = self
            .durable_users
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(users.get(username).map(|u| u.id()))
    }

    fn persist_conversation(&self, conversation: Conversation) -> Result<Conversation> {
        self.store_durable_conversation(conversation.clone())?;
        self.conversations.save(conversation.clone())?;
        Ok(conversation)
    }

    fn persist_message(&self, message: Message) -> Result<Message> {
        {
            let mut messages = self
                .durable_messages
                .write()
                .map_err(|_| StoreError::LockPoisoned)?;
            match messages.iter_mut().find(|m| m.id == message.id) {
                Some(existing) => *existing = message.clone(),
                None => messages.push(message.clone()),
            }
        }
        self.messages.save(message.clone())?;
        Ok(message)
    }

    fn touch_conversation_on_new_message(
        &self,
        chat_id: &ChatId,
        message_id: &MessageId,
    ) -> Result<()> {
        let sent_at = {
            let messages = self
                .durable_messages
                .read()
                .map_err(|_| StoreError::LockPoisoned)?;
            messages
                .iter()
                .find(|m| &m.id == message_id)
                .map(|m| m.timestamp)
                .ok_or(StoreError::NotFound)?
        };

        let mut conversation = self.durable_conversation(chat_id)?;
        conversation.last_activity = Some(sent_at);
        if !conversation.message_ids.contains(message_id) {
            conversation.message_ids.push(message_id.clone());
        }

        self.store_durable_conversation(conversation.clone())?;
        self.conversations.save(conversation)
    }

    fn delete_message(&self, id: &MessageId) -> Result<()> {
        {
            let mut messages = self
                .durable_messages
                .write()
                .map_err(|_| StoreError::LockPoisoned)?;
            messages.retain(|m| &m.id != id);
        }
        self.messages.delete_by_id(id)?;
        Ok(())
    }

    fn add_participant(&self, chat_id: &ChatId, user_id: &UserId) -> Result<()> {
        let mut conversation = self.durable_conversation(chat_id)?;
        if !conversation.is_participant(user_id) {
            conversation.participants.push(user_id.clone());
        }
        self.store_durable_conversation(conversation.clone())?;
        self.conversations.save(conversation)
    }

    fn remove_participant(&self, chat_id: &ChatId, user_id: &UserId) -> Result<()> {
        let mut conversation = self.durable_conversation(chat_id)?;
        conversation.participants.retain(|p| p != user_id);
        self.store_durable_conversation(conversation.clone())?;
        self.conversations.save(conversation)
    }

    fn rename_conversation(&self, chat_id: &ChatId, name: &str) -> Result<()> {
        let mut conversation = self.durable_conversation(chat_id)?;
        conversation.name = name.to_string();
        self.store_durable_conversation(conversation.clone())?;
        self.conversations.save(conversation)
    }

    fn materialize_messages_for(
        &self,
        chat_id: &ChatId,
        sender_filter: Option<&UserId>,
        message_filter: Option<&MessageId>,
    ) -> Result<()> {
        let selected: Vec<Message> = {
            let messages = self
                .durable_messages
                .read()
                .map_err(|_| StoreError::LockPoisoned)?;
            messages
                .iter()
                .filter(|m| &m.conversation_id == chat_id)
                .filter(|m| sender_filter.map_or(true, |s| &m.sender_id == s))
                .filter(|m| message_filter.map_or(true, |id| &m.id == id))
                .cloned()
                .collect()
        };

        self.messages.clear()?;
        for message in selected {
            self.messages.save(message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    fn user(username: &str) -> User {
        User {
            username: username.to_string(),
            password: "pw".to_string(),
            created_at: Utc::now(),
        }
    }

    fn conversation(participants: &[&str]) -> Conversation {
        Conversation {
            id: ChatId::new(),
            name: "room".to_string(),
            participants: participants.iter().map(|u| UserId::from(*u)).collect(),
            message_ids: Vec::new(),
            last_activity: None,
            color: "#4CAF50".to_string(),
        }
    }

    fn message(conversation_id: &ChatId, sender: &str, content: &str) -> Message {
        Message {
            id: MessageId::new(),
            conversation_id: conversation_id.clone(),
            sender_id: UserId::from(sender),
            reply_to: None,
            content: content.to_string(),
            timestamp: Utc::now(),
            reactions: HashMap::new(),
        }
    }

    #[test]
    fn test_conversation_repo_preserves_save_order() {
        let repo = MemoryConversationRepository::new();
        let a = conversation(&["alice", "bob"]);
        let b = conversation(&["alice", "carol"]);
        repo.save(a.clone()).unwrap();
        repo.save(b.clone()).unwrap();

        let all = repo.find_all().unwrap();
        assert_eq!(all[0].id, a.id);
        assert_eq!(all[1].id, b.id);
    }

    #[test]
    fn test_conversation_repo_save_replaces_in_place() {
        let repo = MemoryConversationRepository::new();
        let a = conversation(&["alice", "bob"]);
        let b = conversation(&["alice", "carol"]);
        repo.save(a.clone()).unwrap();
        repo.save(b.clone()).unwrap();

        let mut renamed = a.clone();
        renamed.name = "renamed".to_string();
        repo.save(renamed).unwrap();

        let all = repo.find_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a.id);
        assert_eq!(all[0].name, "renamed");
    }

    #[test]
    fn test_message_repo_delete_reports_outcome() {
        let repo = MemoryMessageRepository::new();
        let chat = ChatId::new();
        let msg = message(&chat, "alice", "hello");
        repo.save(msg.clone()).unwrap();

        assert!(repo.delete_by_id(&msg.id).unwrap());
        assert!(!repo.delete_by_id(&msg.id).unwrap());
        assert!(repo.find_by_id(&msg.id).unwrap().is_none());
    }

    #[test]
    fn test_gateway_refresh_filters_by_participant() {
        let identity = Arc::new(MemoryIdentityStore::new());
        let conversations = Arc::new(MemoryConversationRepository::new());
        let messages = Arc::new(MemoryMessageRepository::new());
        let gateway = MemoryGateway::new(
            identity.clone(),
            conversations.clone(),
            messages.clone(),
        );

        let mine = conversation(&["alice", "bob"]);
        let other = conversation(&["carol", "dave"]);
        gateway.persist_conversation(mine.clone()).unwrap();
        gateway.persist_conversation(other).unwrap();

        gateway
            .refresh_conversations_for(&UserId::from("alice"))
            .unwrap();

        let all = conversations.find_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, mine.id);
    }

    #[test]
    fn test_gateway_load_user_into_store() {
        let identity = Arc::new(MemoryIdentityStore::new());
        let conversations = Arc::new(MemoryConversationRepository::new());
        let messages = Arc::new(MemoryMessageRepository::new());
        let gateway = MemoryGateway::new(
            identity.clone(),
            conversations.clone(),
            messages.clone(),
        );

        assert!(!gateway.load_user_into_store("alice").unwrap());
        assert!(identity.find_by_username("alice").unwrap().is_none());

        gateway.seed_user(user("alice")).unwrap();
        assert!(gateway.load_user_into_store("alice").unwrap());
        assert!(identity.find_by_username("alice").unwrap().is_some());
    }

    #[test]
    fn test_gateway_touch_updates_activity_and_index() {
        let identity = Arc::new(MemoryIdentityStore::new());
        let conversations = Arc::new(MemoryConversationRepository::new());
        let messages = Arc::new(MemoryMessageRepository::new());
        let gateway = MemoryGateway::new(
            identity.clone(),
            conversations.clone(),
            messages.clone(),
        );

        let conv = conversation(&["alice", "bob"]);
        gateway.persist_conversation(conv.clone()).unwrap();
        let msg = message(&conv.id, "alice", "hi");
        gateway.persist_message(msg.clone()).unwrap();
        gateway
            .touch_conversation_on_new_message(&conv.id, &msg.id)
            .unwrap();

        let stored = conversations.find_by_id(&conv.id).unwrap().unwrap();
        assert_eq!(stored.last_activity, Some(msg.timestamp));
        assert_eq!(stored.message_ids, vec![msg.id]);
    }

    #[test]
    fn test_gateway_materialize_replaces_snapshot() {
        let identity = Arc::new(MemoryIdentityStore::new());
        let conversations = Arc::new(MemoryConversationRepository::new());
        let messages = Arc::new(MemoryMessageRepository::new());
        let gateway = MemoryGateway::new(
            identity.clone(),
            conversations.clone(),
            messages.clone(),
        );

        let conv_a = conversation(&["alice", "bob"]);
        let conv_b = conversation(&["alice", "carol"]);
        let in_a = message(&conv_a.id, "alice", "first");
        let in_b = message(&conv_b.id, "alice", "second");
        gateway.persist_message(in_a.clone()).unwrap();
        gateway.persist_message(in_b.clone()).unwrap();

        gateway
            .materialize_messages_for(&conv_a.id, None, None)
            .unwrap();

        assert!(messages.find_by_id(&in_a.id).unwrap().is_some());
        assert!(messages.find_by_id(&in_b.id).unwrap().is_none());
    }

    #[test]
    fn test_gateway_materialize_applies_sender_filter() {
        let identity = Arc::new(MemoryIdentityStore::new());
        let conversations = Arc::new(MemoryConversationRepository::new());
        let messages = Arc::new(MemoryMessageRepository::new());
        let gateway = MemoryGateway::new(
            identity.clone(),
            conversations.clone(),
            messages.clone(),
        );

        let conv = conversation(&["alice", "bob"]);
        let from_alice = message(&conv.id, "alice", "mine");
        let from_bob = message(&conv.id, "bob", "theirs");
        gateway.persist_message(from_alice.clone()).unwrap();
        gateway.persist_message(from_bob.clone()).unwrap();

        gateway
            .materialize_messages_for(&conv.id, Some(&UserId::from("bob")), None)
            .unwrap();

        let snapshot = messages.find_by_conversation(&conv.id).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, from_bob.id);
    }
}
