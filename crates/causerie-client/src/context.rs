//! Application context shared by all use-case operations.
//!
//! [`AppContext`] bundles the four persistence ports and the client
//! configuration.  Every operation takes it by reference; nothing in this
//! crate reaches for ambient global state, so tests wire up in-memory ports
//! per case.

use std::sync::Arc;

use causerie_store::{
    ConversationRepository, Database, IdentityStore, MemoryConversationRepository,
    MemoryIdentityStore, MemoryMessageRepository, MessageRepository, SqliteGateway, SyncGateway,
};

use crate::config::ClientConfig;
use crate::error::ChatError;

/// Injected ports plus configuration.
#[derive(Clone)]
pub struct AppContext {
    pub identity: Arc<dyn IdentityStore>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub gateway: Arc<dyn SyncGateway>,
    pub config: ClientConfig,
}

impl AppContext {
    /// Assemble a context from explicitly injected ports.
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
        gateway: Arc<dyn SyncGateway>,
        config: ClientConfig,
    ) -> Self {
        Self {
            identity,
            conversations,
            messages,
            gateway,
            config,
        }
    }

    /// Assemble the production stack: in-memory repositories as the working
    /// cache, bridged to SQLite by [`SqliteGateway`].
    pub fn open(config: ClientConfig) -> Result<Self, ChatError> {
        let database = match &config.db_path {
            Some(path) => Database::open_at(path)?,
            None => Database::new()?,
        };

        let identity = Arc::new(MemoryIdentityStore::new());
        let conversations = Arc::new(MemoryConversationRepository::new());
        let messages = Arc::new(MemoryMessageRepository::new());
        let gateway = Arc::new(SqliteGateway::new(
            database,
            identity.clone(),
            conversations.clone(),
            messages.clone(),
        ));

        Ok(Self::new(identity, conversations, messages, gateway, config))
    }
}
