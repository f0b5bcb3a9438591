//! Test fixture wiring an [`AppContext`] onto in-memory ports.

use std::sync::Arc;

use chrono::Utc;

use causerie_store::{
    MemoryConversationRepository, MemoryGateway, MemoryIdentityStore,
    MemoryMessageRepository, User,
};

use crate::config::ClientConfig;
use crate::context::AppContext;

pub struct TestContext {
    pub ctx: AppContext,
    pub gateway: Arc<MemoryGateway>,
    pub identity: Arc<MemoryIdentityStore>,
    pub conversations: Arc<MemoryConversationRepository>,
    pub messages: Arc<MemoryMessageRepository>,
}

impl TestContext {
    /// Provision a user durably only: resolvable through the gateway but not
    /// yet present in the identity store.
    pub fn seed_durable_user(&self, username: &str) {
        self.gateway
            .seed_user(User {
                username: username.to_string(),
                password: "pw".to_string(),
                created_at: Utc::now(),
            })
            .unwrap();
    }

    /// Provision a user both durably and in the identity store, as a user the
    /// client has already seen (e.g. the logged-in user).
    pub fn seed_known_user(&self, username: &str) {
        self.seed_durable_user(username);
        self.ctx
            .identity
            .save(User {
                username: username.to_string(),
                password: "pw".to_string(),
                created_at: Utc::now(),
            })
            .unwrap();
    }
}

/// A context over fresh in-memory ports, with the given usernames provisioned
/// as known users.
pub fn context_with_users(usernames: &[&str]) -> TestContext {
    let identity = Arc::new(MemoryIdentityStore::new());
    let conversations = Arc::new(MemoryConversationRepository::new());
    let messages = Arc::new(MemoryMessageRepository::new());
    let gateway = Arc::new(MemoryGateway::new(
        identity.clone(),
        conversations.clone(),
        messages.clone(),
    ));

    let ctx = AppContext::new(
        identity.clone(),
        conversations.clone(),
        messages.clone(),
        gateway.clone(),
        ClientConfig::default(),
    );

    let fixture = TestContext {
        ctx,
        gateway,
        identity,
        conversations,
        messages,
    };
    for username in usernames {
        fixture.seed_known_user(username);
    }
    fixture
}
