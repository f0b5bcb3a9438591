//! # causerie-store
//!
//! Persistence layer for Causerie.  Defines the capability ports the
//! use-case layer consumes, the in-memory repositories that cache the
//! working snapshot, and the SQLite durable store bridged to those
//! repositories by [`SqliteGateway`].

pub mod conversations;
pub mod database;
pub mod gateway;
pub mod memory;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod ports;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use gateway::SqliteGateway;
pub use memory::{
    MemoryConversationRepository, MemoryGateway, MemoryIdentityStore, MemoryMessageRepository,
};
pub use models::*;
pub use ports::{ConversationRepository, IdentityStore, MessageRepository, SyncGateway};
