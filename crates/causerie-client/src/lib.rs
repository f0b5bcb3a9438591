//! # causerie-client
//!
//! Business logic of the Causerie messaging client: conversation resolution,
//! group membership, the message pipeline, history and search, reactions,
//! and the recency-ranked conversation list.  Presentation and delivery are
//! external; everything here talks to the world through the persistence
//! ports defined in `causerie-store`.

pub mod chats;
pub mod config;
pub mod context;
pub mod error;
pub mod history;
pub mod membership;
pub mod messaging;
pub mod poller;
pub mod reactions;
pub mod recents;

#[cfg(test)]
mod testutil;

pub use config::ClientConfig;
pub use context::AppContext;
pub use error::ChatError;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise tracing for an embedding shell.  Honors `RUST_LOG`, with
/// per-crate defaults otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("causerie_client=debug,causerie_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
