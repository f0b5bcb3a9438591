//! Domain model structs shared by the repositories and the SQLite store.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the UI layer over IPC.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use causerie_shared::constants::DIRECT_PARTICIPANTS;
use causerie_shared::{ChatId, MessageId, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered user.  The username is the globally unique identifier and
/// doubles as the display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub username: String,
    /// Opaque credential, never interpreted by this layer.
    pub password: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The canonical id of this user.
    pub fn id(&self) -> UserId {
        UserId::new(self.username.clone())
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// Whether a conversation is a one-to-one chat or a named group.
/// Derived from the participant count, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Individual,
    Group,
}

/// A conversation (direct chat or group).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ChatId,
    /// Group chats: the user-chosen name.  Direct chats: the other
    /// participant's username at creation time (recomputed on display).
    pub name: String,
    /// Participant ids.  Contains no duplicates.
    pub participants: Vec<UserId>,
    /// Append-only index of the messages sent to this conversation.
    pub message_ids: Vec<MessageId>,
    /// Timestamp of the most recent message, if any message was ever sent.
    pub last_activity: Option<DateTime<Utc>>,
    /// Cosmetic UI color, assigned at creation.
    pub color: String,
}

impl Conversation {
    /// Derive the conversation kind from the participant count.
    pub fn kind(&self) -> ConversationKind {
        if self.participants.len() == DIRECT_PARTICIPANTS {
            ConversationKind::Individual
        } else {
            ConversationKind::Group
        }
    }

    /// Whether the given user is a participant.
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.participants.contains(user_id)
    }

    /// Participant ids as a sorted snapshot, for unordered set comparison.
    /// The stored list keeps its original order; only the copy is sorted.
    pub fn sorted_participants(&self) -> Vec<UserId> {
        let mut snapshot = self.participants.clone();
        snapshot.sort();
        snapshot
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// The conversation this message belongs to.
    pub conversation_id: ChatId,
    /// Id of the sending user.
    pub sender_id: UserId,
    /// Message this one replies to.  Never validated: the target may not
    /// exist any more, or may never have existed.
    pub reply_to: Option<MessageId>,
    /// Free-text content.
    pub content: String,
    /// Creation time.  Immutable after the message is built.
    pub timestamp: DateTime<Utc>,
    /// One emoji per reacting user.
    pub reactions: HashMap<UserId, String>,
}
