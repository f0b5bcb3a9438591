use thiserror::Error;

use causerie_shared::{ChatId, MessageId};
use causerie_store::StoreError;

/// Failures surfaced by the use-case layer.
///
/// Validation, not-found and state-conflict failures each get their own
/// variant with a message echoing the offending id or name.  Anything
/// unexpected from the persistence ports arrives through the `Store`
/// variant and reads as a generic "operation failed".
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Session expired: current user no longer exists")]
    SessionExpired,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Chat not found: {0}")]
    ChatNotFound(ChatId),

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("Sender not found: {0}")]
    SenderNotFound(String),

    #[error("You cannot open a chat with yourself")]
    SelfChat,

    #[error("Select at least one participant")]
    NoParticipants,

    #[error("Two people make a direct chat, not a group")]
    PairNotAGroup,

    #[error("Group name cannot be empty")]
    EmptyGroupName,

    #[error("Group name cannot exceed {max} characters")]
    GroupNameTooLong { max: usize },

    #[error("A group needs at least {min} participants, got {requested}")]
    TooFewParticipants { requested: usize, min: usize },

    #[error("A group can have at most {max} participants, got {requested}")]
    TooManyParticipants { requested: usize, max: usize },

    #[error("A group named \"{0}\" with these participants already exists")]
    DuplicateGroupName(String),

    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("{0} is already a member of this chat")]
    AlreadyMember(String),

    #[error("{0} is not a member of this chat")]
    NotAMember(String),

    #[error("A group cannot have fewer than {min} members")]
    BelowMinimum { min: usize },

    #[error("This chat is full ({max} members)")]
    CapacityReached { max: usize },

    #[error("Search keyword cannot be empty")]
    EmptyKeyword,

    #[error("operation failed: {0}")]
    Store(#[from] StoreError),
}
