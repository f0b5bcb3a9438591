//! v001 -- Initial schema creation.
//!
//! Creates the six core tables: `users`, `conversations`,
//! `conversation_participants`, `conversation_messages`, `messages`, and
//! `reactions`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    username   TEXT PRIMARY KEY NOT NULL,    -- globally unique, doubles as display name
    password   TEXT NOT NULL,                -- opaque credential, never interpreted here
    created_at TEXT NOT NULL                 -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Conversations
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS conversations (
    id            TEXT PRIMARY KEY NOT NULL, -- UUID v4
    name          TEXT NOT NULL,
    last_activity TEXT,                      -- nullable ISO-8601
    color         TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Participant lists
-- ----------------------------------------------------------------
-- `position` preserves insertion order (creator first for groups).
CREATE TABLE IF NOT EXISTS conversation_participants (
    conversation_id TEXT NOT NULL,
    user_id         TEXT NOT NULL,
    position        INTEGER NOT NULL,

    PRIMARY KEY (conversation_id, user_id),
    FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
);

-- ----------------------------------------------------------------
-- Message index (append-only per conversation)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS conversation_messages (
    conversation_id TEXT NOT NULL,
    message_id      TEXT NOT NULL,
    position        INTEGER NOT NULL,

    PRIMARY KEY (conversation_id, message_id),
    FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id              TEXT PRIMARY KEY NOT NULL, -- UUID v4
    conversation_id TEXT NOT NULL,             -- FK -> conversations(id)
    sender_id       TEXT NOT NULL,
    reply_to        TEXT,                      -- nullable, never validated
    content         TEXT NOT NULL,
    timestamp       TEXT NOT NULL,             -- ISO-8601

    FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation_ts
    ON messages(conversation_id, timestamp ASC);

-- ----------------------------------------------------------------
-- Reactions (one per user per message)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS reactions (
    message_id TEXT NOT NULL,
    user_id    TEXT NOT NULL,
    emoji      TEXT NOT NULL,

    PRIMARY KEY (message_id, user_id),
    FOREIGN KEY (message_id) REFERENCES messages(id) ON DELETE CASCADE
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
