//! CRUD operations for [`Message`] records and their reaction rows.
//!
//! A message's reaction map is persisted in the `reactions` table, one row
//! per reacting user, and rewritten wholesale whenever the message is saved.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::params;

use causerie_shared::{ChatId, MessageId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Message;

impl Database {
    /// Insert or update a message, rewriting its reaction rows.
    pub fn upsert_message(&self, message: &Message) -> Result<()> {
        self.conn().execute(
            "INSERT INTO messages (id, conversation_id, sender_id, reply_to, content, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET content = excluded.content",
            params![
                message.id.to_string(),
                message.conversation_id.to_string(),
                message.sender_id.as_str(),
                message.reply_to.as_ref().map(|id| id.to_string()),
                message.content,
                message.timestamp.to_rfc3339(),
            ],
        )?;

        self.conn().execute(
            "DELETE FROM reactions WHERE message_id = ?1",
            params![message.id.to_string()],
        )?;
        for (user_id, emoji) in &message.reactions {
            self.conn().execute(
                "INSERT INTO reactions (message_id, user_id, emoji) VALUES (?1, ?2, ?3)",
                params![message.id.to_string(), user_id.as_str(), emoji],
            )?;
        }

        Ok(())
    }

    /// Fetch a message with its reactions.
    pub fn get_message(&self, id: &MessageId) -> Result<Message> {
        let mut message = self
            .conn()
            .query_row(
                "SELECT id, conversation_id, sender_id, reply_to, content, timestamp
                 FROM messages WHERE id = ?1",
                params![id.to_string()],
                row_to_message,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })?;

        message.reactions = self.get_reactions_for_message(id)?;
        Ok(message)
    }

    /// Fetch a conversation's messages, oldest first, optionally narrowed to
    /// a single sender or a single message id.
    pub fn get_messages_for_conversation(
        &self,
        conversation_id: &ChatId,
        sender_filter: Option<&UserId>,
        message_filter: Option<&MessageId>,
    ) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, conversation_id, sender_id, reply_to, content, timestamp
             FROM messages
             WHERE conversation_id = ?1
             ORDER BY timestamp ASC",
        )?;

        let rows = stmt.query_map(params![conversation_id.to_string()], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            let message = row?;
            if sender_filter.is_some_and(|s| &message.sender_id != s) {
                continue;
            }
            if message_filter.is_some_and(|id| &message.id != id) {
                continue;
            }
            messages.push(message);
        }

        for message in &mut messages {
            message.reactions = self.get_reactions_for_message(&message.id)?;
        }
        Ok(messages)
    }

    /// Delete a message.  Its reaction rows cascade.  Returns `true` if a
    /// row was actually removed.
    pub fn delete_message_row(&self, id: &MessageId) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM messages WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }

    /// Fetch the reaction map of a message: reacting user -> emoji.
    pub fn get_reactions_for_message(&self, id: &MessageId) -> Result<HashMap<UserId, String>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT user_id, emoji FROM reactions WHERE message_id = ?1")?;
        let rows = stmt.query_map(params![id.to_string()], |row| {
            let user: String = row.get(0)?;
            let emoji: String = row.get(1)?;
            Ok((UserId::new(user), emoji))
        })?;

        let mut reactions = HashMap::new();
        for row in rows {
            let (user_id, emoji) = row?;
            reactions.insert(user_id, emoji);
        }
        Ok(reactions)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let conversation_id_str: String = row.get(1)?;
    let sender_id: String = row.get(2)?;
    let reply_to_str: Option<String> = row.get(3)?;
    let content: String = row.get(4)?;
    let ts_str: String = row.get(5)?;

    let id = MessageId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let conversation_id = ChatId::parse(&conversation_id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let reply_to = reply_to_str
        .map(|s| MessageId::parse(&s))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Message {
        id,
        conversation_id,
        sender_id: UserId::new(sender_id),
        reply_to,
        content,
        timestamp,
        reactions: HashMap::new(),
    })
}
