//! CRUD operations for [`Conversation`] records.
//!
//! A conversation hydrates from three tables: the `conversations` row itself,
//! its participant list (ordered by `position`, creator first) and its
//! append-only message index (ordered by `position`).

use chrono::{DateTime, Utc};
use rusqlite::params;

use causerie_shared::{ChatId, MessageId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Conversation;

impl Database {
    // ------------------------------------------------------------------
    // Create / update
    // ------------------------------------------------------------------

    /// Insert or update a conversation, rewriting its participant list and
    /// message index.
    ///
    /// The conversation row is upserted in place (no `INSERT OR REPLACE`,
    /// which would cascade-delete the conversation's messages).
    pub fn upsert_conversation(&self, conversation: &Conversation) -> Result<()> {
        self.conn().execute(
            "INSERT INTO conversations (id, name, last_activity, color)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 last_activity = excluded.last_activity,
                 color = excluded.color",
            params![
                conversation.id.to_string(),
                conversation.name,
                conversation.last_activity.map(|ts| ts.to_rfc3339()),
                conversation.color,
            ],
        )?;

        self.conn().execute(
            "DELETE FROM conversation_participants WHERE conversation_id = ?1",
            params![conversation.id.to_string()],
        )?;
        for (position, user_id) in conversation.participants.iter().enumerate() {
            self.conn().execute(
                "INSERT INTO conversation_participants (conversation_id, user_id, position)
                 VALUES (?1, ?2, ?3)",
                params![
                    conversation.id.to_string(),
                    user_id.as_str(),
                    position as i64
                ],
            )?;
        }

        self.conn().execute(
            "DELETE FROM conversation_messages WHERE conversation_id = ?1",
            params![conversation.id.to_string()],
        )?;
        for (position, message_id) in conversation.message_ids.iter().enumerate() {
            self.conn().execute(
                "INSERT INTO conversation_messages (conversation_id, message_id, position)
                 VALUES (?1, ?2, ?3)",
                params![
                    conversation.id.to_string(),
                    message_id.to_string(),
                    position as i64
                ],
            )?;
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single conversation with participants and message index.
    pub fn get_conversation(&self, id: &ChatId) -> Result<Conversation> {
        let (name, last_activity, color) = self
            .conn()
            .query_row(
                "SELECT name, last_activity, color FROM conversations WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    let name: String = row.get(0)?;
                    let last_activity: Option<String> = row.get(1)?;
                    let color: String = row.get(2)?;
                    Ok((name, last_activity, color))
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })?;

        let last_activity: Option<DateTime<Utc>> = last_activity
            .map(|ts| DateTime::parse_from_rfc3339(&ts).map(|dt| dt.with_timezone(&Utc)))
            .transpose()?;

        Ok(Conversation {
            id: id.clone(),
            name,
            participants: self.participants_of(id)?,
            message_ids: self.message_index_of(id)?,
            last_activity,
            color,
        })
    }

    /// Fetch every conversation the given user participates in, oldest first
    /// (insertion order, which keeps `find_all` scans deterministic).
    pub fn get_conversations_for_user(&self, user_id: &UserId) -> Result<Vec<Conversation>> {
        let ids: Vec<ChatId> = {
            let mut stmt = self.conn().prepare(
                "SELECT c.id FROM conversations c
                 JOIN conversation_participants p ON p.conversation_id = c.id
                 WHERE p.user_id = ?1
                 ORDER BY c.rowid ASC",
            )?;
            let rows = stmt.query_map(params![user_id.as_str()], |row| {
                let id_str: String = row.get(0)?;
                ChatId::parse(&id_str).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
            })?;

            let mut ids = Vec::new();
            for row in rows {
                ids.push(row?);
            }
            ids
        };

        let mut conversations = Vec::with_capacity(ids.len());
        for id in &ids {
            conversations.push(self.get_conversation(id)?);
        }
        Ok(conversations)
    }

    fn participants_of(&self, id: &ChatId) -> Result<Vec<UserId>> {
        let mut stmt = self.conn().prepare(
            "SELECT user_id FROM conversation_participants
             WHERE conversation_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![id.to_string()], |row| {
            let user: String = row.get(0)?;
            Ok(UserId::new(user))
        })?;

        let mut participants = Vec::new();
        for row in rows {
            participants.push(row?);
        }
        Ok(participants)
    }

    fn message_index_of(&self, id: &ChatId) -> Result<Vec<MessageId>> {
        let mut stmt = self.conn().prepare(
            "SELECT message_id FROM conversation_messages
             WHERE conversation_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![id.to_string()], |row| {
            let id_str: String = row.get(0)?;
            MessageId::parse(&id_str).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })?;

        let mut message_ids = Vec::new();
        for row in rows {
            message_ids.push(row?);
        }
        Ok(message_ids)
    }

    // ------------------------------------------------------------------
    // Targeted mutations
    // ------------------------------------------------------------------

    /// Set the conversation's last-activity timestamp and append the message
    /// id to its index.  Appending an id already present is a no-op.
    pub fn touch_conversation(
        &self,
        chat_id: &ChatId,
        message_id: &MessageId,
        sent_at: DateTime<Utc>,
    ) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE conversations SET last_activity = ?2 WHERE id = ?1",
            params![chat_id.to_string(), sent_at.to_rfc3339()],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        self.conn().execute(
            "INSERT OR IGNORE INTO conversation_messages (conversation_id, message_id, position)
             VALUES (?1, ?2,
                     (SELECT COALESCE(MAX(position) + 1, 0)
                      FROM conversation_messages WHERE conversation_id = ?1))",
            params![chat_id.to_string(), message_id.to_string()],
        )?;
        Ok(())
    }

    /// Append a participant.  Adding an existing participant is a no-op.
    pub fn add_participant_row(&self, chat_id: &ChatId, user_id: &UserId) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO conversation_participants (conversation_id, user_id, position)
             VALUES (?1, ?2,
                     (SELECT COALESCE(MAX(position) + 1, 0)
                      FROM conversation_participants WHERE conversation_id = ?1))",
            params![chat_id.to_string(), user_id.as_str()],
        )?;
        Ok(())
    }

    /// Remove a participant, if present.
    pub fn remove_participant_row(&self, chat_id: &ChatId, user_id: &UserId) -> Result<()> {
        self.conn().execute(
            "DELETE FROM conversation_participants
             WHERE conversation_id = ?1 AND user_id = ?2",
            params![chat_id.to_string(), user_id.as_str()],
        )?;
        Ok(())
    }

    /// Rename a conversation.
    pub fn rename_conversation_row(&self, chat_id: &ChatId, name: &str) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE conversations SET name = ?2 WHERE id = ?1",
            params![chat_id.to_string(), name],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn conversation(participants: &[&str]) -> Conversation {
        Conversation {
            id: ChatId::new(),
            name: "room".to_string(),
            participants: participants.iter().map(|u| UserId::from(*u)).collect(),
            message_ids: Vec::new(),
            last_activity: None,
            color: "#2196F3".to_string(),
        }
    }

    #[test]
    fn conversation_round_trip_preserves_participant_order() {
        let (_dir, db) = open_db();
        let conv = conversation(&["carol", "alice", "bob"]);
        db.upsert_conversation(&conv).unwrap();

        let loaded = db.get_conversation(&conv.id).unwrap();
        assert_eq!(loaded, conv);
    }

    #[test]
    fn conversations_for_user_keep_insertion_order() {
        let (_dir, db) = open_db();
        let first = conversation(&["alice", "bob"]);
        let second = conversation(&["alice", "carol", "dave"]);
        let foreign = conversation(&["carol", "dave"]);
        db.upsert_conversation(&first).unwrap();
        db.upsert_conversation(&second).unwrap();
        db.upsert_conversation(&foreign).unwrap();

        let mine = db.get_conversations_for_user(&UserId::from("alice")).unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, first.id);
        assert_eq!(mine[1].id, second.id);
    }

    #[test]
    fn touch_sets_activity_and_appends_once() {
        let (_dir, db) = open_db();
        let conv = conversation(&["alice", "bob"]);
        db.upsert_conversation(&conv).unwrap();

        let message_id = MessageId::new();
        let sent_at = Utc::now();
        db.touch_conversation(&conv.id, &message_id, sent_at).unwrap();
        db.touch_conversation(&conv.id, &message_id, sent_at).unwrap();

        let loaded = db.get_conversation(&conv.id).unwrap();
        assert_eq!(
            loaded.last_activity.map(|ts| ts.to_rfc3339()),
            Some(sent_at.to_rfc3339())
        );
        assert_eq!(loaded.message_ids, vec![message_id]);
    }

    #[test]
    fn participant_rows_add_and_remove() {
        let (_dir, db) = open_db();
        let conv = conversation(&["alice", "bob", "carol"]);
        db.upsert_conversation(&conv).unwrap();

        db.add_participant_row(&conv.id, &UserId::from("dave")).unwrap();
        let loaded = db.get_conversation(&conv.id).unwrap();
        assert_eq!(loaded.participants.len(), 4);
        assert_eq!(loaded.participants[3], UserId::from("dave"));

        db.remove_participant_row(&conv.id, &UserId::from("bob")).unwrap();
        let loaded = db.get_conversation(&conv.id).unwrap();
        assert!(!loaded.is_participant(&UserId::from("bob")));
        assert_eq!(loaded.participants.len(), 3);
    }

    #[test]
    fn rename_missing_conversation_is_not_found() {
        let (_dir, db) = open_db();
        assert!(matches!(
            db.rename_conversation_row(&ChatId::new(), "anything"),
            Err(StoreError::NotFound)
        ));
    }
}
