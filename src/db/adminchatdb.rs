use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::{
    chatmodels::{AdminConversation, AdminMessage, MessageKind},
    usermodel::User,
};

const ADMIN_MESSAGE_COLUMNS: &str = r#"
    id, admin_id, participant_id, sender_id, sender_name, sender_role,
    content, kind, media_url, voice_duration, is_read, created_at
"#;

#[async_trait]
pub trait AdminChatExt {
    async fn create_admin_message(
        &self,
        admin_id: Uuid,
        participant_id: Uuid,
        sender: &User,
        kind: MessageKind,
        content: String,
        media_url: Option<String>,
        voice_duration: Option<i32>,
    ) -> Result<AdminMessage, Error>;

    async fn get_admin_messages(
        &self,
        admin_id: Uuid,
        participant_id: Uuid,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<AdminMessage>, Error>;

    async fn mark_admin_messages_as_read(
        &self,
        admin_id: Uuid,
        participant_id: Uuid,
        reader_id: Uuid,
    ) -> Result<u64, Error>;

    /// Latest message per participant for one admin, with the number of
    /// still-unread participant messages, most recent conversation first.
    async fn admin_conversations(&self, admin_id: Uuid)
        -> Result<Vec<AdminConversation>, Error>;

    /// The admin the participant talked to most recently, if any.
    async fn latest_admin_for(&self, participant_id: Uuid) -> Result<Option<Uuid>, Error>;

    /// Unread messages addressed to this user across the channel.
    async fn admin_chat_unread_count(&self, user_id: Uuid, is_admin: bool)
        -> Result<i64, Error>;

    /// Deletes a message, but only when the caller sent it.
    async fn delete_admin_message(&self, message_id: Uuid, sender_id: Uuid)
        -> Result<u64, Error>;
}

#[async_trait]
impl AdminChatExt for DBClient {
    async fn create_admin_message(
        &self,
        admin_id: Uuid,
        participant_id: Uuid,
        sender: &User,
        kind: MessageKind,
        content: String,
        media_url: Option<String>,
        voice_duration: Option<i32>,
    ) -> Result<AdminMessage, Error> {
        sqlx::query_as::<_, AdminMessage>(&format!(
            r#"
            INSERT INTO admin_messages
                (admin_id, participant_id, sender_id, sender_name, sender_role,
                 content, kind, media_url, voice_duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ADMIN_MESSAGE_COLUMNS}
            "#
        ))
        .bind(admin_id)
        .bind(participant_id)
        .bind(sender.id)
        .bind(&sender.name)
        .bind(sender.role)
        .bind(content)
        .bind(kind)
        .bind(media_url)
        .bind(voice_duration)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_admin_messages(
        &self,
        admin_id: Uuid,
        participant_id: Uuid,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<AdminMessage>, Error> {
        sqlx::query_as::<_, AdminMessage>(&format!(
            r#"
            SELECT {ADMIN_MESSAGE_COLUMNS} FROM admin_messages
            WHERE admin_id = $1
              AND participant_id = $2
              AND ($3::timestamptz IS NULL OR created_at > $3)
            ORDER BY created_at ASC
            LIMIT $4
            "#
        ))
        .bind(admin_id)
        .bind(participant_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_admin_messages_as_read(
        &self,
        admin_id: Uuid,
        participant_id: Uuid,
        reader_id: Uuid,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE admin_messages
            SET is_read = true
            WHERE admin_id = $1
              AND participant_id = $2
              AND sender_id != $3
              AND is_read = false
            "#,
        )
        .bind(admin_id)
        .bind(participant_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn admin_conversations(
        &self,
        admin_id: Uuid,
    ) -> Result<Vec<AdminConversation>, Error> {
        sqlx::query_as::<_, AdminConversation>(
            r#"
            SELECT * FROM (
                SELECT DISTINCT ON (m.participant_id)
                    m.participant_id,
                    u.name AS participant_name,
                    u.role AS participant_role,
                    m.content AS last_message,
                    m.kind AS last_kind,
                    m.created_at AS last_message_at,
                    (
                        SELECT COUNT(*) FROM admin_messages am
                        WHERE am.admin_id = $1
                          AND am.participant_id = m.participant_id
                          AND am.sender_role != 'admin'::user_role
                          AND am.is_read = false
                    ) AS unread_count
                FROM admin_messages m
                INNER JOIN users u ON u.id = m.participant_id
                WHERE m.admin_id = $1
                ORDER BY m.participant_id, m.created_at DESC
            ) conversations
            ORDER BY last_message_at DESC
            "#,
        )
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn latest_admin_for(&self, participant_id: Uuid) -> Result<Option<Uuid>, Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT admin_id FROM admin_messages
            WHERE participant_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn admin_chat_unread_count(
        &self,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<i64, Error> {
        let query = if is_admin {
            r#"
            SELECT COUNT(*) FROM admin_messages
            WHERE admin_id = $1
              AND sender_role != 'admin'::user_role
              AND is_read = false
            "#
        } else {
            r#"
            SELECT COUNT(*) FROM admin_messages
            WHERE participant_id = $1
              AND sender_id != $1
              AND is_read = false
            "#
        };

        sqlx::query_scalar::<_, i64>(query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn delete_admin_message(
        &self,
        message_id: Uuid,
        sender_id: Uuid,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            "DELETE FROM admin_messages WHERE id = $1 AND sender_id = $2",
        )
        .bind(message_id)
        .bind(sender_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
