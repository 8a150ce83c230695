use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::{
    chatmodels::{AlertMessage, AlertUnread, MessageKind},
    usermodel::{User, UserRole},
};

const MESSAGE_COLUMNS: &str = r#"
    id, alert_id, sender_id, sender_name, sender_role,
    content, kind, media_url, voice_duration, is_read, created_at
"#;

#[async_trait]
pub trait ChatExt {
    async fn create_message(
        &self,
        alert_id: Uuid,
        sender: &User,
        kind: MessageKind,
        content: String,
        media_url: Option<String>,
        voice_duration: Option<i32>,
    ) -> Result<AlertMessage, Error>;

    /// Ascending-time thread listing with an optional strict since-cursor,
    /// capped at `limit`.
    async fn get_messages(
        &self,
        alert_id: Uuid,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<AlertMessage>, Error>;

    /// Flips is_read on the counterpart's messages in the thread. Read
    /// receipts are a side effect of listing, not a separate call.
    async fn mark_messages_as_read(&self, alert_id: Uuid, reader_id: Uuid) -> Result<u64, Error>;

    /// Unread messages authored by the opposite role across every alert the
    /// caller takes part in. Engineers count threads on alerts they created
    /// that have left pending; technicians count alerts assigned to them.
    async fn unread_per_alert(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<Vec<AlertUnread>, Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn create_message(
        &self,
        alert_id: Uuid,
        sender: &User,
        kind: MessageKind,
        content: String,
        media_url: Option<String>,
        voice_duration: Option<i32>,
    ) -> Result<AlertMessage, Error> {
        sqlx::query_as::<_, AlertMessage>(&format!(
            r#"
            INSERT INTO alert_messages
                (alert_id, sender_id, sender_name, sender_role, content, kind,
                 media_url, voice_duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(alert_id)
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

    async fn get_messages(
        &self,
        alert_id: Uuid,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<AlertMessage>, Error> {
        sqlx::query_as::<_, AlertMessage>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM alert_messages
            WHERE alert_id = $1
              AND ($2::timestamptz IS NULL OR created_at > $2)
            ORDER BY created_at ASC
            LIMIT $3
            "#
        ))
        .bind(alert_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_messages_as_read(&self, alert_id: Uuid, reader_id: Uuid) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE alert_messages
            SET is_read = true
            WHERE alert_id = $1
              AND sender_id != $2
              AND is_read = false
            "#,
        )
        .bind(alert_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn unread_per_alert(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<Vec<AlertUnread>, Error> {
        let query = match role {
            UserRole::Engineer => {
                r#"
                SELECT m.alert_id, COUNT(*) AS unread_count
                FROM alert_messages m
                INNER JOIN repair_alerts a ON a.id = m.alert_id
                WHERE a.engineer_id = $1
                  AND a.status != 'pending'::alert_status
                  AND m.sender_id != $1
                  AND m.is_read = false
                GROUP BY m.alert_id
                "#
            }
            _ => {
                r#"
                SELECT m.alert_id, COUNT(*) AS unread_count
                FROM alert_messages m
                INNER JOIN repair_alerts a ON a.id = m.alert_id
                WHERE a.technician_id = $1
                  AND m.sender_id != $1
                  AND m.is_read = false
                GROUP BY m.alert_id
                "#
            }
        };

        sqlx::query_as::<_, AlertUnread>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }
}
