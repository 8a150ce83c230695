use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::usermodel::UserRole;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "message_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Voice,
}

/// A chat entry scoped to one repair alert. Only the alert's engineer and
/// assigned technician take part in the thread.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct AlertMessage {
    pub id: Uuid,
    pub alert_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_role: UserRole,
    pub content: String,
    pub kind: MessageKind,
    pub media_url: Option<String>,
    pub voice_duration: Option<i32>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A chat entry in the admin channel, keyed by (admin_id, participant_id)
/// rather than by an alert.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct AdminMessage {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub participant_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_role: UserRole,
    pub content: String,
    pub kind: MessageKind,
    pub media_url: Option<String>,
    pub voice_duration: Option<i32>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// One row of the admin's conversation overview: the latest message per
/// participant plus how many of their messages are still unread.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct AdminConversation {
    pub participant_id: Uuid,
    pub participant_name: String,
    pub participant_role: UserRole,
    pub last_message: String,
    pub last_kind: MessageKind,
    pub last_message_at: DateTime<Utc>,
    pub unread_count: i64,
}

/// Per-alert unread tally used by the polling clients.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct AlertUnread {
    pub alert_id: Uuid,
    pub unread_count: i64,
}
