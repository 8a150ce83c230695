use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::chatmodels::{AlertMessage, AlertUnread};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct SendTextMessageDto {
    #[validate(length(min = 1, max = 5000, message = "Message cannot be empty"))]
    pub content: String,
}

/// Incremental-polling cursor: only messages strictly newer than `since`
/// are returned when it is present.
#[derive(Debug, Deserialize)]
pub struct SinceQuery {
    pub since: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponseDto {
    pub status: String,
    pub results: usize,
    pub messages: Vec<AlertMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCountResponseDto {
    pub status: String,
    pub total_unread: i64,
    pub per_alert: Vec<AlertUnread>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct StartConversationDto {
    /// Explicit admin to talk to; when absent the most recent prior
    /// conversation's admin is reused, falling back to any admin.
    pub admin_id: Option<Uuid>,

    #[validate(length(min = 1, max = 5000, message = "Message cannot be empty"))]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_message_fails_validation() {
        let dto = SendTextMessageDto {
            content: "".to_string(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn since_query_parses_rfc3339() {
        let q: SinceQuery =
            serde_json::from_str(r#"{"since":"2026-08-01T12:00:00Z"}"#).unwrap();
        assert!(q.since.is_some());

        let q: SinceQuery = serde_json::from_str(r#"{}"#).unwrap();
        assert!(q.since.is_none());
    }
}
