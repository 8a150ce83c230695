use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "alert_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Pending,
    InProgress,
    Resolved,
}

impl AlertStatus {
    pub fn to_str(&self) -> &str {
        match self {
            AlertStatus::Pending => "pending",
            AlertStatus::InProgress => "in_progress",
            AlertStatus::Resolved => "resolved",
        }
    }

    /// The lifecycle is forward-only: pending -> in_progress -> resolved.
    pub fn can_transition(&self, next: AlertStatus) -> bool {
        matches!(
            (self, next),
            (AlertStatus::Pending, AlertStatus::InProgress)
                | (AlertStatus::InProgress, AlertStatus::Resolved)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "alert_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct RepairAlert {
    pub id: Uuid,
    pub subsystem: String,
    pub issue: String,
    pub priority: AlertPriority,
    pub status: AlertStatus,

    pub engineer_id: Uuid,
    pub engineer_name: String,
    pub engineer_email: String,

    // Empty until a technician accepts the alert
    pub technician_id: Option<Uuid>,
    pub technician_name: Option<String>,
    pub technician_email: Option<String>,

    pub accepted_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,

    pub rating: Option<i32>,
    pub rating_comment: Option<String>,
    pub rated_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepairAlert {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.engineer_id == user_id || self.technician_id == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(AlertStatus::Pending.can_transition(AlertStatus::InProgress));
        assert!(AlertStatus::InProgress.can_transition(AlertStatus::Resolved));
    }

    #[test]
    fn backward_and_sideways_transitions_are_rejected() {
        assert!(!AlertStatus::Pending.can_transition(AlertStatus::Resolved));
        assert!(!AlertStatus::Pending.can_transition(AlertStatus::Pending));
        assert!(!AlertStatus::InProgress.can_transition(AlertStatus::Pending));
        assert!(!AlertStatus::InProgress.can_transition(AlertStatus::InProgress));
        assert!(!AlertStatus::Resolved.can_transition(AlertStatus::Pending));
        assert!(!AlertStatus::Resolved.can_transition(AlertStatus::InProgress));
        assert!(!AlertStatus::Resolved.can_transition(AlertStatus::Resolved));
    }

    #[test]
    fn status_deserializes_from_wire_form() {
        let status: AlertStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, AlertStatus::InProgress);
    }
}
