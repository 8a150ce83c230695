use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Short-lived one-time code tied to an email address. Rows past their
/// expiry are purged opportunistically and by the background sweeper.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct OtpRecord {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}
