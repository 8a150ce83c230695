use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Engineer,
    Technician,
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Engineer
    }
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Engineer => "engineer",
            UserRole::Technician => "technician",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub organization: String,
    pub photo_url: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_serde() {
        let json = serde_json::to_string(&UserRole::Technician).unwrap();
        assert_eq!(json, "\"technician\"");
        let role: UserRole = serde_json::from_str("\"engineer\"").unwrap();
        assert_eq!(role, UserRole::Engineer);
    }
}
