use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::{User, UserRole};

const USER_COLUMNS: &str = r#"
    id, name, email, role, organization, photo_url, password,
    reset_token, reset_token_expires_at, created_at, updated_at
"#;

#[async_trait]
pub trait UserExt {
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, Error>;

    async fn get_user_by_email_and_role(
        &self,
        email: &str,
        role: UserRole,
    ) -> Result<Option<User>, Error>;

    async fn get_user_by_reset_token(&self, token: &str) -> Result<Option<User>, Error>;

    async fn save_user(
        &self,
        name: String,
        email: String,
        role: UserRole,
        organization: String,
        hashed_password: String,
    ) -> Result<User, Error>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        organization: Option<String>,
        photo_url: Option<String>,
    ) -> Result<User, Error>;

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error>;

    /// Replaces the password and clears the reset token in one statement.
    async fn reset_password(&self, user_id: Uuid, hashed_password: String) -> Result<(), Error>;

    async fn get_any_admin(&self) -> Result<Option<User>, Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_email_and_role(
        &self,
        email: &str,
        role: UserRole,
    ) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND role = $2"
        ))
        .bind(email.to_lowercase())
        .bind(role)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_reset_token(&self, token: &str) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reset_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
    }

    async fn save_user(
        &self,
        name: String,
        email: String,
        role: UserRole,
        organization: String,
        hashed_password: String,
    ) -> Result<User, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, role, organization, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email.to_lowercase())
        .bind(role)
        .bind(organization)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        organization: Option<String>,
        photo_url: Option<String>,
    ) -> Result<User, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                organization = COALESCE($3, organization),
                photo_url = COALESCE($4, photo_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(name)
        .bind(organization)
        .bind(photo_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reset_password(&self, user_id: Uuid, hashed_password: String) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET password = $2,
                reset_token = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(hashed_password)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_any_admin(&self) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE role = 'admin'::user_role
            ORDER BY created_at ASC
            LIMIT 1
            "#
        ))
        .fetch_optional(&self.pool)
        .await
    }
}
