use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::otpmodel::OtpRecord;

const OTP_COLUMNS: &str = "id, email, code, expires_at, verified, created_at";

#[async_trait]
pub trait OtpExt {
    /// Stores a fresh code after purging the address's stale rows, keeping
    /// only the most recent code live for an email.
    async fn create_otp(
        &self,
        email: String,
        code: String,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpRecord, Error>;

    /// Most recent unverified, unexpired record matching email + code.
    async fn get_valid_otp(&self, email: &str, code: &str) -> Result<Option<OtpRecord>, Error>;

    /// Flips the verified flag exactly once; returns false when a
    /// concurrent verify already claimed the record.
    async fn mark_otp_verified(&self, otp_id: Uuid) -> Result<bool, Error>;

    async fn cleanup_expired_otps(&self) -> Result<u64, Error>;
}

#[async_trait]
impl OtpExt for DBClient {
    async fn create_otp(
        &self,
        email: String,
        code: String,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpRecord, Error> {
        let email = email.to_lowercase();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM otp_codes WHERE email = $1")
            .bind(&email)
            .execute(&mut *tx)
            .await?;

        let record = sqlx::query_as::<_, OtpRecord>(&format!(
            r#"
            INSERT INTO otp_codes (email, code, expires_at)
            VALUES ($1, $2, $3)
            RETURNING {OTP_COLUMNS}
            "#
        ))
        .bind(&email)
        .bind(code)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn get_valid_otp(&self, email: &str, code: &str) -> Result<Option<OtpRecord>, Error> {
        sqlx::query_as::<_, OtpRecord>(&format!(
            r#"
            SELECT {OTP_COLUMNS} FROM otp_codes
            WHERE email = $1
              AND code = $2
              AND verified = false
              AND expires_at > NOW()
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(email.to_lowercase())
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_otp_verified(&self, otp_id: Uuid) -> Result<bool, Error> {
        let result =
            sqlx::query("UPDATE otp_codes SET verified = true WHERE id = $1 AND verified = false")
                .bind(otp_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn cleanup_expired_otps(&self) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
