use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::{
    alertmodel::{AlertPriority, AlertStatus, RepairAlert},
    usermodel::User,
};

const ALERT_COLUMNS: &str = r#"
    id, subsystem, issue, priority, status,
    engineer_id, engineer_name, engineer_email,
    technician_id, technician_name, technician_email,
    accepted_at, resolved_at, rating, rating_comment, rated_at,
    created_at, updated_at
"#;

#[async_trait]
pub trait AlertExt {
    async fn create_alert(
        &self,
        subsystem: String,
        issue: String,
        priority: AlertPriority,
        engineer: &User,
    ) -> Result<RepairAlert, Error>;

    async fn get_alert_by_id(&self, alert_id: Uuid) -> Result<Option<RepairAlert>, Error>;

    async fn list_alerts(
        &self,
        status: Option<AlertStatus>,
        engineer_id: Option<Uuid>,
        technician_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<RepairAlert>, Error>;

    /// Compare-and-swap accept: succeeds only while the alert is still
    /// pending, so two racing technicians cannot both win.
    async fn accept_alert(
        &self,
        alert_id: Uuid,
        technician: &User,
    ) -> Result<Option<RepairAlert>, Error>;

    /// Compare-and-swap resolve, guarded on in_progress.
    async fn resolve_alert(&self, alert_id: Uuid) -> Result<Option<RepairAlert>, Error>;

    async fn delete_alert(&self, alert_id: Uuid) -> Result<u64, Error>;

    /// Stores the rating only when none exists yet.
    async fn rate_alert(
        &self,
        alert_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Option<RepairAlert>, Error>;

    async fn technician_rating(
        &self,
        technician_id: Uuid,
    ) -> Result<(Option<f64>, i64), Error>;
}

#[async_trait]
impl AlertExt for DBClient {
    async fn create_alert(
        &self,
        subsystem: String,
        issue: String,
        priority: AlertPriority,
        engineer: &User,
    ) -> Result<RepairAlert, Error> {
        sqlx::query_as::<_, RepairAlert>(&format!(
            r#"
            INSERT INTO repair_alerts
                (subsystem, issue, priority, engineer_id, engineer_name, engineer_email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(subsystem)
        .bind(issue)
        .bind(priority)
        .bind(engineer.id)
        .bind(&engineer.name)
        .bind(&engineer.email)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_alert_by_id(&self, alert_id: Uuid) -> Result<Option<RepairAlert>, Error> {
        sqlx::query_as::<_, RepairAlert>(&format!(
            "SELECT {ALERT_COLUMNS} FROM repair_alerts WHERE id = $1"
        ))
        .bind(alert_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_alerts(
        &self,
        status: Option<AlertStatus>,
        engineer_id: Option<Uuid>,
        technician_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<RepairAlert>, Error> {
        sqlx::query_as::<_, RepairAlert>(&format!(
            r#"
            SELECT {ALERT_COLUMNS} FROM repair_alerts
            WHERE ($1::alert_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR engineer_id = $2)
              AND ($3::uuid IS NULL OR technician_id = $3)
            ORDER BY created_at DESC
            LIMIT $4
            "#
        ))
        .bind(status)
        .bind(engineer_id)
        .bind(technician_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn accept_alert(
        &self,
        alert_id: Uuid,
        technician: &User,
    ) -> Result<Option<RepairAlert>, Error> {
        sqlx::query_as::<_, RepairAlert>(&format!(
            r#"
            UPDATE repair_alerts
            SET status = 'in_progress'::alert_status,
                technician_id = $2,
                technician_name = $3,
                technician_email = $4,
                accepted_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'::alert_status
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(alert_id)
        .bind(technician.id)
        .bind(&technician.name)
        .bind(&technician.email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn resolve_alert(&self, alert_id: Uuid) -> Result<Option<RepairAlert>, Error> {
        sqlx::query_as::<_, RepairAlert>(&format!(
            r#"
            UPDATE repair_alerts
            SET status = 'resolved'::alert_status,
                resolved_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'in_progress'::alert_status
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(alert_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_alert(&self, alert_id: Uuid) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM repair_alerts WHERE id = $1")
            .bind(alert_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn rate_alert(
        &self,
        alert_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Option<RepairAlert>, Error> {
        sqlx::query_as::<_, RepairAlert>(&format!(
            r#"
            UPDATE repair_alerts
            SET rating = $2,
                rating_comment = $3,
                rated_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND rating IS NULL
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(alert_id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(&self.pool)
        .await
    }

    async fn technician_rating(
        &self,
        technician_id: Uuid,
    ) -> Result<(Option<f64>, i64), Error> {
        let row = sqlx::query_as::<_, (Option<f64>, i64)>(
            r#"
            SELECT AVG(rating)::float8, COUNT(rating)
            FROM repair_alerts
            WHERE technician_id = $1 AND rating IS NOT NULL
            "#,
        )
        .bind(technician_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
