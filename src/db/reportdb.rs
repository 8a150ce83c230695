use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::dtos::reportdtos::{EngineerMonthlyRow, OverviewStats, TechnicianMonthlyRow};

const ENGINEER_REPORT_SELECT: &str = r#"
    SELECT engineer_id, engineer_name,
        COUNT(*) FILTER (WHERE priority = 'low'::alert_priority) AS low_count,
        COUNT(*) FILTER (WHERE priority = 'medium'::alert_priority) AS medium_count,
        COUNT(*) FILTER (WHERE priority = 'high'::alert_priority) AS high_count,
        COUNT(*) FILTER (WHERE priority = 'critical'::alert_priority) AS critical_count,
        COUNT(*) AS total_count,
        COUNT(*) FILTER (WHERE status = 'resolved'::alert_status) AS resolved_count,
        AVG(EXTRACT(EPOCH FROM (accepted_at - created_at)) / 60.0)::float8
            AS avg_response_minutes
    FROM repair_alerts
    WHERE created_at >= $1 AND created_at < $2
"#;

const TECHNICIAN_REPORT_SELECT: &str = r#"
    SELECT technician_id, technician_name,
        COUNT(*) AS assigned_count,
        COUNT(*) FILTER (WHERE status = 'resolved'::alert_status) AS completed_count,
        AVG(EXTRACT(EPOCH FROM (resolved_at - accepted_at)) / 60.0)::float8
            AS avg_fix_minutes,
        AVG(rating)::float8 AS avg_rating
    FROM repair_alerts
    WHERE technician_id IS NOT NULL
      AND accepted_at >= $1 AND accepted_at < $2
"#;

#[async_trait]
pub trait ReportExt {
    async fn engineer_monthly_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EngineerMonthlyRow>, Error>;

    async fn engineer_monthly_report_for(
        &self,
        engineer_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<EngineerMonthlyRow>, Error>;

    async fn technician_monthly_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TechnicianMonthlyRow>, Error>;

    async fn technician_monthly_report_for(
        &self,
        technician_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<TechnicianMonthlyRow>, Error>;

    async fn overview_stats(&self) -> Result<OverviewStats, Error>;
}

#[async_trait]
impl ReportExt for DBClient {
    async fn engineer_monthly_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EngineerMonthlyRow>, Error> {
        sqlx::query_as::<_, EngineerMonthlyRow>(&format!(
            "{ENGINEER_REPORT_SELECT} GROUP BY engineer_id, engineer_name ORDER BY total_count DESC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    async fn engineer_monthly_report_for(
        &self,
        engineer_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<EngineerMonthlyRow>, Error> {
        sqlx::query_as::<_, EngineerMonthlyRow>(&format!(
            "{ENGINEER_REPORT_SELECT} AND engineer_id = $3 GROUP BY engineer_id, engineer_name"
        ))
        .bind(start)
        .bind(end)
        .bind(engineer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn technician_monthly_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TechnicianMonthlyRow>, Error> {
        sqlx::query_as::<_, TechnicianMonthlyRow>(&format!(
            "{TECHNICIAN_REPORT_SELECT} GROUP BY technician_id, technician_name ORDER BY assigned_count DESC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    async fn technician_monthly_report_for(
        &self,
        technician_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<TechnicianMonthlyRow>, Error> {
        sqlx::query_as::<_, TechnicianMonthlyRow>(&format!(
            "{TECHNICIAN_REPORT_SELECT} AND technician_id = $3 GROUP BY technician_id, technician_name"
        ))
        .bind(start)
        .bind(end)
        .bind(technician_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn overview_stats(&self) -> Result<OverviewStats, Error> {
        sqlx::query_as::<_, OverviewStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE role = 'engineer'::user_role) AS engineers,
                (SELECT COUNT(*) FROM users WHERE role = 'technician'::user_role) AS technicians,
                (SELECT COUNT(*) FROM users WHERE role = 'admin'::user_role) AS admins,
                (SELECT COUNT(*) FROM repair_alerts WHERE status = 'pending'::alert_status)
                    AS pending_alerts,
                (SELECT COUNT(*) FROM repair_alerts WHERE status = 'in_progress'::alert_status)
                    AS in_progress_alerts,
                (SELECT COUNT(*) FROM repair_alerts WHERE status = 'resolved'::alert_status)
                    AS resolved_alerts,
                (SELECT COUNT(*) FROM repair_alerts
                    WHERE status = 'resolved'::alert_status AND rating IS NULL)
                    AS unrated_resolved_alerts,
                (SELECT COUNT(*) FROM alert_messages) AS total_messages
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }
}
