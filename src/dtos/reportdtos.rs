use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::usermodel::UserRole;

/// Calendar-month reporting window, defaulting to the current month.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl MonthQuery {
    pub fn window(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
        let now = Utc::now();
        let year = self.year.unwrap_or_else(|| now.year());
        let month = self.month.unwrap_or_else(|| now.month());

        if !(1..=12).contains(&month) {
            return Err(format!("Invalid month: {}", month));
        }

        let start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| format!("Invalid reporting window: {}-{}", year, month))?;

        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let end = Utc
            .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| format!("Invalid reporting window: {}-{}", year, month))?;

        Ok((start, end))
    }
}

#[derive(Debug, Deserialize)]
pub struct UserReportQuery {
    pub user_id: Uuid,
    pub role: UserRole,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Raw per-engineer aggregate row for one month.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct EngineerMonthlyRow {
    pub engineer_id: Uuid,
    pub engineer_name: String,
    pub low_count: i64,
    pub medium_count: i64,
    pub high_count: i64,
    pub critical_count: i64,
    pub total_count: i64,
    pub resolved_count: i64,
    pub avg_response_minutes: Option<f64>,
}

/// Raw per-technician aggregate row for one month.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct TechnicianMonthlyRow {
    pub technician_id: Uuid,
    pub technician_name: String,
    pub assigned_count: i64,
    pub completed_count: i64,
    pub avg_fix_minutes: Option<f64>,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineerReportDto {
    pub engineer_id: Uuid,
    pub engineer_name: String,
    pub issues_by_priority: PriorityBreakdown,
    pub total_count: i64,
    pub resolved_count: i64,
    pub avg_response_minutes: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PriorityBreakdown {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TechnicianReportDto {
    pub technician_id: Uuid,
    pub technician_name: String,
    pub assigned_count: i64,
    pub completed_count: i64,
    pub success_rate: Option<f64>,
    pub avg_fix_minutes: Option<f64>,
    pub avg_rating: Option<f64>,
}

impl From<EngineerMonthlyRow> for EngineerReportDto {
    fn from(row: EngineerMonthlyRow) -> Self {
        EngineerReportDto {
            engineer_id: row.engineer_id,
            engineer_name: row.engineer_name,
            issues_by_priority: PriorityBreakdown {
                low: row.low_count,
                medium: row.medium_count,
                high: row.high_count,
                critical: row.critical_count,
            },
            total_count: row.total_count,
            resolved_count: row.resolved_count,
            avg_response_minutes: row.avg_response_minutes.map(round1),
        }
    }
}

impl From<TechnicianMonthlyRow> for TechnicianReportDto {
    fn from(row: TechnicianMonthlyRow) -> Self {
        let success_rate = if row.assigned_count > 0 {
            Some(round1(
                row.completed_count as f64 / row.assigned_count as f64 * 100.0,
            ))
        } else {
            None
        };

        TechnicianReportDto {
            technician_id: row.technician_id,
            technician_name: row.technician_name,
            assigned_count: row.assigned_count,
            completed_count: row.completed_count,
            success_rate,
            avg_fix_minutes: row.avg_fix_minutes.map(round1),
            avg_rating: row.avg_rating.map(round1),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct OverviewStats {
    pub engineers: i64,
    pub technicians: i64,
    pub admins: i64,
    pub pending_alerts: i64,
    pub in_progress_alerts: i64,
    pub resolved_alerts: i64,
    pub unrated_resolved_alerts: i64,
    pub total_messages: i64,
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round1_rounds_to_one_decimal() {
        assert_eq!(round1(4.25), 4.3);
        assert_eq!(round1(4.24), 4.2);
        assert_eq!(round1(5.0), 5.0);
    }

    #[test]
    fn window_spans_exactly_one_month() {
        let q = MonthQuery {
            year: Some(2026),
            month: Some(8),
        };
        let (start, end) = q.window().unwrap();
        assert_eq!(start.to_rfc3339(), "2026-08-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-09-01T00:00:00+00:00");
    }

    #[test]
    fn december_window_rolls_into_next_year() {
        let q = MonthQuery {
            year: Some(2025),
            month: Some(12),
        };
        let (start, end) = q.window().unwrap();
        assert_eq!(start.year(), 2025);
        assert_eq!(end.year(), 2026);
        assert_eq!(end.month(), 1);
    }

    #[test]
    fn invalid_month_is_an_error() {
        let q = MonthQuery {
            year: Some(2026),
            month: Some(13),
        };
        assert!(q.window().is_err());
    }

    #[test]
    fn success_rate_is_none_without_assignments() {
        let dto: TechnicianReportDto = TechnicianMonthlyRow {
            technician_id: Uuid::nil(),
            technician_name: "Bo".to_string(),
            assigned_count: 0,
            completed_count: 0,
            avg_fix_minutes: None,
            avg_rating: None,
        }
        .into();
        assert_eq!(dto.success_rate, None);
    }

    #[test]
    fn success_rate_is_percentage_to_one_decimal() {
        let dto: TechnicianReportDto = TechnicianMonthlyRow {
            technician_id: Uuid::nil(),
            technician_name: "Bo".to_string(),
            assigned_count: 3,
            completed_count: 2,
            avg_fix_minutes: Some(12.345),
            avg_rating: Some(4.666),
        }
        .into();
        assert_eq!(dto.success_rate, Some(66.7));
        assert_eq!(dto.avg_fix_minutes, Some(12.3));
        assert_eq!(dto.avg_rating, Some(4.7));
    }
}
