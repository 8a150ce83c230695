use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::alertmodel::{AlertPriority, AlertStatus, RepairAlert};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlertDto {
    #[validate(length(min = 1, max = 200, message = "Subsystem is required"))]
    pub subsystem: String,

    #[validate(length(min = 1, max = 5000, message = "Issue description is required"))]
    pub issue: String,

    pub priority: Option<AlertPriority>,
}

#[derive(Debug, Deserialize)]
pub struct AlertListQuery {
    pub status: Option<AlertStatus>,
    pub engineer_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MyAlertsQuery {
    pub status: Option<AlertStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAlertStatusDto {
    pub status: AlertStatus,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RateAlertDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 2000, message = "Comment is too long"))]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertData {
    pub alert: RepairAlert,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertResponseDto {
    pub status: String,
    pub data: AlertData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertListResponseDto {
    pub status: String,
    pub results: usize,
    pub alerts: Vec<RepairAlert>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TechnicianRatingDto {
    pub technician_id: Uuid,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_outside_range_fails_validation() {
        let dto = RateAlertDto {
            rating: 0,
            comment: None,
        };
        assert!(dto.validate().is_err());

        let dto = RateAlertDto {
            rating: 6,
            comment: None,
        };
        assert!(dto.validate().is_err());

        let dto = RateAlertDto {
            rating: 5,
            comment: Some("great job".to_string()),
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn create_alert_requires_subsystem_and_issue() {
        let dto = CreateAlertDto {
            subsystem: "".to_string(),
            issue: "leak".to_string(),
            priority: None,
        };
        assert!(dto.validate().is_err());

        let dto = CreateAlertDto {
            subsystem: "Cutterhead".to_string(),
            issue: "".to_string(),
            priority: Some(AlertPriority::High),
        };
        assert!(dto.validate().is_err());
    }
}
