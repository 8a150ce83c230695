use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::alertdb::AlertExt,
    dtos::{
        AlertData, AlertListQuery, AlertListResponseDto, AlertResponseDto, CreateAlertDto,
        MyAlertsQuery, RateAlertDto, Response, TechnicianRatingDto, UpdateAlertStatusDto,
    },
    dtos::reportdtos::round1,
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddleware,
    models::{
        alertmodel::{AlertPriority, AlertStatus},
        usermodel::UserRole,
    },
    AppState,
};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 100;

pub fn alerts_handler() -> Router {
    Router::new()
        .route("/", post(create_alert).get(list_alerts))
        .route("/my-alerts", get(my_alerts))
        .route(
            "/:alert_id",
            axum::routing::patch(update_status).delete(delete_alert),
        )
        .route("/:alert_id/rate", post(rate_alert))
        .route("/technician/:technician_id/rating", get(technician_rating))
}

pub async fn create_alert(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<CreateAlertDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if auth.user.role != UserRole::Engineer {
        return Err(HttpError::forbidden(
            "Only engineers can raise repair alerts",
        ));
    }

    let subsystem = body.subsystem.trim().to_string();
    let issue = body.issue.trim().to_string();
    if subsystem.is_empty() || issue.is_empty() {
        return Err(HttpError::bad_request("Subsystem and issue are required"));
    }

    let alert = app_state
        .db_client
        .create_alert(
            subsystem,
            issue,
            body.priority.unwrap_or(AlertPriority::Medium),
            &auth.user,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(AlertResponseDto {
        status: "success".to_string(),
        data: AlertData { alert },
    }))
}

pub async fn list_alerts(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<AlertListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let alerts = app_state
        .db_client
        .list_alerts(query.status, query.engineer_id, query.technician_id, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(AlertListResponseDto {
        status: "success".to_string(),
        results: alerts.len(),
        alerts,
    }))
}

pub async fn my_alerts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Query(query): Query<MyAlertsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let (engineer_id, technician_id) = match auth.user.role {
        UserRole::Technician => (None, Some(auth.user.id)),
        _ => (Some(auth.user.id), None),
    };

    let alerts = app_state
        .db_client
        .list_alerts(query.status, engineer_id, technician_id, DEFAULT_LIST_LIMIT)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(AlertListResponseDto {
        status: "success".to_string(),
        results: alerts.len(),
        alerts,
    }))
}

pub async fn update_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(alert_id): Path<Uuid>,
    Json(body): Json<UpdateAlertStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let alert = app_state
        .db_client
        .get_alert_by_id(alert_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::AlertNotFound.to_string()))?;

    if !alert.status.can_transition(body.status) {
        return Err(HttpError::bad_request(format!(
            "Cannot move an alert from {} to {}",
            alert.status.to_str(),
            body.status.to_str()
        )));
    }

    let updated = match body.status {
        AlertStatus::InProgress => {
            if auth.user.role != UserRole::Technician {
                return Err(HttpError::forbidden(
                    "Only technicians can accept repair alerts",
                ));
            }

            app_state
                .db_client
                .accept_alert(alert_id, &auth.user)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?
                .ok_or_else(|| {
                    HttpError::conflict("Alert was already accepted by another technician")
                })?
        }
        AlertStatus::Resolved => {
            if !alert.is_participant(auth.user.id) {
                return Err(HttpError::forbidden(
                    ErrorMessage::PermissionDenied.to_string(),
                ));
            }

            app_state
                .db_client
                .resolve_alert(alert_id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?
                .ok_or_else(|| HttpError::conflict("Alert is no longer in progress"))?
        }
        AlertStatus::Pending => {
            // can_transition never admits a move back to pending
            return Err(HttpError::bad_request(
                "An alert cannot be moved back to pending",
            ));
        }
    };

    Ok(Json(AlertResponseDto {
        status: "success".to_string(),
        data: AlertData { alert: updated },
    }))
}

pub async fn delete_alert(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(alert_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let alert = app_state
        .db_client
        .get_alert_by_id(alert_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::AlertNotFound.to_string()))?;

    if !alert.is_participant(auth.user.id) {
        return Err(HttpError::forbidden(
            "Only the creating engineer or the assigned technician can delete this alert",
        ));
    }

    app_state
        .db_client
        .delete_alert(alert_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(Response {
        status: "success",
        message: "Repair alert deleted".to_string(),
    }))
}

pub async fn rate_alert(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(alert_id): Path<Uuid>,
    Json(body): Json<RateAlertDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let alert = app_state
        .db_client
        .get_alert_by_id(alert_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::AlertNotFound.to_string()))?;

    if alert.status != AlertStatus::Resolved {
        return Err(HttpError::bad_request(
            "Only resolved alerts can be rated",
        ));
    }

    if alert.engineer_id != auth.user.id {
        return Err(HttpError::forbidden(
            "Only the creating engineer can rate this alert",
        ));
    }

    if alert.rating.is_some() {
        return Err(HttpError::bad_request("Alert has already been rated"));
    }

    let rated = app_state
        .db_client
        .rate_alert(alert_id, body.rating, body.comment)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::bad_request("Alert has already been rated"))?;

    Ok(Json(AlertResponseDto {
        status: "success".to_string(),
        data: AlertData { alert: rated },
    }))
}

pub async fn technician_rating(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(technician_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let (average, count) = app_state
        .db_client
        .technician_rating(technician_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": TechnicianRatingDto {
            technician_id,
            average_rating: average.map(round1),
            rating_count: count,
        }
    })))
}
