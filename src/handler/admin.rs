use std::sync::Arc;

use axum::{
    extract::Query,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};

use crate::{
    db::{alertdb::AlertExt, reportdb::ReportExt},
    dtos::{
        AlertListQuery, AlertListResponseDto, EngineerReportDto, MonthQuery,
        TechnicianReportDto, UserReportQuery,
    },
    error::HttpError,
    models::usermodel::UserRole,
    AppState,
};

pub fn admin_handler() -> Router {
    Router::new()
        .route("/stats/overview", get(overview))
        .route("/stats/engineers", get(engineer_stats))
        .route("/stats/technicians", get(technician_stats))
        .route("/reports/monthly", get(monthly_report))
        .route("/reports/monthly/user", get(monthly_report_for_user))
        .route("/alerts", get(list_all_alerts))
}

pub async fn overview(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state
        .db_client
        .overview_stats()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": stats
    })))
}

pub async fn engineer_stats(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let (start, end) = query.window().map_err(HttpError::bad_request)?;

    let rows = app_state
        .db_client
        .engineer_monthly_report(start, end)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let engineers: Vec<EngineerReportDto> = rows.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "window": { "start": start, "end": end },
        "engineers": engineers
    })))
}

pub async fn technician_stats(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let (start, end) = query.window().map_err(HttpError::bad_request)?;

    let rows = app_state
        .db_client
        .technician_monthly_report(start, end)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let technicians: Vec<TechnicianReportDto> = rows.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "window": { "start": start, "end": end },
        "technicians": technicians
    })))
}

pub async fn monthly_report(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let (start, end) = query.window().map_err(HttpError::bad_request)?;

    let engineer_rows = app_state
        .db_client
        .engineer_monthly_report(start, end)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let technician_rows = app_state
        .db_client
        .technician_monthly_report(start, end)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let engineers: Vec<EngineerReportDto> = engineer_rows.into_iter().map(Into::into).collect();
    let technicians: Vec<TechnicianReportDto> =
        technician_rows.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "window": { "start": start, "end": end },
        "engineers": engineers,
        "technicians": technicians
    })))
}

pub async fn monthly_report_for_user(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<UserReportQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let window = MonthQuery {
        year: query.year,
        month: query.month,
    };
    let (start, end) = window.window().map_err(HttpError::bad_request)?;

    let report = match query.role {
        UserRole::Engineer => {
            let row = app_state
                .db_client
                .engineer_monthly_report_for(query.user_id, start, end)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            serde_json::json!(row.map(EngineerReportDto::from))
        }
        UserRole::Technician => {
            let row = app_state
                .db_client
                .technician_monthly_report_for(query.user_id, start, end)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            serde_json::json!(row.map(TechnicianReportDto::from))
        }
        UserRole::Admin => {
            return Err(HttpError::bad_request(
                "Monthly reports cover engineers and technicians only",
            ))
        }
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "window": { "start": start, "end": end },
        "report": report
    })))
}

pub async fn list_all_alerts(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<AlertListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);

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
