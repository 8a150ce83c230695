use std::sync::Arc;

use axum::{response::IntoResponse, routing::post, Extension, Json, Router};
use chrono::{Duration, Utc};
use validator::Validate;

use crate::{
    db::otpdb::OtpExt,
    dtos::{Response, SendOtpDto, VerifyOtpDto},
    error::{ErrorMessage, HttpError},
    mail::mails::send_otp_email,
    utils::otp_generator::generate_otp,
    AppState,
};

const OTP_TTL_MINUTES: i64 = 10;

pub fn otp_handler() -> Router {
    Router::new()
        .route("/send-otp", post(send_otp))
        .route("/verify-otp", post(verify_otp))
}

pub async fn send_otp(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<SendOtpDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let code = generate_otp();
    let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

    let record = app_state
        .db_client
        .create_otp(body.email, code, expires_at)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Dispatch happens before the response, so a real send failure is fatal
    // to the request. The degraded mailer logs the code and succeeds.
    send_otp_email(&app_state.mailer, &record.email, &record.code).map_err(|e| {
        tracing::error!("Failed to send OTP email to {}: {}", record.email, e);
        HttpError::server_error("Failed to send OTP email")
    })?;

    Ok(Json(Response {
        status: "success",
        message: "OTP sent".to_string(),
    }))
}

pub async fn verify_otp(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<VerifyOtpDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let record = app_state
        .db_client
        .get_valid_otp(&body.email, &body.code)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::InvalidOtp.to_string()))?;

    // The conditional update is the arbiter: a concurrent verify of the
    // same code loses here instead of both succeeding.
    let verified = app_state
        .db_client
        .mark_otp_verified(record.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if !verified {
        return Err(HttpError::bad_request(ErrorMessage::InvalidOtp.to_string()));
    }

    Ok(Json(Response {
        status: "success",
        message: "Email verified".to_string(),
    }))
}
