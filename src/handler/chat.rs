use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{alertdb::AlertExt, chatdb::ChatExt},
    dtos::{MessageListResponseDto, SendTextMessageDto, SinceQuery, UnreadCountResponseDto},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddleware,
    models::{
        alertmodel::{AlertStatus, RepairAlert},
        chatmodels::MessageKind,
        usermodel::User,
    },
    utils::upload::{
        is_audio_type, is_image_type, store_media, MAX_IMAGE_BYTES, MAX_VOICE_BYTES,
    },
    AppState,
};

const THREAD_PAGE_LIMIT: i64 = 100;

pub fn chat_handler() -> Router {
    Router::new()
        .route("/unread/count", get(unread_count))
        .route("/:alert_id", get(get_messages).post(send_text))
        .route("/:alert_id/image", post(send_image))
        .route("/:alert_id/voice", post(send_voice))
        // multipart bodies need headroom above the per-file ceilings
        .layer(DefaultBodyLimit::max(MAX_VOICE_BYTES + 1024 * 1024))
}

/// Thread access guard: only the creating engineer or the assigned
/// technician may touch the thread, and only after the alert has left
/// pending.
fn chat_access(alert: &RepairAlert, user: &User) -> Result<(), HttpError> {
    if !alert.is_participant(user.id) {
        return Err(HttpError::forbidden(
            "Only the alert's engineer or technician can access this chat",
        ));
    }

    if alert.status == AlertStatus::Pending {
        return Err(HttpError::bad_request(ErrorMessage::ChatLocked.to_string()));
    }

    Ok(())
}

async fn load_alert_for_chat(
    app_state: &AppState,
    alert_id: Uuid,
    user: &User,
) -> Result<RepairAlert, HttpError> {
    let alert = app_state
        .db_client
        .get_alert_by_id(alert_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::AlertNotFound.to_string()))?;

    chat_access(&alert, user)?;

    Ok(alert)
}

pub async fn send_text(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(alert_id): Path<Uuid>,
    Json(body): Json<SendTextMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let content = body.content.trim().to_string();
    if content.is_empty() {
        return Err(HttpError::bad_request("Message cannot be empty"));
    }

    load_alert_for_chat(&app_state, alert_id, &auth.user).await?;

    let message = app_state
        .db_client
        .create_message(alert_id, &auth.user, MessageKind::Text, content, None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": message
    })))
}

pub async fn send_image(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(alert_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    load_alert_for_chat(&app_state, alert_id, &auth.user).await?;

    let upload = read_media_upload(multipart, MAX_IMAGE_BYTES, is_image_type, "image").await?;

    let media_url = store_media(&app_state.env.upload_dir, &upload.content_type, &upload.data)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let message = app_state
        .db_client
        .create_message(
            alert_id,
            &auth.user,
            MessageKind::Image,
            upload.caption.unwrap_or_default(),
            Some(media_url),
            None,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": message
    })))
}

pub async fn send_voice(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(alert_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    load_alert_for_chat(&app_state, alert_id, &auth.user).await?;

    let upload = read_media_upload(multipart, MAX_VOICE_BYTES, is_audio_type, "voice").await?;

    let media_url = store_media(&app_state.env.upload_dir, &upload.content_type, &upload.data)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let message = app_state
        .db_client
        .create_message(
            alert_id,
            &auth.user,
            MessageKind::Voice,
            upload.caption.unwrap_or_default(),
            Some(media_url),
            upload.duration,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": message
    })))
}

pub async fn get_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(alert_id): Path<Uuid>,
    Query(query): Query<SinceQuery>,
) -> Result<impl IntoResponse, HttpError> {
    load_alert_for_chat(&app_state, alert_id, &auth.user).await?;

    let messages = app_state
        .db_client
        .get_messages(alert_id, query.since, THREAD_PAGE_LIMIT)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Listing doubles as the read receipt for the counterpart's messages.
    app_state
        .db_client
        .mark_messages_as_read(alert_id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(MessageListResponseDto {
        status: "success".to_string(),
        results: messages.len(),
        messages,
    }))
}

pub async fn unread_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let per_alert = app_state
        .db_client
        .unread_per_alert(auth.user.id, auth.user.role)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let total_unread = per_alert.iter().map(|u| u.unread_count).sum();

    Ok(Json(UnreadCountResponseDto {
        status: "success".to_string(),
        total_unread,
        per_alert,
    }))
}

pub struct MediaUpload {
    pub content_type: String,
    pub data: Vec<u8>,
    pub caption: Option<String>,
    pub duration: Option<i32>,
}

fn check_media_type(
    content_type: Option<&str>,
    type_check: fn(&str) -> bool,
    label: &str,
) -> Result<String, HttpError> {
    let content_type = content_type.ok_or_else(|| {
        HttpError::bad_request(format!("Missing content type on {} upload", label))
    })?;

    if !type_check(content_type) {
        return Err(HttpError::bad_request(format!(
            "Unsupported {} type: {}",
            label, content_type
        )));
    }

    Ok(content_type.to_string())
}

fn check_media_size(len: usize, max_bytes: usize, label: &str) -> Result<(), HttpError> {
    if len > max_bytes {
        return Err(HttpError::bad_request(format!(
            "{} upload exceeds the {}MB limit",
            label,
            max_bytes / (1024 * 1024)
        )));
    }

    Ok(())
}

/// Pulls one media file (plus optional caption/duration fields) out of a
/// multipart body, enforcing the type predicate and byte ceiling before
/// anything is persisted. Shared by the alert threads and the admin channel.
pub(crate) async fn read_media_upload(
    mut multipart: Multipart,
    max_bytes: usize,
    type_check: fn(&str) -> bool,
    label: &str,
) -> Result<MediaUpload, HttpError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut caption: Option<String> = None;
    let mut duration: Option<i32> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.to_string()))?
    {
        match field.name() {
            Some("caption") => {
                caption = field.text().await.ok().filter(|t| !t.trim().is_empty());
            }
            Some("duration") => {
                duration = field
                    .text()
                    .await
                    .ok()
                    .and_then(|t| t.trim().parse::<i32>().ok());
            }
            _ => {
                let content_type = check_media_type(field.content_type(), type_check, label)?;

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| HttpError::bad_request(e.to_string()))?;

                check_media_size(data.len(), max_bytes, label)?;

                upload = Some((content_type, data.to_vec()));
            }
        }
    }

    let (content_type, data) =
        upload.ok_or_else(|| HttpError::bad_request(format!("No {} file provided", label)))?;

    if data.is_empty() {
        return Err(HttpError::bad_request(format!("Empty {} upload", label)));
    }

    Ok(MediaUpload {
        content_type,
        data,
        caption,
        duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Utc;

    use crate::models::{
        alertmodel::AlertPriority,
        usermodel::UserRole,
    };

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role,
            organization: "Tunnel Ops".to_string(),
            photo_url: None,
            password: "hash".to_string(),
            reset_token: None,
            reset_token_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn alert(engineer: &User, technician: Option<&User>, status: AlertStatus) -> RepairAlert {
        RepairAlert {
            id: Uuid::new_v4(),
            subsystem: "Cutterhead".to_string(),
            issue: "leak".to_string(),
            priority: AlertPriority::High,
            status,
            engineer_id: engineer.id,
            engineer_name: engineer.name.clone(),
            engineer_email: engineer.email.clone(),
            technician_id: technician.map(|t| t.id),
            technician_name: technician.map(|t| t.name.clone()),
            technician_email: technician.map(|t| t.email.clone()),
            accepted_at: technician.map(|_| Utc::now()),
            resolved_at: None,
            rating: None,
            rating_comment: None,
            rated_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn outsider_is_forbidden_from_the_thread() {
        let engineer = user(UserRole::Engineer);
        let technician = user(UserRole::Technician);
        let outsider = user(UserRole::Engineer);

        let alert = alert(&engineer, Some(&technician), AlertStatus::InProgress);
        let err = chat_access(&alert, &outsider).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn thread_is_locked_while_pending_for_both_roles() {
        let engineer = user(UserRole::Engineer);
        let technician = user(UserRole::Technician);

        let pending = alert(&engineer, None, AlertStatus::Pending);
        let err = chat_access(&pending, &engineer).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        // A technician who is not yet the assignee is rejected as an
        // outsider, never let through the pending gate.
        let err = chat_access(&pending, &technician).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn participants_get_access_after_acceptance() {
        let engineer = user(UserRole::Engineer);
        let technician = user(UserRole::Technician);

        let active = alert(&engineer, Some(&technician), AlertStatus::InProgress);
        assert!(chat_access(&active, &engineer).is_ok());
        assert!(chat_access(&active, &technician).is_ok());
    }

    #[test]
    fn media_type_check_requires_a_matching_content_type() {
        assert!(check_media_type(None, is_image_type, "image").is_err());
        assert!(check_media_type(Some("application/pdf"), is_image_type, "image").is_err());
        assert!(check_media_type(Some("image/png"), is_image_type, "image").is_ok());
        assert!(check_media_type(Some("video/webm"), is_audio_type, "voice").is_ok());
    }

    #[test]
    fn media_size_check_enforces_the_ceiling() {
        assert!(check_media_size(MAX_IMAGE_BYTES, MAX_IMAGE_BYTES, "image").is_ok());
        assert!(check_media_size(MAX_IMAGE_BYTES + 1, MAX_IMAGE_BYTES, "image").is_err());
    }
}
