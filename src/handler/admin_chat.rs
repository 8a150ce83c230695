use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query},
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use super::chat::read_media_upload;
use crate::{
    db::{adminchatdb::AdminChatExt, userdb::UserExt},
    dtos::{SendTextMessageDto, SinceQuery, StartConversationDto},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddleware,
    models::{chatmodels::MessageKind, usermodel::{User, UserRole}},
    utils::upload::{
        is_audio_type, is_image_type, store_media, MAX_IMAGE_BYTES, MAX_VOICE_BYTES,
    },
    AppState,
};

const THREAD_PAGE_LIMIT: i64 = 100;

pub fn admin_chat_handler() -> Router {
    Router::new()
        .route("/conversations", get(conversations))
        .route("/start", post(start_conversation))
        .route("/unread/count", get(unread_count))
        .route("/with/:other_id", get(get_messages).post(send_message))
        .route("/with/:other_id/image", post(send_image))
        .route("/with/:other_id/voice", post(send_voice))
        .route("/messages/:message_id", delete(delete_message))
        // multipart bodies need headroom above the per-file ceilings
        .layer(DefaultBodyLimit::max(MAX_VOICE_BYTES + 1024 * 1024))
}

/// Orients the (admin, participant) key from the caller's role: admins name
/// the participant, participants name the admin.
async fn resolve_channel(
    app_state: &AppState,
    caller: &User,
    other_id: Uuid,
) -> Result<(Uuid, Uuid), HttpError> {
    let other = app_state
        .db_client
        .get_user_by_id(other_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    match (caller.role, other.role) {
        (UserRole::Admin, UserRole::Admin) => Err(HttpError::bad_request(
            "Admin-to-admin conversations are not supported",
        )),
        (UserRole::Admin, _) => Ok((caller.id, other.id)),
        (_, UserRole::Admin) => Ok((other.id, caller.id)),
        _ => Err(HttpError::forbidden(
            "One side of an admin conversation must be an admin",
        )),
    }
}

pub async fn conversations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    if auth.user.role != UserRole::Admin {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let conversations = app_state
        .db_client
        .admin_conversations(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": conversations.len(),
        "conversations": conversations
    })))
}

pub async fn start_conversation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<StartConversationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if auth.user.role == UserRole::Admin {
        return Err(HttpError::bad_request(
            "Admins open conversations by messaging a participant directly",
        ));
    }

    let admin = match body.admin_id {
        Some(admin_id) => {
            let admin = app_state
                .db_client
                .get_user_by_id(admin_id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?
                .ok_or_else(|| HttpError::not_found("Admin not found"))?;

            if admin.role != UserRole::Admin {
                return Err(HttpError::bad_request("Selected user is not an admin"));
            }
            admin
        }
        None => {
            // Prefer the admin from the most recent prior conversation,
            // fall back to any admin.
            let previous = app_state
                .db_client
                .latest_admin_for(auth.user.id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;

            match previous {
                Some(admin_id) => app_state
                    .db_client
                    .get_user_by_id(admin_id)
                    .await
                    .map_err(|e| HttpError::server_error(e.to_string()))?
                    .ok_or_else(|| HttpError::not_found("Admin not found"))?,
                None => app_state
                    .db_client
                    .get_any_admin()
                    .await
                    .map_err(|e| HttpError::server_error(e.to_string()))?
                    .ok_or_else(|| HttpError::not_found("No admin available"))?,
            }
        }
    };

    let initial_message = match body.message.map(|m| m.trim().to_string()) {
        Some(content) if !content.is_empty() => Some(
            app_state
                .db_client
                .create_admin_message(
                    admin.id,
                    auth.user.id,
                    &auth.user,
                    MessageKind::Text,
                    content,
                    None,
                    None,
                )
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?,
        ),
        _ => None,
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "admin_id": admin.id,
            "admin_name": admin.name,
            "message": initial_message
        }
    })))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(other_id): Path<Uuid>,
    Json(body): Json<SendTextMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let content = body.content.trim().to_string();
    if content.is_empty() {
        return Err(HttpError::bad_request("Message cannot be empty"));
    }

    let (admin_id, participant_id) = resolve_channel(&app_state, &auth.user, other_id).await?;

    let message = app_state
        .db_client
        .create_admin_message(
            admin_id,
            participant_id,
            &auth.user,
            MessageKind::Text,
            content,
            None,
            None,
        )
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
    Path(other_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let (admin_id, participant_id) = resolve_channel(&app_state, &auth.user, other_id).await?;

    let upload = read_media_upload(multipart, MAX_IMAGE_BYTES, is_image_type, "image").await?;

    let media_url = store_media(&app_state.env.upload_dir, &upload.content_type, &upload.data)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let message = app_state
        .db_client
        .create_admin_message(
            admin_id,
            participant_id,
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
    Path(other_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let (admin_id, participant_id) = resolve_channel(&app_state, &auth.user, other_id).await?;

    let upload = read_media_upload(multipart, MAX_VOICE_BYTES, is_audio_type, "voice").await?;

    let media_url = store_media(&app_state.env.upload_dir, &upload.content_type, &upload.data)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let message = app_state
        .db_client
        .create_admin_message(
            admin_id,
            participant_id,
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
    Path(other_id): Path<Uuid>,
    Query(query): Query<SinceQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let (admin_id, participant_id) = resolve_channel(&app_state, &auth.user, other_id).await?;

    let messages = app_state
        .db_client
        .get_admin_messages(admin_id, participant_id, query.since, THREAD_PAGE_LIMIT)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .mark_admin_messages_as_read(admin_id, participant_id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": messages.len(),
        "messages": messages
    })))
}

pub async fn unread_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let count = app_state
        .db_client
        .admin_chat_unread_count(auth.user.id, auth.user.role == UserRole::Admin)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "unread_count": count }
    })))
}

pub async fn delete_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let deleted = app_state
        .db_client
        .delete_admin_message(message_id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if deleted == 0 {
        return Err(HttpError::not_found(
            "Message not found or not sent by you",
        ));
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Message deleted"
    })))
}
