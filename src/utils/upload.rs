use uuid::Uuid;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_VOICE_BYTES: usize = 10 * 1024 * 1024;

pub fn is_image_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// Voice notes arrive from MediaRecorder, which labels webm blobs as either
/// audio/webm or video/webm depending on the browser.
pub fn is_audio_type(content_type: &str) -> bool {
    content_type.starts_with("audio/") || content_type == "video/webm"
}

pub fn extension_for(content_type: &str) -> &str {
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/jpeg" | "image/jpg" => "jpg",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/m4a" => "m4a",
        "audio/webm" | "video/webm" => "webm",
        _ => "bin",
    }
}

/// Writes the media bytes under the upload directory with a random filename
/// and returns the public URL path the frontend can fetch it from.
pub async fn store_media(
    upload_dir: &str,
    content_type: &str,
    data: &[u8],
) -> std::io::Result<String> {
    let filename = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
    let path = std::path::Path::new(upload_dir).join(&filename);

    tokio::fs::create_dir_all(upload_dir).await?;
    tokio::fs::write(&path, data).await?;

    Ok(format!("/uploads/{}", filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_types_are_detected() {
        assert!(is_image_type("image/png"));
        assert!(is_image_type("image/jpeg"));
        assert!(!is_image_type("application/pdf"));
        assert!(!is_image_type("audio/webm"));
    }

    #[test]
    fn voice_types_include_webm_video_label() {
        assert!(is_audio_type("audio/webm"));
        assert!(is_audio_type("audio/mpeg"));
        assert!(is_audio_type("video/webm"));
        assert!(!is_audio_type("video/mp4"));
        assert!(!is_audio_type("image/png"));
    }

    #[test]
    fn unknown_types_fall_back_to_bin() {
        assert_eq!(extension_for("application/octet-stream"), "bin");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("video/webm"), "webm");
    }

    #[tokio::test]
    async fn stored_media_lands_under_uploads_path() {
        let dir = std::env::temp_dir().join(format!("boretrack-test-{}", Uuid::new_v4()));
        let dir = dir.to_str().unwrap().to_string();

        let url = store_media(&dir, "image/png", b"fake-png").await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let filename = url.trim_start_matches("/uploads/");
        let bytes = tokio::fs::read(std::path::Path::new(&dir).join(filename))
            .await
            .unwrap();
        assert_eq!(bytes, b"fake-png");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
