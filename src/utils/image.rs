use std::path::Path;

use crate::error::AppError;

/// Image formats accepted for post attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// Detects the format from the leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageKind::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
        }
    }
}

/// Validates an uploaded image and writes it under `upload_dir`.
///
/// Returns the public URL (`/uploads/<name>`) of the stored file.
pub async fn store_image(
    upload_dir: &Path,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<String, AppError> {
    if bytes.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "The file is too large. Please upload an image smaller than {} MB.",
            max_bytes / (1024 * 1024)
        )));
    }

    let kind = ImageKind::sniff(bytes).ok_or_else(|| {
        AppError::BadRequest(
            "Unsupported file type. Please upload a JPG, PNG, or GIF image.".to_string(),
        )
    })?;

    tokio::fs::create_dir_all(upload_dir).await?;

    let file_name = format!("{}.{}", uuid::Uuid::new_v4(), kind.extension());
    tokio::fs::write(upload_dir.join(&file_name), bytes).await?;

    tracing::debug!("Stored uploaded image {}", file_name);
    Ok(format!("/uploads/{}", file_name))
}

/// Best-effort removal of a previously stored image.
pub async fn remove_image(upload_dir: &Path, image_url: &str) {
    let Some(file_name) = image_url.strip_prefix("/uploads/") else {
        return;
    };
    // Never follow anything that looks like a path.
    if file_name.contains('/') || file_name.contains("..") {
        return;
    }
    if let Err(e) = tokio::fs::remove_file(upload_dir.join(file_name)).await {
        tracing::warn!("Failed to remove image {}: {}", file_name, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn sniffs_supported_formats() {
        assert_eq!(ImageKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::sniff(&PNG_HEADER), Some(ImageKind::Png));
        assert_eq!(ImageKind::sniff(b"GIF89a...."), Some(ImageKind::Gif));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(ImageKind::sniff(b"%PDF-1.7"), None);
        assert_eq!(ImageKind::sniff(b"<svg></svg>"), None);
        assert_eq!(ImageKind::sniff(&[]), None);
    }

    #[tokio::test]
    async fn store_rejects_oversized_and_unknown() {
        let dir = std::env::temp_dir().join(format!("forum-img-{}", uuid::Uuid::new_v4()));

        let too_big = store_image(&dir, &PNG_HEADER, 4).await;
        assert!(matches!(too_big, Err(AppError::BadRequest(_))));

        let unknown = store_image(&dir, b"plain text", 1024).await;
        assert!(matches!(unknown, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn store_and_remove_round_trip() {
        let dir = std::env::temp_dir().join(format!("forum-img-{}", uuid::Uuid::new_v4()));

        let url = store_image(&dir, &PNG_HEADER, 1024).await.unwrap();
        assert!(url.starts_with("/uploads/") && url.ends_with(".png"));

        let on_disk = dir.join(url.trim_start_matches("/uploads/"));
        assert!(on_disk.exists());

        remove_image(&dir, &url).await;
        assert!(!on_disk.exists());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
