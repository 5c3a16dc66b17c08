use base64::{engine::general_purpose, Engine};
use std::path::Path;

use crate::error::SelectError;
use crate::models::{ImagePreview, SelectedImage, Selection};

/// Size the upload form advertises. Not enforced.
pub const ADVERTISED_MAX_BYTES: usize = 10 * 1024 * 1024;

/// MIME type for an image file name, or `None` if the picker's `image/*`
/// filter would hide it.
pub fn image_mime_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

pub fn data_url(image: &SelectedImage) -> ImagePreview {
    let encoded = general_purpose::STANDARD.encode(&image.bytes);
    ImagePreview {
        data_url: format!("data:{};base64,{}", image.mime_type, encoded),
    }
}

/// Read a picked file from disk and build its preview.
pub async fn load_selection(path: &Path) -> Result<Selection, SelectError> {
    let display = path.display().to_string();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(display.as_str())
        .to_string();

    let mime_type = image_mime_type(&name).ok_or_else(|| SelectError::NotAnImage(name.clone()))?;

    let bytes = tokio::fs::read(path).await.map_err(|source| SelectError::Io {
        path: display.clone(),
        source,
    })?;

    log::debug!("📊 Image file size: {} bytes", bytes.len());
    if bytes.len() > ADVERTISED_MAX_BYTES {
        log::warn!(
            "⚠️ {} is {} bytes, larger than the advertised {} byte limit",
            name,
            bytes.len(),
            ADVERTISED_MAX_BYTES
        );
    }

    let image = SelectedImage::new(name, mime_type, bytes);
    let preview = data_url(&image);
    log::debug!("🖼️ Preview data URL created: {} chars", preview.data_url.len());

    Ok(Selection { image, preview })
}
