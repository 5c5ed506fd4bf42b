use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    content::ContentClient,
    error::{AppError, Result},
    models::{ImageRef, ImageUpload},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Splits `data:<mime>;base64,<payload>` into its MIME type and payload.
fn split_data_url(data: &str) -> (Option<&str>, &str) {
    match data.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((meta, payload)) => {
            let mime = meta.split(';').next().filter(|m| !m.is_empty());
            (mime, payload)
        }
        None => (None, data),
    }
}

/// Decodes and checks an inline image: it must be an image type and fit
/// within `max_size` bytes once decoded.
pub fn decode_image(upload: &ImageUpload, max_size: usize) -> Result<DecodedImage> {
    let (data_url_mime, payload) = split_data_url(upload.base64.trim());

    let content_type = upload
        .content_type
        .clone()
        .or_else(|| data_url_mime.map(str::to_string))
        .or_else(|| {
            mime_guess::from_path(&upload.filename)
                .first()
                .map(|m| m.essence_str().to_string())
        })
        .ok_or(AppError::UnsupportedMediaType)?;

    let mime: mime::Mime = content_type
        .parse()
        .map_err(|_| AppError::UnsupportedMediaType)?;
    if mime.type_() != mime::IMAGE {
        return Err(AppError::UnsupportedMediaType);
    }

    // Cheap bound before decoding: 4 base64 chars carry 3 bytes
    if payload.len() / 4 * 3 > max_size + 3 {
        return Err(AppError::ContentTooLarge);
    }

    let bytes = STANDARD.decode(payload)?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Image data is empty".to_string()));
    }
    if bytes.len() > max_size {
        return Err(AppError::ContentTooLarge);
    }

    Ok(DecodedImage {
        bytes,
        filename: upload.filename.clone(),
        content_type: mime.essence_str().to_string(),
    })
}

/// Uploads an inline image as a store asset and returns the reference to
/// embed in a document.
pub async fn upload_image(
    content: &ContentClient,
    upload: &ImageUpload,
    max_size: usize,
) -> Result<ImageRef> {
    let image = decode_image(upload, max_size)?;
    let size = image.bytes.len();

    let asset = content
        .upload_image(image.bytes, &image.filename, &image.content_type)
        .await?;

    tracing::info!(
        "Uploaded image asset {} ({}, {} bytes)",
        asset.id,
        image.content_type,
        size
    );

    Ok(ImageRef::asset(asset.id))
}
