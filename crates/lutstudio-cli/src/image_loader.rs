//! Image decode/encode at the edge of the pipeline.

use std::path::Path;

use lutstudio_core::PixelBuffer;
use lutstudio_style::StyleRequest;

/// Load an image from disk as RGBA8.
///
/// Any format the `image` crate decodes is accepted; higher bit depths are
/// reduced to 8 bits per channel.
pub fn load_image(path: &Path) -> Result<PixelBuffer, ImageLoadError> {
    let img = image::open(path).map_err(ImageLoadError::Decode)?;
    let rgba = img.to_rgba8();
    tracing::debug!(
        path = %path.display(),
        width = rgba.width(),
        height = rgba.height(),
        color = ?img.color(),
        "decoded image"
    );
    Ok(PixelBuffer::from(rgba))
}

/// Write an RGBA8 buffer; the format follows the file extension.
pub fn save_image(path: &Path, buffer: PixelBuffer) -> Result<(), ImageLoadError> {
    let img: image::RgbaImage = buffer.into();
    img.save(path).map_err(ImageLoadError::Encode)?;
    tracing::info!(path = %path.display(), "wrote image");
    Ok(())
}

/// Read the original file bytes for the style service.
pub fn load_style_request(path: &Path) -> Result<StyleRequest, ImageLoadError> {
    let bytes = std::fs::read(path)?;
    let mime = image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or("image/jpeg");
    Ok(StyleRequest::from_bytes(&bytes, mime))
}

/// Errors that can occur during image loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
