use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Unknown,
}

impl ImageFormat {
    /// MIME type to send in `Content-Type`.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Unknown => "application/octet-stream",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_extension(path: &Path) -> ImageFormat {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
            Some("png") => ImageFormat::Png,
            Some("gif") => ImageFormat::Gif,
            Some("webp") => ImageFormat::WebP,
            _ => ImageFormat::Unknown,
        }
    }
}

/// Detect image format from the leading bytes of a file.
pub fn detect_image(header: &[u8]) -> ImageFormat {
    // JPEG: SOI marker followed by the start of another marker
    if header.len() >= 3 && header[0..3] == [0xFF, 0xD8, 0xFF] {
        return ImageFormat::Jpeg;
    }

    if header.len() >= 8 && header[0..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
        return ImageFormat::Png;
    }

    if header.len() >= 6 && (&header[0..6] == b"GIF87a" || &header[0..6] == b"GIF89a") {
        return ImageFormat::Gif;
    }

    // WebP: RIFF container with "WEBP" form type at offset 8
    if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
        return ImageFormat::WebP;
    }

    ImageFormat::Unknown
}

/// Content type for the artifact: sniffed bytes first, then the extension.
pub fn content_type_for(path: &Path, bytes: &[u8]) -> &'static str {
    match detect_image(bytes) {
        ImageFormat::Unknown => ImageFormat::from_extension(path).mime_type(),
        format => format.mime_type(),
    }
}
