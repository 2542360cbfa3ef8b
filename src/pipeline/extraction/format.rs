use serde::Serialize;

/// Input formats the OCR service accepts, detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentFormat {
    Pdf,
    Png,
    Jpeg,
    Tiff,
    Unsupported,
}

impl DocumentFormat {
    /// Detect format from leading bytes. Extensions are not trusted.
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes {
            [0x25, 0x50, 0x44, 0x46, 0x2D, ..] => Self::Pdf,
            [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => Self::Png,
            [0xFF, 0xD8, 0xFF, ..] => Self::Jpeg,
            [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Self::Tiff,
            _ => Self::Unsupported,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Tiff => "image/tiff",
            Self::Unsupported => "application/octet-stream",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}
