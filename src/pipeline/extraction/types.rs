use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Structured OCR response: typed blocks in reading order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrDocument {
    #[serde(rename = "Blocks", default)]
    pub blocks: Vec<OcrBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrBlock {
    #[serde(rename = "BlockType")]
    pub block_type: BlockType,
    #[serde(rename = "Text", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl OcrBlock {
    pub fn line(text: &str) -> Self {
        Self {
            block_type: BlockType::Line,
            text: Some(text.to_string()),
        }
    }

    pub fn other() -> Self {
        Self {
            block_type: BlockType::Other,
            text: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Page,
    Line,
    Word,
    #[serde(other)]
    Other,
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine: Send + Sync {
    /// Single synchronous call with the whole document buffer.
    fn detect_document_text(&self, document: &[u8]) -> Result<OcrDocument, ExtractionError>;
}
