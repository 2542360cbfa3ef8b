use std::sync::{Arc, Mutex};

use super::format::DocumentFormat;
use super::types::{BlockType, OcrBlock, OcrDocument, OcrEngine};
use super::ExtractionError;

/// Assemble LINE blocks into text, one line per block, in service order.
///
/// Zero recognized lines is not an error: the result is an empty string.
pub fn extract_text(engine: &dyn OcrEngine, document: &[u8]) -> Result<String, ExtractionError> {
    let format = DocumentFormat::detect(document);
    if !format.is_supported() {
        return Err(ExtractionError::UnsupportedFormat);
    }

    let _span = tracing::info_span!(
        "ocr_extract",
        mime = format.mime_type(),
        size = document.len(),
    )
    .entered();
    let start = std::time::Instant::now();

    let result = engine.detect_document_text(document)?;
    let text = assemble_lines(&result.blocks);

    tracing::info!(
        elapsed_ms = %start.elapsed().as_millis(),
        blocks = result.blocks.len(),
        text_len = text.len(),
        "OCR extraction complete"
    );
    Ok(text)
}

fn assemble_lines(blocks: &[OcrBlock]) -> String {
    let mut text = String::new();
    for block in blocks.iter().filter(|b| b.block_type == BlockType::Line) {
        text.push_str(block.text.as_deref().unwrap_or_default());
        text.push('\n');
    }
    text
}

/// OCR engine backed by an HTTP document-text-detection endpoint.
///
/// The raw document is posted as the request body; the response is the
/// service's block list (`{"Blocks": [...]}`).
pub struct HttpOcrEngine {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpOcrEngine {
    pub fn new(endpoint: &str) -> Result<Self, ExtractionError> {
        // No client-side timeout: the hosting environment bounds the run.
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| ExtractionError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl OcrEngine for HttpOcrEngine {
    fn detect_document_text(&self, document: &[u8]) -> Result<OcrDocument, ExtractionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(document.to_vec())
            .send()
            .map_err(|e| ExtractionError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::Service {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<OcrDocument>()
            .map_err(|e| ExtractionError::ResponseParsing(e.to_string()))
    }
}

/// Mock OCR engine for unit testing without a live service.
#[derive(Clone)]
pub struct MockOcrEngine {
    blocks: Vec<OcrBlock>,
    failure: Option<String>,
    calls: Arc<Mutex<usize>>,
}

impl MockOcrEngine {
    pub fn new(blocks: Vec<OcrBlock>) -> Self {
        Self {
            blocks,
            failure: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Engine returning one LINE block per entry.
    pub fn with_lines(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| OcrBlock::line(l)).collect())
    }

    /// Engine whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or_default()
    }
}

impl OcrEngine for MockOcrEngine {
    fn detect_document_text(&self, _document: &[u8]) -> Result<OcrDocument, ExtractionError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        match &self.failure {
            Some(message) => Err(ExtractionError::OcrProcessing(message.clone())),
            None => Ok(OcrDocument {
                blocks: self.blocks.clone(),
            }),
        }
    }
}
