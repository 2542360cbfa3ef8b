//! Document rendering: translated text → PDF bytes.
//!
//! Rendering happens on a dedicated writer thread. Callers stream text into a
//! `RenderSession`, call `finish()`, then block on `PendingDocument::wait()`
//! for the completion signal carrying the flushed buffer. Returning from
//! `finish()` does not mean the bytes are ready.

mod font;
pub mod layout;
pub mod session;

pub use layout::*;
pub use session::*;

use thiserror::Error;

/// Content type of every rendered document, regardless of source format.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("PDF font error: {0}")]
    Font(String),

    /// The font has no glyph for this character. printpdf would drop it
    /// silently.
    #[error("Font cannot render {0:?} (U+{code:04X})", code = u32::from(*.0))]
    UnsupportedGlyphs(char),

    #[error("PDF save error: {0}")]
    Save(String),

    #[error("Render session closed before completion")]
    SessionAborted,

    #[error("Rendered document is empty")]
    EmptyOutput,
}

/// Rendered output: immutable bytes plus a fixed content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedDocument {
    bytes: Vec<u8>,
}

impl TranslatedDocument {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Result<Self, RenderError> {
        if bytes.is_empty() {
            return Err(RenderError::EmptyOutput);
        }
        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Session options.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub title: String,
    /// TrueType/OpenType font bytes. Built-in Helvetica when absent, which
    /// only covers the WinAnsi character set.
    pub font: Option<Vec<u8>>,
}

impl RenderOptions {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            font: None,
        }
    }
}

/// Render `text` in one go: open a session, stream it line by line,
/// finalize, and wait for the buffer.
pub fn render_document(
    text: &str,
    options: RenderOptions,
) -> Result<TranslatedDocument, RenderError> {
    let session = RenderSession::start(options);
    for line in text.split_inclusive('\n') {
        // A closed session reports its cause through wait().
        if session.write(line).is_err() {
            break;
        }
    }
    session.finish().wait()
}
