use std::io::{BufWriter, Cursor};
use std::sync::mpsc;
use std::thread;

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::font::FontCoverage;
use super::layout::*;
use super::{RenderError, RenderOptions, TranslatedDocument};

enum RenderCommand {
    Text(String),
    Finish,
}

/// An open document-generation session backed by a writer thread.
pub struct RenderSession {
    commands: mpsc::Sender<RenderCommand>,
    completion: mpsc::Receiver<Result<Vec<u8>, RenderError>>,
}

/// A finalized session whose output may still be flushing.
pub struct PendingDocument {
    completion: mpsc::Receiver<Result<Vec<u8>, RenderError>>,
}

impl RenderSession {
    pub fn start(options: RenderOptions) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel();
        let (completion_tx, completion_rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("pdf-render".into())
            .spawn(move || {
                let result = run_writer(options, commands_rx);
                // Receiver gone means nobody is waiting.
                let _ = completion_tx.send(result);
            });
        if let Err(e) = spawned {
            // Both channel ends were moved into the closure and dropped,
            // so wait() reports SessionAborted.
            tracing::error!("Failed to spawn render thread: {e}");
        }

        Self {
            commands: commands_tx,
            completion: completion_rx,
        }
    }

    /// Stream a chunk of text into the document.
    pub fn write(&self, chunk: &str) -> Result<(), RenderError> {
        self.commands
            .send(RenderCommand::Text(chunk.to_string()))
            .map_err(|_| RenderError::SessionAborted)
    }

    /// Finalize the session. Bytes are not ready until `wait()` returns.
    pub fn finish(self) -> PendingDocument {
        if self.commands.send(RenderCommand::Finish).is_err() {
            tracing::debug!("Render writer already stopped before finish");
        }
        PendingDocument {
            completion: self.completion,
        }
    }
}

impl PendingDocument {
    /// Block until the writer signals completion, then take the buffer.
    pub fn wait(self) -> Result<TranslatedDocument, RenderError> {
        let bytes = self
            .completion
            .recv()
            .map_err(|_| RenderError::SessionAborted)??;
        TranslatedDocument::from_bytes(bytes)
    }
}

fn run_writer(
    options: RenderOptions,
    commands: mpsc::Receiver<RenderCommand>,
) -> Result<Vec<u8>, RenderError> {
    let mut writer = PdfWriter::new(&options)?;
    for command in commands {
        match command {
            RenderCommand::Text(chunk) => writer.push(&chunk)?,
            RenderCommand::Finish => return writer.finish(),
        }
    }
    Err(RenderError::SessionAborted)
}

/// Thread-local PDF state. printpdf documents are not `Send`, so this never
/// leaves the writer thread.
struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    coverage: FontCoverage,
    layer: PdfLayerReference,
    cursor_mm: f32,
    pages: usize,
    pending: String,
}

impl PdfWriter {
    fn new(options: &RenderOptions) -> Result<Self, RenderError> {
        let (doc, page, layer) = PdfDocument::new(
            &options.title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let (font, coverage) = match &options.font {
            Some(bytes) => {
                let coverage = FontCoverage::external(bytes)?;
                (doc.add_external_font(Cursor::new(bytes.clone())), coverage)
            }
            None => (
                doc.add_builtin_font(BuiltinFont::Helvetica),
                FontCoverage::Builtin,
            ),
        };
        let font = font.map_err(|e| RenderError::Font(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            font,
            coverage,
            layer,
            cursor_mm: PAGE_HEIGHT_MM - MARGIN_TOP_MM,
            pages: 1,
            pending: String::new(),
        })
    }

    fn push(&mut self, chunk: &str) -> Result<(), RenderError> {
        self.pending.push_str(chunk);
        while let Some(pos) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=pos).collect();
            self.write_paragraph(line.trim_end_matches(['\n', '\r']))?;
        }
        Ok(())
    }

    fn write_paragraph(&mut self, paragraph: &str) -> Result<(), RenderError> {
        if let Some(c) = self.coverage.first_missing(paragraph) {
            return Err(RenderError::UnsupportedGlyphs(c));
        }
        for line in self.coverage.wrap(paragraph) {
            if self.cursor_mm < MARGIN_BOTTOM_MM {
                self.new_page();
            }
            if !line.is_empty() {
                self.layer.use_text(
                    line,
                    FONT_SIZE_PT,
                    Mm(MARGIN_LEFT_MM),
                    Mm(self.cursor_mm),
                    &self.font,
                );
            }
            self.cursor_mm -= LINE_HEIGHT_MM;
        }
        Ok(())
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor_mm = PAGE_HEIGHT_MM - MARGIN_TOP_MM;
    }

    fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.write_paragraph(&rest)?;
        }
        tracing::debug!(pages = self.pages, "Saving rendered PDF");

        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| RenderError::Save(e.to_string()))?;
        buf.into_inner()
            .map_err(|e| RenderError::Save(format!("PDF buffer error: {e}")))
    }
}
