//! MuPDF backend adapter.
//!
//! Bridges the renderer the viewer binary uses to the backend traits.
//! MuPDF reports text in top-left-origin coordinates; the adapter flips
//! search results to the bottom-left origin the trait contract specifies
//! (the search code flips them back exactly once, at ingestion).

use mupdf::{Colorspace, Matrix, TextPageOptions};

use crate::backend::{CharBox, DocumentBackend, PageBackend, TextAttr};
use crate::device::Canvas;
use crate::error::{Error, Result};
use crate::geometry::Rect;

fn backend_error(path: &str, e: impl std::fmt::Display) -> Error {
    Error::DocumentOpen {
        path: path.to_string(),
        reason: e.to_string(),
    }
}

/// A document opened through MuPDF.
pub struct MupdfDocument {
    doc: mupdf::Document,
    path: String,
}

impl MupdfDocument {
    /// Open a PDF file.
    pub fn open(path: &str) -> Result<MupdfDocument> {
        let doc = mupdf::Document::open(path).map_err(|e| backend_error(path, e))?;
        let opened = MupdfDocument {
            doc,
            path: path.to_string(),
        };
        if opened.page_count() == 0 {
            return Err(Error::EmptyDocument);
        }
        Ok(opened)
    }
}

impl DocumentBackend for MupdfDocument {
    type Page = MupdfPage;

    fn page_count(&self) -> usize {
        self.doc.page_count().unwrap_or(0).max(0) as usize
    }

    fn load_page(&self, index: usize) -> Result<MupdfPage> {
        let page = self
            .doc
            .load_page(index as i32)
            .map_err(|_| Error::PageOutOfRange(index))?;
        MupdfPage::new(page, &self.path)
    }

    fn update_id(&self) -> Option<Vec<u8>> {
        // MuPDF exposes no cheap update identifier; file metadata stands
        // in for it.
        let meta = std::fs::metadata(&self.path).ok()?;
        let mut id = Vec::new();
        if let Ok(modified) = meta.modified() {
            if let Ok(stamp) = modified.duration_since(std::time::UNIX_EPOCH) {
                id.extend_from_slice(&stamp.as_nanos().to_le_bytes());
            }
        }
        id.extend_from_slice(&meta.len().to_le_bytes());
        Some(id)
    }

    fn reload(&mut self) -> Result<()> {
        self.doc =
            mupdf::Document::open(&self.path).map_err(|e| backend_error(&self.path, e))?;
        if self.page_count() == 0 {
            return Err(Error::EmptyDocument);
        }
        Ok(())
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// One MuPDF page with its extracted character layout.
pub struct MupdfPage {
    page: mupdf::Page,
    width: f64,
    height: f64,
    chars: Vec<CharBox>,
    attrs: Vec<TextAttr>,
}

impl MupdfPage {
    fn new(page: mupdf::Page, path: &str) -> Result<MupdfPage> {
        let bounds = page.bounds().map_err(|e| backend_error(path, e))?;
        let width = (bounds.x1 - bounds.x0) as f64;
        let height = (bounds.y1 - bounds.y0) as f64;

        let mut chars = Vec::new();
        let text_page = page
            .to_text_page(TextPageOptions::empty())
            .map_err(|e| backend_error(path, e))?;
        for block in text_page.blocks() {
            for line in block.lines() {
                let mut line_end: Option<Rect> = None;
                for ch in line.chars() {
                    let Some(c) = ch.char() else { continue };
                    let q = ch.quad();
                    let rect = Rect::new(
                        q.ul.x.min(q.ll.x) as f64,
                        q.ul.y.min(q.ur.y) as f64,
                        q.ur.x.max(q.lr.x) as f64,
                        q.ll.y.max(q.lr.y) as f64,
                    );
                    line_end = Some(rect);
                    chars.push(CharBox { ch: c, rect });
                }
                // a newline between lines, as the layout contract expects
                if let Some(last) = line_end {
                    chars.push(CharBox {
                        ch: '\n',
                        rect: Rect::new(last.x2, last.y1, last.x2, last.y2),
                    });
                }
            }
        }

        // MuPDF does not expose per-character font names here; a single
        // run keeps the extractor working, without face changes.
        let attrs = if chars.is_empty() {
            Vec::new()
        } else {
            vec![TextAttr {
                font_name: String::new(),
                start: 0,
                end: chars.len() - 1,
            }]
        };

        Ok(MupdfPage {
            page,
            width,
            height,
            chars,
            attrs,
        })
    }
}

impl PageBackend for MupdfPage {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn chars(&self) -> &[CharBox] {
        &self.chars
    }

    fn attributes(&self) -> &[TextAttr] {
        &self.attrs
    }

    fn find_text(&self, needle: &str) -> Vec<Rect> {
        let Ok(quads) = self.page.search(needle, 64) else {
            return Vec::new();
        };
        quads
            .into_iter()
            .map(|q| {
                let x1 = q.ul.x.min(q.ll.x) as f64;
                let x2 = q.ur.x.max(q.lr.x) as f64;
                let top = q.ul.y.min(q.ur.y) as f64;
                let bottom = q.ll.y.max(q.lr.y) as f64;
                // flip to the bottom-left origin of the trait contract
                Rect::new(x1, self.height - bottom, x2, self.height - top)
            })
            .collect()
    }

    fn render(&self, canvas: &mut Canvas) {
        let t = canvas.transform();
        let matrix = Matrix::new_scale(t.sx as f32, t.sy as f32);
        let pixmap = match self
            .page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), false, false)
        {
            Ok(pixmap) => pixmap,
            Err(e) => {
                log::error!("render failed: {e}");
                return;
            }
        };
        canvas.blit_rgb(
            pixmap.samples(),
            pixmap.width(),
            pixmap.height(),
            t.tx,
            t.ty,
        );
    }
}
