//! Interface to the PDF rendering backend.
//!
//! The viewer core never parses PDF itself: it consumes character
//! rectangles, text attributes, search matches and a render call through
//! these traits. Character layout is in top-left-origin PDF points;
//! [`PageBackend::find_text`] reports bottom-left-origin rectangles, which
//! the search code converts exactly once at ingestion.

pub mod sim;

#[cfg(feature = "mupdf")]
pub mod mupdf;

use crate::device::Canvas;
use crate::error::Result;
use crate::geometry::Rect;

/// One character of a page with its rectangle.
#[derive(Debug, Clone)]
pub struct CharBox {
    /// The character.
    pub ch: char,
    /// Its rectangle, top-left origin.
    pub rect: Rect,
}

/// A run of characters sharing font attributes.
///
/// Indices are character positions into the page's character sequence;
/// `end` is inclusive. Italic and bold are inferred from the font name, the
/// only signal the backends provide.
#[derive(Debug, Clone)]
pub struct TextAttr {
    /// Font name as reported by the document.
    pub font_name: String,
    /// First character of the run.
    pub start: usize,
    /// Last character of the run, inclusive.
    pub end: usize,
}

impl TextAttr {
    /// Whether the font name declares an italic face.
    pub fn is_italic(&self) -> bool {
        self.font_name.contains("Italic")
    }

    /// Whether the font name declares a bold face.
    pub fn is_bold(&self) -> bool {
        self.font_name.contains("Bold")
    }
}

/// One page of an open document.
pub trait PageBackend {
    /// Page size in PDF points.
    fn size(&self) -> (f64, f64);

    /// The characters of the page in document order, top-left origin.
    fn chars(&self) -> &[CharBox];

    /// Font attribute runs over the character sequence.
    fn attributes(&self) -> &[TextAttr];

    /// All matches of `needle` on the page, case-insensitive,
    /// bottom-left origin.
    fn find_text(&self, needle: &str) -> Vec<Rect>;

    /// Whether the page carries annotations other than links.
    fn has_annotations(&self) -> bool {
        false
    }

    /// Whether the page carries actions other than internal links.
    fn has_actions(&self) -> bool {
        false
    }

    /// Paint the page content under the canvas' current transform.
    fn render(&self, canvas: &mut Canvas);
}

/// An open document.
pub trait DocumentBackend {
    /// The page type of this backend.
    type Page: PageBackend;

    /// Number of pages; at least one for a successfully opened document.
    fn page_count(&self) -> usize;

    /// Load one page.
    fn load_page(&self, index: usize) -> Result<Self::Page>;

    /// An identifier that changes when the file is rewritten, if the
    /// backend can provide one.
    fn update_id(&self) -> Option<Vec<u8>>;

    /// Re-open the document from its path, picking up external changes.
    fn reload(&mut self) -> Result<()>;

    /// The path the document was opened from.
    fn path(&self) -> &str;
}

/// A rectangle as large as the page.
pub fn page_rect<P: PageBackend + ?Sized>(page: &P) -> Rect {
    let (w, h) = page.size();
    Rect::from_size(w, h)
}
