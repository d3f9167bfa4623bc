//! Synthetic in-memory documents.
//!
//! A deterministic backend for tests and smoke runs: pages are built from
//! lines of text laid out on a fixed character grid, so the text-area
//! decomposition of every page is known in advance. Rendering fills the
//! character cells, which is enough to exercise transforms and clipping.

use crate::backend::{CharBox, DocumentBackend, PageBackend, TextAttr};
use crate::device::{rgb, Canvas};
use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Builder for one synthetic page.
#[derive(Debug, Clone)]
pub struct SimPage {
    width: f64,
    height: f64,
    chars: Vec<CharBox>,
    attrs: Vec<TextAttr>,
    has_annotations: bool,
    has_actions: bool,
}

impl SimPage {
    /// An empty page of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            chars: Vec::new(),
            attrs: Vec::new(),
            has_annotations: false,
            has_actions: false,
        }
    }

    /// Lay out `text` starting at `(x, y)` on a grid of `char_w` by
    /// `char_h` cells, in the given font. Spaces get real rectangles, as
    /// backends report them.
    pub fn line(mut self, x: f64, y: f64, text: &str, char_w: f64, char_h: f64, font: &str) -> Self {
        let start = self.chars.len();
        for (i, ch) in text.chars().enumerate() {
            let cx = x + i as f64 * char_w;
            self.chars.push(CharBox {
                ch,
                rect: Rect::new(cx, y, cx + char_w, y + char_h),
            });
        }
        if !text.is_empty() {
            self.push_attr(font, start, self.chars.len() - 1);
        }
        self
    }

    /// A line of 6 by 10 point characters in a regular font, terminated by
    /// a newline character as layout backends emit.
    pub fn text_line(self, x: f64, y: f64, text: &str) -> Self {
        self.line(x, y, text, 6.0, 10.0, "Sim-Regular").newline()
    }

    /// Append an explicit newline character (zero-width, at the line end),
    /// as layout backends emit between lines.
    pub fn newline(mut self) -> Self {
        let rect = match self.chars.last() {
            Some(c) => Rect::new(c.rect.x2, c.rect.y1, c.rect.x2, c.rect.y2),
            None => Rect::default(),
        };
        let index = self.chars.len();
        self.chars.push(CharBox { ch: '\n', rect });
        self.push_attr("Sim-Regular", index, index);
        self
    }

    /// Mark the page as carrying non-link annotations.
    pub fn with_annotations(mut self) -> Self {
        self.has_annotations = true;
        self
    }

    /// Mark the page as carrying non-link actions.
    pub fn with_actions(mut self) -> Self {
        self.has_actions = true;
        self
    }

    fn push_attr(&mut self, font: &str, start: usize, end: usize) {
        if let Some(last) = self.attrs.last_mut() {
            if last.font_name == font && last.end + 1 == start {
                last.end = end;
                return;
            }
        }
        self.attrs.push(TextAttr {
            font_name: font.to_string(),
            start,
            end,
        });
    }
}

impl PageBackend for SimPage {
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
        if needle.is_empty() {
            return Vec::new();
        }
        let needle: Vec<char> = needle.chars().flat_map(|c| c.to_lowercase()).collect();
        let chars: Vec<char> = self
            .chars
            .iter()
            .map(|c| c.ch.to_lowercase().next().unwrap_or(c.ch))
            .collect();
        let mut found = Vec::new();
        for start in 0..chars.len().saturating_sub(needle.len() - 1) {
            if chars[start..start + needle.len()] != needle[..] {
                continue;
            }
            let mut rect = self.chars[start].rect;
            for c in &self.chars[start + 1..start + needle.len()] {
                rect = rect.join(&c.rect);
            }
            // Reported with bottom-left origin, as real backends do.
            let y1 = self.height - rect.y2;
            let y2 = self.height - rect.y1;
            found.push(Rect::new(rect.x1, y1, rect.x2, y2));
        }
        found
    }

    fn has_annotations(&self) -> bool {
        self.has_annotations
    }

    fn has_actions(&self) -> bool {
        self.has_actions
    }

    fn render(&self, canvas: &mut Canvas) {
        let ink = rgb(0.25, 0.25, 0.25);
        for c in &self.chars {
            if c.ch != ' ' && c.ch != '\n' {
                let mut cell = c.rect;
                cell.expand(-0.5, -1.0);
                canvas.fill_rect(cell, ink);
            }
        }
    }
}

/// A synthetic document: a vector of pages plus a version counter standing
/// in for the file's update id.
#[derive(Debug, Clone)]
pub struct SimDocument {
    pages: Vec<SimPage>,
    replacement: Option<Vec<SimPage>>,
    version: u64,
    path: String,
}

impl SimDocument {
    /// A document over the given pages.
    pub fn new(pages: Vec<SimPage>) -> Self {
        Self {
            pages,
            replacement: None,
            version: 0,
            path: "sim.pdf".to_string(),
        }
    }

    /// Stage different content to appear at the next reload, as if the
    /// file were replaced on disk.
    pub fn stage_replacement(&mut self, pages: Vec<SimPage>) {
        self.replacement = Some(pages);
        self.version += 1;
    }

    /// A document of `count` identical simple text pages.
    pub fn uniform(count: usize, build: impl Fn(usize) -> SimPage) -> Self {
        Self::new((0..count).map(build).collect())
    }
}

impl DocumentBackend for SimDocument {
    type Page = SimPage;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, index: usize) -> Result<SimPage> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(Error::PageOutOfRange(index))
    }

    fn update_id(&self) -> Option<Vec<u8>> {
        Some(self.version.to_le_bytes().to_vec())
    }

    fn reload(&mut self) -> Result<()> {
        if let Some(pages) = self.replacement.take() {
            self.pages = pages;
        }
        if self.pages.is_empty() {
            return Err(Error::EmptyDocument);
        }
        Ok(())
    }

    fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::page_rect;

    #[test]
    fn test_line_layout() {
        let page = SimPage::new(612.0, 792.0).line(50.0, 100.0, "ab c", 6.0, 10.0, "Sim-Regular");
        assert_eq!(page.chars().len(), 4);
        assert_eq!(page.chars()[0].rect, Rect::new(50.0, 100.0, 56.0, 110.0));
        assert_eq!(page.chars()[3].ch, 'c');
        assert_eq!(page.attributes().len(), 1);
        assert_eq!(page.attributes()[0].end, 3);
        assert_eq!(page_rect(&page), Rect::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_text_line_appends_newline() {
        let page = SimPage::new(612.0, 792.0).text_line(50.0, 100.0, "ab");
        assert_eq!(page.chars().len(), 3);
        assert_eq!(page.chars()[2].ch, '\n');
        assert_eq!(page.chars()[2].rect.width(), 0.0);
        // The newline run merges into the line's attribute run.
        assert_eq!(page.attributes().len(), 1);
    }

    #[test]
    fn test_find_text_flips_origin() {
        let page = SimPage::new(612.0, 792.0).text_line(50.0, 100.0, "hello");
        let found = page.find_text("HeLLo");
        assert_eq!(found.len(), 1);
        // y flipped: the match sits at height - y.
        assert_eq!(found[0], Rect::new(50.0, 682.0, 80.0, 692.0));
        assert!(page.find_text("absent").is_empty());
    }

    #[test]
    fn test_reload_replacement() {
        let mut doc = SimDocument::new(vec![SimPage::new(612.0, 792.0); 3]);
        assert_eq!(doc.page_count(), 3);
        let before = doc.update_id();
        doc.stage_replacement(vec![SimPage::new(612.0, 792.0)]);
        assert_ne!(doc.update_id(), before);
        doc.reload().unwrap();
        assert_eq!(doc.page_count(), 1);
    }
}
