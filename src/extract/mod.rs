//! Paragraph-aware text extraction.
//!
//! Walks the character stream of a page together with its font attributes
//! and emits text into a [`Format`], reconstructing paragraphs from the
//! geometry: an explicit newline after a short line, a vertical jump, a
//! block transition, or a detected column start. A hyphen immediately
//! before a line end is suppressed and the next character concatenates
//! without a space.

mod format;

pub use format::Format;

use std::io::Write;

use crate::backend::{DocumentBackend, PageBackend, TextAttr};
use crate::error::{Error, Result};
use crate::geometry::{BlockOrder, Rect};
use crate::layout::text_area;

/// How the printable area of a page is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// The whole page, with column detection.
    CropBox,
    /// The bounding box of the text.
    BoundingBox,
    /// The text-area decomposition, paragraph breaks at block transitions.
    TextArea,
    /// One pass per block, blocks in reading order.
    #[default]
    SortedBlocks,
}

/// Geometry thresholds of the paragraph heuristic. Deltas in points,
/// percentages of the block size.
#[derive(Debug, Clone, Copy)]
pub struct Measure {
    /// More vertical delta than this is a new line.
    pub newline: f64,
    /// More vertical delta than this is a new paragraph.
    pub newpar: f64,
    /// A line ending before this percentage of the block width is short.
    pub rightreturn: f64,
    /// Horizontal delta percentage that, with [`Measure::newcolumny`],
    /// signals a new column.
    pub newcolumnx: f64,
    /// Upward vertical delta percentage that, with
    /// [`Measure::newcolumnx`], signals a new column.
    pub newcolumny: f64,
    /// More indentation than this at the start of a line is a paragraph.
    pub indent: f64,
    /// Characters at the begin and end of a page ignored by the column
    /// scan.
    pub headfooter: usize,
    /// Block separation distance of the text-area decomposition.
    pub blockdistance: f64,
}

impl Default for Measure {
    fn default() -> Self {
        Self {
            newline: 8.0,
            newpar: 25.0,
            rightreturn: 80.0,
            newcolumnx: 30.0,
            newcolumny: 40.0,
            indent: 6.0,
            headfooter: 20,
            blockdistance: 15.0,
        }
    }
}

/// The pending character carried between lines, boxes and pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// Nothing printed yet.
    Start,
    /// Nothing pending.
    None,
    /// A line break turned into a space.
    Space,
    /// A suppressed end-of-line hyphen: concatenate.
    Hyphen,
}

/// Extraction state threaded through boxes and pages.
#[derive(Debug, Clone)]
pub struct ExtractState {
    newpar: bool,
    pending: Pending,
}

impl ExtractState {
    /// The state at the start of a document.
    pub fn new() -> Self {
        Self {
            newpar: false,
            pending: Pending::Start,
        }
    }
}

impl Default for ExtractState {
    fn default() -> Self {
        Self::new()
    }
}

/// The extractor: mode, thresholds, format and block order.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    /// Printable-area selection.
    pub mode: ExtractionMode,
    /// Paragraph thresholds.
    pub measure: Measure,
    /// Output format.
    pub format: Format,
    /// Block order for [`ExtractionMode::SortedBlocks`].
    pub order: BlockOrder,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::SortedBlocks,
            measure: Measure::default(),
            format: Format::text(),
            order: BlockOrder::TwoStep,
        }
    }
}

impl TextExtractor {
    /// Extractor with the given format and defaults otherwise.
    pub fn with_format(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Extract a whole document.
    pub fn document<B: DocumentBackend>(&self, w: &mut dyn Write, doc: &B) -> Result<()> {
        self.pages(w, doc, 0, doc.page_count())
    }

    /// Extract the page range `[first, last)`.
    pub fn pages<B: DocumentBackend>(
        &self,
        w: &mut dyn Write,
        doc: &B,
        first: usize,
        last: usize,
    ) -> Result<()> {
        let mut state = ExtractState::new();
        for n in first..last.min(doc.page_count()) {
            let page = doc.load_page(n)?;
            self.page(w, &page, &mut state)?;
        }
        self.end(w, &state)?;
        Ok(())
    }

    /// Extract one page, threading `state` from the previous call.
    pub fn page<P: PageBackend + ?Sized>(
        &self,
        w: &mut dyn Write,
        page: &P,
        state: &mut ExtractState,
    ) -> Result<()> {
        if self.mode != ExtractionMode::SortedBlocks {
            return self.show_box(w, page, None, state);
        }
        let mut blocks = text_area::text_area(page, self.measure.blockdistance).into_vec();
        let chars: Vec<Rect> = page.chars().iter().map(|c| c.rect).collect();
        self.order.sort(&mut blocks, &chars);
        for block in &blocks {
            self.show_box(w, page, Some(block), state)?;
        }
        Ok(())
    }

    /// Close the last paragraph.
    pub fn end(&self, w: &mut dyn Write, state: &ExtractState) -> Result<()> {
        if state.pending != Pending::Start {
            w.write_all(self.format.par_end.as_bytes())?;
        }
        Ok(())
    }

    /// Emit the characters of `zone` (or of the mode's printable area when
    /// `zone` is `None`).
    fn show_box<P: PageBackend + ?Sized>(
        &self,
        w: &mut dyn Write,
        page: &P,
        zone: Option<&Rect>,
        state: &mut ExtractState,
    ) -> Result<()> {
        let chars = page.chars();
        let attrs = page.attributes();
        if chars.is_empty() || attrs.is_empty() {
            return Ok(());
        }

        let measure = &self.measure;
        let format = &self.format;

        // the area to print
        let (textarea, detect_columns): (Vec<Rect>, bool) = match (zone, self.mode) {
            (Some(z), _) => (vec![*z], false),
            (None, ExtractionMode::CropBox) => (vec![crate::backend::page_rect(page)], true),
            (None, ExtractionMode::BoundingBox) => (
                vec![text_area::bounding_box(page)
                    .unwrap_or_else(|| crate::backend::page_rect(page))],
                false,
            ),
            (None, _) => (
                text_area::text_area(page, measure.blockdistance).into_vec(),
                false,
            ),
        };

        let mut current_block: Option<Rect> = None;
        let mut left = 0.0;
        let mut y = 0.0;
        let mut short_line = false;
        let mut start_column = true;
        let mut italic = false;
        let mut bold = false;
        let mut new_face = true;

        let mut attr_index = 0;
        let mut attr = &attrs[0];

        for (count, c) in chars.iter().enumerate() {
            let crect = c.rect;
            let next_ch = chars.get(count + 1).map(|n| n.ch);
            if let Some(z) = zone {
                if !z.contains(&crect) {
                    continue;
                }
            }

            // the attribute run of this character; per-block passes skip
            // characters, so the run is looked up rather than counted
            if count < attr.start || count > attr.end {
                if let Some(idx) = attrs
                    .iter()
                    .position(|a| a.start <= count && count <= a.end)
                {
                    if idx != attr_index {
                        self.face(w, false, false, &mut italic, &mut bold, &attrs[idx])?;
                        attr_index = idx;
                        attr = &attrs[idx];
                        new_face = true;
                    }
                }
            }

            // the text block this character belongs to
            let mut new_line = false;
            match current_block {
                Some(tr) if tr.contains(&crect) => {}
                _ => {
                    let tr = match textarea.iter().find(|t| t.contains(&crect)) {
                        Some(t) => *t,
                        None if c.ch == ' ' => crect,
                        None => {
                            return Err(Error::OutsideBlocks(format!(
                                "'{}' at {}",
                                c.ch, crect
                            )))
                        }
                    };
                    left = tr.x1;
                    y = tr.y1 - measure.newline - 1.0;
                    current_block = Some(tr);
                    new_line = true;
                }
            }
            let tr = current_block.unwrap_or(crect);

            // explicit or implicit end of line
            if c.ch == '\n' || new_line {
                if short_line {
                    state.newpar = true;
                } else {
                    state.pending = match state.pending {
                        Pending::Hyphen | Pending::Start => Pending::None,
                        _ => Pending::Space,
                    };
                }
            }

            if c.ch != '\n' {
                // new column
                if detect_columns && new_column(y, &crect, left, &tr, measure) {
                    start_column = true;
                }
                if detect_columns && start_column {
                    let mut min_left = f64::MAX;
                    let mut min_y = f64::MAX;
                    let from = measure.headfooter.max(count);
                    for r in chars
                        .iter()
                        .take(chars.len().saturating_sub(measure.headfooter))
                        .skip(from)
                    {
                        min_left = min_left.min(r.rect.x1);
                        min_y = min_y.min(r.rect.y1);
                    }
                    if min_left == f64::MAX {
                        min_y = 0.0; // few characters, force a paragraph
                    } else {
                        left = min_left;
                    }
                    y = min_y - measure.newline - 1.0;
                    start_column = false;
                }

                // vertical jump
                if crect.y1 - y > measure.newline {
                    if crect.y1 - y > measure.newpar {
                        state.newpar = true;
                    }
                    y = crect.y1;
                    if crect.x1 - left > measure.indent {
                        state.newpar = true;
                    }
                }

                // paragraph break or pending character
                if state.newpar {
                    self.face(w, false, true, &mut italic, &mut bold, attr)?;
                    if state.pending != Pending::Start {
                        w.write_all(format.par_end.as_bytes())?;
                    }
                    w.write_all(format.par_start.as_bytes())?;
                    self.face(w, true, true, &mut italic, &mut bold, attr)?;
                } else {
                    match state.pending {
                        Pending::Space => w.write_all(b" ")?,
                        Pending::Hyphen => w.write_all(b"-")?,
                        _ => {}
                    }
                }

                // open the face of the current attribute run
                if new_face && c.ch != ' ' {
                    self.face(w, true, false, &mut italic, &mut bold, attr)?;
                    new_face = false;
                }

                self.character(w, c.ch, next_ch, state)?;

                short_line =
                    crect.x2 - left < (tr.x2 - left) * measure.rightreturn / 100.0;
                state.newpar = false;
            }

        }

        // close the faces left open at the end of the box
        self.face(w, false, true, &mut italic, &mut bold, attr)?;

        if short_line {
            state.newpar = true;
        }
        Ok(())
    }

    /// Emit one character with the format's escapes. A hyphen before the
    /// end of a line or of the input is held back instead.
    fn character(
        &self,
        w: &mut dyn Write,
        ch: char,
        next: Option<char>,
        state: &mut ExtractState,
    ) -> Result<()> {
        let format = &self.format;
        state.pending = Pending::None;
        match ch {
            '\\' => w.write_all(format.backslash.as_bytes())?,
            '.' if state.newpar => w.write_all(format.first_dot.as_bytes())?,
            '<' => w.write_all(format.less.as_bytes())?,
            '>' => w.write_all(format.greater.as_bytes())?,
            '&' => w.write_all(format.and.as_bytes())?,
            '-' if matches!(next, None | Some('\n')) => state.pending = Pending::Hyphen,
            _ => {
                let mut buf = [0u8; 4];
                w.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
            }
        }
        Ok(())
    }

    /// Start or end a font face.
    ///
    /// `start` opens the new face, otherwise the previous one is closed;
    /// `reset` temporarily closes or restores all active faces around a
    /// paragraph break (only for formats that ask for it).
    fn face(
        &self,
        w: &mut dyn Write,
        start: bool,
        reset: bool,
        italic: &mut bool,
        bold: &mut bool,
        attr: &TextAttr,
    ) -> Result<()> {
        let format = &self.format;
        if reset && !format.reset {
            return Ok(());
        }

        let new_italic = attr.is_italic();
        let new_bold = attr.is_bold();

        if start && !reset && !format.font_name.is_empty() {
            let announced = format.font_name.replace("%s", &attr.font_name);
            w.write_all(announced.as_bytes())?;
        }

        if start {
            if !new_italic && !new_bold {
                w.write_all(format.plain.as_bytes())?;
            } else if new_italic && !new_bold {
                w.write_all(format.italic.as_bytes())?;
            } else if !new_italic && new_bold {
                w.write_all(format.bold.as_bytes())?;
            }
            if new_italic && new_bold {
                w.write_all(format.bold_italic.as_bytes())?;
            }
        }
        if !start && reset {
            w.write_all(format.plain.as_bytes())?;
        }

        if !start {
            if *bold && new_bold == reset {
                w.write_all(format.bold_end.as_bytes())?;
            }
            if *italic && new_italic == reset {
                w.write_all(format.italic_end.as_bytes())?;
            }
        } else {
            if *italic == reset && new_italic {
                w.write_all(format.italic_begin.as_bytes())?;
            }
            if *bold == reset && new_bold {
                w.write_all(format.bold_begin.as_bytes())?;
            }
        }

        if start && !reset {
            *italic = new_italic;
            *bold = new_bold;
        }
        Ok(())
    }
}

/// Whether the jump to `crect` looks like the start of a new column: far
/// to the right and well above the previous baseline.
fn new_column(y: f64, crect: &Rect, left: f64, tr: &Rect, measure: &Measure) -> bool {
    crect.x1 - left > tr.width() * measure.newcolumnx / 100.0
        && y - crect.y1 > tr.height() * measure.newcolumny / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sim::{SimDocument, SimPage};

    fn extract(page: SimPage, extractor: &TextExtractor) -> String {
        let doc = SimDocument::new(vec![page]);
        let mut out = Vec::new();
        extractor.document(&mut out, &doc).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_paragraph() {
        let page = SimPage::new(612.0, 792.0)
            .text_line(50.0, 100.0, "hello world this line is long enough")
            .text_line(50.0, 112.0, "and continues here");
        let text = extract(page, &TextExtractor::default());
        assert_eq!(
            text,
            "hello world this line is long enough and continues here\n"
        );
    }

    #[test]
    fn test_vertical_gap_breaks_paragraph() {
        // Tall lines 28 pt apart: the inter-line white stays below the
        // block distance (one block), while the jump exceeds the paragraph
        // threshold.
        let page = SimPage::new(612.0, 792.0)
            .line(50.0, 100.0, "first paragraph line that runs to the edge", 6.0, 14.0, "Sim-Regular")
            .newline()
            .line(50.0, 128.0, "second paragraph far below the first one xx", 6.0, 14.0, "Sim-Regular")
            .newline();
        let text = extract(page, &TextExtractor::default());
        assert_eq!(text.matches('\n').count(), 2, "got: {text:?}");
        assert!(text.contains("edge\nsecond"), "got: {text}");
    }

    #[test]
    fn test_short_line_breaks_paragraph() {
        let page = SimPage::new(612.0, 792.0)
            .text_line(50.0, 100.0, "stub.")
            .text_line(50.0, 112.0, "a much longer line that opens the following paragraph");
        let text = extract(page, &TextExtractor::default());
        assert!(text.contains("stub.\na much"), "got: {text}");
    }

    #[test]
    fn test_hyphen_suppressed() {
        let page = SimPage::new(612.0, 792.0)
            .text_line(50.0, 100.0, "this long line ends with a famous exam-")
            .text_line(50.0, 112.0, "ple of a hyphenated word in running text");
        let text = extract(page, &TextExtractor::default());
        assert!(text.contains("example"), "got: {text}");
        assert!(!text.contains("exam- ple"));
    }

    #[test]
    fn test_line_break_becomes_space() {
        let page = SimPage::new(612.0, 792.0)
            .text_line(50.0, 100.0, "first line that takes the whole width xx")
            .text_line(50.0, 112.0, "second line right below it continuing on");
        let text = extract(page, &TextExtractor::default());
        assert!(text.contains("xx second"), "got: {text}");
    }

    #[test]
    fn test_html_faces() {
        let page = SimPage::new(612.0, 792.0)
            .line(50.0, 100.0, "plain ", 6.0, 10.0, "Sim-Regular")
            .line(86.0, 100.0, "slanted", 6.0, 10.0, "Sim-Italic")
            .line(128.0, 100.0, " after", 6.0, 10.0, "Sim-Regular");
        let text = extract(page, &TextExtractor::with_format(Format::html()));
        assert!(text.contains("<i>slanted</i>"), "got: {text}");
    }

    #[test]
    fn test_escapes() {
        let page = SimPage::new(612.0, 792.0)
            .text_line(50.0, 100.0, "a<b>c&d");
        let text = extract(page, &TextExtractor::with_format(Format::html()));
        assert!(text.contains("a&lt;b&gt;c&amp;d"), "got: {text}");
    }

    #[test]
    fn test_two_columns_in_reading_order() {
        let mut page = SimPage::new(612.0, 792.0);
        for n in 0..8 {
            let y = 100.0 + n as f64 * 12.0;
            page = page
                .text_line(50.0, y, "leftcol text with some words here")
                .text_line(320.0, y, "rightcol text with more words too");
        }
        let text = extract(page, &TextExtractor::default());
        let left_pos = text.find("leftcol").unwrap();
        let right_pos = text.find("rightcol").unwrap();
        assert!(left_pos < right_pos);
        // All of the left column precedes all of the right column.
        let last_left = text.rfind("leftcol").unwrap();
        assert!(last_left < right_pos);
    }

    #[test]
    fn test_roff_leading_dot_escaped() {
        // A dot opening a paragraph would read as a roff macro.
        let page = SimPage::new(612.0, 792.0)
            .text_line(50.0, 100.0, "intro.")
            .text_line(50.0, 112.0, ".TH looks like a macro in the output");
        let text = extract(page, &TextExtractor::with_format(Format::roff()));
        assert!(text.contains("\\[char46]TH"), "got: {text}");
    }
}
