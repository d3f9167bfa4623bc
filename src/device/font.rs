//! UI text rendering.
//!
//! The overlay windows draw their prompts and lists with a monospace system
//! font found through fontdb, shaped by rustybuzz and filled as tiny-skia
//! paths. Headless environments without any installed font fall back to
//! fixed cell metrics with no glyph painting, so layout code and tests
//! never depend on the host font set.

use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use rustybuzz::UnicodeBuffer;
use tiny_skia::{
    Color, FillRule, Mask, Paint, PathBuilder, Pixmap, Shader, Transform as SkTransform,
};

/// Vertical and horizontal metrics of the UI font.
#[derive(Debug, Clone, Copy)]
pub struct FontExtents {
    /// Distance from the baseline to the top of the tallest glyph.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the deepest glyph.
    pub descent: f64,
    /// Recommended line height.
    pub height: f64,
    /// Advance of the widest glyph; the font is monospace, so this is the
    /// advance of every glyph.
    pub max_x_advance: f64,
}

/// A sized monospace font for the overlay windows.
pub struct UiFont {
    data: Option<(Vec<u8>, u32)>,
    size: f64,
    extents: FontExtents,
}

impl UiFont {
    /// Load the system monospace font at the given size in pixels.
    ///
    /// Falls back to metrics-only cells when no font is available.
    pub fn monospace(size: f64) -> UiFont {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let bold = fontdb::Query {
            families: &[fontdb::Family::Monospace],
            weight: fontdb::Weight::BOLD,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        let normal = fontdb::Query {
            families: &[fontdb::Family::Monospace],
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        let data = db
            .query(&bold)
            .or_else(|| db.query(&normal))
            .and_then(|id| db.with_face_data(id, |data, index| (data.to_vec(), index)));

        match data {
            Some((bytes, index)) => {
                let extents = face_extents(&bytes, index, size)
                    .unwrap_or_else(|| fallback_extents(size));
                UiFont {
                    data: Some((bytes, index)),
                    size,
                    extents,
                }
            }
            None => {
                log::warn!("no monospace font found, UI text disabled");
                UiFont {
                    data: None,
                    size,
                    extents: fallback_extents(size),
                }
            }
        }
    }

    /// A metrics-only font (no glyph painting). Used by tests.
    pub fn metrics_only(size: f64) -> UiFont {
        UiFont {
            data: None,
            size,
            extents: fallback_extents(size),
        }
    }

    /// The font metrics.
    pub fn extents(&self) -> FontExtents {
        self.extents
    }

    /// Horizontal advance of a string.
    pub fn text_width(&self, text: &str) -> f64 {
        match &self.data {
            Some((bytes, index)) => {
                let face = match rustybuzz::Face::from_slice(bytes, *index) {
                    Some(face) => face,
                    None => return text.chars().count() as f64 * self.extents.max_x_advance,
                };
                let scale = self.size / face.units_per_em() as f64;
                let mut buffer = UnicodeBuffer::new();
                buffer.push_str(text);
                let glyphs = rustybuzz::shape(&face, &[], buffer);
                glyphs
                    .glyph_positions()
                    .iter()
                    .map(|p| p.x_advance as f64 * scale)
                    .sum()
            }
            None => text.chars().count() as f64 * self.extents.max_x_advance,
        }
    }

    /// Paint a string with its baseline at `(x, y)` in pixmap coordinates.
    pub fn draw(
        &self,
        pixmap: &mut Pixmap,
        x: f64,
        y: f64,
        text: &str,
        color: Color,
        mask: Option<&Mask>,
    ) {
        let Some((bytes, index)) = &self.data else {
            return;
        };
        let Some(face) = rustybuzz::Face::from_slice(bytes, *index) else {
            return;
        };
        let scale = self.size / face.units_per_em() as f64;

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        let glyphs = rustybuzz::shape(&face, &[], buffer);

        let paint = Paint {
            shader: Shader::SolidColor(color),
            anti_alias: true,
            ..Paint::default()
        };

        let mut pen_x = x;
        for (info, pos) in glyphs.glyph_infos().iter().zip(glyphs.glyph_positions()) {
            let gx = pen_x + pos.x_offset as f64 * scale;
            let gy = y - pos.y_offset as f64 * scale;
            let mut outline = GlyphOutline::new(gx, gy, scale);
            if face
                .outline_glyph(GlyphId(info.glyph_id as u16), &mut outline)
                .is_some()
            {
                if let Some(path) = outline.builder.finish() {
                    pixmap.fill_path(
                        &path,
                        &paint,
                        FillRule::Winding,
                        SkTransform::identity(),
                        mask,
                    );
                }
            }
            pen_x += pos.x_advance as f64 * scale;
        }
    }
}

fn face_extents(bytes: &[u8], index: u32, size: f64) -> Option<FontExtents> {
    let face = rustybuzz::Face::from_slice(bytes, index)?;
    let scale = size / face.units_per_em() as f64;
    let ascent = face.ascender() as f64 * scale;
    let descent = -(face.descender() as f64) * scale;
    let height = ascent + descent + face.line_gap() as f64 * scale;
    let advance = face
        .glyph_index('M')
        .and_then(|g| face.glyph_hor_advance(g))
        .map(|a| a as f64 * scale)
        .unwrap_or(size * 0.6);
    Some(FontExtents {
        ascent,
        descent,
        height,
        max_x_advance: advance,
    })
}

fn fallback_extents(size: f64) -> FontExtents {
    FontExtents {
        ascent: size * 0.8,
        descent: size * 0.2,
        height: size * 1.2,
        max_x_advance: size * 0.6,
    }
}

/// Adapter from the font outline callbacks to a tiny-skia path, flipping
/// the y axis and scaling from font units to pixels.
struct GlyphOutline {
    builder: PathBuilder,
    x: f64,
    y: f64,
    scale: f64,
}

impl GlyphOutline {
    fn new(x: f64, y: f64, scale: f64) -> Self {
        Self {
            builder: PathBuilder::new(),
            x,
            y,
            scale,
        }
    }

    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (self.x + x as f64 * self.scale) as f32,
            (self.y - y as f64 * self.scale) as f32,
        )
    }
}

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_only_extents() {
        let font = UiFont::metrics_only(20.0);
        let e = font.extents();
        assert!((e.height - 24.0).abs() < 1e-9);
        assert!((e.max_x_advance - 12.0).abs() < 1e-9);
        assert_eq!(font.text_width("abcd"), 4.0 * e.max_x_advance);
    }

    #[test]
    fn test_metrics_only_draw_is_noop() {
        let font = UiFont::metrics_only(16.0);
        let mut pixmap = Pixmap::new(10, 10).unwrap();
        font.draw(
            &mut pixmap,
            0.0,
            8.0,
            "hi",
            Color::from_rgba8(0, 0, 0, 255),
            None,
        );
    }
}
