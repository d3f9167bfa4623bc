//! The drawing canvas shared by every device.
//!
//! A pixmap plus the current document-to-device transform and an optional
//! clip mask. Rectangle operations take document coordinates and go through
//! the transform; text ignores the transform scale (the UI always draws
//! under the identity) but honors the transformed position.

use tiny_skia::{
    BlendMode, Color, FillRule, Mask, Paint, PathBuilder, Pixmap, Shader, Stroke,
    Transform as SkTransform,
};

use crate::device::font::{FontExtents, UiFont};
use crate::geometry::{Rect, Transform};

/// Build an opaque color from 0..1 components.
pub fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::from_rgba(r, g, b, 1.0).unwrap_or(Color::BLACK)
}

/// A 2D canvas with a transform stack of depth one.
pub struct Canvas {
    pixmap: Pixmap,
    transform: Transform,
    clip: Option<Mask>,
    font: UiFont,
}

impl Canvas {
    /// Allocate a canvas of the given pixel size.
    pub fn new(width: u32, height: u32, font: UiFont) -> Canvas {
        let pixmap = Pixmap::new(width.max(1), height.max(1))
            .unwrap_or_else(|| Pixmap::new(1, 1).unwrap());
        Canvas {
            pixmap,
            transform: Transform::identity(),
            clip: None,
            font,
        }
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> f64 {
        self.pixmap.width() as f64
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> f64 {
        self.pixmap.height() as f64
    }

    /// The pixel buffer, for devices to blit from.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Replace the pixel buffer with a new size, dropping content and clip.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(pixmap) = Pixmap::new(width.max(1), height.max(1)) {
            self.pixmap = pixmap;
        }
        self.clip = None;
        self.transform = Transform::identity();
    }

    /// Reset to the identity transform.
    pub fn set_identity(&mut self) {
        self.transform = Transform::identity();
    }

    /// Install a document-to-device transform.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// The current transform.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Font metrics of the UI font.
    pub fn font_extents(&self) -> FontExtents {
        self.font.extents()
    }

    /// Advance width of `text` in pixels.
    pub fn text_width(&self, text: &str) -> f64 {
        self.font.text_width(text)
    }

    /// Fill the whole canvas, ignoring transform and clip.
    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(color);
    }

    /// Fill a rectangle given in current user coordinates.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_rect_blend(rect, color, BlendMode::SourceOver);
    }

    /// Fill a rectangle with an explicit blend mode (the search highlight
    /// uses difference, so it stays visible on any page content).
    pub fn fill_rect_blend(&mut self, rect: Rect, color: Color, blend_mode: BlendMode) {
        let mut r = self.transform.map_rect(&rect);
        r.normalize();
        let Some(sk) = tiny_skia::Rect::from_ltrb(r.x1 as f32, r.y1 as f32, r.x2 as f32, r.y2 as f32)
        else {
            return;
        };
        let paint = Paint {
            shader: Shader::SolidColor(color),
            blend_mode,
            anti_alias: false,
            ..Paint::default()
        };
        self.pixmap
            .fill_rect(sk, &paint, SkTransform::identity(), self.clip.as_ref());
    }

    /// Stroke the outline of a rectangle given in current user coordinates.
    pub fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        let mut r = self.transform.map_rect(&rect);
        r.normalize();
        let Some(sk) = tiny_skia::Rect::from_ltrb(r.x1 as f32, r.y1 as f32, r.x2 as f32, r.y2 as f32)
        else {
            return;
        };
        let path = PathBuilder::from_rect(sk);
        let paint = Paint {
            shader: Shader::SolidColor(color),
            anti_alias: true,
            ..Paint::default()
        };
        let stroke = Stroke {
            width: line_width as f32,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &paint,
            &stroke,
            SkTransform::identity(),
            self.clip.as_ref(),
        );
    }

    /// Draw text with its baseline at `(x, y)` in current user coordinates.
    /// Glyphs are not scaled by the transform.
    pub fn show_text(&mut self, x: f64, y: f64, text: &str, color: Color) {
        let (dx, dy) = self.transform.to_device(x, y);
        self.font
            .draw(&mut self.pixmap, dx, dy, text, color, self.clip.as_ref());
    }

    /// Restrict painting to `bounds` minus the `holes`, all in current user
    /// coordinates. Holes are enlarged by `enlarge` on every side. Replaces
    /// any previous clip.
    pub fn clip_exclude(&mut self, bounds: Rect, holes: &[Rect], enlarge: f64) {
        let mut builder = PathBuilder::new();
        let b = self.transform.map_rect(&bounds);
        if let Some(sk) =
            tiny_skia::Rect::from_ltrb(b.x1 as f32, b.y1 as f32, b.x2 as f32, b.y2 as f32)
        {
            builder.push_rect(sk);
        }
        for hole in holes {
            let mut h = *hole;
            h.expand(enlarge, enlarge);
            let h = self.transform.map_rect(&h);
            if let Some(sk) =
                tiny_skia::Rect::from_ltrb(h.x1 as f32, h.y1 as f32, h.x2 as f32, h.y2 as f32)
            {
                builder.push_rect(sk);
            }
        }
        let Some(path) = builder.finish() else {
            return;
        };
        let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };
        mask.fill_path(&path, FillRule::EvenOdd, false, SkTransform::identity());
        self.clip = Some(mask);
    }

    /// Copy an opaque RGB image to the device position `(x, y)`, honoring
    /// the clip. Backends render the page at the transform's scale and
    /// blit the result here.
    pub fn blit_rgb(&mut self, data: &[u8], width: u32, height: u32, x: f64, y: f64) {
        let Some(mut src) = Pixmap::new(width.max(1), height.max(1)) else {
            return;
        };
        let pixels = src.data_mut();
        for i in 0..(width as usize * height as usize) {
            let Some(rgb) = data.get(i * 3..i * 3 + 3) else {
                break;
            };
            pixels[i * 4] = rgb[0];
            pixels[i * 4 + 1] = rgb[1];
            pixels[i * 4 + 2] = rgb[2];
            pixels[i * 4 + 3] = 255;
        }
        self.pixmap.draw_pixmap(
            x as i32,
            y as i32,
            src.as_ref(),
            &tiny_skia::PixmapPaint::default(),
            SkTransform::identity(),
            self.clip.as_ref(),
        );
    }

    /// Restrict painting to `rect`, in current user coordinates. Replaces
    /// any previous clip.
    pub fn clip_rect(&mut self, rect: Rect) {
        let r = self.transform.map_rect(&rect);
        let Some(sk) = tiny_skia::Rect::from_ltrb(r.x1 as f32, r.y1 as f32, r.x2 as f32, r.y2 as f32)
        else {
            return;
        };
        let path = PathBuilder::from_rect(sk);
        let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };
        mask.fill_path(&path, FillRule::Winding, false, SkTransform::identity());
        self.clip = Some(mask);
    }

    /// Remove the clip.
    pub fn reset_clip(&mut self) {
        self.clip = None;
    }
}
