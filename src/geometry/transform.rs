//! Axis-aligned transforms between document and device coordinates.
//!
//! The viewer never rotates, so a transform is a scale followed by a
//! translation per axis. Operations compose like a matrix stack: the call
//! applied last acts on the source coordinates first.

use crate::geometry::rect::Rect;

/// A scale-and-translate transform: `device = (sx * x + tx, sy * y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Horizontal scale
    pub sx: f64,
    /// Vertical scale
    pub sy: f64,
    /// Horizontal translation
    pub tx: f64,
    /// Vertical translation
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Post-compose a translation: subsequent sources are shifted before
    /// the current transform applies.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.tx += self.sx * dx;
        self.ty += self.sy * dy;
    }

    /// Post-compose a scale.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.sx *= sx;
        self.sy *= sy;
    }

    /// Map a document point to device coordinates.
    pub fn to_device(&self, x: f64, y: f64) -> (f64, f64) {
        (self.sx * x + self.tx, self.sy * y + self.ty)
    }

    /// Map a device point back to document coordinates.
    pub fn to_user(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.tx) / self.sx, (y - self.ty) / self.sy)
    }

    /// Map a device distance to a document distance.
    pub fn to_user_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.sx, dy / self.sy)
    }

    /// Map a document rectangle to device coordinates.
    pub fn map_rect(&self, r: &Rect) -> Rect {
        let (x1, y1) = self.to_device(r.x1, r.y1);
        let (x2, y2) = self.to_device(r.x2, r.y2);
        Rect::new(x1, y1, x2, y2)
    }

    /// Compose this transform so that `src` (document) maps onto `dst`
    /// (device).
    ///
    /// * `horizontal`: scale so `src` fits `dst` horizontally, aspect
    ///   preserved.
    /// * `vertical`: the same vertically.
    /// * neither: non-uniform scale to exactly `dst`, unless `ratio`
    ///   shrinks the larger scale to preserve the aspect.
    /// * `top_align`/`left_align`: pin `src` to the top/left edge of `dst`
    ///   instead of centering on that axis.
    pub fn map_to(
        &mut self,
        dst: &Rect,
        src: &Rect,
        horizontal: bool,
        vertical: bool,
        ratio: bool,
        top_align: bool,
        left_align: bool,
    ) {
        let src_w = src.width();
        let src_h = src.height();
        let dst_w = dst.width();
        let dst_h = dst.height();

        let mut scale_x = dst_w / src_w;
        let mut scale_y;
        if horizontal {
            scale_y = scale_x;
        } else {
            scale_y = dst_h / src_h;
            if vertical {
                scale_x = scale_y;
            } else {
                if ratio && scale_x > scale_y {
                    scale_x = scale_y;
                }
                if ratio && scale_y > scale_x {
                    scale_y = scale_x;
                }
            }
        }

        let mut margin_x = dst.x1 + (dst_w - src_w * scale_x) / 2.0;
        let mut margin_y = dst.y1 + (dst_h - src_h * scale_y) / 2.0;
        if top_align {
            margin_y = dst.y1;
        }
        if left_align {
            margin_x = dst.x1;
        }

        // Like a matrix stack: the translation added last applies to the
        // source first.
        self.translate(margin_x, margin_y);
        self.scale(scale_x, scale_y);
        self.translate(-src.x1, -src.y1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut t = Transform::identity();
        t.scale(2.0, 3.0);
        t.translate(10.0, 20.0);
        let (dx, dy) = t.to_device(5.0, 5.0);
        assert_eq!((dx, dy), (30.0, 75.0));
        let (ux, uy) = t.to_user(dx, dy);
        assert!((ux - 5.0).abs() < 1e-9);
        assert!((uy - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_to_horizontal_fit() {
        let mut t = Transform::identity();
        let dst = Rect::new(0.0, 0.0, 200.0, 100.0);
        let src = Rect::new(50.0, 50.0, 150.0, 250.0);
        t.map_to(&dst, &src, true, false, true, true, true);
        // src width 100 maps to dst width 200: scale 2 on both axes.
        let mapped = t.map_rect(&src);
        assert!((mapped.x1 - 0.0).abs() < 1e-9);
        assert!((mapped.x2 - 200.0).abs() < 1e-9);
        assert!((mapped.y1 - 0.0).abs() < 1e-9);
        assert!((mapped.height() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_to_both_stretches() {
        let mut t = Transform::identity();
        let dst = Rect::new(10.0, 10.0, 210.0, 110.0);
        let src = Rect::new(0.0, 0.0, 100.0, 100.0);
        t.map_to(&dst, &src, false, false, false, false, false);
        let mapped = t.map_rect(&src);
        assert!((mapped.x1 - 10.0).abs() < 1e-9);
        assert!((mapped.y1 - 10.0).abs() < 1e-9);
        assert!((mapped.x2 - 210.0).abs() < 1e-9);
        assert!((mapped.y2 - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_to_centers() {
        let mut t = Transform::identity();
        let dst = Rect::new(0.0, 0.0, 200.0, 200.0);
        let src = Rect::new(0.0, 0.0, 100.0, 50.0);
        // Horizontal fit, no top align: vertically centered.
        t.map_to(&dst, &src, true, false, true, false, true);
        let mapped = t.map_rect(&src);
        assert!((mapped.y1 - 50.0).abs() < 1e-9);
        assert!((mapped.y2 - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_to_after_aspect_scale() {
        // An aspect pre-scale composed before map_to still maps src onto the
        // counter-scaled destination, as the viewer does.
        let aspect = 1.25;
        let mut t = Transform::identity();
        t.scale(1.0, aspect);
        let mut dst = Rect::new(0.0, 0.0, 100.0, 100.0);
        dst.y1 /= aspect;
        dst.y2 /= aspect;
        let src = Rect::new(0.0, 0.0, 50.0, 50.0);
        t.map_to(&dst, &src, true, false, true, true, true);
        let mapped = t.map_rect(&src);
        assert!((mapped.x2 - 100.0).abs() < 1e-9);
        // The vertical extent is the horizontal one times the aspect.
        assert!((mapped.y2 - 125.0).abs() < 1e-9);
    }
}
