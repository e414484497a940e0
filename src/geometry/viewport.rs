//! Screen/image coordinate mapping.
//!
//! The host drives pan and zoom; the controller only reads the mapping to
//! turn screen-space pointer positions into image pixels and to scale its
//! hit-test thresholds.

use serde::{Deserialize, Serialize};

use super::Point;
use crate::constants::viewport::{MAX_OFFSET_FRACTION, MAX_SCALE, MIN_SCALE, ZOOM_FACTOR};

/// Pan/zoom state for one image.
///
/// A screen pixel `(sx, sy)` maps to image pixel
/// `(sx / scale + offset_x, sy / scale + offset_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub image_width: f32,
    pub image_height: f32,
}

impl Viewport {
    /// Create an identity viewport for an image of the given size.
    pub fn new(image_width: f32, image_height: f32) -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            image_width,
            image_height,
        }
    }

    /// Create a viewport with explicit scale and offset. The offset is clamped.
    pub fn with_transform(mut self, scale: f32, offset_x: f32, offset_y: f32) -> Self {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self.clamp_offset();
        self
    }

    /// Map a screen position to image coordinates.
    pub fn screen_to_image(&self, sx: f32, sy: f32) -> Point {
        Point::new(sx / self.scale + self.offset_x, sy / self.scale + self.offset_y)
    }

    /// Map an image position back to screen coordinates.
    pub fn image_to_screen(&self, p: &Point) -> (f32, f32) {
        (
            (p.x - self.offset_x) * self.scale,
            (p.y - self.offset_y) * self.scale,
        )
    }

    /// Convert a screen-space distance into image pixels.
    pub fn screen_distance(&self, distance: f32) -> f32 {
        distance / self.scale
    }

    /// Zoom to `new_scale` keeping the image point under the cursor fixed.
    pub fn zoom_at(&mut self, new_scale: f32, cursor_x: f32, cursor_y: f32) {
        let anchor = self.screen_to_image(cursor_x, cursor_y);
        self.scale = new_scale.clamp(MIN_SCALE, MAX_SCALE);
        self.offset_x = anchor.x - cursor_x / self.scale;
        self.offset_y = anchor.y - cursor_y / self.scale;
        self.clamp_offset();
        log::trace!(
            "Viewport zoom {:.2}x at ({:.1}, {:.1}), offset ({:.1}, {:.1})",
            self.scale,
            cursor_x,
            cursor_y,
            self.offset_x,
            self.offset_y
        );
    }

    /// Zoom in (positive) or out (negative) by whole factor steps.
    pub fn zoom_step(&mut self, steps: i32, cursor_x: f32, cursor_y: f32) {
        self.zoom_at(self.scale * ZOOM_FACTOR.powi(steps), cursor_x, cursor_y);
    }

    /// Pan by a screen-space delta (content follows the pointer).
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.offset_x -= dx / self.scale;
        self.offset_y -= dy / self.scale;
        self.clamp_offset();
    }

    /// Reset to identity scale and zero offset.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.offset_x = 0.0;
        self.offset_y = 0.0;
    }

    fn clamp_offset(&mut self) {
        let max_x = self.image_width * MAX_OFFSET_FRACTION;
        let max_y = self.image_height * MAX_OFFSET_FRACTION;
        self.offset_x = self.offset_x.clamp(-max_x, max_x);
        self.offset_y = self.offset_y.clamp(-max_y, max_y);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity_mapping() {
        let v = Viewport::new(100.0, 100.0);
        assert_eq!(v.screen_to_image(12.0, 34.0), Point::new(12.0, 34.0));
    }

    #[test]
    fn test_scaled_mapping() {
        let v = Viewport::new(200.0, 200.0).with_transform(2.0, 10.0, 20.0);
        let p = v.screen_to_image(40.0, 60.0);
        assert!(approx_eq(p.x, 30.0));
        assert!(approx_eq(p.y, 50.0));
        let (sx, sy) = v.image_to_screen(&p);
        assert!(approx_eq(sx, 40.0));
        assert!(approx_eq(sy, 60.0));
    }

    #[test]
    fn test_zoom_at_preserves_cursor_point() {
        let mut v = Viewport::new(500.0, 500.0).with_transform(1.0, 50.0, 30.0);
        let before = v.screen_to_image(150.0, 120.0);
        v.zoom_at(2.0, 150.0, 120.0);
        let after = v.screen_to_image(150.0, 120.0);
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
        assert_eq!(v.scale, 2.0);
    }

    #[test]
    fn test_offset_clamped_to_ninety_percent() {
        let mut v = Viewport::new(100.0, 50.0);
        v.pan_by(-1000.0, 1000.0);
        assert!(approx_eq(v.offset_x, 90.0));
        assert!(approx_eq(v.offset_y, -45.0));
    }

    #[test]
    fn test_screen_distance_scales_inversely() {
        let v = Viewport::new(100.0, 100.0).with_transform(4.0, 0.0, 0.0);
        assert!(approx_eq(v.screen_distance(8.0), 2.0));
    }

    #[test]
    fn test_zoom_steps_cancel_out() {
        let mut v = Viewport::new(100.0, 100.0);
        v.zoom_step(2, 10.0, 10.0);
        assert!(approx_eq(v.scale, ZOOM_FACTOR * ZOOM_FACTOR));
        v.zoom_step(-2, 10.0, 10.0);
        assert!(approx_eq(v.scale, 1.0));
    }

    #[test]
    fn test_scale_is_clamped() {
        let mut v = Viewport::new(100.0, 100.0);
        v.zoom_at(1000.0, 0.0, 0.0);
        assert_eq!(v.scale, MAX_SCALE);
    }
}
