//! Drawing surface contract and the connection fade.
//!
//! The simulation never talks to a concrete raster. It draws through the
//! [`Canvas`] trait, which exposes only the primitive verbs the particle field
//! needs: clear, filled rectangle, stroked line, filled circle.
//! [`PixelCanvas`](crate::canvas::PixelCanvas) is the software implementation
//! shipped with the crate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque 8-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Attach an alpha in `[0, 1]`.
    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: a.clamp(0.0, 1.0),
        }
    }
}

/// Color with a floating-point alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    /// Scale the alpha, keeping it in `[0, 1]`.
    pub fn fade(self, factor: f32) -> Rgba {
        Rgba {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// A sized 2D drawing surface.
///
/// Coordinates are in pixels with the origin at the top-left corner and y
/// growing downwards. Drawing outside the surface is clipped silently.
pub trait Canvas {
    /// Surface size in pixels as `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Overwrite every pixel with an opaque color.
    fn clear(&mut self, color: Rgb);

    /// Alpha-blend a filled axis-aligned rectangle.
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba);

    /// Alpha-blend a line segment of the given width.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);

    /// Alpha-blend a filled disc.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Surface size as a vector, convenient for bounds math.
    fn extent(&self) -> Vec2 {
        let (w, h) = self.size();
        Vec2::new(w as f32, h as f32)
    }
}

/// Opacity of a connection between two points `distance_sq` apart.
///
/// Fades linearly with distance: `(1 - sqrt(distance_sq / threshold_sq)) *
/// global_opacity`. Returns `None` when the pair is not connected, i.e. at or
/// beyond the threshold.
#[inline]
pub fn connection_opacity(distance_sq: f32, threshold_sq: f32, global_opacity: f32) -> Option<f32> {
    if distance_sq < threshold_sq {
        Some((1.0 - (distance_sq / threshold_sq).sqrt()) * global_opacity)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_opacity_scenario() {
        let opacity = connection_opacity(100.0, 120.0 * 120.0, 1.0).unwrap();
        assert!((opacity - (1.0 - 10.0 / 120.0)).abs() < 1e-6);
        assert!((opacity - 0.9167).abs() < 1e-3);
    }

    #[test]
    fn test_connection_opacity_edges() {
        assert_eq!(connection_opacity(0.0, 400.0, 0.5), Some(0.5));
        assert_eq!(connection_opacity(400.0, 400.0, 1.0), None);
        assert_eq!(connection_opacity(500.0, 400.0, 1.0), None);
    }

    #[test]
    fn test_with_alpha_clamps() {
        assert_eq!(Rgb::WHITE.with_alpha(2.0).a, 1.0);
        assert_eq!(Rgb::WHITE.with_alpha(0.5).fade(0.5).a, 0.25);
    }
}
