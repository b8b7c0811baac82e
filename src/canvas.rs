//! Software RGBA raster.
//!
//! [`PixelCanvas`] is the default [`Canvas`]: an opaque RGBA8 buffer with
//! alpha blending, anti-aliased lines (Wu's algorithm for hairlines, coverage
//! sampling for thicker strokes) and anti-aliased discs. The buffer is laid
//! out row-major, top row first, which is what both the GPU upload and PNG
//! export expect.

use std::path::Path;

use glam::Vec2;

use crate::error::ConfigError;
use crate::render::{Canvas, Rgb, Rgba};

/// Lines up to this width use the hairline rasterizer.
const HAIRLINE_WIDTH: f32 = 1.5;

/// Opaque RGBA8 pixel buffer.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl PixelCanvas {
    /// Create a black canvas. Fails on a zero dimension.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroSurface { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; width as usize * height as usize],
        })
    }

    /// Resize and clear to black.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Encode the canvas as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        image::save_buffer(
            path,
            self.pixels(),
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )
    }

    /// Blend `color` into one pixel, scaled by `coverage`.
    #[inline]
    fn blend(&mut self, x: i32, y: i32, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let a = color.a * coverage.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let px = &mut self.pixels[(y as u32 * self.width + x as u32) as usize];
        px[0] = mix(px[0], color.r, a);
        px[1] = mix(px[1], color.g, a);
        px[2] = mix(px[2], color.b, a);
    }

    /// Wu's anti-aliased line, one pixel wide.
    fn hairline(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        // Wu works on pixel centers
        let (mut x0, mut y0) = (from.x - 0.5, from.y - 0.5);
        let (mut x1, mut y1) = (to.x - 0.5, to.y - 0.5);
        let color = color.fade(width.min(1.0));

        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let gradient = if dx == 0.0 { 1.0 } else { (y1 - y0) / dx };

        let plot = |canvas: &mut Self, major: i32, minor: i32, coverage: f32| {
            if steep {
                canvas.blend(minor, major, color, coverage);
            } else {
                canvas.blend(major, minor, color, coverage);
            }
        };

        let xend = x0.round();
        let yend = y0 + gradient * (xend - x0);
        let xgap = 1.0 - fract(x0 + 0.5);
        let xpxl1 = xend as i32;
        let ypxl1 = yend.floor() as i32;
        plot(self, xpxl1, ypxl1, (1.0 - fract(yend)) * xgap);
        plot(self, xpxl1, ypxl1 + 1, fract(yend) * xgap);
        let mut intery = yend + gradient;

        let xend = x1.round();
        let yend = y1 + gradient * (xend - x1);
        let xgap = fract(x1 + 0.5);
        let xpxl2 = xend as i32;
        let ypxl2 = yend.floor() as i32;
        if xpxl2 != xpxl1 {
            plot(self, xpxl2, ypxl2, (1.0 - fract(yend)) * xgap);
            plot(self, xpxl2, ypxl2 + 1, fract(yend) * xgap);
        }

        for x in (xpxl1 + 1)..xpxl2 {
            let y = intery.floor() as i32;
            plot(self, x, y, 1.0 - fract(intery));
            plot(self, x, y + 1, fract(intery));
            intery += gradient;
        }
    }

    /// Thick line: coverage from the distance of each pixel center to the
    /// segment, one pixel of soft edge.
    fn thick_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        let half = width * 0.5;
        let pad = half + 1.0;
        let min = from.min(to) - Vec2::splat(pad);
        let max = from.max(to) + Vec2::splat(pad);
        let Some((x0, y0, x1, y1)) = self.clip(min, max) else {
            return;
        };

        let segment = to - from;
        let len_sq = segment.length_squared();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    ((p - from).dot(segment) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = p.distance(from + segment * t);
                self.blend(x, y, color, half + 0.5 - d);
            }
        }
    }

    /// Pixel range `[x0, x1) x [y0, y1)` covering `min..max`, clipped to the
    /// canvas. `None` when nothing is visible.
    fn clip(&self, min: Vec2, max: Vec2) -> Option<(i32, i32, i32, i32)> {
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(self.width as f32);
        let y1 = max.y.ceil().min(self.height as f32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as i32, y0 as i32, x1 as i32, y1 as i32))
    }
}

impl Canvas for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) {
        self.pixels.fill([color.r, color.g, color.b, 255]);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        let Some((x0, y0, x1, y1)) = self.clip(origin, origin + size) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, 1.0);
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        if !(width > 0.0) {
            return;
        }
        if width <= HAIRLINE_WIDTH {
            self.hairline(from, to, color, width);
        } else {
            self.thick_line(from, to, color, width);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if !(radius > 0.0) {
            return;
        }
        let pad = Vec2::splat(radius + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(center - pad, center + pad) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
                self.blend(x, y, color, radius + 0.5 - d);
            }
        }
    }
}

#[inline]
fn fract(v: f32) -> f32 {
    v - v.floor()
}

#[inline]
fn mix(dst: u8, src: u8, a: f32) -> u8 {
    (dst as f32 + (src as f32 - dst as f32) * a).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_canvas_is_rejected() {
        assert!(matches!(
            PixelCanvas::new(0, 10),
            Err(ConfigError::ZeroSurface { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_clear_and_pixel_bytes() {
        let mut canvas = PixelCanvas::new(4, 3).unwrap();
        canvas.clear(Rgb::new(10, 20, 30));
        assert_eq!(canvas.pixels().len(), 4 * 3 * 4);
        assert_eq!(canvas.pixel(3, 2), Some([10, 20, 30, 255]));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn test_fill_rect_blends() {
        let mut canvas = PixelCanvas::new(4, 4).unwrap();
        canvas.clear(Rgb::WHITE);
        canvas.fill_rect(Vec2::ZERO, Vec2::new(4.0, 4.0), Rgb::BLACK.with_alpha(0.25));
        assert_eq!(canvas.pixel(2, 2), Some([191, 191, 191, 255]));
    }

    #[test]
    fn test_horizontal_hairline_covers_row() {
        let mut canvas = PixelCanvas::new(10, 10).unwrap();
        canvas.stroke_line(Vec2::new(1.0, 5.5), Vec2::new(9.0, 5.5), Rgb::WHITE.with_alpha(1.0), 1.0);
        for x in 2..8 {
            assert_eq!(canvas.pixel(x, 5), Some([255, 255, 255, 255]), "x = {}", x);
            assert_eq!(canvas.pixel(x, 2), Some([0, 0, 0, 255]));
        }
    }

    #[test]
    fn test_thick_line_is_wider() {
        let mut canvas = PixelCanvas::new(20, 20).unwrap();
        canvas.stroke_line(Vec2::new(2.0, 10.0), Vec2::new(18.0, 10.0), Rgb::WHITE.with_alpha(1.0), 4.0);
        assert_eq!(canvas.pixel(10, 8), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(10, 11), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(10, 15), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_circle_is_clipped_at_edges() {
        let mut canvas = PixelCanvas::new(8, 8).unwrap();
        canvas.fill_circle(Vec2::new(0.0, 0.0), 3.0, Rgb::WHITE.with_alpha(1.0));
        assert_eq!(canvas.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(7, 7), Some([0, 0, 0, 255]));

        // Entirely off-canvas draws are ignored
        canvas.fill_circle(Vec2::new(-50.0, -50.0), 3.0, Rgb::WHITE.with_alpha(1.0));
        canvas.stroke_line(Vec2::new(-50.0, -50.0), Vec2::new(-40.0, -45.0), Rgb::WHITE.with_alpha(1.0), 3.0);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut canvas = PixelCanvas::new(16, 8).unwrap();
        canvas.fill_circle(Vec2::new(8.0, 4.0), 3.0, Rgb::WHITE.with_alpha(1.0));
        canvas.save_png(&path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (16, 8));
        assert_eq!(decoded.as_raw().as_slice(), canvas.pixels());
    }
}
