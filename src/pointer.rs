//! Pointer proxy consulted by particles for highlight and repulsion.
//!
//! The pointer remembers the last position reported by the input source and
//! carries an influence radius. Movement grows the radius, every simulation
//! tick shrinks it, so the influence swells while the cursor moves and decays
//! back to rest once it stops.
//!
//! ```
//! use plexus::pointer::{Pointer, PointerConfig};
//!
//! let mut pointer = Pointer::new(&PointerConfig::default());
//! assert!(pointer.position().is_none());
//!
//! pointer.set_coordinates(40.0, 30.0);
//! pointer.increase_radius(1000.0);
//! assert_eq!(pointer.radius(), 180.0);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Pointer radius limits and per-event steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Radius at startup.
    pub radius: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Added on every pointer-move event.
    pub grow_step: f32,
    /// Removed on every simulation tick.
    pub decay_step: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            radius: 120.0,
            min_radius: 0.0,
            max_radius: 180.0,
            grow_step: 10.0,
            decay_step: 2.0,
        }
    }
}

/// Last-known pointer position plus a bounded influence radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Pointer {
    position: Option<Vec2>,
    radius: f32,
    min_radius: f32,
    max_radius: f32,
}

impl Pointer {
    /// Create a pointer with no known position.
    ///
    /// The starting radius is clamped into `[min_radius, max_radius]`.
    pub fn new(config: &PointerConfig) -> Self {
        let mut pointer = Self {
            position: None,
            radius: config.radius,
            min_radius: config.min_radius,
            max_radius: config.max_radius,
        };
        pointer.radius = pointer.clamp(config.radius);
        pointer
    }

    /// Overwrite the last-known position.
    pub fn set_coordinates(&mut self, x: f32, y: f32) {
        self.position = Some(Vec2::new(x, y));
    }

    /// Forget the position, e.g. when the cursor leaves the window.
    pub fn clear_coordinates(&mut self) {
        self.position = None;
    }

    /// Grow the radius, saturating at `max_radius`.
    pub fn increase_radius(&mut self, delta: f32) {
        self.radius = self.clamp(self.radius + delta);
    }

    /// Shrink the radius, saturating at `min_radius`.
    pub fn reduce_radius(&mut self, delta: f32) {
        self.radius = self.clamp(self.radius - delta);
    }

    /// Euclidean distance to `point`, or `None` before the first input event.
    pub fn distance_to(&self, point: Vec2) -> Option<f32> {
        self.position.map(|p| p.distance(point))
    }

    /// Whether `point` lies strictly inside the current influence radius.
    pub fn influences(&self, point: Vec2) -> bool {
        self.distance_to(point).is_some_and(|d| d < self.radius)
    }

    #[inline]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn min_radius(&self) -> f32 {
        self.min_radius
    }

    #[inline]
    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    fn clamp(&self, radius: f32) -> f32 {
        // f32::clamp panics on inverted bounds
        radius.min(self.max_radius).max(self.min_radius)
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::new(&PointerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_starts_without_position() {
        let pointer = Pointer::default();
        assert!(pointer.position().is_none());
        assert!(pointer.distance_to(Vec2::ZERO).is_none());
        assert!(!pointer.influences(Vec2::ZERO));
        assert_eq!(pointer.radius(), 120.0);
    }

    #[test]
    fn test_radius_saturates_at_bounds() {
        let mut pointer = Pointer::default();
        pointer.increase_radius(100.0);
        assert_eq!(pointer.radius(), 180.0);

        pointer.reduce_radius(500.0);
        assert_eq!(pointer.radius(), 0.0);
    }

    #[test]
    fn test_initial_radius_is_clamped() {
        let pointer = Pointer::new(&PointerConfig {
            radius: 400.0,
            ..Default::default()
        });
        assert_eq!(pointer.radius(), 180.0);
    }

    #[test]
    fn test_distance_and_influence() {
        let mut pointer = Pointer::default();
        pointer.set_coordinates(0.0, 0.0);
        assert_eq!(pointer.distance_to(Vec2::new(3.0, 4.0)), Some(5.0));
        assert!(pointer.influences(Vec2::new(3.0, 4.0)));
        assert!(!pointer.influences(Vec2::new(120.0, 0.0)));

        pointer.clear_coordinates();
        assert!(!pointer.influences(Vec2::new(3.0, 4.0)));
    }
}
