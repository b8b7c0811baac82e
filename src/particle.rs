//! Particle data shape and its behavior policies.
//!
//! There is one particle type. Variation between "bouncing", "wrapping" and
//! "pointer-reactive" particles is expressed by the [`Behavior`] each particle
//! carries, selected from configuration:
//!
//! - [`BoundaryPolicy`] decides what happens at the canvas edge.
//! - [`InteractionPolicy`] decides how the particle reacts to the pointer and
//!   to its neighbors.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::pointer::Pointer;
use crate::render::{Canvas, Rgb, Rgba};
use crate::scene::{FrameContext, Updatable};

/// Edge behavior applied after every move step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Flip the velocity component on the violated axis and keep the
    /// particle inside `[radius, extent - radius]`.
    #[default]
    Reflect,
    /// Re-enter from the opposite edge.
    Wrap,
    /// Move freely; particles may leave the canvas.
    None,
}

/// How a particle reacts to the pointer and to nearby particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionPolicy {
    /// No reaction; particles draw at full opacity.
    None,
    /// Highlight ramps up by `step` per tick (capped at `cap`) while the
    /// pointer is within its radius, and back down to zero otherwise.
    PointerFade { step: f32, cap: f32 },
    /// Approaching pairs closer than `distance` bounce off each other.
    PairwiseRepel { distance: f32 },
}

impl Default for InteractionPolicy {
    fn default() -> Self {
        InteractionPolicy::PointerFade { step: 0.05, cap: 1.0 }
    }
}

/// Behavior bundle shared by every particle of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Behavior {
    pub boundary: BoundaryPolicy,
    pub interaction: InteractionPolicy,
    /// Opacity of a pointer-fade particle that is not highlighted.
    pub rest_opacity: f32,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::default(),
            interaction: InteractionPolicy::default(),
            rest_opacity: 0.6,
        }
    }
}

/// A point with velocity, a dot radius and a pointer highlight level.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Pixels per 60 Hz frame.
    pub velocity: Vec2,
    pub radius: f32,
    /// Interaction opacity driven by pointer proximity.
    pub highlight: f32,
    pub behavior: Behavior,
    /// Fill at full opacity; the drawn alpha is scaled by [`Particle::opacity`].
    pub fill: Rgba,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
            highlight: 0.0,
            behavior: Behavior::default(),
            fill: Rgb::WHITE.with_alpha(1.0),
        }
    }

    /// Random position inside the bounds, random velocity up to `max_speed`
    /// on each axis.
    pub fn random<R: Rng>(rng: &mut R, bounds: Vec2, radius: f32, max_speed: f32) -> Self {
        let x = random_within(rng, radius, bounds.x);
        let y = random_within(rng, radius, bounds.y);
        let speed = max_speed.abs();
        let velocity = Vec2::new(rng.gen_range(-speed..=speed), rng.gen_range(-speed..=speed));
        Self::new(Vec2::new(x, y), velocity, radius)
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_fill(mut self, fill: Rgba) -> Self {
        self.fill = fill;
        self
    }

    /// One full-frame move step.
    pub fn move_within(&mut self, bounds: Vec2) {
        self.advance(bounds, 1.0);
    }

    /// Move by `velocity * step` and apply the boundary policy.
    ///
    /// With [`BoundaryPolicy::Reflect`], a velocity component flips when the
    /// particle already violates that axis or the projected position would
    /// cross it. Both axes may flip in the same step.
    pub fn advance(&mut self, bounds: Vec2, step: f32) {
        match self.behavior.boundary {
            BoundaryPolicy::Reflect => {
                self.velocity.x = reflect_axis(self.position.x, self.velocity.x, self.radius, bounds.x, step);
                self.velocity.y = reflect_axis(self.position.y, self.velocity.y, self.radius, bounds.y, step);
                self.position += self.velocity * step;
                self.position.x = clamp_axis(self.position.x, self.radius, bounds.x);
                self.position.y = clamp_axis(self.position.y, self.radius, bounds.y);
            }
            BoundaryPolicy::Wrap => {
                self.position += self.velocity * step;
                self.position.x = wrap_axis(self.position.x, bounds.x);
                self.position.y = wrap_axis(self.position.y, bounds.y);
            }
            BoundaryPolicy::None => self.position += self.velocity * step,
        }
    }

    /// Ramp the highlight toward its cap or back toward zero.
    pub fn interact(&mut self, pointer: &Pointer, step: f32) {
        if let InteractionPolicy::PointerFade { step: fade, cap } = self.behavior.interaction {
            if pointer.influences(self.position) {
                self.highlight = (self.highlight + fade * step).min(cap);
            } else {
                self.highlight = (self.highlight - fade * step).max(0.0);
            }
        }
    }

    /// Opacity multiplier for the dot.
    pub fn opacity(&self) -> f32 {
        match self.behavior.interaction {
            InteractionPolicy::PointerFade { .. } => self.highlight.max(self.behavior.rest_opacity),
            _ => 1.0,
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.fill_circle(self.position, self.radius, self.fill.fade(self.opacity()));
    }
}

impl Updatable for Particle {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.draw(ctx.canvas);
        self.interact(ctx.pointer, ctx.step);
        let bounds = ctx.canvas.extent();
        self.advance(bounds, ctx.step);
    }
}

/// Exchange the normal velocity components of two particles that are closer
/// than `distance` and moving toward each other.
///
/// Returns `true` when the pair bounced.
pub fn repel(a: &mut Particle, b: &mut Particle, distance: f32) -> bool {
    let delta = b.position - a.position;
    let dist_sq = delta.length_squared();
    if dist_sq >= distance * distance || dist_sq == 0.0 {
        return false;
    }
    let normal = delta / dist_sq.sqrt();
    let closing = (a.velocity - b.velocity).dot(normal);
    if closing <= 0.0 {
        return false;
    }
    a.velocity -= normal * closing;
    b.velocity += normal * closing;
    true
}

fn reflect_axis(pos: f32, vel: f32, radius: f32, extent: f32, step: f32) -> f32 {
    let next = pos + vel * step;
    let outside = pos - radius < 0.0 || pos + radius > extent;
    let crossing = next - radius < 0.0 || next + radius > extent;
    if outside || crossing {
        -vel
    } else {
        vel
    }
}

fn clamp_axis(pos: f32, radius: f32, extent: f32) -> f32 {
    if extent < radius * 2.0 {
        extent * 0.5
    } else {
        pos.max(radius).min(extent - radius)
    }
}

/// Fold `value` into `[0, extent)`. A tiny negative value rounds up to
/// `extent` under `rem_euclid`, which is folded back to the near edge.
fn wrap_axis(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return value;
    }
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

fn random_within<R: Rng>(rng: &mut R, radius: f32, extent: f32) -> f32 {
    if extent > radius * 2.0 {
        rng.gen_range(radius..extent - radius)
    } else {
        extent * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::PointerConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fading(position: Vec2) -> Particle {
        Particle::new(position, Vec2::ZERO, 1.0)
    }

    #[test]
    fn test_corner_reflection() {
        let mut p = Particle::new(Vec2::new(8.5, 8.5), Vec2::new(2.0, 2.0), 1.0);
        p.move_within(Vec2::new(10.0, 10.0));

        assert_eq!(p.velocity, Vec2::new(-2.0, -2.0));
        assert_eq!(p.position, Vec2::new(6.5, 6.5));
    }

    #[test]
    fn test_reflection_flips_only_violated_axis() {
        let mut p = Particle::new(Vec2::new(8.5, 5.0), Vec2::new(2.0, 1.0), 1.0);
        p.move_within(Vec2::new(10.0, 10.0));

        assert_eq!(p.velocity, Vec2::new(-2.0, 1.0));
        assert_eq!(p.position, Vec2::new(6.5, 6.0));
    }

    #[test]
    fn test_reflection_when_already_outside() {
        let mut p = Particle::new(Vec2::new(-3.0, 5.0), Vec2::new(1.0, 0.0), 1.0);
        p.move_within(Vec2::new(10.0, 10.0));

        assert_eq!(p.velocity.x, -1.0);
        assert_eq!(p.position.x, 1.0);
    }

    #[test]
    fn test_reflect_keeps_particle_inside_tiny_canvas() {
        let mut p = Particle::new(Vec2::new(0.5, 0.5), Vec2::new(3.0, -3.0), 2.0);
        p.move_within(Vec2::new(1.0, 1.0));
        assert_eq!(p.position, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_wrap_reenters_opposite_edge() {
        let mut p = Particle::new(Vec2::new(9.5, 0.5), Vec2::new(1.0, -1.0), 1.0).with_behavior(Behavior {
            boundary: BoundaryPolicy::Wrap,
            ..Default::default()
        });
        p.move_within(Vec2::new(10.0, 10.0));

        assert!((p.position.x - 0.5).abs() < 1e-5);
        assert!((p.position.y - 9.5).abs() < 1e-5);
        assert_eq!(p.velocity, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_wrap_tiny_negative_lands_on_near_edge() {
        let mut p = Particle::new(Vec2::new(0.0, 5.0), Vec2::new(-1e-7, 0.0), 1.0).with_behavior(Behavior {
            boundary: BoundaryPolicy::Wrap,
            ..Default::default()
        });
        p.move_within(Vec2::new(50.0, 50.0));
        assert!((0.0..50.0).contains(&p.position.x), "x = {}", p.position.x);
        assert_eq!(wrap_axis(-1e-7, 50.0), 0.0);
        assert_eq!(wrap_axis(-0.5, 50.0), 49.5);
    }

    #[test]
    fn test_unbounded_particle_leaves_canvas() {
        let mut p = Particle::new(Vec2::new(9.5, 5.0), Vec2::new(2.0, 0.0), 1.0).with_behavior(Behavior {
            boundary: BoundaryPolicy::None,
            ..Default::default()
        });
        p.move_within(Vec2::new(10.0, 10.0));
        assert_eq!(p.position.x, 11.5);
    }

    #[test]
    fn test_highlight_ramps_and_caps() {
        let mut pointer = Pointer::new(&PointerConfig::default());
        pointer.set_coordinates(0.0, 0.0);

        let mut p = fading(Vec2::new(10.0, 0.0));
        for _ in 0..30 {
            p.interact(&pointer, 1.0);
        }
        assert_eq!(p.highlight, 1.0);

        pointer.set_coordinates(500.0, 500.0);
        for _ in 0..30 {
            p.interact(&pointer, 1.0);
        }
        assert_eq!(p.highlight, 0.0);
    }

    #[test]
    fn test_highlight_is_monotonic_per_step() {
        let mut pointer = Pointer::new(&PointerConfig::default());
        pointer.set_coordinates(0.0, 0.0);
        let steps = [0.5, 1.0, 0.25, 3.0];

        let mut p = fading(Vec2::new(10.0, 0.0));
        p.interact(&pointer, 0.5);
        assert!((p.highlight - 0.025).abs() < 1e-6);
        for i in 0..60 {
            let before = p.highlight;
            p.interact(&pointer, steps[i % steps.len()]);
            assert!(p.highlight >= before);
            assert!(p.highlight <= 1.0);
        }
        assert_eq!(p.highlight, 1.0);

        pointer.clear_coordinates();
        p.interact(&pointer, 0.25);
        assert!((p.highlight - 0.9875).abs() < 1e-6);
        for i in 0..60 {
            let before = p.highlight;
            p.interact(&pointer, steps[i % steps.len()]);
            assert!(p.highlight <= before);
            assert!(p.highlight >= 0.0);
        }
        assert_eq!(p.highlight, 0.0);
    }

    #[test]
    fn test_opacity_respects_rest_level() {
        let mut p = fading(Vec2::ZERO);
        assert_eq!(p.opacity(), 0.6);
        p.highlight = 0.9;
        assert_eq!(p.opacity(), 0.9);

        p.behavior.interaction = InteractionPolicy::None;
        assert_eq!(p.opacity(), 1.0);
    }

    #[test]
    fn test_repel_exchanges_normal_velocity() {
        let mut a = Particle::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 1.0);
        let mut b = Particle::new(Vec2::new(2.0, 0.0), Vec2::new(-1.0, 0.0), 1.0);
        assert!(repel(&mut a, &mut b, 5.0));
        assert_eq!(a.velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(1.0, 0.0));

        // Separating now, so a second call leaves them alone
        assert!(!repel(&mut a, &mut b, 5.0));
    }

    #[test]
    fn test_random_particles_spawn_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = Vec2::new(200.0, 100.0);
        for _ in 0..100 {
            let p = Particle::random(&mut rng, bounds, 2.0, 1.5);
            assert!(p.position.x >= 2.0 && p.position.x <= 198.0);
            assert!(p.position.y >= 2.0 && p.position.y <= 98.0);
            assert!(p.velocity.x.abs() <= 1.5 && p.velocity.y.abs() <= 1.5);
        }
    }
}
