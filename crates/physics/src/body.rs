use crate::config::HISTORY_LEN;
use cgmath::{prelude::*, Vector2};
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Centres closer than this are treated as coincident.
pub const MIN_SEPARATION: f64 = 1e-9;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u64);

impl BodyId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BodyId({})", self.0)
    }
}

/// A circular rigid body with translational state only.
///
/// `movable` is fixed at creation: static bodies never move but still attract
/// and collide. `active` says whether a movable body is currently integrated;
/// it is cleared while the body is being authored.
#[derive(Clone, Debug)]
pub struct Body {
    id: BodyId,
    pos: Vector2<f64>,
    vel: Vector2<f64>,
    mass: f64,
    radius: f64,
    movable: bool,
    active: bool,
    /// Most recent first. Always full.
    history: [Vector2<f64>; HISTORY_LEN],
    trajectory: Option<Vec<Vector2<f64>>>,
    color: u32,
}

impl Body {
    pub fn new(
        pos: Vector2<f64>,
        radius: f64,
        mass: f64,
        movable: bool,
        active: bool,
    ) -> anyhow::Result<Body> {
        anyhow::ensure!(
            pos.x.is_finite() && pos.y.is_finite(),
            "body position must be finite, got ({}, {})",
            pos.x,
            pos.y
        );
        anyhow::ensure!(
            radius > 0.0 && radius.is_finite(),
            "body radius must be positive, got {radius}"
        );
        anyhow::ensure!(
            mass > 0.0 && mass.is_finite(),
            "body mass must be positive, got {mass}"
        );
        let id = BodyId::next();
        Ok(Body {
            id,
            pos,
            vel: Vector2::zero(),
            mass,
            radius,
            movable,
            active: movable && active,
            history: [pos; HISTORY_LEN],
            trajectory: None,
            color: (id.0 as u32).wrapping_mul(0x9e37_79b9) | 0xff,
        })
    }

    pub fn id(&self) -> BodyId {
        self.id
    }
    pub fn pos(&self) -> Vector2<f64> {
        self.pos
    }
    pub fn vel(&self) -> Vector2<f64> {
        self.vel
    }
    pub fn speed(&self) -> f64 {
        self.vel.magnitude()
    }
    pub fn mass(&self) -> f64 {
        self.mass
    }
    pub fn radius(&self) -> f64 {
        self.radius
    }
    /// Conservative radius used by the broadphase.
    pub fn bounding_radius(&self) -> f64 {
        2.0 * self.radius
    }
    pub fn is_movable(&self) -> bool {
        self.movable
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn history(&self) -> &[Vector2<f64>; HISTORY_LEN] {
        &self.history
    }
    pub fn trajectory(&self) -> Option<&[Vector2<f64>]> {
        self.trajectory.as_deref()
    }
    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn set_vel(&mut self, vel: Vector2<f64>) {
        self.vel = vel;
    }
    pub fn set_color(&mut self, color: u32) {
        self.color = color;
    }
    /// Static bodies stay inactive whatever is asked.
    pub fn set_active(&mut self, active: bool) {
        self.active = self.movable && active;
    }
    pub(crate) fn make_movable(&mut self) {
        self.movable = true;
        self.active = true;
    }
    pub fn set_trajectory(&mut self, samples: Vec<Vector2<f64>>) {
        self.trajectory = Some(samples);
    }
    pub fn clear_trajectory(&mut self) {
        self.trajectory = None;
    }

    /// Centre distance minus both radii. Negative when overlapping.
    pub fn distance_between_surfaces(&self, other: &Body) -> f64 {
        (self.pos - other.pos).magnitude() - self.radius - other.radius
    }
    pub fn distance_from_center(&self, point: Vector2<f64>) -> f64 {
        (self.pos - point).magnitude()
    }
    pub fn contains(&self, point: Vector2<f64>) -> bool {
        self.distance_from_center(point) <= self.radius
    }

    /// Newtonian attraction from `source` acting on this body.
    /// `None` when the centres coincide.
    pub fn compute_force(&self, source: &Body, g: f64) -> Option<Vector2<f64>> {
        self.force_towards(source.pos, source.mass, g)
    }

    fn force_towards(&self, point: Vector2<f64>, mass: f64, g: f64) -> Option<Vector2<f64>> {
        let rel_pos = point - self.pos;
        let distance = rel_pos.magnitude();
        if distance < MIN_SEPARATION {
            return None;
        }
        let rel_pos_norm = rel_pos / distance;
        Some(g * self.mass * mass / distance.powi(2) * rel_pos_norm)
    }

    /// Explicit Euler against a constant-magnitude pull towards `source`.
    /// The position moves with the old velocity.
    pub fn integrate_euler(&mut self, source: &Body, dt: f64, pull: f64) {
        let rel_pos = source.pos - self.pos;
        let distance = rel_pos.magnitude();
        let accel = if distance < MIN_SEPARATION {
            log::debug!("{} and {} coincide, no pull this step", self.id, source.id);
            Vector2::zero()
        } else {
            pull * rel_pos / distance
        };
        self.advance(dt);
        self.vel += accel * dt;
    }

    /// Full velocity kick from `source` at its current position.
    pub fn gravitational_kick(&mut self, source: &Body, dt: f64, g: f64) {
        if let Some(force) = self.compute_force(source, g) {
            self.vel += force / self.mass * dt;
        }
    }

    /// First Velocity-Verlet half kick. Uses where `other` was one history
    /// slot back, so the result does not depend on which bodies have already
    /// been moved this tick.
    pub fn integrate_verlet_initial_half(&mut self, other: &Body, dt: f64, g: f64) {
        if let Some(force) = self.force_towards(other.history[0], other.mass, g) {
            self.vel += force / self.mass * (0.5 * dt);
        }
    }

    pub fn integrate_verlet_final_half(&mut self, other: &Body, dt: f64, g: f64) {
        if let Some(force) = self.compute_force(other, g) {
            self.vel += force / self.mass * (0.5 * dt);
        }
    }

    /// Moves along the current velocity, recording the old position.
    pub fn advance(&mut self, dt: f64) {
        self.record_position(self.pos + self.vel * dt);
    }

    pub fn record_position(&mut self, pos: Vector2<f64>) {
        self.history.rotate_right(1);
        self.history[0] = self.pos;
        self.pos = pos;
    }

    /// Moves without touching the history. Used by penetration correction.
    pub(crate) fn translate(&mut self, offset: Vector2<f64>) {
        self.pos += offset;
    }

    /// Independent copy keeping the id. Preview samples are not carried over.
    pub fn deep_copy(&self) -> Body {
        Body {
            trajectory: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: pos ({:.2}, {:.2}) vel ({:.2}, {:.2}) r {} m {} movable {} active {}",
            self.id,
            self.pos.x,
            self.pos.y,
            self.vel.x,
            self.vel.y,
            self.radius,
            self.mass,
            self.movable,
            self.active
        )
    }
}
