use cgmath::{prelude::*, Vector2};
use instant::Instant;
use std::time::Duration;

pub mod body;
pub mod broadphase;
pub mod config;
pub mod instance;
pub mod integrator;
pub mod narrowphase;
pub mod scene;
pub mod trajectory;

pub use body::{Body, BodyId};
pub use config::{Integrator, PredictionConfig, SimConfig, TangentConvention, MAX_LAG, TICK};
pub use instance::BodyInstance;
pub use narrowphase::Narrowphase;

/// Creation parameters for [`Simulation::add_body`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySpec {
    pub pos: Vector2<f64>,
    pub radius: f64,
    pub mass: f64,
    pub movable: bool,
    pub active: bool,
}

impl BodySpec {
    pub fn fixed(pos: Vector2<f64>, radius: f64, mass: f64) -> Self {
        Self {
            pos,
            radius,
            mass,
            movable: false,
            active: false,
        }
    }
    pub fn moving(pos: Vector2<f64>, radius: f64, mass: f64) -> Self {
        Self {
            pos,
            radius,
            mass,
            movable: true,
            active: true,
        }
    }
    /// Movable but frozen until [`Simulation::release`].
    pub fn editing(pos: Vector2<f64>, radius: f64, mass: f64) -> Self {
        Self {
            active: false,
            ..Self::moving(pos, radius, mass)
        }
    }
}

/// Read-only view for status displays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyStatus {
    pub id: BodyId,
    pub pos: Vector2<f64>,
    pub speed: f64,
    pub radius: f64,
    pub movable: bool,
    pub active: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct StepReport {
    pub elapsed_real: Duration,
    pub ticks: u64,
}

/// The live world. Owns every body; all mutation goes through `&mut self`,
/// so nothing can reposition a body in the middle of a tick.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub(crate) bodies: Vec<Body>,
    pub(crate) narrowphase: Narrowphase,
    pub(crate) config: SimConfig,
    pub(crate) controlled: Option<BodyId>,
    timestamp: Instant,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: SimConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            bodies: Vec::new(),
            narrowphase: Narrowphase::new(),
            config,
            controlled: None,
            timestamp: Instant::now(),
            ticks: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
    pub fn set_integrator(&mut self, integrator: Integrator) {
        self.config.integrator = integrator;
    }
    pub fn set_collisions(&mut self, enabled: bool) {
        self.config.collisions = enabled;
    }
    pub fn set_resting_contact(&mut self, enabled: bool) {
        self.config.resting_contact = enabled;
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id() == id)
    }
    pub fn len(&self) -> usize {
        self.bodies.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }
    pub fn narrowphase(&self) -> &Narrowphase {
        &self.narrowphase
    }
    pub fn controlled(&self) -> Option<BodyId> {
        self.controlled
    }

    pub fn status(&self, id: BodyId) -> anyhow::Result<BodyStatus> {
        let body = self.get(id)?;
        Ok(BodyStatus {
            id,
            pos: body.pos(),
            speed: body.speed(),
            radius: body.radius(),
            movable: body.is_movable(),
            active: body.is_active(),
        })
    }

    /// Last body containing `point`.
    pub fn body_at(&self, point: Vector2<f64>) -> Option<BodyId> {
        self.bodies
            .iter()
            .rev()
            .find(|b| b.contains(point))
            .map(Body::id)
    }

    pub fn instances(&self) -> Vec<BodyInstance> {
        instance::instances(&self.bodies)
    }

    fn get(&self, id: BodyId) -> anyhow::Result<&Body> {
        self.body(id)
            .ok_or_else(|| anyhow::anyhow!("no body with id {}", id))
    }
    fn get_mut(&mut self, id: BodyId) -> anyhow::Result<&mut Body> {
        self.bodies
            .iter_mut()
            .find(|b| b.id() == id)
            .ok_or_else(|| anyhow::anyhow!("no body with id {}", id))
    }

    /// Inserts into the broadphase order, restoring it first if bodies have
    /// moved past each other since the last insertion.
    pub fn add_body(&mut self, spec: BodySpec) -> anyhow::Result<BodyId> {
        let body = Body::new(spec.pos, spec.radius, spec.mass, spec.movable, spec.active)?;
        let id = body.id();
        log::debug!("Adding {body}");
        if !broadphase::is_sorted(&self.bodies) {
            broadphase::sort_by_key(&mut self.bodies);
        }
        broadphase::insert_maintaining_order(&mut self.bodies, [body]);
        Ok(id)
    }

    pub fn clear(&mut self) {
        log::info!("Clearing {} bodies", self.bodies.len());
        self.bodies.clear();
        self.narrowphase.clear();
        self.controlled = None;
    }

    /// Takes external control of a body. An active body being dragged loses
    /// its velocity.
    pub fn begin_drag(&mut self, id: BodyId) -> anyhow::Result<()> {
        let body = self.get_mut(id)?;
        if body.is_active() {
            body.set_vel(Vector2::zero());
        }
        self.controlled = Some(id);
        Ok(())
    }

    pub fn drag_to(&mut self, id: BodyId, point: Vector2<f64>) -> anyhow::Result<()> {
        anyhow::ensure!(
            point.x.is_finite() && point.y.is_finite(),
            "cannot move {id} to a non-finite point"
        );
        self.get_mut(id)?.record_position(point);
        Ok(())
    }

    pub fn end_drag(&mut self) {
        self.controlled = None;
    }

    pub fn set_active(&mut self, id: BodyId, active: bool) -> anyhow::Result<()> {
        let body = self.get_mut(id)?;
        anyhow::ensure!(body.is_movable(), "{id} is static and cannot be activated");
        body.set_active(active);
        Ok(())
    }

    pub fn set_velocity(&mut self, id: BodyId, vel: Vector2<f64>) -> anyhow::Result<()> {
        anyhow::ensure!(
            vel.x.is_finite() && vel.y.is_finite(),
            "velocity of {id} must be finite"
        );
        let body = self.get_mut(id)?;
        anyhow::ensure!(body.is_movable(), "{id} is static and cannot be given a velocity");
        body.set_vel(vel);
        Ok(())
    }

    /// Slingshot aiming: the velocity points from `point` to the body centre
    /// with the same length as that offset.
    pub fn aim(&mut self, id: BodyId, point: Vector2<f64>) -> anyhow::Result<()> {
        let body = self.get(id)?;
        let offset = body.pos() - point;
        if offset.magnitude2() == 0.0 {
            return Ok(());
        }
        self.set_velocity(id, offset)
    }

    /// Ends authoring: drops the preview and lets the body move.
    pub fn release(&mut self, id: BodyId) -> anyhow::Result<()> {
        let body = self.get_mut(id)?;
        anyhow::ensure!(body.is_movable(), "{id} is static and cannot be released");
        body.clear_trajectory();
        body.set_active(true);
        Ok(())
    }

    /// One tick: integrate, then broadphase and narrowphase.
    pub fn step(&mut self, dt: f64) {
        if !(dt > 0.0 && dt.is_finite()) {
            log::warn!("Ignoring step with dt = {dt}");
            return;
        }
        integrator::integrate(&mut self.bodies, &self.config, self.controlled, dt);
        if self.config.collisions {
            let candidates = broadphase::sweep(&self.bodies);
            self.narrowphase
                .resolve_all(&mut self.bodies, &candidates, &self.config);
        }
        self.ticks += 1;
    }

    /// Runs fixed ticks until within one tick of `target`.
    pub fn advance_to(&mut self, target: Instant) -> StepReport {
        let before = Instant::now();
        let mut ticks = 0;
        loop {
            let lag = target.checked_duration_since(self.timestamp);
            match lag {
                lag if lag < Some(TICK) => break,
                lag if lag > Some(MAX_LAG) => {
                    let new_timestamp = target - TICK;
                    log::error!(
                        "Simulation far behind, dropping {}ms",
                        (new_timestamp - self.timestamp).as_millis()
                    );
                    self.timestamp = new_timestamp;
                }
                _ => {}
            }
            self.step(TICK.as_secs_f64());
            self.timestamp += TICK;
            ticks += 1;
        }
        StepReport {
            elapsed_real: Instant::now() - before,
            ticks,
        }
    }

    /// Future positions of `id`, computed on a deep copy.
    pub fn preview_trajectory(&self, id: BodyId) -> anyhow::Result<Vec<Vector2<f64>>> {
        trajectory::predict(self, id, &self.config.prediction)
    }

    pub fn preview_trajectories(&self, ids: &[BodyId]) -> anyhow::Result<Vec<Vec<Vector2<f64>>>> {
        trajectory::predict_many(self, ids, &self.config.prediction)
    }

    /// Stores a fresh preview on the body for display.
    pub fn refresh_preview(&mut self, id: BodyId) -> anyhow::Result<()> {
        let samples = self.preview_trajectory(id)?;
        self.get_mut(id)?.set_trajectory(samples);
        Ok(())
    }

    pub fn clear_preview(&mut self, id: BodyId) -> anyhow::Result<()> {
        self.get_mut(id)?.clear_trajectory();
        Ok(())
    }
}
