use std::time::Duration;

pub const GRAVITATIONAL_CONSTANT: f64 = 6.674e-11;
/// Entries kept in every body's position history.
pub const HISTORY_LEN: usize = 20;
pub const TRAJECTORY_SAMPLES: usize = 20;
pub const SAMPLE_INTERVAL: f64 = 0.1;
pub const PREDICTION_SUB_STEP: f64 = 0.016665;
/// Magnitude of the constant pull used by [`Integrator::Euler`].
pub const SYNTHETIC_PULL: f64 = 1000.0;
pub const RESTING_DISTANCE: f64 = 10.0;
pub const RESTING_SPEED: f64 = 3.0;

pub const TICK: Duration = Duration::from_micros(16_667);
pub const MAX_LAG: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Integrator {
    /// First order, pulled towards every other body by a fixed-magnitude
    /// acceleration. Cheap preview mode.
    Euler,
    /// Newtonian velocity kick from every source, then one position update.
    GravitationalEuler,
    #[default]
    VelocityVerlet,
}

impl std::str::FromStr for Integrator {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "euler" => Ok(Self::Euler),
            "gravitational-euler" => Ok(Self::GravitationalEuler),
            "verlet" | "velocity-verlet" => Ok(Self::VelocityVerlet),
            other => Err(anyhow::anyhow!(
                "unknown integrator {other:?}, expected euler, gravitational-euler or verlet"
            )),
        }
    }
}

/// Which way the collision normal is rotated to get the tangent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TangentConvention {
    #[default]
    CounterClockwise,
    Clockwise,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PredictionConfig {
    pub sub_step: f64,
    pub sample_interval: f64,
    pub samples: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            sub_step: PREDICTION_SUB_STEP,
            sample_interval: SAMPLE_INTERVAL,
            samples: TRAJECTORY_SAMPLES,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub integrator: Integrator,
    pub gravitational_constant: f64,
    pub synthetic_pull: f64,
    pub collisions: bool,
    /// Zero out jitter on pairs that stay in near-still contact across ticks.
    pub resting_contact: bool,
    pub resting_distance: f64,
    pub resting_speed: f64,
    pub tangent: TangentConvention,
    pub prediction: PredictionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            integrator: Integrator::default(),
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            synthetic_pull: SYNTHETIC_PULL,
            collisions: true,
            resting_contact: false,
            resting_distance: RESTING_DISTANCE,
            resting_speed: RESTING_SPEED,
            tangent: TangentConvention::default(),
            prediction: PredictionConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }
    pub fn with_gravitational_constant(mut self, g: f64) -> Self {
        self.gravitational_constant = g;
        self
    }
    pub fn with_resting_contact(mut self, enabled: bool) -> Self {
        self.resting_contact = enabled;
        self
    }
    pub fn validate(&self) -> anyhow::Result<()> {
        let p = &self.prediction;
        anyhow::ensure!(
            p.sub_step > 0.0 && p.sub_step.is_finite(),
            "prediction sub-step must be positive, got {}",
            p.sub_step
        );
        anyhow::ensure!(
            p.sample_interval >= 0.0 && p.sample_interval.is_finite(),
            "sample interval must be non-negative, got {}",
            p.sample_interval
        );
        anyhow::ensure!(
            self.gravitational_constant.is_finite(),
            "gravitational constant must be finite"
        );
        Ok(())
    }
}
