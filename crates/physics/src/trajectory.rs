//! Short-horizon preview by stepping a deep copy of the world.
//!
//! The live world is only ever borrowed immutably, so a preview cannot
//! disturb it; several previews can run side by side on their own copies.

use crate::{body::BodyId, config::PredictionConfig, Simulation};
use cgmath::Vector2;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

/// Independent copy of `world` in which `id` is free to move.
/// Returns the copy and the tracked body's index in it.
pub fn fork(world: &Simulation, id: BodyId) -> anyhow::Result<(Simulation, usize)> {
    let index = world
        .bodies
        .iter()
        .position(|b| b.id() == id)
        .ok_or_else(|| anyhow::anyhow!("cannot predict unknown body {}", id))?;
    let mut fork = Simulation {
        bodies: world.bodies.iter().map(|b| b.deep_copy()).collect(),
        narrowphase: world.narrowphase.clone(),
        config: world.config.clone(),
        controlled: None,
        timestamp: world.timestamp,
        ticks: 0,
    };
    fork.bodies[index].make_movable();
    Ok((fork, index))
}

pub fn predict(
    world: &Simulation,
    id: BodyId,
    config: &PredictionConfig,
) -> anyhow::Result<Vec<Vector2<f64>>> {
    anyhow::ensure!(
        config.sub_step > 0.0 && config.sub_step.is_finite(),
        "prediction sub-step must be positive"
    );
    let (mut fork, index) = fork(world, id)?;
    let mut samples = Vec::with_capacity(config.samples);
    let mut elapsed = 0.0;
    while samples.len() < config.samples {
        fork.step(config.sub_step);
        if elapsed >= config.sample_interval {
            samples.push(fork.bodies[index].pos());
            elapsed = 0.0;
        }
        elapsed += config.sub_step;
    }
    log::debug!(
        "Predicted {} samples for {} over {} ticks",
        samples.len(),
        id,
        fork.ticks()
    );
    Ok(samples)
}

pub fn predict_many(
    world: &Simulation,
    ids: &[BodyId],
    config: &PredictionConfig,
) -> anyhow::Result<Vec<Vec<Vector2<f64>>>> {
    ids.par_iter().map(|&id| predict(world, id, config)).collect()
}
