//! Ready-made worlds for the driver and for tests.

use crate::{BodyId, BodySpec, SimConfig, Simulation};
use cgmath::Vector2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Distribution;

/// A static star and one satellite on a circular orbit.
pub fn orbit(
    config: SimConfig,
    star_mass: f64,
    distance: f64,
) -> anyhow::Result<(Simulation, BodyId)> {
    anyhow::ensure!(distance > 0.0, "orbit distance must be positive");
    let g = config.gravitational_constant;
    let mut sim = Simulation::new(config)?;
    sim.add_body(BodySpec::fixed(Vector2::new(0.0, 0.0), 20.0, star_mass))?;
    let satellite = sim.add_body(BodySpec::moving(Vector2::new(distance, 0.0), 5.0, 1.0))?;
    let speed = (g * star_mass / distance).sqrt();
    sim.set_velocity(satellite, Vector2::new(0.0, speed))?;
    Ok((sim, satellite))
}

/// A row of touching balls; the first one is moving into the rest.
pub fn newtons_cradle(
    config: SimConfig,
    count: usize,
    radius: f64,
    speed: f64,
) -> anyhow::Result<Simulation> {
    anyhow::ensure!(count >= 2, "a cradle needs at least two balls");
    let mut sim = Simulation::new(config)?;
    let mut first = None;
    for i in 0..count {
        let pos = Vector2::new(2.0 * radius * i as f64, 0.0);
        let id = sim.add_body(BodySpec::moving(pos, radius, 1.0))?;
        first.get_or_insert(id);
    }
    if let Some(id) = first {
        sim.set_velocity(id, Vector2::new(speed, 0.0))?;
    }
    Ok(sim)
}

/// Reproducible cloud of moving bodies inside `[-extent, extent]²`.
/// Mass grows with area.
pub fn random_field(
    config: SimConfig,
    count: usize,
    extent: f64,
    seed: u64,
) -> anyhow::Result<Simulation> {
    anyhow::ensure!(extent > 0.0, "field extent must be positive");
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = rand_distr::Normal::new(0.0f64, 1.0)?;
    let mut sim = Simulation::new(config)?;
    for _ in 0..count {
        let pos = Vector2::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent));
        let radius = 0.01 * extent * (0.8 * normal.sample(&mut rng).abs() + 0.2);
        let id = sim.add_body(BodySpec::moving(pos, radius, radius * radius))?;
        let vel = Vector2::new(normal.sample(&mut rng), normal.sample(&mut rng));
        sim.set_velocity(id, vel)?;
    }
    log::info!("Generated field of {count} bodies from seed {seed}");
    Ok(sim)
}
