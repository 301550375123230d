mod run;

use physics::{scene, BodyId, Integrator, SimConfig, Simulation};
use std::time::Duration;

const DEFAULT_SECONDS: f64 = 10.0;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let scene_name = args.next().unwrap_or_else(|| "orbit".to_owned());
    let seconds: f64 = args
        .next()
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(DEFAULT_SECONDS);
    let integrator: Integrator = args
        .next()
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or_default();
    anyhow::ensure!(seconds > 0.0, "run time must be positive, got {seconds}");

    log::info!("Setting up {scene_name} with {integrator:?}");
    let (simulation, tracked) = build_scene(&scene_name, integrator)?;
    run::run(simulation, tracked, Duration::from_secs_f64(seconds))
}

fn build_scene(
    name: &str,
    integrator: Integrator,
) -> anyhow::Result<(Simulation, Option<BodyId>)> {
    let config = SimConfig::default().with_integrator(integrator);
    Ok(match name {
        "orbit" => {
            let config = config.with_gravitational_constant(1.0);
            let (simulation, satellite) = scene::orbit(config, 10_000.0, 150.0)?;
            (simulation, Some(satellite))
        }
        "cradle" => {
            let config = config.with_gravitational_constant(0.0);
            (scene::newtons_cradle(config, 5, 10.0, 40.0)?, None)
        }
        "field" => {
            let config = config
                .with_gravitational_constant(100.0)
                .with_resting_contact(true);
            (scene::random_field(config, 64, 400.0, 42)?, None)
        }
        other => anyhow::bail!("unknown scene {other:?}, expected orbit, cradle or field"),
    })
}
