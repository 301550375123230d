use instant::Instant;
use physics::{instance, BodyId, Simulation, StepReport};
use std::time::Duration;

const FRAME_TIME: Duration = Duration::from_micros(16_667);

struct Stats {
    frame_number: u64,
    tick_number: u64,
    instant_start: Instant,
    time_spent_in_physics: Duration,
    time_spent_in_preview: Duration,
    uploaded_bytes: usize,
}

/// Stand-in for a render loop: one `advance_to` per frame, a fresh preview of
/// the tracked body, and the instance buffer a renderer would upload.
pub fn run(
    mut simulation: Simulation,
    tracked: Option<BodyId>,
    duration: Duration,
) -> anyhow::Result<()> {
    let mut stats = Stats {
        frame_number: 0,
        tick_number: 0,
        instant_start: Instant::now(),
        time_spent_in_physics: Duration::ZERO,
        time_spent_in_preview: Duration::ZERO,
        uploaded_bytes: 0,
    };
    let end = stats.instant_start + duration;

    log::info!("Starting frame loop with {} bodies", simulation.len());
    loop {
        let frame_start = Instant::now();
        if frame_start >= end {
            break;
        }
        report(simulation.advance_to(frame_start), &mut stats);

        if let Some(id) = tracked {
            let before = Instant::now();
            simulation.refresh_preview(id)?;
            stats.time_spent_in_preview += Instant::now().duration_since(before);
        }
        let instances = simulation.instances();
        stats.uploaded_bytes = instance::as_bytes(&instances).len();

        stats.frame_number += 1;
        if stats.frame_number.is_power_of_two() || stats.frame_number % 1024 == 0 {
            log::info!(
                "Elapsed {:.1}s, {}ms physics ({} ticks), {}ms preview ({} frames), {}B instances",
                Instant::now().duration_since(stats.instant_start).as_secs_f64(),
                stats.time_spent_in_physics.as_millis(),
                stats.tick_number,
                stats.time_spent_in_preview.as_millis(),
                stats.frame_number,
                stats.uploaded_bytes,
            );
        }
        if let Some(id) = tracked {
            let status = simulation.status(id)?;
            log::debug!(
                "Tracked {} at ({:.2}, {:.2}) moving at {:.2}",
                id,
                status.pos.x,
                status.pos.y,
                status.speed
            );
        }

        let next_frame = frame_start + FRAME_TIME;
        if let Some(wait) = next_frame.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        }
    }

    log::info!(
        "Finished after {} ticks, {} contacts open",
        stats.tick_number,
        simulation.narrowphase().contact_count()
    );
    for body in simulation.bodies() {
        log::info!("{body}");
    }
    Ok(())
}

fn report(StepReport { elapsed_real, ticks }: StepReport, stats: &mut Stats) {
    stats.time_spent_in_physics += elapsed_real;
    stats.tick_number += ticks;
}
