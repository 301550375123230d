use cgmath::{prelude::*, Vector2};
use physics::{
    broadphase, scene, Body, BodyId, BodySpec, Integrator, Narrowphase, SimConfig, Simulation,
    TangentConvention,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two moving bodies on the x axis, `gap` apart centre to centre.
pub fn head_on(gap: f64, radius: f64, m1: f64, m2: f64) -> (Body, Body) {
    let mut a = Body::new(Vector2::new(0.0, 0.0), radius, m1, true, true).unwrap();
    let mut b = Body::new(Vector2::new(gap, 0.0), radius, m2, true, true).unwrap();
    a.set_vel(Vector2::new(1.0, 0.0));
    b.set_vel(Vector2::new(-1.0, 0.0));
    (a, b)
}

pub fn snapshot(sim: &Simulation) -> Vec<(BodyId, Vector2<f64>, Vector2<f64>, bool)> {
    sim.bodies()
        .iter()
        .map(|b| (b.id(), b.pos(), b.vel(), b.is_active()))
        .collect()
}

pub fn approx_eq(a: Vector2<f64>, b: Vector2<f64>, tol: f64) -> bool {
    (a - b).magnitude() < tol
}

// ==================================================================================
// Collision scenarios
// ==================================================================================

#[test]
fn head_on_equal_masses_swap_and_separate() {
    let (mut a, mut b) = head_on(10.0, 6.0, 1.0, 1.0);
    assert!(Narrowphase::is_colliding(&a, &b));
    Narrowphase::collide(&mut a, &mut b, TangentConvention::CounterClockwise);
    assert!(approx_eq(a.vel(), Vector2::new(-1.0, 0.0), 1e-12));
    assert!(approx_eq(b.vel(), Vector2::new(1.0, 0.0), 1e-12));
    assert!(approx_eq(a.pos(), Vector2::new(-1.0, 0.0), 1e-12));
    assert!(approx_eq(b.pos(), Vector2::new(11.0, 0.0), 1e-12));
}

#[test]
fn unequal_masses_conserve_momentum() {
    let (mut a, mut b) = head_on(5.0, 3.0, 2.0, 7.0);
    let before = a.mass() * a.vel() + b.mass() * b.vel();
    Narrowphase::collide(&mut a, &mut b, TangentConvention::CounterClockwise);
    let after = a.mass() * a.vel() + b.mass() * b.vel();
    assert!(approx_eq(before, after, 1e-12));
}

#[test]
fn static_body_is_untouched_by_resolution() {
    init_logging();
    let mut sim = Simulation::new(SimConfig::default().with_gravitational_constant(0.0)).unwrap();
    let wall = sim
        .add_body(BodySpec::fixed(Vector2::new(0.0, 0.0), 10.0, 5.0))
        .unwrap();
    let ball = sim
        .add_body(BodySpec::moving(Vector2::new(12.0, 0.0), 3.0, 1.0))
        .unwrap();
    sim.set_velocity(ball, Vector2::new(-5.0, 0.0)).unwrap();
    sim.step(0.01);

    let wall = sim.body(wall).unwrap();
    assert_eq!(wall.pos(), Vector2::new(0.0, 0.0));
    assert_eq!(wall.vel(), Vector2::zero());
    let ball = sim.body(ball).unwrap();
    assert!(ball.vel().x > 0.0);
    assert!(ball.pos().x >= 13.0 - 1e-9);
}

#[test]
fn cradle_passes_momentum_down_the_row() {
    let config = SimConfig::default().with_gravitational_constant(0.0);
    let mut sim = scene::newtons_cradle(config, 2, 1.0, 2.0).unwrap();
    sim.step(0.01);
    let speeds: Vec<f64> = sim.bodies().iter().map(|b| b.vel().x).collect();
    assert!(approx_eq(
        Vector2::new(speeds[0], speeds[1]),
        Vector2::new(0.0, 2.0),
        1e-9
    ));
}

#[test]
fn resting_contact_worlds_replay_identically() {
    init_logging();
    let run = || {
        let config = SimConfig::default()
            .with_gravitational_constant(100.0)
            .with_resting_contact(true);
        let mut sim = scene::random_field(config, 40, 120.0, 9).unwrap();
        for _ in 0..60 {
            sim.step(0.016);
        }
        sim.bodies()
            .iter()
            .map(|b| (b.pos(), b.vel()))
            .collect::<Vec<_>>()
    };
    let first = run();
    for _ in 0..4 {
        assert_eq!(run(), first);
    }
}

// ==================================================================================
// Broadphase properties
// ==================================================================================

#[test]
fn separated_bounding_circles_never_pair() {
    let mut sim = scene::random_field(SimConfig::default(), 40, 300.0, 11).unwrap();
    let bodies: Vec<Body> = sim.bodies().to_vec();
    let pairs = broadphase::sweep(&bodies);
    for (i, a) in bodies.iter().enumerate() {
        for (j, b) in bodies.iter().enumerate().skip(i + 1) {
            let apart = (a.pos() - b.pos()).magnitude() > a.bounding_radius() + b.bounding_radius();
            if apart {
                assert!(!pairs.contains(&(i, j)));
            } else {
                assert!(pairs.contains(&(i, j)));
            }
        }
    }
    sim.step(0.01);
    assert_eq!(sim.len(), 40);
}

#[test]
fn overlapping_true_circles_are_always_candidates() {
    let sim = scene::random_field(SimConfig::default(), 60, 100.0, 5).unwrap();
    let pairs = broadphase::sweep(sim.bodies());
    for &(i, j) in &pairs {
        assert!(i < j);
    }
    for (i, a) in sim.bodies().iter().enumerate() {
        for (j, b) in sim.bodies().iter().enumerate().skip(i + 1) {
            if Narrowphase::is_colliding(a, b) {
                assert!(pairs.contains(&(i, j)));
            }
        }
    }
}

// ==================================================================================
// Trajectory prediction
// ==================================================================================

#[test]
fn preview_is_deterministic_and_leaves_world_alone() {
    init_logging();
    let config = SimConfig::default().with_gravitational_constant(1.0);
    let (mut sim, satellite) = scene::orbit(config, 10_000.0, 100.0).unwrap();
    sim.add_body(BodySpec::moving(Vector2::new(-60.0, 10.0), 4.0, 2.0))
        .unwrap();
    sim.step(0.016);

    let before = snapshot(&sim);
    let contacts = sim.narrowphase().contact_count();
    let first = sim.preview_trajectory(satellite).unwrap();
    let second = sim.preview_trajectory(satellite).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 20);
    assert_eq!(snapshot(&sim), before);
    assert_eq!(sim.narrowphase().contact_count(), contacts);
}

#[test]
fn refreshed_preview_is_attached_and_cleared_on_release() {
    let config = SimConfig::default().with_gravitational_constant(1.0);
    let mut sim = Simulation::new(config).unwrap();
    sim.add_body(BodySpec::fixed(Vector2::new(0.0, 0.0), 10.0, 10_000.0))
        .unwrap();
    let aimed = sim
        .add_body(BodySpec::editing(Vector2::new(200.0, 0.0), 3.0, 1.0))
        .unwrap();
    sim.aim(aimed, Vector2::new(200.0, -7.0)).unwrap();
    sim.refresh_preview(aimed).unwrap();

    let expected = sim.preview_trajectory(aimed).unwrap();
    assert_eq!(sim.body(aimed).unwrap().trajectory(), Some(&expected[..]));
    assert_eq!(sim.instances().len(), 2 + expected.len());

    // Still frozen in the live world while being aimed.
    sim.step(0.016);
    assert_eq!(sim.body(aimed).unwrap().pos(), Vector2::new(200.0, 0.0));

    sim.release(aimed).unwrap();
    assert!(sim.body(aimed).unwrap().trajectory().is_none());
    sim.step(0.016);
    assert!(sim.body(aimed).unwrap().pos().y > 0.0);
}

#[test]
fn preview_tracks_every_integrator() {
    for method in [
        Integrator::Euler,
        Integrator::GravitationalEuler,
        Integrator::VelocityVerlet,
    ] {
        let config = SimConfig::default()
            .with_gravitational_constant(1.0)
            .with_integrator(method);
        let (sim, satellite) = scene::orbit(config, 10_000.0, 100.0).unwrap();
        let samples = sim.preview_trajectory(satellite).unwrap();
        assert_eq!(samples.len(), 20, "{method:?}");
        assert!(samples.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}

// ==================================================================================
// Deep copy
// ==================================================================================

#[test]
fn deep_copies_of_a_world_are_independent() {
    let sim = scene::random_field(SimConfig::default(), 10, 200.0, 1).unwrap();
    let mut copies: Vec<Body> = sim.bodies().iter().map(Body::deep_copy).collect();
    for copy in &mut copies {
        copy.set_vel(Vector2::new(100.0, 100.0));
        copy.advance(1.0);
    }
    for (original, copy) in sim.bodies().iter().zip(&copies) {
        assert_eq!(original.id(), copy.id());
        assert_ne!(original.pos(), copy.pos());
        assert_ne!(original.vel(), copy.vel());
    }
}
