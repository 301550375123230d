use crate::{
    body::{Body, BodyId},
    config::{Integrator, SimConfig},
    narrowphase::pair_mut,
};

/// Moves every active body that is not under external control, pairwise
/// against every other body. Controlled and static bodies still attract.
pub fn integrate(bodies: &mut [Body], config: &SimConfig, controlled: Option<BodyId>, dt: f64) {
    let g = config.gravitational_constant;
    let integrated: Vec<usize> = bodies
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_active() && Some(b.id()) != controlled)
        .map(|(i, _)| i)
        .collect();
    let n = bodies.len();

    match config.integrator {
        Integrator::Euler => {
            for &i in &integrated {
                for j in (0..n).filter(|&j| j != i) {
                    let (body, source) = pair_mut(bodies, i, j);
                    body.integrate_euler(source, dt, config.synthetic_pull);
                }
            }
        }
        Integrator::GravitationalEuler => {
            for &i in &integrated {
                for j in (0..n).filter(|&j| j != i) {
                    let (body, source) = pair_mut(bodies, i, j);
                    body.gravitational_kick(source, dt, g);
                }
                bodies[i].advance(dt);
            }
        }
        Integrator::VelocityVerlet => {
            for &i in &integrated {
                for j in (0..n).filter(|&j| j != i) {
                    let (body, other) = pair_mut(bodies, i, j);
                    body.integrate_verlet_initial_half(other, dt, g);
                }
                bodies[i].advance(dt);
            }
            for &i in &integrated {
                for j in (0..n).filter(|&j| j != i) {
                    let (body, other) = pair_mut(bodies, i, j);
                    body.integrate_verlet_final_half(other, dt, g);
                }
            }
        }
    }
}
