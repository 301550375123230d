//! Exact circle overlap, elastic response and penetration correction.

use crate::{
    body::{Body, BodyId, MIN_SEPARATION},
    broadphase::CandidatePair,
    config::{SimConfig, TangentConvention},
};
use cgmath::{prelude::*, Vector2};
use std::collections::{BTreeSet, HashMap};

/// Unordered pair of body ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactKey(BodyId, BodyId);

impl ContactKey {
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
    pub fn ids(&self) -> (BodyId, BodyId) {
        (self.0, self.1)
    }
}

/// Remembers which pairs are in contact across ticks. Iterated in id order,
/// since settling one pair can change whether the next one is resting.
#[derive(Clone, Debug, Default)]
pub struct Narrowphase {
    colliding: BTreeSet<ContactKey>,
}

impl Narrowphase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_colliding(a: &Body, b: &Body) -> bool {
        (a.pos() - b.pos()).magnitude() - a.radius() - b.radius() <= 0.0
    }

    pub fn in_contact(&self, a: BodyId, b: BodyId) -> bool {
        self.colliding.contains(&ContactKey::new(a, b))
    }
    pub fn contacts(&self) -> impl Iterator<Item = &ContactKey> {
        self.colliding.iter()
    }
    pub fn contact_count(&self) -> usize {
        self.colliding.len()
    }
    pub fn clear(&mut self) {
        self.colliding.clear();
    }

    /// Drops retained pairs that separated, optionally settles the ones still
    /// resting, then collides every overlapping candidate. Returns how many
    /// candidates were collided.
    pub fn resolve_all(
        &mut self,
        bodies: &mut [Body],
        candidates: &[CandidatePair],
        config: &SimConfig,
    ) -> usize {
        let index: HashMap<BodyId, usize> = bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id(), i))
            .collect();
        self.colliding.retain(|key| {
            let (a, b) = key.ids();
            match (index.get(&a), index.get(&b)) {
                (Some(&i), Some(&j)) => Self::is_colliding(&bodies[i], &bodies[j]),
                _ => false,
            }
        });

        if config.resting_contact {
            for key in &self.colliding {
                let (a, b) = key.ids();
                let (a, b) = pair_mut(bodies, index[&a], index[&b]);
                if Self::settle_resting(a, b, config) {
                    log::debug!("{} and {} at rest", a.id(), b.id());
                }
            }
        }

        let mut collided = 0;
        for &(i, j) in candidates {
            let (a, b) = pair_mut(bodies, i, j);
            if Self::is_colliding(a, b) && Self::collide(a, b, config.tangent) {
                self.colliding.insert(ContactKey::new(a.id(), b.id()));
                collided += 1;
            }
        }
        collided
    }

    /// Elastic response along the line of centres, then separation.
    /// Returns false, leaving both untouched, when the centres coincide.
    pub fn collide(a: &mut Body, b: &mut Body, tangent: TangentConvention) -> bool {
        let rel_pos = a.pos() - b.pos();
        let distance = rel_pos.magnitude();
        if distance < MIN_SEPARATION {
            log::debug!("{} and {} coincide, skipping collision", a.id(), b.id());
            return false;
        }
        let normal = rel_pos / distance;
        let tangent = match tangent {
            TangentConvention::CounterClockwise => Vector2::new(-normal.y, normal.x),
            TangentConvention::Clockwise => Vector2::new(normal.y, -normal.x),
        };

        let new_a = a
            .is_active()
            .then(|| collision_velocity(a, b, normal, tangent));
        let new_b = b
            .is_active()
            .then(|| collision_velocity(b, a, normal, tangent));

        match (a.is_active(), b.is_active()) {
            (true, true) => correct_both(a, b),
            (true, false) => correct_one(a, b),
            (false, true) => correct_one(b, a),
            (false, false) => {}
        }
        if let Some(vel) = new_a {
            a.set_vel(vel);
        }
        if let Some(vel) = new_b {
            b.set_vel(vel);
        }
        true
    }

    pub fn is_resting(a: &Body, b: &Body, config: &SimConfig) -> bool {
        let gap = a.distance_between_surfaces(b).abs();
        let rel_speed = (a.vel() - b.vel()).magnitude();
        gap < config.resting_distance && rel_speed < config.resting_speed
    }

    /// Zeroes the active bodies' velocities if the pair is resting.
    pub fn settle_resting(a: &mut Body, b: &mut Body, config: &SimConfig) -> bool {
        if !Self::is_resting(a, b, config) {
            return false;
        }
        for body in [a, b] {
            if body.is_active() {
                body.set_vel(Vector2::zero());
            }
        }
        true
    }
}

fn collision_velocity(
    body: &Body,
    other: &Body,
    normal: Vector2<f64>,
    tangent: Vector2<f64>,
) -> Vector2<f64> {
    let (m1, m2) = (body.mass(), other.mass());
    let v1n = body.vel().dot(normal);
    let v1t = body.vel().dot(tangent);
    let v2n = other.vel().dot(normal);
    let new_v1n = (v1n * (m1 - m2) + 2.0 * m2 * v2n) / (m1 + m2);
    new_v1n * normal + v1t * tangent
}

/// Each body moves half the depth away from the other.
fn correct_both(a: &mut Body, b: &mut Body) {
    let distance = a.distance_between_surfaces(b);
    if distance < 0.0 {
        let correction = (b.pos() - a.pos()).normalize() * (distance / 2.0);
        a.translate(correction);
        b.translate(-correction);
    }
}

/// `body` moves the full depth away from `anchor`.
fn correct_one(body: &mut Body, anchor: &Body) {
    let distance = body.distance_between_surfaces(anchor);
    if distance < 0.0 {
        let correction = (anchor.pos() - body.pos()).normalize() * distance;
        body.translate(correction);
    }
}

/// Two distinct mutable bodies out of one slice.
pub fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    assert_ne!(i, j, "a body cannot collide with itself");
    if i < j {
        let (head, tail) = bodies.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}
