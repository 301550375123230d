//! Sort-and-sweep candidate search.
//!
//! Bodies are ordered by the x coordinate of the lower-left corner of their
//! bounding box. The sweep itself tests every pair against the doubled
//! bounding radius and does not prune on the ordering; body counts are small.
//! The ordering is what lets new bodies be inserted without a full re-sort.

use crate::body::Body;
use cgmath::prelude::*;

/// Indices `(i, j)` with `i < j` into the swept slice.
pub type CandidatePair = (usize, usize);

pub fn sort_key(body: &Body) -> f64 {
    body.pos().x - body.radius()
}

pub fn sort_by_key(bodies: &mut [Body]) {
    bodies.sort_unstable_by(|a, b| sort_key(a).total_cmp(&sort_key(b)));
}

pub fn is_sorted(bodies: &[Body]) -> bool {
    bodies
        .windows(2)
        .all(|pair| sort_key(&pair[0]) <= sort_key(&pair[1]))
}

pub fn bounding_overlap(a: &Body, b: &Body) -> bool {
    (a.pos() - b.pos()).magnitude() - a.bounding_radius() - b.bounding_radius() <= 0.0
}

pub fn sweep(sorted: &[Body]) -> Vec<CandidatePair> {
    let mut pairs = Vec::new();
    for (i, a) in sorted.iter().enumerate() {
        for (j, b) in sorted.iter().enumerate().skip(i + 1) {
            if bounding_overlap(a, b) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

pub fn sort_then_sweep(bodies: &mut [Body]) -> Vec<CandidatePair> {
    sort_by_key(bodies);
    sweep(bodies)
}

/// Binary search for each new body's slot, then shift it in.
pub fn insert_maintaining_order(sorted: &mut Vec<Body>, new: impl IntoIterator<Item = Body>) {
    for body in new {
        let key = sort_key(&body);
        let index = sorted.partition_point(|b| sort_key(b) < key);
        sorted.insert(index, body);
    }
}

pub fn insert_then_sweep(
    sorted: &mut Vec<Body>,
    new: impl IntoIterator<Item = Body>,
) -> Vec<CandidatePair> {
    insert_maintaining_order(sorted, new);
    sweep(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector2;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn circle(x: f64, y: f64, radius: f64) -> Body {
        Body::new(Vector2::new(x, y), radius, 1.0, true, true).unwrap()
    }

    #[test]
    fn far_apart_bodies_are_not_candidates() {
        // Bounding radii 2 + 2, centres 4.5 apart.
        let bodies = vec![circle(0.0, 0.0, 1.0), circle(4.5, 0.0, 1.0)];
        assert!(sweep(&bodies).is_empty());
    }

    #[test]
    fn bounding_margin_catches_near_misses() {
        // True circles 1 apart, bounding circles overlap.
        let bodies = vec![circle(0.0, 0.0, 1.0), circle(3.0, 0.0, 1.0)];
        assert_eq!(sweep(&bodies), vec![(0, 1)]);
    }

    #[test]
    fn every_pair_is_tested() {
        let mut bodies = vec![
            circle(100.0, 0.0, 1.0),
            circle(0.0, 0.0, 1.0),
            circle(1.0, 0.0, 1.0),
            circle(101.0, 0.0, 1.0),
        ];
        let pairs = sort_then_sweep(&mut bodies);
        assert!(is_sorted(&bodies));
        assert_eq!(pairs, vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn key_uses_the_left_edge() {
        let mut bodies = vec![circle(5.0, 0.0, 1.0), circle(6.0, 0.0, 3.0)];
        sort_by_key(&mut bodies);
        assert_eq!(bodies[0].radius(), 3.0);
    }

    #[test]
    fn insertion_matches_full_sort() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sorted = Vec::new();
        for _ in 0..10 {
            let batch: Vec<Body> = (0..rng.gen_range(1..6))
                .map(|_| {
                    circle(
                        rng.gen_range(-50.0..50.0),
                        rng.gen_range(-50.0..50.0),
                        rng.gen_range(0.5..5.0),
                    )
                })
                .collect();
            insert_maintaining_order(&mut sorted, batch);
            assert!(is_sorted(&sorted));
        }
        let mut resorted = sorted.clone();
        sort_by_key(&mut resorted);
        let keys: Vec<f64> = sorted.iter().map(sort_key).collect();
        let expected: Vec<f64> = resorted.iter().map(sort_key).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn insert_then_sweep_reports_new_contacts() {
        let mut sorted = vec![circle(0.0, 0.0, 1.0)];
        let pairs = insert_then_sweep(&mut sorted, vec![circle(2.0, 0.0, 1.0)]);
        assert_eq!(pairs, vec![(0, 1)]);
    }
}
