/// Rank inversion: the performance of a position in a field of known ratings
/// is the rating whose expected rank in that field equals the position.
use std::collections::HashMap;

use crate::constants::{
    EXPECTED_RANK_BASE, EXPECTED_RANK_SCALE, MAX_BISECTION_STEPS, MAX_RATING, MIN_RATING,
};

/// Expected number of field members that out-rank a participant performing
/// at `m`, plus one half for the participant's own entry when present.
pub fn expected_rank(m: f64, ratings: &[f64]) -> f64 {
    ratings
        .iter()
        .map(|&r| 1.0 / (1.0 + EXPECTED_RANK_BASE.powf((m - r) / EXPECTED_RANK_SCALE)))
        .sum()
}

/// Performance for every position of a ranked field.
///
/// `ratings` is ordered best-to-worst: `ratings[0]` took first place. The
/// returned performances are rounded and in the same order.
pub fn calculate_performances(ratings: &[f64]) -> Vec<f64> {
    // Bisection midpoints repeat across positions; key by bit pattern.
    let mut cache: HashMap<u64, f64> = HashMap::new();
    let mut performances = Vec::with_capacity(ratings.len());

    for position in 0..ratings.len() {
        let target = position as f64 + 0.5;
        let mut lb = MIN_RATING;
        let mut ub = MAX_RATING;

        for _ in 0..MAX_BISECTION_STEPS {
            if lb.round() == ub.round() {
                break;
            }
            let m = (lb + ub) / 2.0;
            let rank = *cache
                .entry(m.to_bits())
                .or_insert_with(|| expected_rank(m, ratings));
            if rank < target {
                ub = m;
            } else {
                lb = m;
            }
        }
        performances.push(lb.round());
    }

    performances
}
