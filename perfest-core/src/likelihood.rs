/// Maximum-likelihood performance from a participant's own solve record,
/// independent of how anyone else did.
use std::collections::HashMap;

use crate::constants::{LIKELIHOOD_RATING_END, LIKELIHOOD_RATING_START, PROBABILITY_EPSILON};
use crate::problem_model::{clip_rating, predict_solve_probability};
use crate::types::{FittableProblem, ProblemId, ProblemResults};

/// Outcome of one participant on one problem.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemOutcome {
    pub problem_id: ProblemId,
    pub solved: bool,
    /// Seconds from contest start to the accepted submission; ignored when
    /// unsolved.
    pub elapsed_seconds: i64,
}

/// One outcome per problem, solved when the participant holds an accepted
/// result for it.
pub fn outcomes_from_results(problems: &[FittableProblem], results: &ProblemResults, start: i64) -> Vec<ProblemOutcome> {
    problems
        .iter()
        .map(|problem| match results.get(&problem.problem_id) {
            Some(r) if r.accepted => ProblemOutcome {
                problem_id: problem.problem_id.clone(),
                solved: true,
                elapsed_seconds: r.last_updated_epoch_second - start,
            },
            _ => ProblemOutcome {
                problem_id: problem.problem_id.clone(),
                solved: false,
                elapsed_seconds: 0,
            },
        })
        .collect()
}

/// Log-likelihood of `outcome` for a participant at `rating`.
///
/// A solve contributes `ln p` plus the log-normal log-density of its time;
/// a miss contributes `ln(1 - p)`.
pub fn outcome_log_likelihood(problem: &FittableProblem, outcome: &ProblemOutcome, rating: f64) -> f64 {
    let p = predict_solve_probability(&problem.difficulty, rating)
        .clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
    if !outcome.solved {
        return (1.0 - p).ln();
    }

    let variance = problem.time.variance.max(PROBABILITY_EPSILON);
    let seconds = (outcome.elapsed_seconds as f64).max(1.0);
    let deviation = seconds.ln() - problem.time.log_time_mean(rating);
    let log_density =
        -deviation * deviation / (2.0 * variance) - 0.5 * (2.0 * std::f64::consts::PI * variance).ln() - seconds.ln();
    p.ln() + log_density
}

/// Scan every integer rating in `[-4000, 4000)` and return the clipped
/// rating with the highest likelihood; the lowest such rating wins ties.
///
/// Outcomes for problems not in `problems` are ignored. `None` when no
/// outcome has a model.
pub fn estimate_likelihood_performance(outcomes: &[ProblemOutcome], problems: &[FittableProblem]) -> Option<f64> {
    let by_id: HashMap<&str, &FittableProblem> = problems.iter().map(|p| (p.problem_id.as_str(), p)).collect();
    let modelled: Vec<(&FittableProblem, &ProblemOutcome)> = outcomes
        .iter()
        .filter_map(|o| by_id.get(o.problem_id.as_str()).map(|p| (*p, o)))
        .collect();
    if modelled.is_empty() {
        return None;
    }

    let mut best_rating = LIKELIHOOD_RATING_START as f64;
    let mut best = f64::NEG_INFINITY;
    for rating in LIKELIHOOD_RATING_START..LIKELIHOOD_RATING_END {
        let rating = rating as f64;
        let log_likelihood: f64 = modelled
            .iter()
            .map(|(problem, outcome)| outcome_log_likelihood(problem, outcome, rating))
            .sum();
        if log_likelihood > best {
            best = log_likelihood;
            best_rating = rating;
        }
    }
    Some(clip_rating(best_rating))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DifficultyModel, ReducedProblemResult, TimeModel};

    fn problem(id: &str, difficulty: f64) -> FittableProblem {
        FittableProblem {
            problem_id: id.to_string(),
            point: 100.0,
            difficulty: DifficultyModel {
                difficulty,
                discrimination: 0.005,
                raw_difficulty: Some(difficulty),
            },
            time: TimeModel {
                slope: -0.0004,
                intercept: 8.0,
                variance: 0.3,
            },
        }
    }

    fn outcome(id: &str, solved: bool, elapsed_seconds: i64) -> ProblemOutcome {
        ProblemOutcome {
            problem_id: id.to_string(),
            solved,
            elapsed_seconds,
        }
    }

    fn ladder() -> Vec<FittableProblem> {
        vec![
            problem("a", 0.0),
            problem("b", 800.0),
            problem("c", 1600.0),
            problem("d", 2400.0),
        ]
    }

    #[test]
    fn test_no_modelled_outcome() {
        assert_eq!(estimate_likelihood_performance(&[], &ladder()), None);
        let unknown = [outcome("zzz", true, 100)];
        assert_eq!(estimate_likelihood_performance(&unknown, &ladder()), None);
    }

    #[test]
    fn test_more_solves_higher_performance() {
        let problems = ladder();
        let weak = [
            outcome("a", true, 900),
            outcome("b", false, 0),
            outcome("c", false, 0),
            outcome("d", false, 0),
        ];
        let strong = [
            outcome("a", true, 300),
            outcome("b", true, 600),
            outcome("c", true, 1200),
            outcome("d", false, 0),
        ];
        let weak_perf = estimate_likelihood_performance(&weak, &problems).unwrap();
        let strong_perf = estimate_likelihood_performance(&strong, &problems).unwrap();
        assert!(strong_perf > weak_perf);
    }

    #[test]
    fn test_all_solved_saturates_high() {
        let problems = vec![problem("a", -3000.0)];
        // A solve at exactly the median time of a 3999 participant.
        let median = problems[0].time.log_time_mean(3999.0).exp().round() as i64;
        let perf = estimate_likelihood_performance(&[outcome("a", true, median)], &problems).unwrap();
        assert!(perf > 3000.0);
    }

    #[test]
    fn test_nothing_solved_is_clipped_positive() {
        let problems = ladder();
        let none: Vec<ProblemOutcome> = problems.iter().map(|p| outcome(&p.problem_id, false, 0)).collect();
        let perf = estimate_likelihood_performance(&none, &problems).unwrap();
        // The scan bottoms out at -4000, which clips to a small positive value.
        assert_eq!(perf, clip_rating(-4000.0));
        assert!(perf >= 0.0);
    }

    #[test]
    fn test_log_likelihood_is_finite_at_extremes() {
        let p = problem("a", 0.0);
        for rating in [-4000.0, 0.0, 3999.0] {
            assert!(outcome_log_likelihood(&p, &outcome("a", false, 0), rating).is_finite());
            assert!(outcome_log_likelihood(&p, &outcome("a", true, 0), rating).is_finite());
        }
    }

    #[test]
    fn test_outcomes_from_results() {
        let mut results = ProblemResults::new();
        results.insert(
            "a".to_string(),
            ReducedProblemResult { trials: 2, penalties: 1, accepted: true, point: 100.0, last_updated_epoch_second: 1600 },
        );
        results.insert(
            "b".to_string(),
            ReducedProblemResult { trials: 1, penalties: 0, accepted: false, point: 0.0, last_updated_epoch_second: 1200 },
        );
        let outcomes = outcomes_from_results(&ladder(), &results, 1000);
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0], outcome("a", true, 600));
        assert!(!outcomes[1].solved);
        assert!(!outcomes[3].solved);
    }
}
