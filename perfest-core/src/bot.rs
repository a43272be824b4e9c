/// Bot simulation: synthetic participants at chosen ratings, and the
/// refinement loop that places new bots where real participants landed.
///
/// All randomness comes from the generator passed in; the same generator
/// state and inputs always produce the same bots.
use std::cmp::Ordering;

use rand::Rng;
use tracing::debug;

use crate::aggregate::{calc_user_total_result, compare_total_result};
use crate::constants::{
    BOOTSTRAP_RATING_END, BOOTSTRAP_RATING_START, BOOTSTRAP_RATING_STEP, DEFAULT_MAX_REFINEMENT_ROUNDS,
    DEFAULT_MIN_BOT_POOL, MAX_RATING, MAX_SOLVE_ATTEMPTS, MIN_RATING,
};
use crate::performance::calculate_performances;
use crate::problem_model::predict_solve_probability;
use crate::types::{BotRunner, FittableProblem, ProblemResults, ReducedProblemResult, UserTotalResult};

/// Limits of the refinement loop.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FittingConfig {
    pub min_bot_pool: usize,
    pub max_refinement_rounds: usize,
}

impl Default for FittingConfig {
    fn default() -> Self {
        FittingConfig {
            min_bot_pool: DEFAULT_MIN_BOT_POOL,
            max_refinement_rounds: DEFAULT_MAX_REFINEMENT_ROUNDS,
        }
    }
}

/// Order problems the way bots attempt them: easiest first.
pub fn sort_by_difficulty(problems: &mut [FittableProblem]) {
    problems.sort_by(|a, b| a.difficulty.difficulty.total_cmp(&b.difficulty.difficulty));
}

/// The coarse rating grid every fitting run starts from.
pub fn bootstrap_ratings() -> Vec<f64> {
    let mut ratings = Vec::new();
    let mut rating = BOOTSTRAP_RATING_START;
    while rating < BOOTSTRAP_RATING_END {
        ratings.push(rating);
        rating += BOOTSTRAP_RATING_STEP;
    }
    ratings
}

/// Draw from LogNormal(mu, sigma) with a Box-Muller normal.
fn sample_log_normal(rng: &mut impl Rng, mu: f64, sigma: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-10);
    let u2: f64 = rng.random();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    (mu + sigma * z).exp()
}

/// Simulate one bot over `problems`, which must be sorted by ascending
/// difficulty (see [`sort_by_difficulty`]).
///
/// Failed attempts cost `slope * rating + intercept` seconds each. The bot
/// stops for good once a solve would finish after `end`, or once it has
/// spent [`MAX_SOLVE_ATTEMPTS`] attempts on a single problem.
pub fn simulate_bot(
    rating: f64,
    problems: &[FittableProblem],
    start: i64,
    end: i64,
    rng: &mut impl Rng,
) -> BotRunner {
    let rating = rating.clamp(MIN_RATING, MAX_RATING);
    let end_time = end as f64;
    let mut current_time = start as f64;
    let mut result = ProblemResults::new();

    'problems: for problem in problems {
        let log_time_mean = problem.time.log_time_mean(rating);
        let solve_probability = if problem.difficulty.is_too_easy() {
            1.0
        } else {
            predict_solve_probability(&problem.difficulty, rating)
        };

        let mut attempts = 0;
        while rng.random::<f64>() >= solve_probability && current_time <= end_time {
            attempts += 1;
            if attempts >= MAX_SOLVE_ATTEMPTS {
                debug!(rating, problem = %problem.problem_id, "bot gave up after {attempts} attempts");
                break 'problems;
            }
            current_time += log_time_mean;
        }

        let solve_time = sample_log_normal(rng, log_time_mean, problem.time.variance.max(0.0).sqrt());
        if current_time + solve_time > end_time {
            break;
        }

        current_time += solve_time;
        result.insert(
            problem.problem_id.clone(),
            ReducedProblemResult {
                trials: 1,
                penalties: 0,
                accepted: true,
                point: problem.point,
                last_updated_epoch_second: current_time.round() as i64,
            },
        );
    }

    BotRunner { rating, result }
}

/// One bot per rating, all drawing from the same generator in order.
pub fn make_bot_runners(
    problems: &[FittableProblem],
    start: i64,
    end: i64,
    ratings: &[f64],
    rng: &mut impl Rng,
) -> Vec<BotRunner> {
    ratings
        .iter()
        .map(|&rating| simulate_bot(rating, problems, start, end, rng))
        .collect()
}

/// A bot pool in standings order, with the performance of every position.
///
/// Real participants are placed into the field by their total, not their
/// rating, and read their performance off their neighbours.
#[derive(Debug, Clone)]
pub struct BotField {
    /// Indices into the bot slice the field was built from, best first.
    order: Vec<usize>,
    totals: Vec<UserTotalResult>,
    ratings: Vec<f64>,
    performances: Vec<f64>,
    penalty_second: i64,
}

impl BotField {
    pub fn build(bots: &[BotRunner], penalty_second: i64) -> Self {
        let totals: Vec<UserTotalResult> = bots.iter().map(|b| calc_user_total_result(&b.result)).collect();

        let mut order: Vec<usize> = (0..bots.len()).collect();
        order.sort_by(|&a, &b| {
            compare_total_result(&totals[a], &totals[b], penalty_second)
                .then_with(|| bots[b].rating.total_cmp(&bots[a].rating))
        });

        let ratings: Vec<f64> = order.iter().map(|&i| bots[i].rating).collect();
        let performances = calculate_performances(&ratings);

        BotField {
            totals: order.iter().map(|&i| totals[i]).collect(),
            order,
            ratings,
            performances,
            penalty_second,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bot indices in standings order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn totals(&self) -> &[UserTotalResult] {
        &self.totals
    }

    pub fn ratings(&self) -> &[f64] {
        &self.ratings
    }

    /// Performance of each position, aligned with [`BotField::order`].
    pub fn performances(&self) -> &[f64] {
        &self.performances
    }

    /// Number of bots that rank strictly above `total`.
    pub fn insertion_index(&self, total: &UserTotalResult) -> usize {
        self.totals
            .partition_point(|bot| compare_total_result(bot, total, self.penalty_second) == Ordering::Less)
    }

    /// Performance of a participant with `total`: the midpoint of the bots
    /// directly above and below, or the nearest bot at either end.
    /// `None` for an empty field.
    pub fn estimate(&self, total: &UserTotalResult) -> Option<f64> {
        let n = self.performances.len();
        if n == 0 {
            return None;
        }
        let index = self.insertion_index(total);
        let performance = if index == 0 {
            self.performances[0]
        } else if index == n {
            self.performances[n - 1]
        } else {
            (self.performances[index - 1] + self.performances[index]) / 2.0
        };
        Some(performance)
    }
}

/// Grow a bot pool around the given participant totals.
///
/// Starts from [`bootstrap_ratings`], then repeatedly estimates every
/// participant against the current pool and simulates one new bot at each
/// estimate, until the pool holds `config.min_bot_pool` bots or
/// `config.max_refinement_rounds` rounds have run. Without participants the
/// bootstrap bots are returned as is.
pub fn make_fitting_bots<F>(
    mut make_bots: F,
    user_totals: &[UserTotalResult],
    penalty_second: i64,
    config: &FittingConfig,
) -> Vec<BotRunner>
where
    F: FnMut(&[f64]) -> Vec<BotRunner>,
{
    let mut bots = make_bots(&bootstrap_ratings());
    if user_totals.is_empty() {
        return bots;
    }

    let mut round = 0;
    while bots.len() < config.min_bot_pool && round < config.max_refinement_rounds {
        let field = BotField::build(&bots, penalty_second);
        let candidates: Vec<f64> = user_totals
            .iter()
            .filter_map(|total| field.estimate(total))
            .map(|performance| performance.clamp(MIN_RATING, MAX_RATING))
            .collect();

        let new_bots = make_bots(&candidates);
        if new_bots.is_empty() {
            break;
        }
        bots.extend(new_bots);
        round += 1;
        debug!(round, pool = bots.len(), "refined bot pool");
    }

    bots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DifficultyModel, TimeModel};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const START: i64 = 1_000_000;
    const END: i64 = START + 6000;

    fn problem(id: &str, difficulty: f64, point: f64) -> FittableProblem {
        FittableProblem {
            problem_id: id.to_string(),
            point,
            difficulty: DifficultyModel {
                difficulty,
                discrimination: 0.004,
                raw_difficulty: Some(difficulty),
            },
            time: TimeModel {
                slope: -0.0005,
                intercept: 7.5,
                variance: 0.25,
            },
        }
    }

    fn contest() -> Vec<FittableProblem> {
        let mut problems = vec![
            problem("d", 1600.0, 400.0),
            problem("a", -200.0, 100.0),
            problem("c", 1000.0, 300.0),
            problem("b", 400.0, 200.0),
        ];
        sort_by_difficulty(&mut problems);
        problems
    }

    fn total(point: f64, last: i64) -> UserTotalResult {
        UserTotalResult {
            point,
            penalties: 0,
            last_updated_epoch_second: last,
        }
    }

    #[test]
    fn test_bootstrap_grid() {
        let ratings = bootstrap_ratings();
        assert_eq!(ratings.first(), Some(&-1000.0));
        assert_eq!(ratings.last(), Some(&4000.0));
        assert_eq!(ratings.len(), 11);
    }

    #[test]
    fn test_sort_by_difficulty() {
        let contest = contest();
        let ids: Vec<&str> = contest.iter().map(|p| p.problem_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_same_seed_same_bot() {
        let problems = contest();
        let mut rng1 = ChaCha8Rng::seed_from_u64(7);
        let mut rng2 = ChaCha8Rng::seed_from_u64(7);
        let ratings = [200.0, 1200.0, 2400.0];
        let a = make_bot_runners(&problems, START, END, &ratings, &mut rng1);
        let b = make_bot_runners(&problems, START, END, &ratings, &mut rng2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_strong_bot_solves_in_order_within_window() {
        let problems = contest();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bot = simulate_bot(4000.0, &problems, START, END, &mut rng);

        assert_eq!(bot.rating, 4000.0);
        assert!(!bot.result.is_empty());
        let mut previous = START;
        for p in &problems {
            let Some(r) = bot.result.get(&p.problem_id) else { break };
            assert_eq!(r.trials, 1);
            assert_eq!(r.penalties, 0);
            assert!(r.accepted);
            assert_eq!(r.point, p.point);
            assert!(r.last_updated_epoch_second >= previous);
            assert!(r.last_updated_epoch_second <= END);
            previous = r.last_updated_epoch_second;
        }
    }

    #[test]
    fn test_solved_problems_form_a_prefix() {
        let problems = contest();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for bot in make_bot_runners(&problems, START, END, &bootstrap_ratings(), &mut rng) {
            let solved: Vec<bool> = problems.iter().map(|p| bot.result.contains_key(&p.problem_id)).collect();
            let first_gap = solved.iter().position(|s| !s).unwrap_or(solved.len());
            assert!(solved[first_gap..].iter().all(|s| !s), "bot {} skipped a problem", bot.rating);
        }
    }

    #[test]
    fn test_hopeless_problem_terminates() {
        // Probability underflows to zero and failed attempts do not advance the
        // clock: only the attempt cap ends the loop.
        let mut hopeless = problem("x", 9000.0, 100.0);
        hopeless.difficulty.discrimination = 1.0;
        hopeless.time = TimeModel {
            slope: 0.0,
            intercept: -1.0,
            variance: 0.1,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let bot = simulate_bot(-5000.0, &[hopeless], START, END, &mut rng);
        assert!(bot.result.is_empty());
    }

    #[test]
    fn test_too_easy_problem_always_solved_first_try() {
        let mut easy = problem("e", -20000.0, 100.0);
        easy.difficulty.raw_difficulty = Some(-10000.0);
        easy.time.intercept = 3.0;
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for rating in [-3000.0, 0.0, 3000.0] {
            let bot = simulate_bot(rating, std::slice::from_ref(&easy), START, END, &mut rng);
            assert!(bot.result.contains_key("e"));
        }
    }

    #[test]
    fn test_zero_length_contest_records_nothing() {
        let problems = contest();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let bot = simulate_bot(3000.0, &problems, START, START, &mut rng);
        assert!(bot.result.is_empty());
    }

    #[test]
    fn test_field_estimate_clamps_at_ends() {
        let mut strong = ProblemResults::new();
        strong.insert(
            "a".to_string(),
            ReducedProblemResult { trials: 1, penalties: 0, accepted: true, point: 100.0, last_updated_epoch_second: 50 },
        );
        let bots = vec![
            BotRunner { rating: 0.0, result: ProblemResults::new() },
            BotRunner { rating: 2000.0, result: strong },
        ];
        let field = BotField::build(&bots, 0);
        assert_eq!(field.order(), &[1, 0]);
        assert_eq!(field.ratings(), &[2000.0, 0.0]);

        let perf = field.performances().to_vec();
        assert_eq!(field.estimate(&total(500.0, 10)), Some(perf[0]));
        assert_eq!(field.estimate(&total(100.0, 70)), Some((perf[0] + perf[1]) / 2.0));
        // Ties with the last bot land before it, between the two.
        assert_eq!(field.estimate(&UserTotalResult::default()), Some((perf[0] + perf[1]) / 2.0));
        assert_eq!(field.insertion_index(&UserTotalResult::default()), 1);
    }

    #[test]
    fn test_empty_field_has_no_estimate() {
        let field = BotField::build(&[], 300);
        assert!(field.is_empty());
        assert_eq!(field.estimate(&total(100.0, 10)), None);
    }

    #[test]
    fn test_fitting_without_users_returns_bootstrap() {
        let problems = contest();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let bots = make_fitting_bots(
            |ratings| make_bot_runners(&problems, START, END, ratings, &mut rng),
            &[],
            300,
            &FittingConfig::default(),
        );
        assert_eq!(bots.len(), bootstrap_ratings().len());
    }

    #[test]
    fn test_fitting_grows_pool_near_participants() {
        let problems = contest();
        let users = [total(300.0, START + 2500), total(1000.0, START + 4000)];
        let config = FittingConfig { min_bot_pool: 41, max_refinement_rounds: 100 };

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let bots = make_fitting_bots(
            |ratings| make_bot_runners(&problems, START, END, ratings, &mut rng),
            &users,
            300,
            &config,
        );
        // 11 bootstrap bots, then 2 per round until at least 41.
        assert_eq!(bots.len(), 41);
        assert!(bots.iter().all(|b| (MIN_RATING..=MAX_RATING).contains(&b.rating)));

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let again = make_fitting_bots(
            |ratings| make_bot_runners(&problems, START, END, ratings, &mut rng),
            &users,
            300,
            &config,
        );
        assert_eq!(bots, again);
    }

    #[test]
    fn test_fitting_respects_round_budget() {
        let problems = contest();
        let users = [total(100.0, START + 600)];
        let config = FittingConfig { min_bot_pool: 10_000, max_refinement_rounds: 5 };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let bots = make_fitting_bots(
            |ratings| make_bot_runners(&problems, START, END, ratings, &mut rng),
            &users,
            0,
            &config,
        );
        assert_eq!(bots.len(), 11 + 5);
    }
}
