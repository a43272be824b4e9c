/// Lower bound of the rating search space. Performances and bot ratings are
/// clamped into `[MIN_RATING, MAX_RATING]` so every bisection is well-defined.
pub const MIN_RATING: f64 = -10000.0;

/// Upper bound of the rating search space.
pub const MAX_RATING: f64 = 10000.0;

/// Base of the expected-rank logistic used by the performance calculator.
/// `1 / (1 + 6^((m - r) / 400))` is the AtCoder-style win expectation.
pub const EXPECTED_RANK_BASE: f64 = 6.0;

/// Rating scale of the expected-rank logistic.
pub const EXPECTED_RANK_SCALE: f64 = 400.0;

/// Hard cap on bisection steps per rank position. Each step halves a
/// 20000-wide interval, so 100 steps is far past f64 resolution; the cap only
/// matters when `lb` and `ub` straddle a `.5` boundary at machine precision.
pub const MAX_BISECTION_STEPS: usize = 100;

/// First rating of the coarse bootstrap grid.
pub const BOOTSTRAP_RATING_START: f64 = -1000.0;

/// Exclusive end of the coarse bootstrap grid.
pub const BOOTSTRAP_RATING_END: f64 = 4200.0;

/// Spacing of the coarse bootstrap grid.
pub const BOOTSTRAP_RATING_STEP: f64 = 500.0;

/// Refinement stops once the bot pool holds at least this many bots.
pub const DEFAULT_MIN_BOT_POOL: usize = 400;

/// Upper bound on refinement rounds, independent of the pool target.
pub const DEFAULT_MAX_REFINEMENT_ROUNDS: usize = 400;

/// Maximum Bernoulli retries a bot spends on one problem before giving up on
/// the rest of the contest. Guards the retry loop when the solve probability
/// underflows or `slope * rating + intercept <= 0` stops the clock.
pub const MAX_SOLVE_ATTEMPTS: usize = 10_000;

/// Models whose raw difficulty is at or below this value are "too easy":
/// the bot solves them on the first attempt.
pub const TOO_EASY_RAW_DIFFICULTY: f64 = -10000.0;

/// Point value used for a simulated solve when neither an override nor a
/// judge point is known.
pub const DEFAULT_PROBLEM_POINT: f64 = 100.0;

/// Rating at which solve time is reported as "top player equivalent effort".
pub const TOP_PLAYER_RATING: f64 = 4000.0;

/// Ratings below this are compressed for display.
pub const RATING_CLIP_THRESHOLD: f64 = 400.0;

/// Probabilities are clamped into `(PROBABILITY_EPSILON, 1 - PROBABILITY_EPSILON)`
/// before taking logarithms.
pub const PROBABILITY_EPSILON: f64 = 1e-12;

/// Candidate range scanned by the likelihood estimator, `[start, end)`.
pub const LIKELIHOOD_RATING_START: i32 = -4000;
pub const LIKELIHOOD_RATING_END: i32 = 4000;

/// Verdict string of an accepted submission.
pub const ACCEPTED_VERDICT: &str = "AC";

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 0x6174_636f_6465_72;
