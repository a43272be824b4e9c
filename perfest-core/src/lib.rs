/// perfest-core: performance estimation for virtual contests.
///
/// Submissions → reduced per-problem results → totals → standings, with a
/// performance rating per participant inferred from simulated bots.
/// No IO, no global state. Randomness comes from a caller-supplied seed.
///
/// Problems, participants and submissions are identified by the judge's own
/// string ids; the crate never invents ids except for bot labels.
///
/// # Quick start
///
/// ```rust
/// use perfest_core::{
///     run_estimation, ContestInput, ContestProblem, EstimationOptions, ProblemSolveModel, Submission,
/// };
///
/// let model = ProblemSolveModel {
///     slope: Some(-0.0005),
///     intercept: Some(7.8),
///     difficulty: Some(800.0),
///     raw_difficulty: Some(800.0),
///     discrimination: Some(0.004),
///     variance: Some(0.3),
///     is_experimental: false,
/// };
///
/// let input = ContestInput {
///     start: 0,
///     end: 6000,
///     penalty_second: 300,
///     participants: vec!["alice".into(), "bob".into()],
///     problems: vec![ContestProblem {
///         id: "abc001_a".into(),
///         judge_point: Some(100.0),
///         model: Some(model),
///         ..Default::default()
///     }],
///     submissions: vec![Submission {
///         id: 1,
///         problem_id: "abc001_a".into(),
///         user_id: "alice".into(),
///         epoch_second: 420,
///         result: "AC".into(),
///         point: 100.0,
///     }],
///     ..Default::default()
/// };
///
/// let options = EstimationOptions { min_bot_pool: 40, ..Default::default() };
/// let standings = run_estimation(&input, &options).unwrap();
///
/// for row in &standings.rows {
///     println!("{} {} {:?}", row.rank, row.participant, row.estimated_performance);
/// }
/// ```

pub mod aggregate;
pub mod bot;
pub mod constants;
pub mod error;
pub mod estimation;
pub mod likelihood;
pub mod lockout;
pub mod performance;
pub mod problem_model;
pub mod reducer;
pub mod types;

// Re-export primary public API at crate root.
pub use aggregate::{
    assign_ranks, calc_user_total_result, compare_standings_rows, compare_total_result, effective_time, sort_standings,
};
pub use bot::{bootstrap_ratings, make_bot_runners, make_fitting_bots, simulate_bot, BotField, FittingConfig};
pub use error::EstimationError;
pub use estimation::{fittable_problems, run_estimation, validate_input};
pub use likelihood::{estimate_likelihood_performance, ProblemOutcome};
pub use performance::calculate_performances;
pub use problem_model::{
    calculate_top_player_equivalent_effort, clip_rating, predict_solve_probability, predict_solve_time,
};
pub use reducer::{reduce_submissions, reduce_user_contest_result};
pub use types::{
    BotRunner, ContestInput, ContestMode, ContestProblem, DifficultyModel, EstimationOptions, FirstAcceptance,
    FittableProblem, ModelCapability, ParticipantId, ProblemId, ProblemResults, ProblemSolveModel,
    ReducedProblemResult, Standings, StandingsRow, Submission, TimeModel, UserTotalResult,
};
