use std::collections::BTreeMap;

use crate::constants::{
    DEFAULT_MAX_REFINEMENT_ROUNDS, DEFAULT_MIN_BOT_POOL, DEFAULT_PROBLEM_POINT, DEFAULT_SEED,
};

/// Problem identifier as issued by the judge (e.g. `abc123_d`).
pub type ProblemId = String;

/// Participant identifier (judge user name, or a `Bot: <rating>` label).
pub type ParticipantId = String;

/// Reduced results of one participant, keyed by problem.
///
/// A `BTreeMap` keeps iteration order stable, which keeps sums and
/// serialized output identical across runs.
pub type ProblemResults = BTreeMap<ProblemId, ReducedProblemResult>;

/// Fitted difficulty/time parameters of a problem, as delivered by the
/// fitting collaborator. Every numeric field is individually optional.
///
/// Use [`ProblemSolveModel::capability`] to get a typed view before predicting.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemSolveModel {
    pub slope: Option<f64>,
    pub intercept: Option<f64>,
    pub difficulty: Option<f64>,
    pub raw_difficulty: Option<f64>,
    pub discrimination: Option<f64>,
    /// Log-scale variance of the solve time.
    pub variance: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_experimental: bool,
}

/// Parameters of the logistic solve-probability model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyModel {
    pub difficulty: f64,
    pub discrimination: f64,
    /// Unclipped difficulty; at or below the "too easy" threshold the problem
    /// is treated as always solved.
    pub raw_difficulty: Option<f64>,
}

/// Parameters of the log-normal solve-time model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeModel {
    pub slope: f64,
    pub intercept: f64,
    pub variance: f64,
}

/// What a [`ProblemSolveModel`] can be used for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelCapability {
    NotFittable,
    DifficultyOnly(DifficultyModel),
    TimeOnly(TimeModel),
    FullyFittable(DifficultyModel, TimeModel),
}

/// A problem that can take part in bot simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FittableProblem {
    pub problem_id: ProblemId,
    /// Points awarded to a bot that solves the problem.
    pub point: f64,
    pub difficulty: DifficultyModel,
    pub time: TimeModel,
}

/// A raw judge submission.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Submission {
    /// Strictly increasing; sorting by id is sorting by submission time.
    pub id: i64,
    pub problem_id: ProblemId,
    pub user_id: ParticipantId,
    pub epoch_second: i64,
    /// Judge verdict, e.g. `AC`, `WA`, `TLE`.
    pub result: String,
    pub point: f64,
}

/// Best-so-far outcome of one participant on one problem.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReducedProblemResult {
    pub trials: u32,
    /// Trials strictly before the submission that set `point`.
    pub penalties: u32,
    pub accepted: bool,
    pub point: f64,
    /// Time of the submission that last improved `point`.
    pub last_updated_epoch_second: i64,
}

/// One participant's contest total. Only problems with a positive point
/// contribute to any field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserTotalResult {
    pub point: f64,
    pub penalties: u32,
    pub last_updated_epoch_second: i64,
}

/// A simulated participant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BotRunner {
    /// Raw (unclipped) rating driving the simulation.
    pub rating: f64,
    pub result: ProblemResults,
}

/// How standings are scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ContestMode {
    /// Everyone scores every problem they solve.
    #[default]
    Normal,
    /// A problem belongs to the first participant who gets it accepted.
    Lockout,
}

/// A problem as configured for one virtual contest.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContestProblem {
    pub id: ProblemId,
    /// Contest-specific point. When set, accepted submissions score this and
    /// rejected submissions score 0.
    pub point_override: Option<f64>,
    /// The judge's own point for the problem, if known.
    pub judge_point: Option<f64>,
    pub model: Option<ProblemSolveModel>,
}

impl ContestProblem {
    /// Points a simulated solve is worth.
    pub fn simulated_point(&self) -> f64 {
        self.point_override
            .or(self.judge_point)
            .unwrap_or(DEFAULT_PROBLEM_POINT)
    }
}

/// Everything one estimation request needs.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContestInput {
    pub start: i64,
    pub end: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub penalty_second: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: ContestMode,
    pub participants: Vec<ParticipantId>,
    pub problems: Vec<ContestProblem>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub submissions: Vec<Submission>,
}

/// Knobs of the estimation pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EstimationOptions {
    /// Seed of the bot simulation generator.
    pub seed: u64,
    /// Refinement stops once this many bots exist.
    pub min_bot_pool: usize,
    /// Refinement stops after this many rounds even if the pool is smaller.
    pub max_refinement_rounds: usize,
    /// Run bot simulation and attach estimated performances.
    pub estimate_performances: bool,
    /// Add the simulated bots to the standings rows.
    pub include_bots: bool,
    /// Attach the maximum-likelihood performance to each row.
    pub likelihood_performance: bool,
}

impl Default for EstimationOptions {
    fn default() -> Self {
        EstimationOptions {
            seed: DEFAULT_SEED,
            min_bot_pool: DEFAULT_MIN_BOT_POOL,
            max_refinement_rounds: DEFAULT_MAX_REFINEMENT_ROUNDS,
            estimate_performances: true,
            include_bots: false,
            likelihood_performance: false,
        }
    }
}

/// One ranked line of the standings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandingsRow {
    /// 1-based; rows with identical totals share a rank.
    pub rank: usize,
    pub participant: ParticipantId,
    pub is_bot: bool,
    pub total: UserTotalResult,
    pub results: ProblemResults,
    /// Raw performance. `None` when estimation is unavailable.
    pub estimated_performance: Option<f64>,
    /// Clipped maximum-likelihood performance, when requested.
    pub likelihood_performance: Option<f64>,
}

/// Fastest accepted solve of a problem.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FirstAcceptance {
    pub participant: ParticipantId,
    /// Seconds since contest start.
    pub elapsed_seconds: i64,
}

/// Output of [`crate::estimation::run_estimation`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standings {
    pub rows: Vec<StandingsRow>,
    pub first_acceptances: BTreeMap<ProblemId, FirstAcceptance>,
    /// Whether performances could be estimated at all for this contest.
    pub estimation_available: bool,
    /// Number of simulated bots behind the estimates (0 when unavailable).
    pub bot_pool_size: usize,
}
