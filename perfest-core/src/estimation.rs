/// The estimation pipeline: contest input in, ranked standings with
/// performances out.
///
/// ```text
/// submissions ─► reduce (or lockout) ─► totals ─┬─► rank ─► rows
///                                               └─► bot fitting ─► BotField ─► performances
/// ```
use std::collections::{BTreeMap, HashMap, HashSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::aggregate::{assign_ranks, calc_user_total_result, first_acceptances, sort_standings};
use crate::bot::{make_bot_runners, make_fitting_bots, sort_by_difficulty, BotField, FittingConfig};
use crate::error::EstimationError;
use crate::likelihood::{estimate_likelihood_performance, outcomes_from_results};
use crate::lockout::lockout_results;
use crate::problem_model::clip_rating;
use crate::reducer::reduce_user_contest_result;
use crate::types::{
    ContestInput, ContestMode, ContestProblem, EstimationOptions, FittableProblem, ModelCapability,
    ParticipantId, ProblemResults, Standings, StandingsRow, Submission,
};

/// Reject inputs the pipeline cannot make sense of.
pub fn validate_input(input: &ContestInput) -> Result<(), EstimationError> {
    if input.end < input.start {
        return Err(EstimationError::InvalidWindow {
            start: input.start,
            end: input.end,
        });
    }
    if input.penalty_second < 0 {
        return Err(EstimationError::NegativePenalty(input.penalty_second));
    }

    let mut participants = HashSet::new();
    for participant in &input.participants {
        if !participants.insert(participant.as_str()) {
            return Err(EstimationError::DuplicateParticipant(participant.clone()));
        }
    }

    let mut problems = HashSet::new();
    for problem in &input.problems {
        if !problems.insert(problem.id.as_str()) {
            return Err(EstimationError::DuplicateProblem(problem.id.clone()));
        }
        if problem.model.as_ref().is_some_and(|m| !m.is_finite()) {
            return Err(EstimationError::NonFiniteModel(problem.id.clone()));
        }
    }

    for submission in &input.submissions {
        if !problems.contains(submission.problem_id.as_str()) {
            return Err(EstimationError::UnknownProblem {
                submission_id: submission.id,
                problem_id: submission.problem_id.clone(),
            });
        }
        if !participants.contains(submission.user_id.as_str()) {
            return Err(EstimationError::UnknownParticipant {
                submission_id: submission.id,
                user_id: submission.user_id.clone(),
            });
        }
    }
    Ok(())
}

/// Problems with a full model, easiest first. Everything else is left out
/// of simulation.
pub fn fittable_problems(problems: &[ContestProblem]) -> Vec<FittableProblem> {
    let mut fittable: Vec<FittableProblem> = problems
        .iter()
        .filter_map(|problem| {
            let capability = problem.model.as_ref().map(|m| m.capability());
            match capability {
                Some(ModelCapability::FullyFittable(difficulty, time)) => Some(FittableProblem {
                    problem_id: problem.id.clone(),
                    point: problem.simulated_point(),
                    difficulty,
                    time,
                }),
                Some(ModelCapability::DifficultyOnly(_) | ModelCapability::TimeOnly(_) | ModelCapability::NotFittable)
                | None => {
                    debug!(problem = %problem.id, "no full model, excluded from simulation");
                    None
                }
            }
        })
        .collect();
    sort_by_difficulty(&mut fittable);
    fittable
}

/// Reduced results for every participant, including those who never
/// submitted.
pub fn reduce_contest(input: &ContestInput) -> BTreeMap<ParticipantId, ProblemResults> {
    let overrides: HashMap<&str, f64> = input
        .problems
        .iter()
        .filter_map(|p| p.point_override.map(|point| (p.id.as_str(), point)))
        .collect();
    let point_override = |problem_id: &str| overrides.get(problem_id).copied();

    let mut results: BTreeMap<ParticipantId, ProblemResults> = match input.mode {
        ContestMode::Normal => {
            let mut by_user: HashMap<&str, Vec<Submission>> = HashMap::new();
            for submission in &input.submissions {
                by_user.entry(submission.user_id.as_str()).or_default().push(submission.clone());
            }
            by_user
                .into_iter()
                .map(|(user, submissions)| (user.to_string(), reduce_user_contest_result(&submissions, point_override)))
                .collect()
        }
        ContestMode::Lockout => lockout_results(&input.submissions, point_override),
    };

    for participant in &input.participants {
        results.entry(participant.clone()).or_default();
    }
    results
}

/// Run the whole pipeline.
///
/// Performances are only estimated in normal mode with at least one fully
/// modelled problem; otherwise every `estimated_performance` is `None` and
/// `estimation_available` is false.
pub fn run_estimation(input: &ContestInput, options: &EstimationOptions) -> Result<Standings, EstimationError> {
    validate_input(input)?;

    let results = reduce_contest(input);
    let fittable = fittable_problems(&input.problems);
    let estimation_available =
        options.estimate_performances && input.mode == ContestMode::Normal && !fittable.is_empty();
    if options.estimate_performances && !estimation_available {
        warn!(
            mode = ?input.mode,
            fittable = fittable.len(),
            "performance estimation unavailable for this contest"
        );
    }

    let users: Vec<(&ParticipantId, &ProblemResults)> = results.iter().collect();
    let user_totals: Vec<_> = users.iter().map(|(_, r)| calc_user_total_result(r)).collect();

    let mut bots = Vec::new();
    let mut field = None;
    if estimation_available {
        let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
        let config = FittingConfig {
            min_bot_pool: options.min_bot_pool,
            max_refinement_rounds: options.max_refinement_rounds,
        };
        bots = make_fitting_bots(
            |ratings| make_bot_runners(&fittable, input.start, input.end, ratings, &mut rng),
            &user_totals,
            input.penalty_second,
            &config,
        );
        field = Some(BotField::build(&bots, input.penalty_second));
    }

    let mut rows: Vec<StandingsRow> = users
        .iter()
        .zip(&user_totals)
        .map(|((participant, results), total)| StandingsRow {
            rank: 0,
            participant: (*participant).clone(),
            is_bot: false,
            total: *total,
            results: (*results).clone(),
            estimated_performance: field.as_ref().and_then(|f| f.estimate(total)),
            likelihood_performance: None,
        })
        .collect();

    if options.include_bots {
        if let Some(field) = &field {
            for ((&index, total), performance) in field.order().iter().zip(field.totals()).zip(field.performances()) {
                let bot = &bots[index];
                rows.push(StandingsRow {
                    rank: 0,
                    participant: format!("Bot: {}", clip_rating(bot.rating)),
                    is_bot: true,
                    total: *total,
                    results: bot.result.clone(),
                    estimated_performance: Some(*performance),
                    likelihood_performance: None,
                });
            }
        }
    }

    sort_standings(&mut rows, input.penalty_second);
    let totals: Vec<_> = rows.iter().map(|r| r.total).collect();
    for (row, rank) in rows.iter_mut().zip(assign_ranks(&totals, input.penalty_second)) {
        row.rank = rank;
    }

    if options.likelihood_performance && !fittable.is_empty() {
        for row in rows.iter_mut().filter(|r| !r.is_bot) {
            let outcomes = outcomes_from_results(&fittable, &row.results, input.start);
            row.likelihood_performance = estimate_likelihood_performance(&outcomes, &fittable);
        }
    }

    let first_acceptances = first_acceptances(
        rows.iter()
            .filter(|r| !r.is_bot)
            .map(|r| (r.participant.as_str(), &r.results)),
        input.start,
    );

    info!(
        participants = users.len(),
        bots = bots.len(),
        estimated = estimation_available,
        "standings computed"
    );

    Ok(Standings {
        rows,
        first_acceptances,
        estimation_available,
        bot_pool_size: bots.len(),
    })
}
