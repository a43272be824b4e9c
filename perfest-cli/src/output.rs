/// Output formatting: terminal table and JSON.
use perfest_core::{
    calculate_top_player_equivalent_effort, clip_rating, effective_time, predict_solve_probability,
    predict_solve_time, ModelCapability, ProblemId, Standings, UserTotalResult,
};
use serde::Serialize;

use crate::bail;

#[derive(Serialize)]
struct JsonRow<'a> {
    rank: usize,
    participant: &'a str,
    is_bot: bool,
    point: f64,
    penalties: u32,
    /// Seconds from start to the last improvement, penalties included.
    finish_seconds: Option<i64>,
    performance: Option<f64>,
    likelihood_performance: Option<f64>,
}

#[derive(Serialize)]
struct JsonFirstAcceptance<'a> {
    problem: &'a str,
    participant: &'a str,
    elapsed_seconds: i64,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    seed: u64,
    rows: Vec<JsonRow<'a>>,
    first_acceptances: Vec<JsonFirstAcceptance<'a>>,
    estimation_available: bool,
    bot_pool_size: usize,
}

fn print_pretty(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => bail(format!("Failed to serialize output: {e}")),
    }
}

/// `h:mm:ss` for a non-negative number of seconds.
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}:{:02}", seconds / 3600, seconds / 60 % 60, seconds % 60)
}

/// Finishing time relative to `start` with penalties, as ranked. `None`
/// before the first scoring submission.
pub fn finish_seconds(total: &UserTotalResult, start: i64, penalty_second: i64) -> Option<i64> {
    (total.point > 0.0).then(|| effective_time(total, penalty_second).saturating_sub(start))
}

fn format_performance(performance: Option<f64>) -> String {
    performance.map_or_else(|| "-".to_string(), |p| format!("{}", clip_rating(p)))
}

/// Print standings as a formatted terminal table.
pub fn print_table(standings: &Standings, start: i64, penalty_second: i64, show_likelihood: bool) {
    let name_width = standings
        .rows
        .iter()
        .map(|r| r.participant.len())
        .max()
        .unwrap_or(11)
        .max(11); // at least "Participant"

    print!("   # | {:<name_width$} |  Score | Penalty |     Time | Perf.", "Participant");
    if show_likelihood {
        print!(" | Likelihood");
    }
    println!();
    println!("-----|-{}-|--------|---------|----------|------", "-".repeat(name_width));

    for row in &standings.rows {
        let elapsed = finish_seconds(&row.total, start, penalty_second).map_or_else(|| "-".to_string(), format_elapsed);
        print!(
            "{:>4} | {:<name_width$} | {:>6} | {:>7} | {:>8} | {:>5}",
            row.rank,
            row.participant,
            row.total.point,
            row.total.penalties,
            elapsed,
            format_performance(row.estimated_performance),
        );
        if show_likelihood {
            print!(" | {:>10}", format_performance(row.likelihood_performance));
        }
        println!();
    }

    if !standings.first_acceptances.is_empty() {
        println!("\nFirst acceptances:");
        for (problem, fa) in &standings.first_acceptances {
            println!("  {problem}: {} at {}", fa.participant, format_elapsed(fa.elapsed_seconds));
        }
    }

    let real = standings.rows.iter().filter(|r| !r.is_bot).count();
    if standings.estimation_available {
        println!("\n{real} participants ranked against {} simulated bots", standings.bot_pool_size);
    } else {
        println!("\n{real} participants ranked (performance estimation unavailable)");
    }
}

fn json_output(standings: &Standings, start: i64, penalty_second: i64, seed: u64) -> JsonOutput<'_> {
    let rows = standings
        .rows
        .iter()
        .map(|r| JsonRow {
            rank: r.rank,
            participant: &r.participant,
            is_bot: r.is_bot,
            point: r.total.point,
            penalties: r.total.penalties,
            finish_seconds: finish_seconds(&r.total, start, penalty_second),
            performance: r.estimated_performance,
            likelihood_performance: r.likelihood_performance,
        })
        .collect();

    let first_acceptances = standings
        .first_acceptances
        .iter()
        .map(|(problem, fa)| JsonFirstAcceptance {
            problem,
            participant: &fa.participant,
            elapsed_seconds: fa.elapsed_seconds,
        })
        .collect();

    JsonOutput {
        seed,
        rows,
        first_acceptances,
        estimation_available: standings.estimation_available,
        bot_pool_size: standings.bot_pool_size,
    }
}

/// Print standings as JSON, with the seed that produced them.
pub fn print_json(standings: &Standings, start: i64, penalty_second: i64, seed: u64) {
    print_pretty(&json_output(standings, start, penalty_second, seed));
}

#[derive(Serialize)]
struct JsonPerformance {
    position: usize,
    rating: f64,
    performance: f64,
}

pub fn print_performances(ratings: &[f64], performances: &[f64], json: bool) {
    if json {
        let entries: Vec<JsonPerformance> = ratings
            .iter()
            .zip(performances)
            .enumerate()
            .map(|(i, (&rating, &performance))| JsonPerformance {
                position: i + 1,
                rating,
                performance,
            })
            .collect();
        print_pretty(&entries);
        return;
    }

    println!("   # |   Rating | Performance");
    println!("-----|----------|------------");
    for (i, (rating, performance)) in ratings.iter().zip(performances).enumerate() {
        println!("{:>4} | {:>8} | {:>11}", i + 1, rating, performance);
    }
}

/// Per-problem predictions at one rating.
#[derive(Debug, Serialize, PartialEq)]
pub struct ProblemPrediction {
    pub problem: ProblemId,
    pub solve_probability: Option<f64>,
    pub median_solve_seconds: Option<f64>,
    pub top_player_effort_seconds: Option<f64>,
}

pub fn predict_problem(problem: ProblemId, capability: ModelCapability, rating: f64) -> ProblemPrediction {
    let (difficulty, time) = match capability {
        ModelCapability::FullyFittable(d, t) => (Some(d), Some(t)),
        ModelCapability::DifficultyOnly(d) => (Some(d), None),
        ModelCapability::TimeOnly(t) => (None, Some(t)),
        ModelCapability::NotFittable => (None, None),
    };
    ProblemPrediction {
        problem,
        solve_probability: difficulty.map(|d| predict_solve_probability(&d, rating)),
        median_solve_seconds: time.map(|t| predict_solve_time(&t, rating)),
        top_player_effort_seconds: time.map(|t| calculate_top_player_equivalent_effort(&t)),
    }
}

pub fn print_predictions(predictions: &[ProblemPrediction], rating: f64, json: bool) {
    if json {
        print_pretty(&predictions);
        return;
    }

    let id_width = predictions.iter().map(|p| p.problem.len()).max().unwrap_or(7).max(7);
    println!("Predictions at rating {rating}");
    println!(" {:<id_width$} | P(solve) |   Median | Top effort", "Problem");
    println!("-{}-|----------|----------|-----------", "-".repeat(id_width));
    for p in predictions {
        let probability = p.solve_probability.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0));
        let median = p.median_solve_seconds.map_or_else(|| "-".to_string(), |v| format_elapsed(v.round() as i64));
        let effort = p.top_player_effort_seconds.map_or_else(|| "-".to_string(), |v| format_elapsed(v.round() as i64));
        println!(" {:<id_width$} | {:>8} | {:>8} | {:>10}", p.problem, probability, median, effort);
    }
}
