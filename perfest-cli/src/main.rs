mod config;
mod input;
mod output;

use clap::Parser;
use perfest_core::{calculate_performances, run_estimation, EstimationOptions, ModelCapability};
use rand::Rng;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "perfest", version, about = "Estimate performance ratings for virtual contests")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Rank a contest and estimate each participant's performance
    Estimate(EstimateArgs),
    /// Performance of every position in a field of ratings (best first)
    Performances(PerformancesArgs),
    /// Solve probability and time predictions for each problem of a contest
    Predict(PredictArgs),
    /// Create a default config file (default: ~/.config/perfest/config.toml)
    Init(InitArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Where to write the config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overwrite an existing config file
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct EstimateArgs {
    /// Contest definition (JSON)
    #[arg(long)]
    contest: PathBuf,

    /// Seed of the bot simulation
    #[arg(long, conflicts_with = "random_seed")]
    seed: Option<u64>,

    /// Draw a fresh seed instead of the configured one
    #[arg(long)]
    random_seed: bool,

    /// Bots to simulate before refinement stops
    #[arg(long)]
    min_bots: Option<usize>,

    /// Upper bound on refinement rounds
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Penalty per wrong submission in seconds, overriding the contest file
    #[arg(long)]
    penalty_second: Option<i64>,

    /// Include the simulated bots in the standings
    #[arg(long)]
    bots: bool,

    /// Also compute the maximum-likelihood performance of each participant
    #[arg(long)]
    likelihood: bool,

    /// Skip bot simulation and only rank
    #[arg(long)]
    no_estimate: bool,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,

    /// Log refinement progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: ~/.config/perfest/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct PerformancesArgs {
    /// File with one rating per line, or a JSON array
    #[arg(long)]
    ratings: Option<PathBuf>,

    /// Inline rating (repeatable)
    #[arg(long = "rating", allow_hyphen_values = true)]
    inline_ratings: Vec<f64>,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct PredictArgs {
    /// Contest definition (JSON)
    #[arg(long)]
    contest: PathBuf,

    /// Rating to predict for
    #[arg(long, allow_hyphen_values = true)]
    rating: f64,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Estimate(args) => run_estimate(args),
        Commands::Performances(args) => {
            init_logging(false);
            let ratings = input::load_ratings(args.ratings.as_deref(), &args.inline_ratings);
            let performances = calculate_performances(&ratings);
            output::print_performances(&ratings, &performances, args.json);
        }
        Commands::Predict(args) => {
            init_logging(false);
            let contest = input::load_contest(&args.contest);
            let predictions: Vec<output::ProblemPrediction> = contest
                .problems
                .iter()
                .map(|p| {
                    let capability = p.model.as_ref().map_or(ModelCapability::NotFittable, |m| m.capability());
                    output::predict_problem(p.id.clone(), capability, args.rating)
                })
                .collect();
            output::print_predictions(&predictions, args.rating, args.json);
        }
        Commands::Init(args) => {
            let path = args.config.unwrap_or_else(config::config_path);
            config::write_default_config(&path, args.force)
                .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));
            println!("Created config at {}", path.display());
            println!("Edit it to set your default seed, bot pool size, etc.");
        }
    }
}

fn run_estimate(args: EstimateArgs) {
    init_logging(args.verbose);

    // Load config file, merge with CLI args (CLI wins)
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let mut contest = input::load_contest(&args.contest);
    if let Some(penalty_second) = args.penalty_second.or(cfg.penalty_second) {
        contest.penalty_second = penalty_second;
    }

    let defaults = EstimationOptions::default();
    let seed = if args.random_seed {
        rand::rng().random()
    } else {
        args.seed.or(cfg.seed).unwrap_or(defaults.seed)
    };
    let options = EstimationOptions {
        seed,
        min_bot_pool: args.min_bots.or(cfg.min_bot_pool).unwrap_or(defaults.min_bot_pool),
        max_refinement_rounds: args
            .max_rounds
            .or(cfg.max_refinement_rounds)
            .unwrap_or(defaults.max_refinement_rounds),
        estimate_performances: !args.no_estimate,
        include_bots: args.bots || cfg.show_bots.unwrap_or(false),
        likelihood_performance: args.likelihood,
    };

    info!(
        contest = %args.contest.display(),
        participants = contest.participants.len(),
        problems = contest.problems.len(),
        submissions = contest.submissions.len(),
        seed,
        "estimating"
    );

    let standings = run_estimation(&contest, &options).unwrap_or_else(|e| bail(format!("{}: {e}", args.contest.display())));

    if args.json {
        output::print_json(&standings, contest.start, contest.penalty_second, seed);
    } else {
        output::print_table(&standings, contest.start, contest.penalty_second, args.likelihood);
        if args.random_seed {
            println!("Seed: {seed}");
        }
    }
}
