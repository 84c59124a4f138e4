//! Circle coverage game analyzer binary.
//!
//! Usage:
//!   cargo run --release --bin coverage_poa -- [OPTIONS]
//!
//! Options:
//!   --config <FILE>      Configuration JSON file (optional)
//!   --regions <N>        Number of circles in the pool (default: 6)
//!   --players <K>        Number of players (default: 3)
//!   --seed <N>           Random seed (optional)
//!   --choices <LIST>     Comma-separated pool indices, one per player
//!   --click <X,Y>        Select the circle under a point (repeatable)
//!   --scope <SCOPE>      full_pool or unclaimed
//!   --threads <N>        Number of threads (default: auto)
//!   --deadline <SECS>    Time budget per equilibrium search
//!   --trials <N>         Analyze N random games instead of one
//!   --output <FILE>      Output file (default: coverage_report.json)
//!   --log-level <LEVEL>  off, error, warn, info, debug or trace
//!   --log-file <FILE>    Write logs to a file instead of stderr

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

use coverage_game_solver::engine::{
    AnalysisConfig, ConfigError, DeviationScope, GameReport, PoaAnalyzer, PoaOutcome, RuleKind,
};
use coverage_game_solver::games::coverage::{
    random_pool, Circle, CoverageValuation, Point, PoolConfig, SelectionState,
};
use coverage_game_solver::setup::{parse_level, setup_logger};

/// Contents of a `--config` file. Missing sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RunConfig {
    pool: PoolConfig,
    analysis: AnalysisConfig,
    players: Option<usize>,
}

impl RunConfig {
    fn from_json_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let run: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        run.validate()?;
        Ok(run)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.pool.validate()?;
        self.analysis.validate()
    }
}

/// Per-rule statistics over many random games.
#[derive(Debug, Clone, Default, Serialize)]
struct RuleSummary {
    rule: String,
    defined: usize,
    no_equilibrium: usize,
    zero_welfare: usize,
    mean_poa: f64,
    max_poa: f64,
}

#[derive(Debug, Clone, Serialize)]
struct TrialSummary {
    trials: usize,
    players: usize,
    pool: PoolConfig,
    mean_welfare_ratio: f64,
    rules: Vec<RuleSummary>,
    elapsed_seconds: f64,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let mut config_file: Option<String> = None;
    let mut regions: Option<usize> = None;
    let mut players: Option<usize> = None;
    let mut seed: Option<u64> = None;
    let mut choices: Option<Vec<usize>> = None;
    let mut clicks: Vec<Point> = Vec::new();
    let mut scope: Option<DeviationScope> = None;
    let mut threads: usize = 0;
    let mut deadline: Option<f64> = None;
    let mut trials: usize = 0;
    let mut output_file = "coverage_report.json".to_string();
    let mut log_level = LevelFilter::Warn;
    let mut log_file: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--regions" | "-r" => {
                i += 1;
                if i < args.len() {
                    regions = args[i].parse().ok();
                }
            }
            "--players" | "-k" => {
                i += 1;
                if i < args.len() {
                    players = args[i].parse().ok();
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--choices" => {
                i += 1;
                if i < args.len() {
                    match parse_list::<usize>(&args[i]) {
                        Some(list) => choices = Some(list),
                        None => {
                            eprintln!("Invalid choices: {}", args[i]);
                            return;
                        }
                    }
                }
            }
            "--click" => {
                i += 1;
                if i < args.len() {
                    match parse_list::<f64>(&args[i]).as_deref() {
                        Some(&[x, y]) => clicks.push(Point::new(x, y)),
                        _ => {
                            eprintln!("Invalid click point: {}", args[i]);
                            return;
                        }
                    }
                }
            }
            "--scope" => {
                i += 1;
                if i < args.len() {
                    scope = match args[i].as_str() {
                        "full_pool" | "full" => Some(DeviationScope::FullPool),
                        "unclaimed" => Some(DeviationScope::Unclaimed),
                        other => {
                            eprintln!("Unknown scope: {}", other);
                            return;
                        }
                    };
                }
            }
            "--threads" | "-t" => {
                i += 1;
                if i < args.len() {
                    threads = args[i].parse().unwrap_or(0);
                }
            }
            "--deadline" => {
                i += 1;
                if i < args.len() {
                    deadline = args[i].parse().ok();
                }
            }
            "--trials" => {
                i += 1;
                if i < args.len() {
                    trials = args[i].parse().unwrap_or(0);
                }
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = args[i].clone();
                }
            }
            "--log-level" => {
                i += 1;
                if i < args.len() {
                    match parse_level(&args[i]) {
                        Some(level) => log_level = level,
                        None => {
                            eprintln!("Unknown log level: {}", args[i]);
                            return;
                        }
                    }
                }
            }
            "--log-file" => {
                i += 1;
                if i < args.len() {
                    log_file = Some(PathBuf::from(&args[i]));
                }
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return;
            }
        }
        i += 1;
    }

    if let Err(e) = setup_logger(log_level, &log_file) {
        eprintln!("Error setting up logger: {}", e);
        return;
    }

    // Load configuration, then apply command-line overrides
    let mut run = match &config_file {
        Some(path) => match RunConfig::from_json_file(path) {
            Ok(run) => run,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return;
            }
        },
        None => RunConfig::default(),
    };
    if let Some(n) = regions {
        run.pool.num_regions = n;
    }
    if let Some(s) = seed {
        run.pool.seed = Some(s);
    }
    if let Some(scope) = scope {
        run.analysis.deviation_scope = scope;
    }
    if threads > 0 {
        run.analysis.num_threads = Some(threads);
    }
    if let Some(secs) = deadline {
        run.analysis.deadline_secs = Some(secs);
    }
    let num_players = players
        .or(run.players)
        .or(choices.as_ref().map(Vec::len))
        .unwrap_or(3);

    if let Err(e) = run.validate() {
        eprintln!("Invalid configuration: {}", e);
        return;
    }
    if num_players > run.pool.num_regions {
        eprintln!(
            "Cannot seat {} players on a pool of {} regions",
            num_players, run.pool.num_regions
        );
        return;
    }

    println!("=================================================");
    println!("  Circle Coverage Game: Shapley & Price of Anarchy");
    println!("=================================================");
    println!();
    println!("Regions: {}", run.pool.num_regions);
    println!(
        "Radius: [{}, {})  Board: {} x {}",
        run.pool.radius_range.0, run.pool.radius_range.1, run.pool.board_size.0, run.pool.board_size.1
    );
    println!("Players: {}", num_players);
    println!("Deviations: {:?}", run.analysis.deviation_scope);
    println!("Threads: {}", if threads == 0 { "auto".to_string() } else { threads.to_string() });
    if let Some(s) = run.pool.seed {
        println!("Seed: {}", s);
    }
    println!("Output: {}", output_file);
    println!();

    if trials > 0 {
        run_trials(&run, num_players, trials, &output_file);
    } else {
        run_single(&run, num_players, choices, &clicks, &output_file);
    }
}

fn run_single(
    run: &RunConfig,
    num_players: usize,
    choices: Option<Vec<usize>>,
    clicks: &[Point],
    output_file: &str,
) {
    let mut rng = run.pool.rng();
    let pool = match random_pool(&run.pool, &mut rng) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Error generating pool: {}", e);
            return;
        }
    };

    println!("=== Pool ===");
    for (index, circle) in pool.iter().enumerate() {
        println!("  [{:>2}] {}", index, circle);
    }
    println!();

    let mut selection = SelectionState::new();
    for &index in choices.iter().flatten() {
        selection.toggle(index);
    }
    for &point in clicks {
        match selection.toggle_at(point, &pool) {
            Some(index) => info!("click ({}, {}) toggled region {}", point.x, point.y, index),
            None => println!("Click ({}, {}) hit no region", point.x, point.y),
        }
    }
    if choices.is_none() && clicks.is_empty() {
        for index in sample(&mut rng, pool.len(), num_players).into_iter() {
            selection.toggle(index);
        }
        println!("No choices given, players picked {:?} at random", selection.selected());
    }

    let assignment = match selection.finalize(num_players, pool.len()) {
        Ok(assignment) => assignment,
        Err(e) => {
            eprintln!("Invalid selection: {}", e);
            return;
        }
    };

    let analyzer = match PoaAnalyzer::from_pool(CoverageValuation, pool, run.analysis.clone()) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Error creating analyzer: {}", e);
            return;
        }
    };

    println!("Analyzing...");
    let report = match analyzer.analyze_assignment(&assignment) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            return;
        }
    };
    print_report(&report, analyzer.game().pool());

    if let Some(stats) = analyzer.game().cache_stats() {
        println!(
            "Cache: {} entries, {:.1}% hit rate",
            stats.entries,
            stats.hit_rate() * 100.0
        );
    }
    println!();

    println!("Exporting results to {}...", output_file);
    match report.save_json(output_file) {
        Ok(_) => println!("Results saved successfully!"),
        Err(e) => eprintln!("Error saving results: {}", e),
    }
}

fn print_report(report: &GameReport, pool: &[Circle]) {
    println!();
    println!("=== Players ===");
    for (player, &index) in report.choices.iter().enumerate() {
        println!(
            "  Player {}: region {:>2} {}  contribution {:>8.4}  Shapley {:>8.4}",
            player, index, pool[index], report.contributions[player], report.shapley_values[player]
        );
    }
    println!();
    println!("Social welfare: {:.4}", report.social_welfare);
    println!(
        "Optimum ({:?}): {:.4} with regions {:?}",
        report.optimum.method, report.optimum.welfare, report.optimum.indices
    );
    println!();
    println!("=== Price of Anarchy ===");
    for rule in RuleKind::ALL {
        match report.poa(rule) {
            PoaOutcome::Defined {
                ratio,
                worst_equilibrium,
                ..
            } => println!(
                "  {:<8} {:.4}  (worst equilibrium {:?}, welfare {:.4}, {} of {} subsets)",
                rule,
                ratio,
                worst_equilibrium.indices,
                worst_equilibrium.welfare,
                worst_equilibrium.equilibria_found,
                worst_equilibrium.subsets_checked
            ),
            PoaOutcome::NoEquilibrium => println!("  {:<8} undefined: no pure equilibrium", rule),
            PoaOutcome::ZeroWelfare => println!("  {:<8} undefined: worst equilibrium has zero welfare", rule),
            PoaOutcome::Skipped { pool_size, limit } => println!(
                "  {:<8} skipped: pool of {} exceeds exact limit {}",
                rule, pool_size, limit
            ),
        }
    }
    println!();
    println!("=== Chosen Assignment vs Whole Pool ===");
    println!("  Whole pool:       {:.4}", report.chosen.unconstrained_optimum);
    println!("  Ratio (marginal): {}", format_ratio(report.chosen.poa_marginal));
    println!(
        "  Ratio (Shapley):  {}  order {:?}",
        format_ratio(report.chosen.poa_shapley),
        report.chosen.shapley_order
    );
    println!();
    println!("Analysis time: {:.3}s", report.elapsed_seconds);
}

fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "undefined (no welfare)".to_string(), |r| format!("{:.4}", r))
}

fn run_trials(run: &RunConfig, num_players: usize, trials: usize, output_file: &str) {
    let start = Instant::now();
    let mut rng = run.pool.rng();
    let mut summaries: Vec<RuleSummary> = RuleKind::ALL
        .iter()
        .map(|rule| RuleSummary {
            rule: rule.to_string(),
            ..Default::default()
        })
        .collect();
    let mut welfare_ratio_total = 0.0;
    let mut completed = 0usize;

    let bar = ProgressBar::new(trials as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for _ in 0..trials {
        let pool = match random_pool(&run.pool, &mut rng) {
            Ok(pool) => pool,
            Err(e) => {
                bar.abandon_with_message(format!("error: {}", e));
                return;
            }
        };
        let picks: Vec<usize> = sample(&mut rng, pool.len(), num_players).into_vec();
        // Rotate so player order is not always ascending.
        let shift = rng.gen_range(0..picks.len().max(1));
        let mut selection = SelectionState::new();
        for &index in picks.iter().cycle().skip(shift).take(picks.len()) {
            selection.toggle(index);
        }

        let result = selection
            .finalize(num_players, pool.len())
            .and_then(|assignment| {
                let analyzer = PoaAnalyzer::from_pool(CoverageValuation, pool, run.analysis.clone())?;
                analyzer.analyze_assignment(&assignment)
            });
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                bar.abandon_with_message(format!("error: {}", e));
                return;
            }
        };

        if report.optimum.welfare > 0.0 {
            welfare_ratio_total += report.social_welfare / report.optimum.welfare;
        }
        for (summary, rule) in summaries.iter_mut().zip(RuleKind::ALL) {
            match report.poa(rule) {
                PoaOutcome::Defined { ratio, .. } => {
                    summary.defined += 1;
                    summary.mean_poa += ratio;
                    summary.max_poa = summary.max_poa.max(*ratio);
                }
                PoaOutcome::NoEquilibrium => summary.no_equilibrium += 1,
                PoaOutcome::ZeroWelfare => summary.zero_welfare += 1,
                PoaOutcome::Skipped { .. } => {}
            }
        }
        completed += 1;
        bar.inc(1);
    }
    bar.finish_with_message("done");

    for summary in &mut summaries {
        if summary.defined > 0 {
            summary.mean_poa /= summary.defined as f64;
        }
    }
    let summary = TrialSummary {
        trials: completed,
        players: num_players,
        pool: run.pool.clone(),
        mean_welfare_ratio: welfare_ratio_total / completed.max(1) as f64,
        rules: summaries,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    };

    println!();
    println!("=== {} Trials ===", summary.trials);
    println!("Mean welfare / optimum: {:.4}", summary.mean_welfare_ratio);
    for rule in &summary.rules {
        println!(
            "  {:<8} defined {:>5}  no equilibrium {:>5}  zero welfare {:>3}  mean PoA {:.4}  max PoA {:.4}",
            rule.rule, rule.defined, rule.no_equilibrium, rule.zero_welfare, rule.mean_poa, rule.max_poa
        );
    }
    println!("Total time: {:.2}s", summary.elapsed_seconds);
    println!();

    println!("Exporting results to {}...", output_file);
    let saved = serde_json::to_string_pretty(&summary)
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(output_file, json).map_err(|e| e.to_string()));
    match saved {
        Ok(_) => println!("Results saved successfully!"),
        Err(e) => eprintln!("Error saving results: {}", e),
    }
}

fn parse_list<T: std::str::FromStr>(text: &str) -> Option<Vec<T>> {
    text.split(',').map(|part| part.trim().parse().ok()).collect()
}

fn print_help() {
    println!("Circle Coverage Game Analyzer");
    println!();
    println!("Usage: coverage_poa [OPTIONS]");
    println!();
    println!("Game:");
    println!("  -c, --config <FILE>      Configuration JSON file");
    println!("  -r, --regions <N>        Number of circles in the pool (default: 6)");
    println!("  -k, --players <K>        Number of players (default: 3)");
    println!("  -s, --seed <N>           Random seed");
    println!();
    println!("Choices (default: random):");
    println!("  --choices <LIST>         Comma-separated pool indices, e.g. 0,3,5");
    println!("  --click <X,Y>            Toggle the first circle containing the point (repeatable)");
    println!();
    println!("Analysis:");
    println!("  --scope <SCOPE>          full_pool (default) or unclaimed");
    println!("  -t, --threads <N>        Number of threads (default: auto)");
    println!("  --deadline <SECS>        Time budget per equilibrium search");
    println!("  --trials <N>             Analyze N random games and summarize");
    println!();
    println!("Output:");
    println!("  -o, --output <FILE>      Output file (default: coverage_report.json)");
    println!("  --log-level <LEVEL>      off, error, warn (default), info, debug, trace");
    println!("  --log-file <FILE>        Write logs to a file instead of stderr");
    println!("  -h, --help               Show this help");
    println!();
    println!("Examples:");
    println!("  # Three players pick regions 0, 2 and 4 of a seeded pool");
    println!("  coverage_poa --seed 7 --choices 0,2,4");
    println!();
    println!("  # Select by clicking points on the board");
    println!("  coverage_poa --seed 7 --players 2 --click 3.5,4 --click 8,8");
    println!();
    println!("  # Average Price of Anarchy over 500 random 10-region games");
    println!("  coverage_poa --regions 10 --trials 500 --seed 1");
    println!();
    println!("  # Use custom config");
    println!("  coverage_poa --config configs/coverage.json");
}
