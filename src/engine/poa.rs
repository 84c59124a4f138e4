//! Price of Anarchy analysis.
//!
//! Ties the optimizer, the Shapley engine and the equilibrium checker
//! together: the optimal welfare over k-subsets of the pool is divided by the
//! welfare of the worst k-subset that is an equilibrium, once per utility
//! rule. The two ratios are independent and need not agree.

use std::path::Path;
use std::time::Instant;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::config::AnalysisConfig;
use crate::engine::equilibrium::{EquilibriumChecker, RuleKind, UtilityRule, WorstEquilibrium};
use crate::engine::error::{GameError, Result};
use crate::engine::game::{Assignment, PoolGame};
use crate::engine::interrupt::Interrupt;
use crate::engine::optimizer::{greedy, optimal, Selection};
use crate::engine::shapley::shapley_values;
use crate::engine::valuation::Valuation;

/// Outcome of a Price of Anarchy computation for one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PoaOutcome {
    /// Both welfare values exist and the ratio is finite.
    Defined {
        /// Exact optimal welfare over k-subsets.
        optimal_welfare: f64,
        /// The worst equilibrium.
        worst_equilibrium: WorstEquilibrium,
        /// `optimal_welfare / worst_equilibrium.welfare`.
        ratio: f64,
    },
    /// No k-subset is an equilibrium under the rule.
    NoEquilibrium,
    /// The worst equilibrium has zero welfare.
    ZeroWelfare,
    /// The pool is above the exact limit; the search was not attempted.
    Skipped {
        /// Pool size.
        pool_size: usize,
        /// Configured exact limit.
        limit: usize,
    },
}

impl PoaOutcome {
    /// The ratio, when defined.
    pub fn ratio(&self) -> Option<f64> {
        match self {
            PoaOutcome::Defined { ratio, .. } => Some(*ratio),
            _ => None,
        }
    }
}

/// The assignment-relative diagnostic.
///
/// Compares what the chosen players cover against covering the whole pool.
/// This is not the worst-case Price of Anarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenAssignmentPoa {
    /// Value of the entire pool.
    pub unconstrained_optimum: f64,
    /// Welfare of the assignment as given.
    pub marginal_welfare: f64,
    /// Welfare with players re-ordered by descending Shapley value; equal
    /// to `marginal_welfare` since welfare does not depend on order.
    pub shapley_welfare: f64,
    /// Player order by descending Shapley value.
    pub shapley_order: Vec<usize>,
    /// `unconstrained_optimum / marginal_welfare`, `None` when the welfare
    /// is not positive.
    pub poa_marginal: Option<f64>,
    /// `unconstrained_optimum / shapley_welfare`, `None` when the welfare
    /// is not positive.
    pub poa_shapley: Option<f64>,
}

/// Everything the engine reports about one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    /// Valuation name.
    pub valuation: String,
    /// Pool size.
    pub pool_size: usize,
    /// Pool index held by each player.
    pub choices: Vec<usize>,
    /// Marginal contribution of each player.
    pub contributions: Vec<f64>,
    /// Welfare of the assignment.
    pub social_welfare: f64,
    /// Shapley value of each player.
    pub shapley_values: Vec<f64>,
    /// Best (or greedy) selection of the same size.
    pub optimum: Selection,
    /// Price of Anarchy under marginal-contribution utility.
    pub poa_marginal: PoaOutcome,
    /// Price of Anarchy under Shapley utility.
    pub poa_shapley: PoaOutcome,
    /// The assignment-relative diagnostic.
    pub chosen: ChosenAssignmentPoa,
    /// Seconds spent producing the report.
    pub elapsed_seconds: f64,
}

impl GameReport {
    /// The outcome for `rule`.
    pub fn poa(&self, rule: RuleKind) -> &PoaOutcome {
        match rule {
            RuleKind::Marginal => &self.poa_marginal,
            RuleKind::Shapley => &self.poa_shapley,
        }
    }

    /// Save the report as pretty-printed JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

/// Runs the full analysis over one pool.
///
/// # Example
/// ```
/// use coverage_game_solver::engine::{AnalysisConfig, PoaAnalyzer, PoolGame, RuleKind};
/// use coverage_game_solver::games::coverage::{Circle, CoverageValuation};
///
/// let pool = vec![
///     Circle::new(0.0, 0.0, 1.0),
///     Circle::new(5.0, 0.0, 2.0),
///     Circle::new(0.5, 0.0, 1.0),
/// ];
/// let analyzer = PoaAnalyzer::new(
///     PoolGame::new(CoverageValuation, pool),
///     AnalysisConfig::default(),
/// ).unwrap();
///
/// let poa = analyzer.price_of_anarchy(2, RuleKind::Marginal).unwrap();
/// assert!(poa >= 1.0);
/// ```
pub struct PoaAnalyzer<V: Valuation> {
    game: PoolGame<V>,
    config: AnalysisConfig,
    interrupt: Interrupt,
    thread_pool: Option<rayon::ThreadPool>,
}

impl<V: Valuation> PoaAnalyzer<V> {
    /// Create an analyzer over a pool, building the game with the
    /// configured cache setting.
    pub fn from_pool(valuation: V, pool: Vec<V::Item>, config: AnalysisConfig) -> Result<Self> {
        let game = PoolGame::with_cache(valuation, pool, config.use_cache);
        Self::new(game, config)
    }

    /// Create an analyzer, validating the configuration.
    ///
    /// The game keeps its own cache setting; `config.use_cache` only
    /// applies through [`PoaAnalyzer::from_pool`].
    pub fn new(game: PoolGame<V>, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let thread_pool = match config.num_threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| GameError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            game,
            config,
            interrupt: Interrupt::new(),
            thread_pool,
        })
    }

    /// The game being analyzed.
    pub fn game(&self) -> &PoolGame<V> {
        &self.game
    }

    /// The configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Handle that cancels searches of this analyzer from another thread.
    pub fn cancel_handle(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Exact optimum when the pool is within the exact limit, greedy otherwise.
    pub fn optimum(&self, k: usize) -> Result<Selection> {
        if self.game.pool_size() <= self.config.exact_pool_limit {
            self.install(|| optimal(&self.game, k))
        } else {
            warn!(
                "pool of {} exceeds exact limit {}, using greedy optimum",
                self.game.pool_size(),
                self.config.exact_pool_limit
            );
            greedy(&self.game, k)
        }
    }

    /// Worst equilibrium of size `k` under `rule`, honoring the deadline.
    pub fn worst_equilibrium<R: UtilityRule>(&self, k: usize, rule: R) -> Result<Option<WorstEquilibrium>> {
        let interrupt = self.interrupt.rearm(self.config.deadline());
        let checker = EquilibriumChecker::new(&self.game, rule).with_scope(self.config.deviation_scope);
        self.install(|| checker.worst_equilibrium(k, &interrupt))
    }

    /// Welfare of the worst equilibrium of size `k`, `+inf` if none exists.
    pub fn worst_equilibrium_welfare<R: UtilityRule>(&self, k: usize, rule: R) -> Result<f64> {
        Ok(self
            .worst_equilibrium(k, rule)?
            .map_or(f64::INFINITY, |worst| worst.welfare))
    }

    /// Exact optimal welfare divided by worst-equilibrium welfare.
    ///
    /// Fails with [`GameError::NoEquilibrium`] or [`GameError::ZeroWelfare`]
    /// instead of returning a degenerate ratio.
    pub fn price_of_anarchy<R: UtilityRule>(&self, k: usize, rule: R) -> Result<f64> {
        let name = rule.name();
        match self.poa_outcome(k, rule)? {
            PoaOutcome::Defined { ratio, .. } => Ok(ratio),
            PoaOutcome::ZeroWelfare => Err(GameError::ZeroWelfare),
            PoaOutcome::NoEquilibrium | PoaOutcome::Skipped { .. } => Err(GameError::NoEquilibrium {
                k,
                rule: name.to_string(),
            }),
        }
    }

    /// Price of Anarchy for every built-in rule, marginal first.
    pub fn price_of_anarchy_all(&self, k: usize) -> Result<Vec<(RuleKind, Result<f64>)>> {
        let mut results = Vec::with_capacity(RuleKind::ALL.len());
        for rule in RuleKind::ALL {
            match self.price_of_anarchy(k, rule) {
                Err(e @ (GameError::NoEquilibrium { .. } | GameError::ZeroWelfare)) => {
                    results.push((rule, Err(e)))
                }
                other => results.push((rule, Ok(other?))),
            }
        }
        Ok(results)
    }

    fn poa_outcome<R: UtilityRule>(&self, k: usize, rule: R) -> Result<PoaOutcome> {
        let name = rule.name();
        let Some(worst) = self.worst_equilibrium(k, rule)? else {
            info!("{} rule, k={}: no equilibrium", name, k);
            return Ok(PoaOutcome::NoEquilibrium);
        };
        if worst.welfare <= 0.0 {
            return Ok(PoaOutcome::ZeroWelfare);
        }

        let best = self.install(|| optimal(&self.game, k))?;
        let ratio = best.welfare / worst.welfare;
        info!(
            "{} PoA for k={}: {:.4} / {:.4} = {:.4}",
            name, k, best.welfare, worst.welfare, ratio
        );

        Ok(PoaOutcome::Defined {
            optimal_welfare: best.welfare,
            worst_equilibrium: worst,
            ratio,
        })
    }

    /// Compare the assignment with covering the entire pool.
    ///
    /// The Shapley variant re-orders the players' own regions by descending
    /// Shapley value. Welfare is a set function, so `shapley_welfare` always
    /// equals `marginal_welfare`; the ordering itself is reported for
    /// display. Ratios are `None` when the welfare is not positive.
    pub fn poa_for_chosen_assignment(&self, assignment: &Assignment) -> Result<ChosenAssignmentPoa> {
        let choices = assignment.choices();
        let all: Vec<usize> = (0..self.game.pool_size()).collect();
        let unconstrained_optimum = self.game.value_of(&all);

        let marginal_welfare = self.game.social_welfare(choices);
        let shapley = self.install(|| shapley_values(&self.game, choices))?;

        let mut shapley_order: Vec<usize> = (0..choices.len()).collect();
        shapley_order.sort_by(|&a, &b| shapley[b].total_cmp(&shapley[a]));
        let reordered: Vec<usize> = shapley_order.iter().map(|&player| choices[player]).collect();
        let shapley_welfare = self.game.social_welfare(&reordered);

        Ok(ChosenAssignmentPoa {
            unconstrained_optimum,
            marginal_welfare,
            shapley_welfare,
            shapley_order,
            poa_marginal: ratio(unconstrained_optimum, marginal_welfare),
            poa_shapley: ratio(unconstrained_optimum, shapley_welfare),
        })
    }

    /// Full report for an assignment, with `k` equal to its player count.
    pub fn analyze_assignment(&self, assignment: &Assignment) -> Result<GameReport> {
        let start = Instant::now();
        let choices = assignment.choices();
        let k = choices.len();

        let contributions = self.game.contributions(choices);
        let social_welfare = self.game.social_welfare(choices);
        let shapley = self.install(|| shapley_values(&self.game, choices))?;
        let optimum = self.optimum(k)?;

        let mut outcomes = Vec::with_capacity(RuleKind::ALL.len());
        for rule in RuleKind::ALL {
            let outcome = if self.game.pool_size() > self.config.exact_pool_limit {
                PoaOutcome::Skipped {
                    pool_size: self.game.pool_size(),
                    limit: self.config.exact_pool_limit,
                }
            } else {
                self.poa_outcome(k, rule)?
            };
            outcomes.push(outcome);
        }
        let poa_shapley = outcomes.pop().unwrap_or(PoaOutcome::NoEquilibrium);
        let poa_marginal = outcomes.pop().unwrap_or(PoaOutcome::NoEquilibrium);

        let chosen = self.poa_for_chosen_assignment(assignment)?;

        Ok(GameReport {
            valuation: self.game.valuation().name().to_string(),
            pool_size: self.game.pool_size(),
            choices: choices.to_vec(),
            contributions,
            social_welfare,
            shapley_values: shapley,
            optimum,
            poa_marginal,
            poa_shapley,
            chosen,
            elapsed_seconds: start.elapsed().as_secs_f64(),
        })
    }

    /// Run `op` on the dedicated pool, if one was configured.
    fn install<T, F>(&self, op: F) -> T
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match &self.thread_pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::ConfigError;
    use crate::engine::equilibrium::DeviationScope;

    /// Disjoint weighted resources.
    struct Additive;

    impl Valuation for Additive {
        type Item = f64;

        fn value(&self, items: &[f64]) -> f64 {
            items.iter().sum()
        }

        fn name(&self) -> &str {
            "additive"
        }
    }

    fn analyzer(config: AnalysisConfig) -> PoaAnalyzer<Additive> {
        PoaAnalyzer::new(PoolGame::new(Additive, vec![1.0, 10.0, 2.0]), config).unwrap()
    }

    #[test]
    fn test_price_of_anarchy_per_rule() {
        let analyzer = analyzer(AnalysisConfig::default());
        assert!((analyzer.price_of_anarchy(2, RuleKind::Marginal).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(
            analyzer.price_of_anarchy(2, RuleKind::Shapley),
            Err(GameError::NoEquilibrium {
                k: 2,
                rule: "shapley".to_string()
            })
        );

        let all = analyzer.price_of_anarchy_all(2).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].1.is_ok());
        assert!(all[1].1.is_err());
    }

    #[test]
    fn test_unclaimed_scope_changes_outcome() {
        let config = AnalysisConfig::default().with_deviation_scope(DeviationScope::Unclaimed);
        let analyzer = analyzer(config);
        let poa = analyzer.price_of_anarchy(2, RuleKind::Shapley).unwrap();
        assert!((poa - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_welfare_is_reported() {
        let analyzer = PoaAnalyzer::new(
            PoolGame::new(Additive, vec![0.0, 0.0]),
            AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(
            analyzer.price_of_anarchy(1, RuleKind::Marginal),
            Err(GameError::ZeroWelfare)
        );
    }

    #[test]
    fn test_chosen_assignment_diagnostic() {
        let analyzer = analyzer(AnalysisConfig::default());
        let assignment = Assignment::new(vec![0, 2], 2, 3).unwrap();
        let chosen = analyzer.poa_for_chosen_assignment(&assignment).unwrap();
        assert_eq!(chosen.unconstrained_optimum, 13.0);
        assert_eq!(chosen.marginal_welfare, 3.0);
        assert_eq!(chosen.shapley_welfare, 3.0);
        assert_eq!(chosen.shapley_order, vec![1, 0]);
        assert!((chosen.poa_marginal.unwrap() - 13.0 / 3.0).abs() < 1e-12);
        assert_eq!(chosen.poa_shapley, chosen.poa_marginal);
    }

    #[test]
    fn test_empty_assignment_report_is_valid_json() {
        let analyzer = analyzer(AnalysisConfig::default());
        let assignment = Assignment::new(vec![], 0, 3).unwrap();
        let report = analyzer.analyze_assignment(&assignment).unwrap();

        assert_eq!(report.social_welfare, 0.0);
        assert_eq!(report.chosen.marginal_welfare, 0.0);
        assert_eq!(report.chosen.poa_marginal, None);
        assert_eq!(report.chosen.poa_shapley, None);
        assert_eq!(report.poa_marginal, PoaOutcome::ZeroWelfare);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"poa_marginal\":null"));
        let back: GameReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chosen, report.chosen);
        assert_eq!(back.poa_shapley, PoaOutcome::ZeroWelfare);
    }

    #[test]
    fn test_zero_welfare_assignment_has_no_ratio() {
        let analyzer = PoaAnalyzer::new(
            PoolGame::new(Additive, vec![0.0, 0.0, 4.0]),
            AnalysisConfig::default(),
        )
        .unwrap();
        let assignment = Assignment::new(vec![0, 1], 2, 3).unwrap();
        let chosen = analyzer.poa_for_chosen_assignment(&assignment).unwrap();
        assert_eq!(chosen.unconstrained_optimum, 4.0);
        assert_eq!(chosen.poa_marginal, None);
        assert!(serde_json::to_string(&chosen).is_ok());
    }

    #[test]
    fn test_from_pool_honors_cache_setting() {
        let config = AnalysisConfig::default().with_cache(false);
        let analyzer = PoaAnalyzer::from_pool(Additive, vec![1.0, 10.0, 2.0], config).unwrap();
        analyzer.price_of_anarchy(2, RuleKind::Marginal).unwrap();
        assert!(analyzer.game().cache_stats().is_none());

        let analyzer =
            PoaAnalyzer::from_pool(Additive, vec![1.0, 10.0, 2.0], AnalysisConfig::default()).unwrap();
        analyzer.price_of_anarchy(2, RuleKind::Marginal).unwrap();
        assert!(analyzer.game().cache_stats().is_some());
    }

    #[test]
    fn test_deadline_stops_equilibrium_search() {
        let pool: Vec<f64> = (1..=14).map(f64::from).collect();
        let config = AnalysisConfig::default().with_deadline_secs(1e-9);
        let analyzer = PoaAnalyzer::from_pool(Additive, pool, config).unwrap();
        assert!(matches!(
            analyzer.worst_equilibrium(7, RuleKind::Shapley),
            Err(GameError::DeadlineExceeded { .. })
        ));
        assert!(matches!(
            analyzer.price_of_anarchy(7, RuleKind::Marginal),
            Err(GameError::DeadlineExceeded { .. })
        ));
    }

    #[test]
    fn test_unrepresentable_deadline_is_rejected() {
        let config = AnalysisConfig::default().with_deadline_secs(1e20);
        assert!(matches!(
            PoaAnalyzer::from_pool(Additive, vec![1.0, 2.0], config),
            Err(GameError::Config(ConfigError::InvalidDeadline(_)))
        ));
    }

    #[test]
    fn test_report() {
        let analyzer = analyzer(AnalysisConfig::default().with_threads(2));
        let assignment = Assignment::new(vec![1, 2], 2, 3).unwrap();
        let report = analyzer.analyze_assignment(&assignment).unwrap();

        assert_eq!(report.valuation, "additive");
        assert_eq!(report.contributions, vec![10.0, 2.0]);
        assert_eq!(report.social_welfare, 12.0);
        assert_eq!(report.optimum.welfare, 12.0);
        assert_eq!(report.poa(RuleKind::Marginal).ratio(), Some(1.0));
        assert_eq!(report.poa_shapley, PoaOutcome::NoEquilibrium);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"no_equilibrium\""));
        let back: GameReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.social_welfare, 12.0);
        assert_eq!(back.poa_shapley, PoaOutcome::NoEquilibrium);
    }

    #[test]
    fn test_large_pool_falls_back_to_greedy() {
        let config = AnalysisConfig::default().with_exact_pool_limit(2);
        let analyzer = analyzer(config);
        let assignment = Assignment::new(vec![0, 1], 2, 3).unwrap();
        let report = analyzer.analyze_assignment(&assignment).unwrap();
        assert_eq!(report.optimum.method, crate::engine::OptimumMethod::Greedy);
        assert!(matches!(report.poa_marginal, PoaOutcome::Skipped { pool_size: 3, limit: 2 }));
    }

    #[test]
    fn test_cancelled_analyzer() {
        let analyzer = analyzer(AnalysisConfig::default());
        analyzer.cancel_handle().cancel();
        assert_eq!(
            analyzer.price_of_anarchy(2, RuleKind::Marginal),
            Err(GameError::Cancelled)
        );
    }
}
