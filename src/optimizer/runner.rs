use super::initialization::{self, Strategy};
use super::{HillClimber, Termination, TieBreak};
use crate::config::{ExperimentConfig, RECOMMENDED_MIN_SEEDS};
use crate::error::SfResult;
use crate::matrix::CoverageMatrix;
use crate::preprocess::{self, Mode, Reduction, ReductionReport};
use crate::stats::Statistics;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

/// Per-run quality metrics.
///
/// `fdcloss` and `coverage_pct` are measured in the matrix the climber
/// worked on (reduced unless preprocessing was skipped); the `original_*`
/// pair re-evaluates the same tests against the matrix as loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    pub original_size: usize,
    pub solution_size: usize,
    pub reduction: usize,
    pub reduction_pct: f64,
    pub tssr: f64,
    pub fdcloss: f64,
    pub coverage_pct: f64,
    pub covered_requirements: usize,
    pub original_fdcloss: f64,
    pub original_coverage_pct: f64,
    pub iterations: usize,
    pub improvements: usize,
    pub evaluations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub seed: u64,
    pub initial_size: usize,
    pub initial_complete: bool,
    /// Retained tests as original indices, ascending.
    pub solution: Vec<usize>,
    pub termination: Termination,
    pub metrics: RunMetrics,
    pub history: Vec<usize>,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub config: ExperimentConfig,
    pub original_tests: usize,
    pub original_requirements: usize,
    pub reduced_tests: usize,
    pub reduced_requirements: usize,
    pub reduction: ReductionReport,
    pub runs: Vec<RunRecord>,
    pub statistics: Statistics,
}

/// Observer notified after each seed finishes.
pub trait ProgressCallback {
    fn on_run_complete(&self, run: usize, total: usize, record: &RunRecord);
}

/// Callback that ignores every notification.
pub struct Silent;

impl ProgressCallback for Silent {
    fn on_run_complete(&self, _run: usize, _total: usize, _record: &RunRecord) {}
}

pub struct ExperimentRunner<'a> {
    matrix: &'a CoverageMatrix,
    config: ExperimentConfig,
}

impl<'a> ExperimentRunner<'a> {
    pub fn new(matrix: &'a CoverageMatrix, config: ExperimentConfig) -> SfResult<Self> {
        config.ensure_valid()?;
        Ok(Self { matrix, config })
    }

    /// Preprocessing is deterministic, so it runs once and every seed
    /// starts from the same reduced matrix.
    pub fn reduce(&self) -> Reduction {
        if !self.config.preprocess {
            return Reduction::unchanged(self.matrix);
        }

        let reduction = preprocess::preprocess(self.matrix, self.config.mode);
        debug!(
            "Preprocessing (mode {}) removed {} tests and {} requirements",
            self.config.mode,
            reduction.tests_removed(),
            reduction.requirements_removed()
        );
        reduction
    }

    pub fn run<CB: ProgressCallback>(&self, callback: CB) -> ExperimentReport {
        if self.config.seeds.len() < RECOMMENDED_MIN_SEEDS {
            warn!(
                "⚠️  Only {} seed(s); at least {} are recommended for meaningful statistics.",
                self.config.seeds.len(),
                RECOMMENDED_MIN_SEEDS
            );
        }

        let reduction = self.reduce();
        let total = self.config.seeds.len();

        let runs: Vec<RunRecord> = self
            .config
            .seeds
            .iter()
            .enumerate()
            .map(|(i, &seed)| {
                let record = self.run_seed(&reduction, seed);
                callback.on_run_complete(i + 1, total, &record);
                record
            })
            .collect();

        let statistics = Statistics::from_runs(&runs);

        ExperimentReport {
            config: self.config.clone(),
            original_tests: self.matrix.num_tests(),
            original_requirements: self.matrix.num_requirements(),
            reduced_tests: reduction.matrix.num_tests(),
            reduced_requirements: reduction.matrix.num_requirements(),
            reduction: reduction.report,
            runs,
            statistics,
        }
    }

    /// One independent run: fresh rng, fresh initial solution, fresh climber.
    pub fn run_seed(&self, reduction: &Reduction, seed: u64) -> RunRecord {
        let started = Instant::now();
        let working = &reduction.matrix;
        let mut rng = fastrand::Rng::with_seed(seed);

        let initial = initialization::generate(working, self.config.strategy, &mut rng);
        let initial_complete = initial.is_complete(working);
        if !initial_complete {
            warn!(
                "Seed {}: initial solution covers {}/{} requirements; the climber keeps that floor.",
                seed,
                initial.covered.len(),
                working.num_requirements()
            );
        }

        let result = HillClimber::new(working, &initial.tests)
            .climb(&self.config.climb_options(), &mut rng);

        let solution = working.to_original(&result.solution);
        let metrics = self.measure(working, &result.solution, &solution, &result);

        debug!(
            "Seed {}: {} -> {} tests ({:?}, {} iterations)",
            seed,
            initial.tests.len(),
            metrics.solution_size,
            result.termination,
            result.iterations
        );

        RunRecord {
            seed,
            initial_size: initial.tests.len(),
            initial_complete,
            solution,
            termination: result.termination,
            metrics,
            history: result.history,
            elapsed_secs: started.elapsed().as_secs_f64(),
        }
    }

    fn measure(
        &self,
        working: &CoverageMatrix,
        local: &[usize],
        original_ids: &[usize],
        result: &super::ClimbResult,
    ) -> RunMetrics {
        let original_size = self.matrix.num_tests();
        let solution_size = local.len();
        let reduction = original_size.saturating_sub(solution_size);
        let tssr = reduction as f64 / original_size as f64;

        let covered = working.covered(local).len();
        let coverable = working.coverable().len();

        // Same tests, evaluated against the matrix as loaded.
        let positions: HashMap<usize, usize> = self
            .matrix
            .test_ids()
            .iter()
            .enumerate()
            .map(|(pos, &id)| (id, pos))
            .collect();
        let in_loaded: Vec<usize> = original_ids
            .iter()
            .filter_map(|id| positions.get(id).copied())
            .collect();
        let orig_covered = self.matrix.covered(&in_loaded).len();
        let orig_coverable = self.matrix.coverable().len();

        RunMetrics {
            original_size,
            solution_size,
            reduction,
            reduction_pct: tssr * 100.0,
            tssr,
            fdcloss: loss(covered, coverable),
            coverage_pct: pct(covered, working.num_requirements()),
            covered_requirements: covered,
            original_fdcloss: loss(orig_covered, orig_coverable),
            original_coverage_pct: pct(orig_covered, self.matrix.num_requirements()),
            iterations: result.iterations,
            improvements: result.improvements,
            evaluations: result.evaluations,
        }
    }
}

fn loss(covered: usize, coverable: usize) -> f64 {
    if coverable == 0 {
        0.0
    } else {
        1.0 - covered as f64 / coverable as f64
    }
}

fn pct(covered: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}

/// Convenience for callers that only have the pieces, not a config record.
pub fn run_experiment(
    matrix: &CoverageMatrix,
    mode: Mode,
    strategy: Strategy,
    seeds: &[u64],
    max_iterations: usize,
    tie_break: TieBreak,
) -> SfResult<ExperimentReport> {
    let config = ExperimentConfig {
        tie_break,
        ..ExperimentConfig::new(mode, strategy, seeds.to_vec(), max_iterations)
    };
    Ok(ExperimentRunner::new(matrix, config)?.run(Silent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::loader::parse_matrix;

    #[test]
    fn test_scenario_metrics() {
        let matrix = parse_matrix("10110\n01101\n11010\n00111\n").unwrap();
        let report =
            run_experiment(&matrix, Mode::A, Strategy::Greedy, &[1], 100, TieBreak::Lowest)
                .unwrap();

        let run = &report.runs[0];
        assert_eq!(run.solution, vec![0, 1]);
        assert_eq!(run.metrics.tssr, 0.5);
        assert_eq!(run.metrics.reduction_pct, 50.0);
        assert_eq!(run.metrics.fdcloss, 0.0);
        assert_eq!(run.metrics.coverage_pct, 100.0);
        assert_eq!(run.termination, Termination::LocalOptimum);
        assert_eq!(report.reduced_tests, 4);
    }

    #[test]
    fn test_zero_seeds_rejected_before_running() {
        let matrix = parse_matrix("1\n").unwrap();
        let res = run_experiment(&matrix, Mode::A, Strategy::All, &[], 10, TieBreak::Lowest);
        assert!(res.is_err());
    }
}
