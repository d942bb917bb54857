use crate::config::ExperimentConfig;
use crate::error::SfResult;
use crate::matrix::{loader, CoverageMatrix, MatrixProfile};
use crate::optimizer::{ExperimentReport, ExperimentRunner, ProgressCallback, Termination};
use crate::preprocess::{self, Mode, ReductionReport};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Profile of a matrix, optionally with the reduction a mode would apply.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub profile: MatrixProfile,
    pub reduction: Option<ReducedView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReducedView {
    pub mode: Mode,
    pub report: ReductionReport,
    pub profile: MatrixProfile,
    pub kept_tests: Vec<usize>,
    pub kept_requirements: Vec<usize>,
}

/// Paths written by `write_results`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFiles {
    pub json: PathBuf,
    pub csv: PathBuf,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    seed: u64,
    original_size: usize,
    solution_size: usize,
    reduction_pct: f64,
    tssr: f64,
    fdcloss: f64,
    coverage_pct: f64,
    original_coverage_pct: f64,
    iterations: usize,
    improvements: usize,
    termination: Termination,
    elapsed_secs: f64,
    solution: &'a str,
}

/// Loads one matrix file and runs the full experiment on it.
pub fn run_file<CB: ProgressCallback>(
    path: &Path,
    config: &ExperimentConfig,
    callback: CB,
) -> SfResult<ExperimentReport> {
    let matrix = loader::load_matrix(path)?;
    let runner = ExperimentRunner::new(&matrix, config.clone())?;
    Ok(runner.run(callback))
}

/// Runs every `*.txt` matrix in `dir`. Files are independent, so they are
/// processed in parallel; a failing file does not stop the others.
pub fn run_directory<CB, F>(
    dir: &Path,
    config: &ExperimentConfig,
    make_callback: F,
) -> SfResult<Vec<(PathBuf, SfResult<ExperimentReport>)>>
where
    CB: ProgressCallback,
    F: Fn(&Path) -> CB + Sync,
{
    config.ensure_valid()?;
    let files = loader::list_matrix_files(dir)?;
    if files.is_empty() {
        warn!("⚠️  No matrix files (*.txt) found in {}", dir.display());
        return Ok(Vec::new());
    }

    info!("📂 Found {} matrix file(s) in {}", files.len(), dir.display());

    Ok(files
        .into_par_iter()
        .map(|path| {
            let result = run_file(&path, config, make_callback(&path));
            (path, result)
        })
        .collect())
}

pub fn inspect(path: &Path, mode: Option<Mode>) -> SfResult<Inspection> {
    let matrix = loader::load_matrix(path)?;
    Ok(inspect_matrix(&matrix, mode))
}

pub fn inspect_matrix(matrix: &CoverageMatrix, mode: Option<Mode>) -> Inspection {
    let reduction = mode.map(|mode| {
        let reduced = preprocess::preprocess(matrix, mode);
        ReducedView {
            mode,
            profile: reduced.matrix.profile(),
            kept_tests: reduced.kept_tests().to_vec(),
            kept_requirements: reduced.kept_requirements().to_vec(),
            report: reduced.report,
        }
    });

    Inspection {
        profile: matrix.profile(),
        reduction,
    }
}

/// Writes `<stem>_<timestamp>.json` (the whole report) and
/// `<stem>_<timestamp>.csv` (one row per seed) into `out_dir`.
pub fn write_results(
    report: &ExperimentReport,
    stem: &str,
    out_dir: &Path,
    timestamp: &str,
) -> SfResult<ResultFiles> {
    fs::create_dir_all(out_dir)?;
    let base = format!("{}_{}", stem, timestamp);

    let json_path = out_dir.join(format!("{}.json", base));
    fs::write(&json_path, serde_json::to_string_pretty(report)?)?;

    let csv_path = out_dir.join(format!("{}.csv", base));
    let mut writer = csv::Writer::from_path(&csv_path)?;
    for run in &report.runs {
        let solution = run
            .solution
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writer.serialize(CsvRow {
            seed: run.seed,
            original_size: run.metrics.original_size,
            solution_size: run.metrics.solution_size,
            reduction_pct: run.metrics.reduction_pct,
            tssr: run.metrics.tssr,
            fdcloss: run.metrics.fdcloss,
            coverage_pct: run.metrics.coverage_pct,
            original_coverage_pct: run.metrics.original_coverage_pct,
            iterations: run.metrics.iterations,
            improvements: run.metrics.improvements,
            termination: run.termination,
            elapsed_secs: run.elapsed_secs,
            solution: &solution,
        })?;
    }
    writer.flush()?;

    Ok(ResultFiles {
        json: json_path,
        csv: csv_path,
    })
}

/// `YYYYmmdd_HHMMSS` in local time, as used in result file names.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
