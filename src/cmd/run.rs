use crate::reports;
use clap::{ArgMatches, Args};
use std::path::{Path, PathBuf};
use suiteforge::api;
use suiteforge::config::{Config, SearchParams};
use suiteforge::error::SfResult;
use suiteforge::optimizer::{ExperimentReport, ProgressCallback, RunRecord};
use tracing::{debug, error, info, warn};

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: Config,

    /// Matrix file, or a directory of *.txt matrix files.
    #[arg(short, long, default_value = "matrices")]
    pub matrix: PathBuf,

    /// JSON file with search parameters; flags given here take precedence.
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    /// Write <name>_<timestamp>.json and .csv result files here.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Log every finished seed.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

struct CliLogger {
    name: String,
    verbose: bool,
}

impl ProgressCallback for CliLogger {
    fn on_run_complete(&self, run: usize, total: usize, record: &RunRecord) {
        let m = &record.metrics;
        if self.verbose {
            info!(
                "   [{}] seed {} ({}/{}) | size {} -> {} | reduction {:.2}% | coverage {:.2}%",
                self.name,
                record.seed,
                run,
                total,
                record.initial_size,
                m.solution_size,
                m.reduction_pct,
                m.coverage_pct
            );
        } else {
            debug!(
                "[{}] seed {} done ({}/{})",
                self.name, record.seed, run, total
            );
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "matrix".to_string())
}

pub fn run(args: RunArgs, matches: &ArgMatches) -> SfResult<()> {
    let params = match &args.config_file {
        Some(path) => {
            info!("⚙️  Loading search parameters from: {}", path.display());
            let mut file_params = SearchParams::load_from_file(path)?;
            file_params.merge_from_cli(&args.config.search, matches);
            file_params
        }
        None => args.config.search.clone(),
    };

    let config = params.validate()?;
    info!(
        "🧪 Mode {} | preprocessing {} | strategy {} | tie-break {} | {} seed(s) | max {} iterations",
        config.mode,
        if config.preprocess { "on" } else { "off" },
        config.strategy,
        config.tie_break,
        config.seeds.len(),
        config.max_iterations
    );

    let stamp = api::timestamp();
    let verbose = args.verbose;

    if args.matrix.is_dir() {
        let results = api::run_directory(&args.matrix, &config, |path| CliLogger {
            name: display_name(path),
            verbose,
        })?;

        let total = results.len();
        let mut failed = 0;
        for (path, result) in results {
            match result {
                Ok(report) => present(&path, &report, &args, &stamp)?,
                Err(e) => {
                    failed += 1;
                    error!("❌ {}: {}", path.display(), e);
                }
            }
        }

        if failed > 0 {
            warn!("⚠️  {} of {} matrices failed", failed, total);
        }
        info!("✅ Processed {} matrices", total - failed);
    } else {
        info!("📂 Loading matrix: {}", args.matrix.display());
        let logger = CliLogger {
            name: display_name(&args.matrix),
            verbose,
        };
        let report = api::run_file(&args.matrix, &config, logger)?;
        present(&args.matrix, &report, &args, &stamp)?;
    }

    Ok(())
}

fn present(path: &Path, report: &ExperimentReport, args: &RunArgs, stamp: &str) -> SfResult<()> {
    println!(
        "\n=== {} ({} tests x {} requirements -> {} x {}) ===",
        path.display(),
        report.original_tests,
        report.original_requirements,
        report.reduced_tests,
        report.reduced_requirements
    );

    reports::print_reduction_report(&report.reduction);
    reports::print_run_table(report);
    reports::print_statistics(&report.statistics);

    if let Some(best) = report
        .runs
        .iter()
        .min_by_key(|r| (r.metrics.solution_size, r.seed))
    {
        info!(
            "🏆 Best: seed {} keeps {} of {} tests: {:?}",
            best.seed, best.metrics.solution_size, best.metrics.original_size, best.solution
        );
    }

    if let Some(dir) = &args.output_dir {
        let files = api::write_results(report, &display_name(path), dir, stamp)?;
        info!(
            "💾 Results written to {} and {}",
            files.json.display(),
            files.csv.display()
        );
    }
    Ok(())
}
