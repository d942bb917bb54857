use crate::error::{SfResult, SuiteError};
use crate::optimizer::{ClimbOptions, Strategy, TieBreak};
use crate::preprocess::Mode;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_SEEDS: [u64; 5] = [42, 123, 456, 789, 1024];

/// Fewer seeds than this still run, but the statistics get a warning.
pub const RECOMMENDED_MIN_SEEDS: usize = 5;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
}

/// Raw experiment parameters as typed on the command line or read from a
/// JSON file. Nothing here is trusted until `validate` has run.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Preprocessing mode: A (tests), B (requirements), C (iterate A/B).
    #[arg(long, default_value = "B")]
    pub mode: String,

    #[arg(long, default_value_t = false)]
    pub no_preprocessing: bool,

    /// Initial solution: all, greedy, essential, random.
    #[arg(long, default_value = "random")]
    pub initial_strategy: String,

    #[arg(long, num_args = 1.., default_values_t = DEFAULT_SEEDS)]
    pub seeds: Vec<u64>,

    #[arg(long, default_value_t = 1000, allow_negative_numbers = true)]
    pub max_iterations: i64,

    /// Choice among equally good removals: lowest, random.
    #[arg(long, default_value = "lowest")]
    pub tie_break: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            mode: "B".to_string(),
            no_preprocessing: false,
            initial_strategy: "random".to_string(),
            seeds: DEFAULT_SEEDS.to_vec(),
            max_iterations: 1000,
            tie_break: "lowest".to_string(),
        }
    }
}

/// Validated experiment record consumed by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub mode: Mode,
    pub preprocess: bool,
    pub strategy: Strategy,
    pub seeds: Vec<u64>,
    pub max_iterations: usize,
    pub tie_break: TieBreak,
}

impl ExperimentConfig {
    pub fn new(mode: Mode, strategy: Strategy, seeds: Vec<u64>, max_iterations: usize) -> Self {
        Self {
            mode,
            preprocess: true,
            strategy,
            seeds,
            max_iterations,
            tie_break: TieBreak::default(),
        }
    }

    /// Checks the invariants a hand-built record could still violate.
    pub fn ensure_valid(&self) -> SfResult<()> {
        if self.seeds.is_empty() {
            return Err(SuiteError::Config("at least one seed is required".into()));
        }
        if self.max_iterations == 0 {
            return Err(SuiteError::Config(
                "max_iterations must be a positive integer".into(),
            ));
        }
        Ok(())
    }

    pub fn climb_options(&self) -> ClimbOptions {
        ClimbOptions {
            max_iterations: self.max_iterations,
            tie_break: self.tie_break,
        }
    }
}

impl SearchParams {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn validate(&self) -> SfResult<ExperimentConfig> {
        let mode: Mode = self
            .mode
            .trim()
            .parse()
            .map_err(|_| SuiteError::Config(format!("unknown mode '{}' (A, B, C)", self.mode)))?;

        let strategy: Strategy = self.initial_strategy.trim().parse().map_err(|_| {
            SuiteError::Config(format!(
                "unknown initial strategy '{}' (all, greedy, essential, random)",
                self.initial_strategy
            ))
        })?;

        let tie_break: TieBreak = self.tie_break.trim().parse().map_err(|_| {
            SuiteError::Config(format!(
                "unknown tie break '{}' (lowest, random)",
                self.tie_break
            ))
        })?;

        if self.max_iterations <= 0 {
            return Err(SuiteError::Config(format!(
                "max_iterations must be a positive integer, got {}",
                self.max_iterations
            )));
        }

        let config = ExperimentConfig {
            mode,
            preprocess: !self.no_preprocessing,
            strategy,
            seeds: self.seeds.clone(),
            max_iterations: self.max_iterations as usize,
            tie_break,
        };
        config.ensure_valid()?;
        Ok(config)
    }

    /// Overlays the flags the user actually typed onto values loaded from a
    /// config file; defaults filled in by clap do not override the file.
    pub fn merge_from_cli(&mut self, cli: &SearchParams, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(mode, "mode");
        update_if_present!(no_preprocessing, "no_preprocessing");
        update_if_present!(initial_strategy, "initial_strategy");
        update_if_present!(seeds, "seeds");
        update_if_present!(max_iterations, "max_iterations");
        update_if_present!(tie_break, "tie_break");
    }
}
