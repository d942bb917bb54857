use crate::reports;
use clap::Args;
use std::path::PathBuf;
use suiteforge::api;
use suiteforge::error::{SfResult, SuiteError};
use suiteforge::preprocess::Mode;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(short, long)]
    pub matrix: PathBuf,

    /// Also show what this preprocessing mode (A, B, C) would remove.
    #[arg(long)]
    pub mode: Option<String>,
}

pub fn run(args: InspectArgs) -> SfResult<()> {
    let mode = args
        .mode
        .as_deref()
        .map(|m| {
            m.trim()
                .parse::<Mode>()
                .map_err(|_| SuiteError::Config(format!("unknown mode '{}' (A, B, C)", m)))
        })
        .transpose()?;

    info!("🔎 Inspecting {}", args.matrix.display());
    let inspection = api::inspect(&args.matrix, mode)?;

    reports::print_matrix_profile("Matrix", &inspection.profile);

    if let Some(view) = &inspection.reduction {
        reports::print_reduction_report(&view.report);
        reports::print_matrix_profile(&format!("After Mode {}", view.mode), &view.profile);
    }
    Ok(())
}
