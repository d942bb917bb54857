use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tracing::{error, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Preprocess, then hill-climb once per seed and report statistics.
    Run(cmd::run::RunArgs),
    /// Show a matrix profile and, with --mode, what preprocessing removes.
    Inspect(cmd::inspect::InspectArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let Some((_, sub_matches)) = matches.subcommand() else {
        error!("❌ No subcommand given");
        process::exit(2);
    };

    let outcome = match cli.command {
        Commands::Run(args) => cmd::run::run(args, sub_matches),
        Commands::Inspect(args) => cmd::inspect::run(args),
    };

    if let Err(e) = outcome {
        error!("❌ {}", e);
        process::exit(1);
    }
}
