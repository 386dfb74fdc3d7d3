use clap::Parser;

use symbolscope::cli::commands::{index, init, query, update};
use symbolscope::cli::{Cli, Commands};
use symbolscope::config::Settings;
use symbolscope::logging;

fn main() {
    let cli = Cli::parse();

    let settings = Settings::load().unwrap_or_else(|err| {
        eprintln!("Configuration error: {err}");
        Settings::default()
    });
    logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Init { force } => init::run(force),
        Commands::Index { path, force } => index::run(path, force, &settings),
        Commands::Update { path } => update::run(path, &settings),
        Commands::Query { query: q, path } => query::run(q, path, &settings),
    }
}
