//! texsnip - LaTeX snippet expansion
//!
//! This is the main entry point. It parses CLI arguments, loads the
//! configuration and delegates to the selected run mode.

mod cli;
mod logging;
mod run;

use texsnip::{config, user_config};

fn main() -> anyhow::Result<()> {
    logging::init();

    // Parse command line arguments
    let cli = cli::Cli::parse()?;

    // Load configuration
    let mut config = config::Config::default();
    user_config::configure(&mut config);

    // Apply CLI overrides
    cli.apply_to_config(&mut config);

    run::run(&cli, &config)
}
