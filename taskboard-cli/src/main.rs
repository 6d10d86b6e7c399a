use clap::Parser;
use std::process;

mod cli;
mod commands;
mod logging;
mod render;

use cli::Cli;

const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::configure_logging(cli.verbose, cli.debug, cli.quiet);

    let exit_code = match commands::run(cli).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            tracing::debug!("command failed: {e:?}");
            eprintln!("Error: {e:#}");
            EXIT_ERROR
        }
    };
    process::exit(exit_code);
}
