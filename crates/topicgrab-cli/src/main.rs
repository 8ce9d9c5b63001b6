use clap::Parser;
use topicgrab_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Bad arity or non-integer pages: clap prints usage and exits with status 2.
    let cli = Cli::parse();

    // Initialize logging as early as possible.
    match cli.log_file.as_deref() {
        Some(path) => {
            if let Err(err) = logging::init_logging_to_file(path) {
                logging::init_logging();
                tracing::warn!("log file unavailable, logging to stderr: {:#}", err);
            }
        }
        None => logging::init_logging(),
    }

    if let Err(err) = cli.run().await {
        eprintln!("topicgrab error: {:#}", err);
        std::process::exit(1);
    }
}
