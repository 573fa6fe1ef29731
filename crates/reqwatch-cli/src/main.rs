use reqwatch_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Records go to stdout; diagnostics go to the log file.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("reqwatch error: {:#}", err);
        std::process::exit(1);
    }
}
