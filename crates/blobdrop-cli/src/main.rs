use blobdrop_core::logging;
use clap::Parser;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Initialize logging before any command runs; stderr if the log file is unusable.
    let opts = cli.log_options();
    if let Err(err) = logging::init(&opts) {
        logging::init_stderr(opts.level);
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    if let Err(err) = cli.command.run() {
        eprintln!("blobdrop error: {:#}", err);
        std::process::exit(1);
    }
}
