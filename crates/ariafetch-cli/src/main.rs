mod cli;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // run installs the log subscriber before returning, even on error.
    if let Err(err) = Cli::parse().run().await {
        tracing::error!("ariafetch error: {:#}", err);
        std::process::exit(1);
    }
}
