use clap::Parser;
use tracing_subscriber::EnvFilter;

use zapnutri_cli::commands::Cli;
use zapnutri_cli::output;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(cli.execute()));

    if let Err(e) = result {
        output::failure(&format!("{:#}", e));
        std::process::exit(1);
    }
}
