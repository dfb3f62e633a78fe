mod cli;

use clap::Parser;
use cli::Cli;
use digester::config::Config;
use digester::observability;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    observability::init_tracing();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path.clone())?,
        None => Config::load()?,
    };
    cli.apply(&mut config);
    config.normalize();

    let digester = config.digester()?;
    let output = digester.run(&cli.urls).await;

    let mut stdout = std::io::stdout().lock();
    for line in cli::render(&output, cli.sorted) {
        writeln!(stdout, "{}", line)?;
    }

    Ok(())
}
