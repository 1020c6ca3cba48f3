use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use switchboard::app::{self, Switchboard};
use switchboard::config;
use switchboard::sys::runtime::{self, InputSource};

#[derive(Parser, Debug)]
#[command(name = "switchboard", version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Read input events from this file instead of stdin
    #[arg(short = 't', long)]
    trace: Option<PathBuf>,

    /// Reload the configuration whenever the file changes
    #[arg(short = 'w', long)]
    watch: bool,

    /// Write the default configuration file and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config_path = config::resolve_path(cli.config)?;

    if cli.init {
        let path = config::write_default_config(&config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = config::load_or_default(&config_path);
    let board = Switchboard::new(&config);

    let input: InputSource = match &cli.trace {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open trace {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };

    let (tx, rx) = async_channel::bounded(64);

    runtime::start_background_services(tx.clone(), input, cli.watch.then(|| config_path.clone()));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    app::run(board, tx, rx, &config_path, &mut out).await
}
