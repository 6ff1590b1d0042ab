use anyhow::Result;
use clap::Parser;
use figure_animations::animator::run_animations;
use figure_animations::api::replicate::ReplicateClient;
use figure_animations::config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "generate-animations", version)]
struct Cli {
    /// Directory holding the source figure images (default: the working directory).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Where the generated MP4s are written (default: <root>/animations).
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = dotenv {
        if !err.not_found() {
            tracing::error!("Failed to load .env: {}", err);
            return ExitCode::FAILURE;
        }
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut cfg = Config::from_env()?;
    if let Some(root) = cli.root {
        cfg = cfg.with_root_dir(root);
    }
    if let Some(dir) = cli.output_dir {
        cfg = cfg.with_output_dir(dir);
    }

    let client = ReplicateClient::new(&cfg)?;
    run_animations(&cfg, &client).await?;
    Ok(())
}
