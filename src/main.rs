use anyhow::Result;
use clap::{Parser, Subcommand};
use ip_insights_scraper::api::{self, AppState};
use ip_insights_scraper::config;
use ip_insights_scraper::db;
use ip_insights_scraper::pipeline::{run_pipeline, RunMode};
use ip_insights_scraper::render::ChromeRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP trigger endpoint
    Serve,
    /// Run the pipeline once and print the report
    Run {
        /// Extract and normalize only; touch no storage
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;

    match args.command {
        Command::Serve => {
            let pool = db::init_pool(&cfg.database_url()).await?;
            db::run_migrations(&pool).await?;

            let state = AppState {
                pool,
                renderer: Arc::new(ChromeRenderer::from_config(&cfg.scrape)),
                cfg: Arc::new(cfg),
            };
            let bind = state.cfg.server.bind.clone();
            let app = api::create_router(state);

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!(%bind, "listening");
            axum::serve(listener, app).await?;
        }
        Command::Run { dry_run } => {
            let renderer = ChromeRenderer::from_config(&cfg.scrape);
            let report = if dry_run {
                run_pipeline(&renderer, RunMode::DryRun, &cfg).await?
            } else {
                let pool = db::init_pool(&cfg.database_url()).await?;
                db::run_migrations(&pool).await?;
                run_pipeline(&renderer, RunMode::Ingest(&pool), &cfg).await?
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
