use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use phc_insights::app::alerts_feed::DEFAULT_FEED_LIMIT;
use phc_insights::app::filters::filter_telecom_advice;
use phc_insights::app::{build_alerts_feed, FeedQuery, FeedType, InsightCaches, InsightStore};
use phc_insights::config::Config;
use phc_insights::infra::FsArtifactReader;
use phc_insights::pipeline::{Pipeline, PipelineConfig};
use phc_insights::{logging, metrics};

#[derive(Parser)]
#[command(name = "phc_insights")]
#[command(about = "Primary health center survey reconciliation and risk indices")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the survey exports and write the output artifacts
    Run {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the unified alerts feed as JSON
    Feed {
        #[arg(long, default_value_t = DEFAULT_FEED_LIMIT)]
        limit: usize,
        /// Comma-separated alert types: outbreak,underserved,resource
        #[arg(long, value_delimiter = ',')]
        types: Option<Vec<String>>,
        #[arg(long)]
        state: Option<String>,
        /// Reload artifacts from disk instead of using cached data
        #[arg(long)]
        refresh: bool,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print preferred outreach channels as JSON
    Advice {
        /// Partial facility name match
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        refresh: bool,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn insight_store(config: &Config) -> InsightStore {
    InsightStore::new(
        Arc::new(FsArtifactReader),
        InsightCaches::new(config.cache_ttl()),
        config.output_dir.clone(),
        config.data_dir.clone(),
    )
}

async fn run_pipeline(config: &Config) -> anyhow::Result<()> {
    let pipeline_config = PipelineConfig::from(config);
    let result = tokio::task::spawn_blocking(move || Pipeline::run(&pipeline_config))
        .await
        .context("Pipeline task panicked")?;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(e.into());
        }
    };

    println!("Pipeline run {}", result.run_id);
    for summary in &result.datasets {
        println!(
            "   {}: {} records, {} facilities, {} dropped, {} malformed rows",
            summary.dataset, summary.records, summary.facilities, summary.dropped, summary.skipped_rows
        );
    }
    println!("   Facilities: {}", result.facilities);
    println!("   Underserved (top decile): {}", result.underserved_flagged);
    println!("   High shortage alerts: {}", result.high_shortage_alerts);
    println!("   High resource alerts: {}", result.high_resource_alerts);
    println!("   Output: {}", config.output_dir.display());

    if !result.diagnostics.is_empty() {
        warn!("{} diagnostics recorded during the run", result.diagnostics.len());
        for note in &result.diagnostics {
            println!("   - {}", note);
        }
    }

    if config.metrics_snapshot {
        metrics::write_snapshot(&config.output_dir).context("Failed to write metrics snapshot")?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    let _guard = logging::init_logging(&config.log_dir);
    metrics::init_metrics();

    match cli.command {
        Commands::Run { data_dir, output_dir } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            info!("Running pipeline");
            run_pipeline(&config).await?;
        }
        Commands::Feed {
            limit,
            types,
            state,
            refresh,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            let types = types
                .map(|names| names.iter().map(|name| name.parse::<FeedType>()).collect::<Result<Vec<_>, _>>())
                .transpose()?;
            let query = FeedQuery {
                limit,
                types,
                state,
                refresh,
            };
            let feed = build_alerts_feed(&insight_store(&config), &query).await?;
            println!("{}", serde_json::to_string_pretty(&feed)?);
        }
        Commands::Advice {
            name,
            state,
            refresh,
            data_dir,
        } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            let advice = insight_store(&config).telecom_advice(refresh).await?;
            let data = filter_telecom_advice(&advice, name.as_deref(), state.as_deref());
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "count": data.len(), "data": data }))?
            );
        }
    }

    Ok(())
}
