use anyhow::{Context, Result};
use clap::Parser;
use retail_analytics::config::ConfigOverrides;
use retail_analytics::{PipelineConfig, RetailPipeline};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "retail-analytics")]
#[command(about = "Clean a retail product CSV and report pricing KPIs", long_about = None)]
struct Cli {
    /// Pipeline configuration file (defaults are used when it does not exist)
    #[arg(short, long, default_value = "src/configs/pipeline.toml")]
    config: PathBuf,

    /// Input product CSV
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output path for the cleaned CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output path for the chart data JSON
    #[arg(long)]
    charts: Option<PathBuf>,

    /// Skip writing chart data
    #[arg(long)]
    no_charts: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        input: cli.input,
        output: cli.output,
        charts: cli.charts,
        no_charts: cli.no_charts,
    };
    let config = PipelineConfig::resolve(&cli.config, &overrides)
        .context("Failed to load pipeline configuration")?;

    info!("Starting retail analytics pipeline on {}", config.input.path.display());

    let pipeline = RetailPipeline::new(config);
    match pipeline.run() {
        Ok(output) => {
            info!(
                "Pipeline complete: {} products, {} categories, {} brands",
                output.products.height(),
                output.categories.len(),
                output.brands.len()
            );
            info!("Cleaned dataset saved to: {}", pipeline.config().output.cleaned_csv.display());
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {:#}", e);
            Err(e)
        }
    }
}
