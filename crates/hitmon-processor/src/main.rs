use anyhow::Result;
use hitmon_processor::adapter::NodeAnalyzer;
use hitmon_processor::config::ProcessorConfig;
use hitmon_processor::{loader, transport};
use tokio::io::BufReader;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries batches, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("hitmon=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/processor.toml".to_string());

    let config = ProcessorConfig::load(&config_path)?;
    tracing::info!(config = %config_path, "hitmon-processor starting");

    let configs = loader::load_metric_configs(&config).await?;
    let mut analyzer = NodeAnalyzer::from_configs(configs)?;

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = transport::run(&mut analyzer, stdin, stdout) => {
            let stats = result?;
            tracing::info!(
                batches = stats.batches,
                rejected = stats.rejected,
                samples_in = stats.samples_in,
                samples_out = stats.samples_out,
                "Input closed, exiting"
            );
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully");
        }
    }

    let registry = analyzer.registry().stats();
    tracing::info!(
        exact = registry.exact,
        bound = registry.bound,
        unresolved = registry.unresolved,
        "Registry state at exit"
    );

    Ok(())
}
