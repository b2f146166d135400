use anyhow::{Context, Result};
use popdash::{load::load_with, render::text::dataset_table, DashboardConfig, DataSource};
use reqwest::Client;
use tracing_subscriber::{fmt, EnvFilter};

/// Prints the full population table, optionally for a source given as the
/// first argument.
#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr) // Log to stderr
        .init();

    let cfg = DashboardConfig::default().with_env().validated()?;
    let source = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<DataSource>()?,
        None => cfg.data_source(),
    };

    tracing::info!(%source, "loading population table");
    let dataset = load_with(&Client::new(), &source, &cfg.fetch_options())
        .await
        .with_context(|| format!("loading {}", source))?;

    println!(
        "\n--- Quarterly population, {} to {} ---",
        dataset.first_period().map(|p| p.to_string()).unwrap_or_default(),
        dataset.last_period().map(|p| p.to_string()).unwrap_or_default()
    );
    dataset_table(&dataset).printstd();

    tracing::info!(rows = dataset.len(), "population table printed");
    Ok(())
}
