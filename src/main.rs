use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use popdash::{
    render::{chart, text},
    Dashboard, DashboardConfig, Quarter, Region, Session, Submission,
};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::{
    fs,
    io::{AsyncBufReadExt, BufReader},
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "popdash")]
#[command(about = "Population change of Canada and its provinces between two quarters")]
#[command(version)]
struct Cli {
    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV URL or local path; overrides the config
    #[arg(short, long)]
    source: Option<String>,

    #[arg(long)]
    start_quarter: Option<Quarter>,
    #[arg(long)]
    start_year: Option<u16>,
    #[arg(long)]
    end_quarter: Option<Quarter>,
    #[arg(long)]
    end_year: Option<u16>,

    /// Region to analyze (name or abbreviation)
    #[arg(short, long)]
    target: Option<Region>,

    /// Region to overlay on the comparison chart; repeatable
    #[arg(short = 'm', long = "compare")]
    compare: Vec<Region>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write population.svg and comparison.svg here
    #[arg(long)]
    svg_dir: Option<PathBuf>,

    /// Print the full data table first
    #[arg(long)]
    show_table: bool,

    /// Read one submission per line from stdin: "Q3 1991, Q1 2023, Canada; Ontario"
    #[arg(short, long)]
    interactive: bool,
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut cfg = match &cli.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default().with_env().validated()?,
    };
    if let Some(source) = &cli.source {
        cfg.source = source.clone();
    }
    Ok(cfg)
}

fn submission_from_args(cli: &Cli, session: &Session) -> Result<Submission> {
    let defaults = session.default_submission()?;
    let sub = Submission::from_form(
        (
            cli.start_quarter.unwrap_or(defaults.start.quarter),
            cli.start_year.unwrap_or(defaults.start.year),
        ),
        (
            cli.end_quarter.unwrap_or(defaults.end.quarter),
            cli.end_year.unwrap_or(defaults.end.year),
        ),
        cli.target.unwrap_or(defaults.target),
        cli.compare.clone(),
        session.config(),
    )?;
    Ok(sub)
}

async fn write_svgs(dash: &Dashboard, dir: &Path, size: (u32, u32)) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;
    for (name, view) in [
        ("population.svg", &dash.population),
        ("comparison.svg", &dash.comparison),
    ] {
        let svg = chart::to_svg(view, size)?;
        let path = dir.join(name);
        fs::write(&path, svg)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote chart");
    }
    Ok(())
}

async fn emit(dash: &Dashboard, cli: &Cli, size: (u32, u32)) -> Result<()> {
    match cli.format {
        OutputFormat::Text => println!("{}", text::summary(dash)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(dash)?),
    }
    if let Some(dir) = &cli.svg_dir {
        write_svgs(dash, dir, size).await?;
    }
    Ok(())
}

async fn run_interactive(session: &Session, cli: &Cli) -> Result<()> {
    let size = session.config().chart_size();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        let submission = if line.is_empty() {
            session.default_submission()
        } else {
            Submission::parse_line(line, session.config())
        };
        match submission.and_then(|s| session.submit(&s)) {
            Ok(dash) => emit(&dash, cli, size).await?,
            Err(e) if e.is_user_error() => eprintln!("{}", e.user_message()),
            Err(e) => error!(error = %e, "render failed"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ─── 2) configure ────────────────────────────────────────────────
    let cfg = load_config(&cli)?;
    info!(source = %cfg.source, "startup");

    // ─── 3) load the dataset once for the session ────────────────────
    let client = Client::new();
    let session = Session::open(&client, cfg)
        .await
        .context("loading population data")?;

    if cli.show_table {
        println!("{}", text::dataset_table(session.dataset()));
    }

    // ─── 4) validate + render on submit ──────────────────────────────
    if cli.interactive {
        return run_interactive(&session, &cli).await;
    }

    let submission = submission_from_args(&cli, &session)?;
    match session.submit(&submission) {
        Ok(dash) => emit(&dash, &cli, session.config().chart_size()).await,
        Err(e) if e.is_user_error() => bail!("{}", e.user_message()),
        Err(e) => Err(e).context("rendering dashboard"),
    }
}
