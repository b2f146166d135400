// src/load/mod.rs

pub mod csv;
pub mod fetch;

use arrow::error::ArrowError;
use reqwest::Client;
use std::{convert::Infallible, fmt, path::PathBuf, str::FromStr};
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

use crate::dataset::Dataset;
use crate::period::ParseError;

pub use self::csv::parse_dataset;
pub use self::fetch::FetchOptions;

/// Published quarterly population estimates for Canada.
pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/marcopeix/MachineLearningModelDeploymentwithStreamlit/master/12_dashboard_capstone/data/quarterly_canada_population.csv";

/// The dataset could not be produced; nothing should render.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetching {url} failed")]
    Fetch {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("reading {path:?} failed")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("data source is empty")]
    Empty,
    #[error("required column {0:?} is missing")]
    MissingColumn(String),
    #[error("malformed CSV")]
    Malformed(#[from] ArrowError),
    #[error("row {row}: column {column:?} is empty")]
    NullValue { column: String, row: usize },
    #[error("row {row}: column {column:?} has negative count {value}")]
    NegativeCount {
        column: String,
        row: usize,
        value: i32,
    },
    #[error("row {row}: bad period label")]
    BadPeriod {
        row: usize,
        #[source]
        source: ParseError,
    },
}

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(Url),
    File(PathBuf),
}

impl Default for DataSource {
    fn default() -> Self {
        match Url::parse(DEFAULT_SOURCE_URL) {
            Ok(url) => DataSource::Url(url),
            Err(_) => DataSource::File(PathBuf::from("quarterly_canada_population.csv")),
        }
    }
}

impl FromStr for DataSource {
    type Err = Infallible;

    /// `http://` and `https://` strings are URLs, anything else a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            if let Ok(url) = Url::parse(s) {
                return Ok(DataSource::Url(url));
            }
        }
        Ok(DataSource::File(PathBuf::from(s)))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load the dataset with default fetch options.
pub async fn load(source: &DataSource) -> Result<Dataset, LoadError> {
    load_with(&Client::new(), source, &FetchOptions::default()).await
}

/// Fetch (or read) the CSV and decode it into a [`Dataset`].
#[instrument(level = "info", skip_all, fields(source = %source))]
pub async fn load_with(
    client: &Client,
    source: &DataSource,
    opts: &FetchOptions,
) -> Result<Dataset, LoadError> {
    let text = match source {
        DataSource::Url(url) => fetch::get_text_with_retry(client, url, opts).await?,
        DataSource::File(path) => fs::read_to_string(path).await.map_err(|e| LoadError::Io {
            path: path.clone(),
            source: e,
        })?,
    };
    let dataset = parse_dataset(&text)?;
    info!(
        records = dataset.len(),
        first = ?dataset.first_period().map(|p| p.to_string()),
        last = ?dataset.last_period().map(|p| p.to_string()),
        "dataset loaded"
    );
    Ok(dataset)
}
