// src/session.rs

use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::error::DashboardError;
use crate::load::{load_with, LoadError};
use crate::period::{Period, PeriodSelection, Quarter};
use crate::region::Region;
use crate::render::{render, Dashboard};
use crate::validate::validate;

/// One press of "Analyze": the form values at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub start: PeriodSelection,
    pub end: PeriodSelection,
    pub target: Region,
    /// Regions to overlay; empty means just `target`.
    pub compare: Vec<Region>,
}

impl Submission {
    /// Builds a submission from the form widgets, checking the year sliders'
    /// bounds.
    pub fn from_form(
        start: (Quarter, u16),
        end: (Quarter, u16),
        target: Region,
        compare: Vec<Region>,
        config: &DashboardConfig,
    ) -> Result<Self, DashboardError> {
        let years = config.years();
        Ok(Self {
            start: PeriodSelection::new(start.0, start.1, &years)?,
            end: PeriodSelection::new(end.0, end.1, &years)?,
            target,
            compare,
        })
    }

    /// Parses `"Q3 1991, Q1 2023, Canada; Ontario, Quebec"`. The part after
    /// `;` lists comparison regions and may be omitted.
    pub fn parse_line(line: &str, config: &DashboardConfig) -> Result<Self, DashboardError> {
        let (head, tail) = match line.split_once(';') {
            Some((h, t)) => (h, Some(t)),
            None => (line, None),
        };
        let fields: Vec<&str> = head.split(',').map(str::trim).collect();
        let [start, end, target] = fields.as_slice() else {
            return Err(DashboardError::Input(line.to_string()));
        };
        let start: Period = start.parse()?;
        let end: Period = end.parse()?;
        let target: Region = target.parse()?;
        let compare = tail
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::parse::<Region>)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        Self::from_form(
            (start.quarter(), start.year()),
            (end.quarter(), end.year()),
            target,
            compare,
            config,
        )
    }
}

/// A loaded dataset plus settings. Every submission runs
/// validate-then-render once against the same snapshot.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Dataset,
    config: DashboardConfig,
}

impl Session {
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        Self { dataset, config }
    }

    /// Load the configured source; any failure is fatal for the session.
    pub async fn open(client: &Client, config: DashboardConfig) -> Result<Self, LoadError> {
        let dataset = load_with(client, &config.data_source(), &config.fetch_options()).await?;
        Ok(Self::new(dataset, config))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The form's initial values, held to the same year bounds as user input.
    pub fn default_submission(&self) -> Result<Submission, DashboardError> {
        let cfg = &self.config;
        Submission::from_form(
            (cfg.default_start.quarter(), cfg.default_start.year()),
            (cfg.default_end.quarter(), cfg.default_end.year()),
            cfg.default_target,
            Vec::new(),
            cfg,
        )
    }

    #[instrument(level = "info", skip(self, submission), fields(target = %submission.target))]
    pub fn submit(&self, submission: &Submission) -> Result<Dashboard, DashboardError> {
        let start = submission.start.period();
        let end = submission.end.period();
        let outcome = validate(&self.dataset, &start, &end)
            .map_err(DashboardError::from)
            .and_then(|()| {
                render(
                    &self.dataset,
                    &start,
                    &end,
                    submission.target,
                    &submission.compare,
                )
                .map_err(DashboardError::from)
            });
        match &outcome {
            Ok(dash) => info!(start = %start, end = %end, change = %dash.change, "rendered"),
            Err(e) => warn!(start = %start, end = %end, error = %e, "submission rejected"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::DataSource;
    use crate::render::PercentChange;
    use crate::testutil::{sample_dataset, to_csv, CANADA_Q1_2023};
    use crate::validate::ValidationError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn session() -> Session {
        Session::new(sample_dataset(), DashboardConfig::default())
    }

    #[test]
    fn test_default_submission_renders() {
        let s = session();
        let dash = s.submit(&s.default_submission().unwrap()).unwrap();
        assert_eq!(dash.last.value, CANADA_Q1_2023);
        assert_eq!(dash.change, PercentChange::Value(41.15));
    }

    #[test]
    fn test_user_errors_leave_dataset_intact() {
        let s = session();
        let before = s.dataset().clone();
        let cfg = s.config().clone();

        let inverted = Submission::parse_line("Q3 2000, Q1 1995, Canada", &cfg).unwrap();
        assert!(matches!(
            s.submit(&inverted),
            Err(DashboardError::Validation(ValidationError::InvertedRange { .. }))
        ));

        let unknown = Submission::parse_line("Q1 1991, Q1 2000, Canada", &cfg).unwrap();
        let err = s.submit(&unknown).unwrap_err();
        assert!(err.is_user_error());
        assert_eq!(
            err.user_message(),
            "No data available. Check your quarter and year selection"
        );

        assert_eq!(s.dataset(), &before);
        assert!(s.submit(&s.default_submission().unwrap()).is_ok());
    }

    #[test]
    fn test_parse_line() {
        let cfg = DashboardConfig::default();
        let sub = Submission::parse_line(" Q1 2000 , Q4 2001, on ; ab, Quebec ", &cfg).unwrap();
        assert_eq!(sub.start.period(), Period::new(Quarter::Q1, 2000));
        assert_eq!(sub.end.period(), Period::new(Quarter::Q4, 2001));
        assert_eq!(sub.target, Region::Ontario);
        assert_eq!(sub.compare, vec![Region::Alberta, Region::Quebec]);

        assert!(matches!(
            Submission::parse_line("Q1 2000, Canada", &cfg),
            Err(DashboardError::Input(_))
        ));
        assert!(matches!(
            Submission::parse_line("Q1 2000, Q1 2001, Gondor", &cfg),
            Err(DashboardError::Region(_))
        ));
        assert!(matches!(
            Submission::parse_line("Q1 1985, Q1 2001, Canada", &cfg),
            Err(DashboardError::Selection(_))
        ));
        assert!(matches!(
            Submission::parse_line("first, Q1 2001, Canada", &cfg),
            Err(DashboardError::Parse(_))
        ));
    }

    #[test]
    fn test_from_form_checks_year_bounds() {
        let cfg = DashboardConfig::default();
        assert!(Submission::from_form(
            (Quarter::Q1, 2024),
            (Quarter::Q1, 2023),
            Region::Canada,
            vec![],
            &cfg
        )
        .is_err());
    }

    #[tokio::test]
    async fn test_open_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(to_csv(&sample_dataset()).as_bytes()).unwrap();
        let cfg = DashboardConfig {
            source: file.path().display().to_string(),
            ..DashboardConfig::default()
        };
        assert!(matches!(cfg.data_source(), DataSource::File(_)));

        let s = Session::open(&Client::new(), cfg).await.unwrap();
        assert_eq!(s.dataset().len(), sample_dataset().len());
    }
}
