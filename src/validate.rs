// src/validate.rs

use thiserror::Error;
use tracing::debug;

use crate::dataset::Dataset;
use crate::period::{ParseError, Period};

/// Why a requested range cannot be shown. Recoverable: the user may resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no data for {0}")]
    UnknownPeriod(Period),
    #[error("start {start} is after end {end}")]
    InvertedRange { start: Period, end: Period },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ValidationError {
    /// Message shown to the user in place of the dashboard.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::UnknownPeriod(_) => {
                "No data available. Check your quarter and year selection"
            }
            ValidationError::InvertedRange { .. } => {
                "Dates don't work. Start date must come before end date."
            }
            ValidationError::Parse(_) => "Dates don't work. Use the form \"Q1 1991\".",
        }
    }
}

/// Both periods must exist in `dataset` and `start` must not be after `end`.
pub fn validate(dataset: &Dataset, start: &Period, end: &Period) -> Result<(), ValidationError> {
    for p in [start, end] {
        if !dataset.contains(p) {
            debug!(period = %p, "period not in dataset");
            return Err(ValidationError::UnknownPeriod(*p));
        }
    }
    if start.is_after(end) {
        return Err(ValidationError::InvertedRange {
            start: *start,
            end: *end,
        });
    }
    Ok(())
}

/// [`validate`] over raw labels; returns the parsed periods on success.
pub fn validate_labels(
    dataset: &Dataset,
    start: &str,
    end: &str,
) -> Result<(Period, Period), ValidationError> {
    let start: Period = start.parse()?;
    let end: Period = end.parse()?;
    validate(dataset, &start, &end)?;
    Ok((start, end))
}
