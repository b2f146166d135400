// src/render/mod.rs

pub mod chart;
pub mod text;

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::dataset::{Dataset, PopulationRecord};
use crate::period::Period;
use crate::region::Region;

pub const X_AXIS_LABEL: &str = "Time";
pub const Y_AXIS_LABEL: &str = "Population";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Zero or several records carry the label.
    #[error("expected exactly one record for {period}, found {matches}")]
    RecordNotFound { period: Period, matches: usize },
    #[error("start {start} comes after end {end} in the dataset")]
    InvertedRange { start: Period, end: Period },
}

/// Relative change between two counts, in percent, two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentChange {
    Value(f64),
    /// The initial count is zero.
    NotAvailable,
}

impl PercentChange {
    pub fn compute(initial: u32, last: u32) -> Self {
        if initial == 0 {
            return PercentChange::NotAvailable;
        }
        let initial = f64::from(initial);
        let pct = (f64::from(last) - initial) / initial * 100.0;
        PercentChange::Value((pct * 100.0).round() / 100.0)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            PercentChange::Value(v) => Some(*v),
            PercentChange::NotAvailable => None,
        }
    }
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentChange::Value(v) => write!(f, "{:.2}%", v),
            PercentChange::NotAvailable => f.write_str("N/A"),
        }
    }
}

impl Serialize for PercentChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PercentChange::Value(v) => serializer.serialize_f64(*v),
            PercentChange::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

/// A headline number: the count at one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub period: Period,
    pub value: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<PercentChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub region: Region,
    pub values: Vec<u32>,
}

/// Line chart over a period axis. Only `ticks` are labelled on the x axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartView {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub periods: Vec<Period>,
    pub ticks: Vec<Period>,
    pub series: Vec<Series>,
}

impl ChartView {
    fn over(title: String, records: &[PopulationRecord], regions: &[Region]) -> Self {
        let periods: Vec<Period> = records.iter().map(|r| r.period).collect();
        let mut ticks: Vec<Period> = periods.first().into_iter().chain(periods.last()).copied().collect();
        ticks.dedup();
        let series = regions
            .iter()
            .map(|&region| Series {
                region,
                values: records.iter().map(|r| r[region]).collect(),
            })
            .collect();
        Self {
            title,
            x_label: X_AXIS_LABEL,
            y_label: Y_AXIS_LABEL,
            periods,
            ticks,
            series,
        }
    }

    /// Smallest and largest value across every series.
    pub fn value_range(&self) -> Option<(u32, u32)> {
        let mut values = self.series.iter().flat_map(|s| s.values.iter().copied());
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Everything shown for one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub start: Period,
    pub end: Period,
    pub target: Region,
    pub initial: Metric,
    #[serde(rename = "final")]
    pub last: Metric,
    pub change: PercentChange,
    pub population: ChartView,
    pub comparison: ChartView,
}

fn locate(dataset: &Dataset, period: &Period) -> Result<usize, RenderError> {
    match dataset.positions(period).as_slice() {
        [idx] => Ok(*idx),
        other => Err(RenderError::RecordNotFound {
            period: *period,
            matches: other.len(),
        }),
    }
}

/// Regions to overlay: `compare` without repeats, or just `target` if empty.
pub fn comparison_regions(target: Region, compare: &[Region]) -> Vec<Region> {
    let mut out: Vec<Region> = Vec::with_capacity(compare.len().max(1));
    for region in compare {
        if !out.contains(region) {
            out.push(*region);
        }
    }
    if out.is_empty() {
        out.push(target);
    }
    out
}

/// Build the single-region and comparison views for `start..=end`.
#[instrument(level = "debug", skip_all, fields(start = %start, end = %end, target = %target))]
pub fn render(
    dataset: &Dataset,
    start: &Period,
    end: &Period,
    target: Region,
    compare: &[Region],
) -> Result<Dashboard, RenderError> {
    let start_idx = locate(dataset, start)?;
    let end_idx = locate(dataset, end)?;
    let records = dataset
        .slice(start_idx, end_idx)
        .ok_or(RenderError::InvertedRange {
            start: *start,
            end: *end,
        })?;

    let initial = dataset.records()[start_idx][target];
    let last = dataset.records()[end_idx][target];
    let change = PercentChange::compute(initial, last);
    debug!(initial, last, %change, rows = records.len(), "computed metrics");

    let population = ChartView::over(
        format!("Population change from {} to {}", start, end),
        records,
        &[target],
    );
    let comparison = ChartView::over(
        "Compare with other locations".to_string(),
        records,
        &comparison_regions(target, compare),
    );

    Ok(Dashboard {
        start: *start,
        end: *end,
        target,
        initial: Metric {
            period: *start,
            value: initial,
            delta: None,
        },
        last: Metric {
            period: *end,
            value: last,
            delta: Some(change),
        },
        change,
        population,
        comparison,
    })
}
