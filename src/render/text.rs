// src/render/text.rs

use prettytable::{format, Cell, Row, Table};
use std::fmt::Write;

use super::{ChartView, Dashboard};
use crate::dataset::Dataset;
use crate::region::Region;

pub const PAGE_TITLE: &str = "Population of Canada";

/// Statistics Canada table 17-10-0009-01, where the figures come from.
pub const SOURCE_TABLE_URL: &str = "https://www150.statcan.gc.ca/t1/tbl1/en/tv.action?pid=1710000901";

fn header_cell(text: &str) -> Cell {
    Cell::new(text).style_spec("bFg")
}

/// Initial and final counts, the final one annotated with the change.
pub fn metrics_table(dash: &Dashboard) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.add_row(Row::new(vec![
        header_cell("Period"),
        header_cell(dash.target.column_name()),
        header_cell("Change"),
    ]));
    for metric in [&dash.initial, &dash.last] {
        let delta = metric.delta.map(|d| d.to_string()).unwrap_or_default();
        table.add_row(Row::new(vec![
            Cell::new(&metric.period.to_string()),
            Cell::new(&metric.value.to_string()).style_spec("r"),
            Cell::new(&delta).style_spec("r"),
        ]));
    }
    table
}

/// The whole dataset, one row per quarter.
pub fn dataset_table(dataset: &Dataset) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    let mut header = vec![header_cell("Quarter")];
    header.extend(Region::ALL.iter().map(|r| header_cell(r.abbreviation())));
    table.add_row(Row::new(header));

    for record in dataset.records() {
        let mut cells = vec![Cell::new(&record.period.to_string())];
        cells.extend(
            record
                .counts()
                .iter()
                .map(|c| Cell::new(&c.to_string()).style_spec("r")),
        );
        table.add_row(Row::new(cells));
    }
    table
}

fn describe_chart(out: &mut String, view: &ChartView) {
    let _ = writeln!(out, "{}", view.title);
    let (first, last) = match (view.ticks.first(), view.ticks.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return,
    };
    for series in &view.series {
        let start = series.values.first().copied().unwrap_or_default();
        let end = series.values.last().copied().unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<26} {} {:>10} -> {} {:>10}  ({} points)",
            series.region.column_name(),
            first,
            start,
            last,
            end,
            series.values.len()
        );
    }
}

/// Plain text rendition of both tabs of the dashboard.
pub fn summary(dash: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", PAGE_TITLE);
    let _ = writeln!(out, "Source table can be found here: {}\n", SOURCE_TABLE_URL);
    let _ = writeln!(out, "{}", metrics_table(dash));
    describe_chart(&mut out, &dash.population);
    out.push('\n');
    describe_chart(&mut out, &dash.comparison);
    out
}
