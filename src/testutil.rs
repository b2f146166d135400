// src/testutil.rs

use crate::dataset::{Dataset, PopulationRecord};
use crate::period::{Period, Quarter};
use crate::region::{Region, REGION_COUNT};

pub const CANADA_Q3_1991: u32 = 28_030_864;
pub const CANADA_Q1_2023: u32 = 39_566_248;

/// Contiguous quarters Q3 1991 ..= Q1 2023 with steadily growing counts.
/// Canada hits the published first and last values exactly.
pub fn sample_dataset() -> Dataset {
    let first = Period::new(Quarter::Q3, 1991);
    let last = Period::new(Quarter::Q1, 2023);

    let mut periods = vec![first];
    while *periods.last().unwrap() < last {
        let next = periods.last().unwrap().next().unwrap();
        periods.push(next);
    }
    let steps = (periods.len() - 1) as u64;
    let growth = u64::from(CANADA_Q1_2023 - CANADA_Q3_1991);

    let records = periods
        .into_iter()
        .enumerate()
        .map(|(i, period)| {
            let mut counts = [0u32; REGION_COUNT];
            counts[Region::Canada.index()] =
                CANADA_Q3_1991 + (growth * i as u64 / steps) as u32;
            for region in &Region::ALL[1..] {
                let k = region.index() as u32;
                counts[region.index()] = k * 100_000 + i as u32 * k * 100;
            }
            PopulationRecord::new(period, counts)
        })
        .collect();

    Dataset::new(records)
}

/// Renders a dataset back to the CSV layout of the published table.
pub fn to_csv(ds: &Dataset) -> String {
    let mut out = String::from("Quarter");
    for region in Region::ALL {
        out.push(',');
        out.push_str(region.column_name());
    }
    out.push('\n');
    for record in ds.records() {
        out.push_str(&record.period.to_string());
        for count in record.counts() {
            out.push(',');
            out.push_str(&count.to_string());
        }
        out.push('\n');
    }
    out
}
