// src/load/csv.rs

use arrow::{
    array::{Array, Int32Array, StringArray},
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{io::Cursor, sync::Arc};
use tracing::{debug, warn};

use super::LoadError;
use crate::dataset::{Dataset, PopulationRecord};
use crate::period::Period;
use crate::region::{Region, REGION_COUNT};

/// Header of the period label column.
pub const PERIOD_COLUMN: &str = "Quarter";

const BATCH_SIZE: usize = 1024;

/// Trim whitespace + strip outer quotes if present.
fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// Where each column we need sits in the file, plus the Arrow schema
/// used to decode the body.
struct HeaderLayout {
    schema: Schema,
    period_idx: usize,
    region_idx: [usize; REGION_COUNT],
}

/// Reads only the header row, with the same tokenizer that decodes the body.
fn read_header(text: &str) -> Result<HeaderLayout, LoadError> {
    let (header, _) = Format::default()
        .with_header(true)
        .infer_schema(Cursor::new(text.as_bytes()), Some(0))?;
    let names: Vec<&str> = header.fields().iter().map(|f| clean_str(f.name())).collect();

    let period_idx = names
        .iter()
        .position(|n| *n == PERIOD_COLUMN)
        .ok_or_else(|| LoadError::MissingColumn(PERIOD_COLUMN.to_string()))?;

    let mut found: [Option<usize>; REGION_COUNT] = [None; REGION_COUNT];
    for (i, name) in names.iter().enumerate() {
        let Some(region) = Region::from_column_name(name) else {
            continue;
        };
        match found[region.index()] {
            None => found[region.index()] = Some(i),
            Some(_) => warn!(column = %name, "duplicate column; using the first"),
        }
    }
    let mut region_idx = [0usize; REGION_COUNT];
    for region in Region::ALL {
        region_idx[region.index()] = found[region.index()]
            .ok_or_else(|| LoadError::MissingColumn(region.column_name().to_string()))?;
    }

    let fields = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let ty = if region_idx.contains(&i) {
                DataType::Int32
            } else {
                if i != period_idx {
                    warn!(column = %name, "ignoring unknown column");
                }
                DataType::Utf8
            };
            // placeholder names keep blank headers unique
            let field_name = if name.is_empty() {
                format!("column_{}", i)
            } else {
                name.to_string()
            };
            Field::new(field_name, ty, true)
        })
        .collect::<Vec<_>>();

    Ok(HeaderLayout {
        schema: Schema::new(fields),
        period_idx,
        region_idx,
    })
}

fn int_column<'a>(batch: &'a RecordBatch, idx: usize) -> Result<&'a Int32Array, LoadError> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<Int32Array>()
        .ok_or_else(|| {
            LoadError::Malformed(arrow::error::ArrowError::CastError(format!(
                "column {} is not Int32",
                idx
            )))
        })
}

fn records_from_batch(
    batch: &RecordBatch,
    layout: &HeaderLayout,
    first_row: usize,
    out: &mut Vec<PopulationRecord>,
) -> Result<(), LoadError> {
    let labels = batch
        .column(layout.period_idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| {
            LoadError::Malformed(arrow::error::ArrowError::CastError(format!(
                "{} column is not Utf8",
                PERIOD_COLUMN
            )))
        })?;

    let columns = Region::ALL
        .iter()
        .map(|r| int_column(batch, layout.region_idx[r.index()]))
        .collect::<Result<Vec<_>, _>>()?;

    for i in 0..batch.num_rows() {
        // 1-based data row, header excluded
        let row = first_row + i + 1;
        if labels.is_null(i) {
            return Err(LoadError::NullValue {
                column: PERIOD_COLUMN.to_string(),
                row,
            });
        }
        let period: Period = labels
            .value(i)
            .parse()
            .map_err(|e| LoadError::BadPeriod { row, source: e })?;

        let mut counts = [0u32; REGION_COUNT];
        for (region, col) in Region::ALL.iter().zip(&columns) {
            if col.is_null(i) {
                return Err(LoadError::NullValue {
                    column: region.column_name().to_string(),
                    row,
                });
            }
            let value = col.value(i);
            counts[region.index()] =
                u32::try_from(value).map_err(|_| LoadError::NegativeCount {
                    column: region.column_name().to_string(),
                    row,
                    value,
                })?;
        }
        out.push(PopulationRecord::new(period, counts));
    }
    Ok(())
}

/// Decode the published CSV layout into a [`Dataset`].
///
/// Column order is free; `Quarter` and every region column must be present.
/// Region cells must be non-negative 32-bit integers.
pub fn parse_dataset(text: &str) -> Result<Dataset, LoadError> {
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if text.is_empty() {
        return Err(LoadError::Empty);
    }
    let layout = read_header(text)?;
    debug!(columns = layout.schema.fields().len(), "parsed header");

    let reader = ReaderBuilder::new(Arc::new(layout.schema.clone()))
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .build(Cursor::new(text.as_bytes()))?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let first_row = records.len();
        records_from_batch(&batch, &layout, first_row, &mut records)?;
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(Dataset::new(records))
}
