use crate::core::evaluator::{self, DEFAULT_MAX_ATTEMPTS};
use crate::domain::model::{Expression, Geometry};
use crate::domain::ports::ComputeService;
use crate::utils::error::{EvalError, Result};
use chrono::DateTime;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// Band name -> date string (`YYYY-MM-DD`) -> sampled value.
pub type BandSeries = HashMap<String, HashMap<String, Value>>;

// Row-oriented regional samples carry id/lon/lat in the first three columns,
// the epoch-millisecond timestamp in the fourth, and one column per band after.
const TIMESTAMP_COLUMN: usize = 3;
const FIRST_BAND_COLUMN: usize = 4;

/// Sample a collection at a point and reshape the row-oriented result into a
/// per-band time series keyed by UTC calendar date.
///
/// Rows falling on the same UTC date overwrite earlier ones per band.
pub async fn point_collection_series<S>(
    service: &S,
    collection: &Expression,
    xy: (f64, f64),
    scale: f64,
) -> Result<BandSeries>
where
    S: ComputeService + ?Sized,
{
    let region = collection.get_region(&Geometry::point(xy.0, xy.1), scale);
    let evaluation = evaluator::get_info(service, &region, DEFAULT_MAX_ATTEMPTS).await?;
    rows_to_series(evaluation.value())
}

/// Reshape a row-oriented regional sample (header row first) into a band map.
pub fn rows_to_series(output: &Value) -> Result<BandSeries> {
    let rows = output
        .as_array()
        .ok_or_else(|| malformed("regional sample is not an array of rows"))?;
    let header = rows
        .first()
        .ok_or_else(|| malformed("regional sample has no header row"))?
        .as_array()
        .ok_or_else(|| malformed("header row is not an array"))?;

    // band name -> column index; a repeated band name keeps the later column
    let mut columns: Vec<(String, usize)> = Vec::new();
    for (offset, name) in header.iter().skip(FIRST_BAND_COLUMN).enumerate() {
        let index = FIRST_BAND_COLUMN + offset;
        let name = name
            .as_str()
            .ok_or_else(|| malformed(format!("band name at column {} is not a string", index)))?;
        columns.push((name.to_string(), index));
    }

    let mut series: BandSeries = columns
        .iter()
        .map(|(name, _)| (name.clone(), HashMap::new()))
        .collect();

    for row in &rows[1..] {
        let row = row
            .as_array()
            .ok_or_else(|| malformed("data row is not an array"))?;
        let millis = row
            .get(TIMESTAMP_COLUMN)
            .and_then(Value::as_f64)
            .ok_or_else(|| malformed("data row has no numeric timestamp"))? as i64;
        let date = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| malformed(format!("timestamp {} is out of range", millis)))?
            .format("%Y-%m-%d")
            .to_string();

        for (name, index) in &columns {
            let value = row
                .get(*index)
                .cloned()
                .ok_or_else(|| malformed(format!("data row is missing column {} ({})", index, name)))?;
            if let Some(band) = series.get_mut(name) {
                band.insert(date.clone(), value);
            }
        }
    }

    Ok(series)
}

/// Render a band series as CSV: a date column plus one column per band, both
/// sorted so the output is stable.
pub fn series_to_csv(series: &BandSeries) -> Result<String> {
    let mut bands: Vec<&String> = series.keys().collect();
    bands.sort();

    let mut dates: BTreeSet<&String> = BTreeSet::new();
    for band in series.values() {
        dates.extend(band.keys());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["date".to_string()];
    header.extend(bands.iter().map(|band| (*band).clone()));
    writer.write_record(&header)?;

    for date in dates {
        let mut record = vec![date.clone()];
        for band in &bands {
            let cell = series
                .get(*band)
                .and_then(|samples| samples.get(date))
                .map(format_cell)
                .unwrap_or_default();
            record.push(cell);
        }
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| EvalError::ProcessingError {
        message: format!("CSV buffer error: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| EvalError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn malformed(message: impl Into<String>) -> EvalError {
    EvalError::MalformedResult {
        message: message.into(),
    }
}
