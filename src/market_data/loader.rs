//! CSV price loader.
//!
//! Parses rows only. Ordering, uniqueness and OHLC bounds are checked later by
//! `PriceSeries::new`, so a malformed file is reported either here (syntax) or
//! at engine build (integrity), never silently repaired.

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::info;

use crate::types::PricePoint;

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Parse a timestamp as written. A bare date means midnight. A trailing UTC
/// offset (`+02:00`, `+0200`, `Z`) is dropped without shifting the clock
/// time.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
                .or_else(|| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        Ok(Self {
            date: position(&lower, &["date", "datetime", "timestamp"])?,
            open: position(&lower, &["open"])?,
            high: position(&lower, &["high"])?,
            low: position(&lower, &["low"])?,
            close: position(&lower, &["close"])?,
        })
    }
}

fn position(headers: &[String], names: &[&str]) -> Result<usize> {
    headers
        .iter()
        .position(|h| names.contains(&h.as_str()))
        .ok_or_else(|| anyhow!("missing column '{}' in header {:?}", names[0], headers))
}

/// Load price points from a CSV file, in file order.
pub fn load_price_points<P: AsRef<Path>>(path: P) -> Result<Vec<PricePoint>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open price data {}", path.display()))?;
    let points = read_price_points(file)
        .with_context(|| format!("failed to load price data {}", path.display()))?;

    info!(path = %path.display(), rows = points.len(), "price data loaded");
    Ok(points)
}

/// Parse price points from any CSV reader with a header row.
pub fn read_price_points<R: Read>(reader: R) -> Result<Vec<PricePoint>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut points = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = record.with_context(|| format!("row {row}: malformed CSV record"))?;
        points.push(parse_record(&record, columns).with_context(|| format!("row {row}"))?);
    }
    Ok(points)
}

fn parse_record(record: &csv::StringRecord, columns: Columns) -> Result<PricePoint> {
    let raw_date = field(record, columns.date, "date")?;
    let Some(timestamp) = parse_timestamp(raw_date) else {
        bail!("invalid date '{raw_date}'");
    };

    Ok(PricePoint::new(
        timestamp,
        number(record, columns.open, "open")?,
        number(record, columns.high, "high")?,
        number(record, columns.low, "low")?,
        number(record, columns.close, "close")?,
    ))
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, name: &str) -> Result<&'r str> {
    record
        .get(idx)
        .ok_or_else(|| anyhow!("missing field '{name}'"))
}

fn number(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64> {
    let raw = field(record, idx, name)?;
    raw.parse::<f64>()
        .with_context(|| format!("invalid {name} value '{raw}'"))
}
