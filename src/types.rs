// =============================================================================
// Shared types used across the trendline engine
// =============================================================================
//
// `PricePoint` is the raw ingestion row. `PriceSeries` is the validated,
// immutable form: the only way to obtain one is `PriceSeries::new`, so holding
// a value proves that timestamps are strictly ascending and every candle is
// well-formed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::DataIntegrityError;

/// One hourly OHLC observation. Timestamps are naive (local, as stored).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    fn check(&self, row: usize) -> Result<(), DataIntegrityError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        if let Some((field, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DataIntegrityError::NonFinite {
                row,
                field: *field,
                value: *value,
            });
        }

        let body_high = self.open.max(self.close);
        let body_low = self.open.min(self.close);
        if self.high < body_high || self.low > body_low || self.low > self.high {
            return Err(DataIntegrityError::BoundViolation {
                row,
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
            });
        }
        Ok(())
    }
}

/// Validated, chronologically ordered price series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validate `points` and wrap them.
    ///
    /// Nothing is reordered, deduplicated or clamped: the first offending row
    /// is reported and the whole series is rejected.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, DataIntegrityError> {
        for (row, point) in points.iter().enumerate() {
            point.check(row)?;
            if row > 0 {
                let previous = points[row - 1].timestamp;
                if point.timestamp == previous {
                    return Err(DataIntegrityError::DuplicateTimestamp {
                        row,
                        timestamp: point.timestamp,
                    });
                }
                if point.timestamp < previous {
                    return Err(DataIntegrityError::NonMonotonic {
                        row,
                        previous,
                        timestamp: point.timestamp,
                    });
                }
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}
