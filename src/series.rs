// =============================================================================
// Enriched series: prices plus indicator columns on one time index
// =============================================================================

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::types::PriceSeries;

/// A named derived column, one value per row of the owning series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub span: usize,
    pub values: Vec<f64>,
}

/// Column-oriented price series with its indicator columns.
///
/// Constructed only by `IndicatorComputer`; every column has the same length
/// as `timestamps`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedSeries {
    timestamps: Vec<NaiveDateTime>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    indicators: Vec<IndicatorSeries>,
}

impl EnrichedSeries {
    pub(crate) fn new(series: PriceSeries, indicators: Vec<IndicatorSeries>) -> Self {
        let points = series.points();
        debug_assert!(indicators.iter().all(|i| i.values.len() == points.len()));

        Self {
            timestamps: points.iter().map(|p| p.timestamp).collect(),
            open: points.iter().map(|p| p.open).collect(),
            high: points.iter().map(|p| p.high).collect(),
            low: points.iter().map(|p| p.low).collect(),
            close: points.iter().map(|p| p.close).collect(),
            indicators,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn indicators(&self) -> &[IndicatorSeries] {
        &self.indicators
    }

    pub fn indicator(&self, name: &str) -> Option<&IndicatorSeries> {
        self.indicators.iter().find(|i| i.name == name)
    }
}
