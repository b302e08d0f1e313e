// =============================================================================
// Indicator Computer: closes in, enriched series out
// =============================================================================
//
// Every configured span is smoothed independently from the same close
// sequence. The input series is consumed by value and moved into the returned
// `EnrichedSeries`; nothing is mutated in place.

use tracing::debug;

use crate::errors::ConfigError;
use crate::indicators::ema::{calculate_ema, ema_name};
use crate::series::{EnrichedSeries, IndicatorSeries};
use crate::types::PriceSeries;

/// Validated set of EMA spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorComputer {
    spans: Vec<usize>,
}

impl IndicatorComputer {
    /// Validate the configured spans. Order is preserved and becomes the
    /// column order of the enriched series.
    pub fn new(spans: &[i64]) -> Result<Self, ConfigError> {
        if spans.is_empty() {
            return Err(ConfigError::NoWindows);
        }

        let mut validated: Vec<usize> = Vec::with_capacity(spans.len());
        for &span in spans {
            if span <= 0 {
                return Err(ConfigError::NonPositiveWindow(span));
            }
            let span = span as usize;
            if validated.contains(&span) {
                return Err(ConfigError::DuplicateWindow(span));
            }
            validated.push(span);
        }

        Ok(Self { spans: validated })
    }

    pub fn spans(&self) -> &[usize] {
        &self.spans
    }

    /// Names of the series `compute` produces, in column order.
    pub fn indicator_names(&self) -> Vec<String> {
        self.spans.iter().map(|&s| ema_name(s)).collect()
    }

    /// Smooth `series` with every configured span.
    pub fn compute(&self, series: PriceSeries) -> EnrichedSeries {
        let closes = series.closes();
        let indicators = self
            .spans
            .iter()
            .map(|&span| IndicatorSeries {
                name: ema_name(span),
                span,
                values: calculate_ema(&closes, span),
            })
            .collect();

        let enriched = EnrichedSeries::new(series, indicators);
        debug!(
            rows = enriched.len(),
            indicators = enriched.indicators().len(),
            "indicator columns computed"
        );
        enriched
    }
}
