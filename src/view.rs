// =============================================================================
// View Query: renderer-ready bundle for one year
// =============================================================================
//
// Read-only over the enriched series and its annual partition. Every series
// in a bundle is cut with the same row range, so the renderer never has to
// re-join by timestamp.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::errors::QueryError;
use crate::partition::AnnualPartition;
use crate::series::EnrichedSeries;

/// One requested indicator, restricted to the bundle's rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewIndicator {
    pub name: String,
    pub values: Vec<f64>,
}

/// Candlestick columns plus requested indicators for one partition year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewBundle {
    pub year: i32,
    pub timestamps: Vec<NaiveDateTime>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub indicators: Vec<ViewIndicator>,
}

/// Borrowed query handle. Cheap to construct, holds no state of its own.
#[derive(Debug, Clone, Copy)]
pub struct ViewQuery<'a> {
    series: &'a EnrichedSeries,
    partition: &'a AnnualPartition,
    display_cap: usize,
}

impl<'a> ViewQuery<'a> {
    pub fn new(
        series: &'a EnrichedSeries,
        partition: &'a AnnualPartition,
        display_cap: usize,
    ) -> Self {
        Self {
            series,
            partition,
            display_cap,
        }
    }

    /// Build the bundle for `year` with the requested indicators.
    ///
    /// Every requested name is checked, including names past the display
    /// cap; only then is the list truncated to the first `display_cap`
    /// entries in caller order.
    pub fn fetch<S: AsRef<str>>(
        &self,
        year: i32,
        indicators: &[S],
    ) -> Result<ViewBundle, QueryError> {
        let rows = self
            .partition
            .rows(year)
            .ok_or(QueryError::UnknownYear(year))?;

        let resolved = indicators
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.series
                    .indicator(name)
                    .ok_or_else(|| QueryError::UnknownIndicator(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if resolved.len() > self.display_cap {
            debug!(
                requested = resolved.len(),
                cap = self.display_cap,
                "indicator request truncated"
            );
        }

        let indicators = resolved
            .into_iter()
            .take(self.display_cap)
            .map(|series| ViewIndicator {
                name: series.name.clone(),
                values: series.values[rows.clone()].to_vec(),
            })
            .collect();

        Ok(ViewBundle {
            year,
            timestamps: self.series.timestamps()[rows.clone()].to_vec(),
            open: self.series.open()[rows.clone()].to_vec(),
            high: self.series.high()[rows.clone()].to_vec(),
            low: self.series.low()[rows.clone()].to_vec(),
            close: self.series.close()[rows].to_vec(),
            indicators,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::computer::IndicatorComputer;
    use crate::partition::YearPartitioner;
    use crate::types::tests::{hourly, ts};
    use crate::types::PriceSeries;

    const SPANS: [i64; 8] = [9, 12, 21, 30, 50, 80, 100, 200];

    fn fixture() -> (EnrichedSeries, AnnualPartition) {
        let points = hourly(ts(2019, 12, 31, 12, 0, 0), 24 * 400);
        let series = IndicatorComputer::new(&SPANS)
            .unwrap()
            .compute(PriceSeries::new(points).unwrap());
        let partition = YearPartitioner::new(&[2019, 2020, 2021])
            .unwrap()
            .partition(&series);
        (series, partition)
    }

    #[test]
    fn bundle_columns_share_one_index() {
        let (series, partition) = fixture();
        let query = ViewQuery::new(&series, &partition, 5);
        let bundle = query.fetch(2020, &["ema_9", "ema_200"]).unwrap();

        let n = bundle.timestamps.len();
        assert_eq!(n, 24 * 366); // 2020 is a leap year
        assert_eq!(bundle.open.len(), n);
        assert_eq!(bundle.high.len(), n);
        assert_eq!(bundle.low.len(), n);
        assert_eq!(bundle.close.len(), n);
        assert!(bundle.indicators.iter().all(|i| i.values.len() == n));
        assert_eq!(bundle.timestamps[0], ts(2020, 1, 1, 0, 0, 0));
    }

    #[test]
    fn indicator_values_come_from_the_full_history() {
        let (series, partition) = fixture();
        let query = ViewQuery::new(&series, &partition, 5);
        let bundle = query.fetch(2020, &["ema_21"]).unwrap();

        // First 2020 row is row 12 of the series (2019-12-31 12:00 start).
        let full = &series.indicator("ema_21").unwrap().values;
        assert_eq!(bundle.indicators[0].values[0], full[12]);
    }

    #[test]
    fn indicators_follow_caller_order() {
        let (series, partition) = fixture();
        let query = ViewQuery::new(&series, &partition, 5);
        let bundle = query.fetch(2020, &["ema_100", "ema_9", "ema_30"]).unwrap();
        let names: Vec<_> = bundle.indicators.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ema_100", "ema_9", "ema_30"]);
    }

    #[test]
    fn excess_indicators_are_truncated_in_request_order() {
        let (series, partition) = fixture();
        let query = ViewQuery::new(&series, &partition, 5);
        let request = [
            "ema_200", "ema_9", "ema_50", "ema_12", "ema_80", "ema_21", "ema_30",
        ];
        let bundle = query.fetch(2020, &request).unwrap();
        let names: Vec<_> = bundle.indicators.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, request[..5].to_vec());

        let again = query.fetch(2020, &request).unwrap();
        assert_eq!(bundle, again);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let (series, partition) = fixture();
        let query = ViewQuery::new(&series, &partition, 5);
        let a = query.fetch(2020, &["ema_9", "ema_12"]).unwrap();
        let b = query.fetch(2020, &["ema_9", "ema_12"]).unwrap();
        assert_eq!(a, b);
        for (x, y) in a.indicators.iter().zip(b.indicators.iter()) {
            let bits_x: Vec<u64> = x.values.iter().map(|v| v.to_bits()).collect();
            let bits_y: Vec<u64> = y.values.iter().map(|v| v.to_bits()).collect();
            assert_eq!(bits_x, bits_y);
        }
    }

    #[test]
    fn unknown_year_is_an_error() {
        let (series, partition) = fixture();
        let query = ViewQuery::new(&series, &partition, 5);
        assert_eq!(
            query.fetch(1999, &["ema_9"]).unwrap_err(),
            QueryError::UnknownYear(1999)
        );
    }

    #[test]
    fn unknown_indicator_is_an_error() {
        let (series, partition) = fixture();
        let query = ViewQuery::new(&series, &partition, 5);
        assert_eq!(
            query.fetch(2020, &["ema_999"]).unwrap_err(),
            QueryError::UnknownIndicator("ema_999".into())
        );
    }

    #[test]
    fn unknown_indicator_past_the_cap_is_still_rejected() {
        let (series, partition) = fixture();
        let query = ViewQuery::new(&series, &partition, 2);
        let err = query
            .fetch(2020, &["ema_9", "ema_12", "sma_5"])
            .unwrap_err();
        assert_eq!(err, QueryError::UnknownIndicator("sma_5".into()));
    }

    #[test]
    fn no_indicators_returns_candles_only() {
        let (series, partition) = fixture();
        let query = ViewQuery::new(&series, &partition, 5);
        let bundle = query.fetch(2021, &[] as &[&str]).unwrap();
        assert!(bundle.indicators.is_empty());
        assert!(!bundle.close.is_empty());
    }
}
