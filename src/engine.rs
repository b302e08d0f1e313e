// =============================================================================
// Engine: validated series, indicator columns and year windows as one value
// =============================================================================
//
// Build order is fixed: configuration → integrity checks → indicators →
// partition. `Engine::build` either returns a complete engine or an error;
// there is no partially initialised state. After construction the engine is
// immutable and is shared as `Arc<Engine>` across any number of readers.

use tracing::{info, warn};

use crate::errors::{ConfigError, EngineError, QueryError};
use crate::indicators::computer::IndicatorComputer;
use crate::partition::{AnnualPartition, YearPartitioner};
use crate::runtime_config::RuntimeConfig;
use crate::series::EnrichedSeries;
use crate::types::{PricePoint, PriceSeries};
use crate::view::{ViewBundle, ViewQuery};

#[derive(Debug, Clone)]
pub struct Engine {
    series: EnrichedSeries,
    partition: AnnualPartition,
    indicator_names: Vec<String>,
    years: Vec<i32>,
    display_cap: usize,
}

impl Engine {
    /// Validate `config` and `points`, then compute everything up front.
    pub fn build(config: &RuntimeConfig, points: Vec<PricePoint>) -> Result<Self, EngineError> {
        let computer = IndicatorComputer::new(&config.ema_windows)?;
        let partitioner = YearPartitioner::new(&config.years)?;
        if config.display_cap == 0 {
            return Err(ConfigError::ZeroDisplayCap.into());
        }

        let prices = PriceSeries::new(points)?;
        if prices.is_empty() {
            warn!("price series is empty, every year window will be empty");
        }
        let series = computer.compute(prices);
        let partition = partitioner.partition(&series);
        let years = partition.years().collect();

        info!(
            rows = series.len(),
            spans = ?computer.spans(),
            years = ?partition.row_counts(),
            "engine built"
        );

        Ok(Self {
            series,
            partition,
            indicator_names: computer.indicator_names(),
            years,
            display_cap: config.display_cap,
        })
    }

    pub fn query(&self) -> ViewQuery<'_> {
        ViewQuery::new(&self.series, &self.partition, self.display_cap)
    }

    /// Shorthand for `self.query().fetch(year, indicators)`.
    pub fn view<S: AsRef<str>>(
        &self,
        year: i32,
        indicators: &[S],
    ) -> Result<ViewBundle, QueryError> {
        self.query().fetch(year, indicators)
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Year shown before the caller picks one.
    pub fn default_year(&self) -> i32 {
        // `YearPartitioner::new` rejects an empty list.
        self.years[0]
    }

    pub fn indicator_names(&self) -> &[String] {
        &self.indicator_names
    }

    pub fn display_cap(&self) -> usize {
        self.display_cap
    }

    pub fn rows(&self) -> usize {
        self.series.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DataIntegrityError;
    use crate::types::tests::{hourly, point, ts};
    use std::sync::Arc;

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            years: vec![2020, 2021],
            ..RuntimeConfig::default()
        }
    }

    fn engine() -> Engine {
        Engine::build(&config(), hourly(ts(2020, 11, 1, 0, 0, 0), 24 * 120)).unwrap()
    }

    #[test]
    fn catalogue_reflects_configuration() {
        let engine = engine();
        assert_eq!(engine.years(), &[2020, 2021]);
        assert_eq!(engine.default_year(), 2020);
        assert_eq!(engine.display_cap(), 5);
        assert_eq!(
            engine.indicator_names(),
            &["ema_9", "ema_12", "ema_21", "ema_30", "ema_50", "ema_80", "ema_100", "ema_200"]
        );
        assert_eq!(engine.rows(), 24 * 120);
    }

    #[test]
    fn config_errors_abort_build() {
        let mut cfg = config();
        cfg.ema_windows = vec![9, 0];
        let err = Engine::build(&cfg, Vec::new()).unwrap_err();
        assert_eq!(err, EngineError::Config(ConfigError::NonPositiveWindow(0)));

        let mut cfg = config();
        cfg.years.clear();
        assert_eq!(
            Engine::build(&cfg, Vec::new()).unwrap_err(),
            EngineError::Config(ConfigError::NoYears)
        );

        let mut cfg = config();
        cfg.display_cap = 0;
        assert_eq!(
            Engine::build(&cfg, Vec::new()).unwrap_err(),
            EngineError::Config(ConfigError::ZeroDisplayCap)
        );
    }

    #[test]
    fn integrity_errors_abort_build() {
        let t = ts(2020, 1, 1, 0, 0, 0);
        let err = Engine::build(&config(), vec![point(t, 1.0), point(t, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DataIntegrity(DataIntegrityError::DuplicateTimestamp { row: 1, .. })
        ));
    }

    #[test]
    fn empty_data_builds_with_empty_years() {
        let engine = Engine::build(&config(), Vec::new()).unwrap();
        let bundle = engine.view(2020, &["ema_9"]).unwrap();
        assert!(bundle.timestamps.is_empty());
        assert!(bundle.indicators[0].values.is_empty());
    }

    #[test]
    fn boundary_points_through_the_engine() {
        let engine = Engine::build(
            &config(),
            vec![
                point(ts(2020, 12, 31, 23, 59, 59), 1.0),
                point(ts(2021, 1, 1, 0, 0, 0), 2.0),
            ],
        )
        .unwrap();
        assert_eq!(
            engine.view(2020, &[] as &[&str]).unwrap().timestamps,
            vec![ts(2020, 12, 31, 23, 59, 59)]
        );
        assert_eq!(
            engine.view(2021, &[] as &[&str]).unwrap().timestamps,
            vec![ts(2021, 1, 1, 0, 0, 0)]
        );
    }

    #[test]
    fn unknown_inputs_are_rejected() {
        let engine = engine();
        assert_eq!(
            engine.view(1999, &["ema_9"]).unwrap_err(),
            QueryError::UnknownYear(1999)
        );
        assert_eq!(
            engine.view(2020, &["ema_999"]).unwrap_err(),
            QueryError::UnknownIndicator("ema_999".into())
        );
    }

    #[test]
    fn concurrent_queries_are_identical() {
        let engine = Arc::new(engine());
        let expected = engine.view(2020, &["ema_9", "ema_12"]).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.view(2020, &["ema_9", "ema_12"]).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
