// =============================================================================
// Year Partitioner: calendar-year windows over the enriched series
// =============================================================================
//
// Window for year Y is every row whose naive timestamp has calendar year Y,
// i.e. [Y-01-01 00:00:00, Y-12-31 23:59:59]. The series is sorted, so each
// window is a contiguous row range found by binary search. Only ranges are
// stored; slicing happens at query time against the same enriched series.

use std::ops::Range;

use chrono::Datelike;
use tracing::debug;

use crate::errors::ConfigError;
use crate::series::EnrichedSeries;

/// Validated, ordered list of partition years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearPartitioner {
    years: Vec<i32>,
}

impl YearPartitioner {
    pub fn new(years: &[i32]) -> Result<Self, ConfigError> {
        if years.is_empty() {
            return Err(ConfigError::NoYears);
        }
        for (i, year) in years.iter().enumerate() {
            if years[..i].contains(year) {
                return Err(ConfigError::DuplicateYear(*year));
            }
        }
        Ok(Self {
            years: years.to_vec(),
        })
    }

    /// Derive the row range of every configured year.
    pub fn partition(&self, series: &EnrichedSeries) -> AnnualPartition {
        let timestamps = series.timestamps();
        let windows = self
            .years
            .iter()
            .map(|&year| {
                let start = timestamps.partition_point(|t| t.year() < year);
                let end = timestamps.partition_point(|t| t.year() <= year);
                debug!(year, rows = end - start, "year window");
                YearWindow {
                    year,
                    rows: start..end,
                }
            })
            .collect();

        AnnualPartition { windows }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct YearWindow {
    year: i32,
    rows: Range<usize>,
}

/// Year → row range mapping, in configured year order.
///
/// Ranges are disjoint; a year with no data has an empty range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnualPartition {
    windows: Vec<YearWindow>,
}

impl AnnualPartition {
    /// Row range for `year`, or `None` if the year is not configured.
    pub fn rows(&self, year: i32) -> Option<Range<usize>> {
        self.windows
            .iter()
            .find(|w| w.year == year)
            .map(|w| w.rows.clone())
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.windows.iter().map(|w| w.year)
    }

    /// `(year, row count)` per configured year.
    pub fn row_counts(&self) -> Vec<(i32, usize)> {
        self.windows.iter().map(|w| (w.year, w.rows.len())).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::computer::IndicatorComputer;
    use crate::types::tests::{hourly, point, ts};
    use crate::types::PriceSeries;

    fn enrich(points: Vec<crate::types::PricePoint>) -> EnrichedSeries {
        IndicatorComputer::new(&[9, 12])
            .unwrap()
            .compute(PriceSeries::new(points).unwrap())
    }

    #[test]
    fn rejects_empty_year_list() {
        assert_eq!(YearPartitioner::new(&[]).unwrap_err(), ConfigError::NoYears);
    }

    #[test]
    fn rejects_duplicate_year() {
        assert_eq!(
            YearPartitioner::new(&[2020, 2021, 2020]).unwrap_err(),
            ConfigError::DuplicateYear(2020)
        );
    }

    #[test]
    fn boundary_rows_land_in_the_right_year() {
        let series = enrich(vec![
            point(ts(2020, 12, 31, 0, 0, 0), 1.0),
            point(ts(2020, 12, 31, 23, 59, 59), 2.0),
            point(ts(2021, 1, 1, 0, 0, 0), 3.0),
        ]);
        let partition = YearPartitioner::new(&[2020, 2021])
            .unwrap()
            .partition(&series);

        assert_eq!(partition.rows(2020), Some(0..2));
        assert_eq!(partition.rows(2021), Some(2..3));
    }

    #[test]
    fn missing_year_is_empty_not_absent() {
        let series = enrich(hourly(ts(2020, 6, 1, 0, 0, 0), 10));
        let partition = YearPartitioner::new(&[2019, 2020])
            .unwrap()
            .partition(&series);

        assert_eq!(partition.rows(2019).map(|r| r.len()), Some(0));
        assert_eq!(partition.rows(2020).map(|r| r.len()), Some(10));
        assert_eq!(partition.rows(2018), None);
    }

    #[test]
    fn partitions_are_disjoint_and_cover_configured_years() {
        // Hourly rows from mid-2018 into 2022; only three years configured.
        let points = hourly(ts(2018, 7, 1, 0, 0, 0), 24 * 365 * 4);
        let series = enrich(points);
        let years = [2021, 2019, 2020];
        let partition = YearPartitioner::new(&years).unwrap().partition(&series);

        let mut covered: Vec<usize> = years
            .iter()
            .flat_map(|&y| partition.rows(y).unwrap())
            .collect();
        let total = covered.len();
        covered.sort_unstable();
        covered.dedup();
        assert_eq!(covered.len(), total, "a row appears in two partitions");

        let expected: Vec<usize> = series
            .timestamps()
            .iter()
            .enumerate()
            .filter(|(_, t)| years.contains(&t.year()))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(covered, expected);
    }

    #[test]
    fn year_order_follows_configuration() {
        let series = enrich(Vec::new());
        let partition = YearPartitioner::new(&[2024, 2017]).unwrap().partition(&series);
        assert_eq!(partition.years().collect::<Vec<_>>(), vec![2024, 2017]);
        assert_eq!(partition.row_counts(), vec![(2024, 0), (2017, 0)]);
    }
}
