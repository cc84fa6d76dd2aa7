use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AdvisorError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily closes for one instrument, oldest first. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self, AdvisorError> {
        let symbol = symbol.into();
        points.retain(|p| p.close.is_finite());
        if points.is_empty() {
            return Err(AdvisorError::unavailable(symbol, "series has no closing prices"));
        }
        points.sort_by_key(|p| p.date);
        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last(&self) -> &PricePoint {
        // `new` rejects empty series
        &self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_points_are_sorted_oldest_first() {
        let series = PriceSeries::new(
            "INFY.NS",
            vec![
                PricePoint { date: day(3), close: 3.0 },
                PricePoint { date: day(1), close: 1.0 },
                PricePoint { date: day(2), close: 2.0 },
            ],
        )
        .unwrap();

        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.last().date, day(3));
    }

    #[test]
    fn test_empty_series_is_unavailable() {
        let err = PriceSeries::new("NOPE.NS", vec![]).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_non_finite_closes_are_dropped() {
        let series = PriceSeries::new(
            "TCS.NS",
            vec![
                PricePoint { date: day(1), close: f64::NAN },
                PricePoint { date: day(2), close: 10.0 },
            ],
        )
        .unwrap();

        assert_eq!(series.len(), 1);
    }
}
