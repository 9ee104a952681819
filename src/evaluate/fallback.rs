/// Degraded-mode policy.
///
/// The requested evaluation restricts the aligned series by date. When it
/// cannot run, the default evaluation instead keeps the first
/// `max_points` aligned points regardless of date. The two are kept as
/// distinct strategies on purpose: the default view is "the start of
/// whatever overlap exists", not a guessed date range.

use crate::analysis::align::align;
use crate::config::FallbackConfig;
use crate::model::{AlignedPair, DateWindow, TimeSeries};

/// How an aligned pair is reduced before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStrategy {
    /// Keep points whose date lies in the closed window.
    DateFilter(DateWindow),
    /// Keep the first `n` points of the full overlap.
    LeadingPoints(usize),
}

impl WindowStrategy {
    pub fn apply(&self, observed: &TimeSeries, modeled: &TimeSeries) -> AlignedPair {
        match *self {
            WindowStrategy::DateFilter(window) => align(observed, modeled, Some(window)),
            WindowStrategy::LeadingPoints(n) => truncate_leading(align(observed, modeled, None), n),
        }
    }
}

/// Keeps at most the first `max_points` points.
pub fn truncate_leading(mut pair: AlignedPair, max_points: usize) -> AlignedPair {
    pair.points.truncate(max_points);
    pair
}

/// What the default evaluation substitutes for the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    pub default_model_id: String,
    pub max_points: usize,
}

impl FallbackPolicy {
    pub fn from_config(config: &FallbackConfig) -> Self {
        Self {
            default_model_id: config.default_model_id.clone(),
            max_points: config.max_points,
        }
    }

    pub fn strategy(&self) -> WindowStrategy {
        WindowStrategy::LeadingPoints(self.max_points)
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::from_config(&FallbackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SeriesKind, TimeSeriesPoint};
    use chrono::NaiveDate;

    fn daily(kind: SeriesKind, days: i64) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2019, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        TimeSeries::new(
            kind,
            (0..days).map(|i| TimeSeriesPoint {
                timestamp: start + chrono::Duration::days(i),
                value: 100.0 + i as f64,
            }),
        )
    }

    #[test]
    fn test_default_policy_matches_deployment() {
        let policy = FallbackPolicy::default();
        assert_eq!(policy.default_model_id, "NWM_v2.1");
        assert_eq!(policy.strategy(), WindowStrategy::LeadingPoints(45));
    }

    #[test]
    fn test_leading_points_keeps_first_n_of_overlap() {
        let obs = daily(SeriesKind::Observed, 100);
        let sim = daily(SeriesKind::Modeled, 100);

        let pair = WindowStrategy::LeadingPoints(45).apply(&obs, &sim);

        assert_eq!(pair.len(), 45);
        assert_eq!(pair.points[0].timestamp, obs.points()[0].timestamp);
        assert_eq!(pair.points[44].timestamp, obs.points()[44].timestamp);
    }

    #[test]
    fn test_leading_points_on_short_overlap_keeps_everything() {
        let pair = WindowStrategy::LeadingPoints(45)
            .apply(&daily(SeriesKind::Observed, 10), &daily(SeriesKind::Modeled, 10));
        assert_eq!(pair.len(), 10);
    }

    #[test]
    fn test_date_filter_ignores_point_count() {
        let obs = daily(SeriesKind::Observed, 100);
        let sim = daily(SeriesKind::Modeled, 100);
        let window = DateWindow {
            start: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2019, 3, 31).unwrap(),
        };

        let pair = WindowStrategy::DateFilter(window).apply(&obs, &sim);

        assert_eq!(pair.len(), 90);
    }
}
