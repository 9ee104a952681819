/// In-process series source.
///
/// Holds series keyed the same way the bucket lays them out, so pipelines
/// can be exercised end to end without network or database access.

use std::collections::HashMap;

use crate::ingest::{SeriesQuery, SeriesSource};
use crate::model::{EvalError, SeriesKind, TimeSeries, TimeSeriesPoint};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Observed { site_id: String },
    Modeled { segment_id: String, model_id: String },
}

/// `SeriesSource` over series inserted up front.
#[derive(Debug, Default)]
pub struct MemorySource {
    series: HashMap<Key, Vec<TimeSeriesPoint>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the observed series for a site. Raw points are kept in
    /// insertion order; deduplication happens when the series is fetched.
    pub fn insert_observed(&mut self, site_id: &str, points: Vec<TimeSeriesPoint>) {
        self.series.insert(
            Key::Observed {
                site_id: site_id.to_string(),
            },
            points,
        );
    }

    /// Registers a model's series for a reach segment.
    pub fn insert_modeled(&mut self, segment_id: &str, model_id: &str, points: Vec<TimeSeriesPoint>) {
        self.series.insert(
            Key::Modeled {
                segment_id: segment_id.to_string(),
                model_id: model_id.to_string(),
            },
            points,
        );
    }
}

impl SeriesSource for MemorySource {
    fn fetch_series(&self, query: &SeriesQuery<'_>) -> Result<TimeSeries, EvalError> {
        let key = match query.kind {
            SeriesKind::Observed => Key::Observed {
                site_id: query.site_id.to_string(),
            },
            SeriesKind::Modeled => Key::Modeled {
                segment_id: query.segment_id.unwrap_or(query.site_id).to_string(),
                model_id: query
                    .model_id
                    .ok_or(EvalError::MissingParameter("model_id"))?
                    .to_string(),
            },
        };

        self.series
            .get(&key)
            .map(|points| TimeSeries::new(query.kind, points.iter().copied()))
            .ok_or_else(|| EvalError::NotFound {
                kind: query.kind,
                key: query.describe(),
            })
    }
}
