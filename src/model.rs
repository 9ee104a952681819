/// Core data types for the streamflow evaluation service.
///
/// This module defines the shared domain model imported by all other modules:
/// time series, aligned observed/modeled pairs, the evaluation request, the
/// metric set, and the error taxonomy. It performs no I/O.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Discharge unit carried by every series, cubic feet per second.
pub const UNIT_CFS: &str = "ft3/s";

// ---------------------------------------------------------------------------
// Series types
// ---------------------------------------------------------------------------

/// Which side of the comparison a series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Observed,
    Modeled,
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKind::Observed => write!(f, "observed"),
            SeriesKind::Modeled => write!(f, "modeled"),
        }
    }
}

/// A single discharge value at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// A discharge series with unique, ascending timestamps.
///
/// Built from raw records in input order. When a timestamp appears more than
/// once, the first occurrence wins and later ones are discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub kind: SeriesKind,
    pub unit: String,
    points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    pub fn new(kind: SeriesKind, raw: impl IntoIterator<Item = TimeSeriesPoint>) -> Self {
        let mut by_time: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
        for point in raw {
            by_time.entry(point.timestamp).or_insert(point.value);
        }

        let points = by_time
            .into_iter()
            .map(|(timestamp, value)| TimeSeriesPoint { timestamp, value })
            .collect();

        Self {
            kind,
            unit: UNIT_CFS.to_string(),
            points,
        }
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at an exact timestamp, if present.
    pub fn value_at(&self, timestamp: NaiveDateTime) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.timestamp.cmp(&timestamp))
            .ok()
            .map(|i| self.points[i].value)
    }
}

// ---------------------------------------------------------------------------
// Aligned pair
// ---------------------------------------------------------------------------

/// One timestamp present in both series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPoint {
    pub timestamp: NaiveDateTime,
    pub observed: f64,
    pub modeled: f64,
}

/// Observed and modeled values over their common timestamps, ascending.
///
/// May be empty; the metric engine is where an empty or single-point pair
/// is rejected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedPair {
    pub points: Vec<AlignedPoint>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn observed(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.observed).collect()
    }

    pub fn modeled(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.modeled).collect()
    }
}

/// Closed calendar-date interval. A timestamp is inside when its date falls
/// on or between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        date >= self.start && date <= self.end
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Evaluation parameters as they arrive from the map UI.
///
/// Only `site_id` is guaranteed. Everything else is kept as the raw string
/// the caller sent; the evaluation layer parses it and decides whether the
/// requested path can run or the fallback must take over.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluationRequest {
    pub site_id: String,
    pub segment_id: Option<String>,
    pub state_code: Option<String>,
    pub model_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Goodness-of-fit statistics at full precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSet {
    pub r2: f64,
    pub rmse: f64,
    pub max_error: f64,
    pub mape_percent: f64,
    pub kge: f64,
    pub kge_r: f64,
    pub kge_alpha: f64,
    pub kge_beta: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while loading, aligning, or scoring a site.
#[derive(Debug, PartialEq)]
pub enum EvalError {
    /// No stored record matches the requested series.
    NotFound { kind: SeriesKind, key: String },
    /// Transport failure talking to storage (timeout, non-2xx, connection).
    Storage(String),
    /// A stored record exists but cannot be interpreted.
    MalformedRecord(String),
    /// A request parameter needed by the requested path is absent.
    MissingParameter(&'static str),
    /// A request parameter is present but names nothing we know.
    InvalidParameter { name: &'static str, value: String },
    /// A request date could not be parsed as a calendar date.
    DateParse { field: &'static str, value: String },
    /// Fewer than two aligned points.
    InsufficientData { points: usize },
    /// A metric is undefined for the given values (zero variance, zero mean,
    /// zero observation).
    DegenerateInput(String),
    /// The fallback path failed after the requested path had already failed.
    EvaluationFailed {
        trigger: Box<EvalError>,
        cause: Box<EvalError>,
    },
}

impl EvalError {
    /// Whether the requested path may recover from this error by running
    /// the default configuration.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            EvalError::NotFound { .. }
                | EvalError::MissingParameter(_)
                | EvalError::InvalidParameter { .. }
                | EvalError::DateParse { .. }
                | EvalError::InsufficientData { .. }
                | EvalError::DegenerateInput(_)
        )
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::NotFound { kind, key } => write!(f, "No {} series found: {}", kind, key),
            EvalError::Storage(msg) => write!(f, "Storage error: {}", msg),
            EvalError::MalformedRecord(msg) => write!(f, "Malformed record: {}", msg),
            EvalError::MissingParameter(name) => write!(f, "Missing parameter: {}", name),
            EvalError::InvalidParameter { name, value } => {
                write!(f, "Invalid parameter {}: '{}'", name, value)
            }
            EvalError::DateParse { field, value } => {
                write!(f, "Date parse error in {}: '{}'", field, value)
            }
            EvalError::InsufficientData { points } => {
                write!(f, "Insufficient data: {} aligned points, need at least 2", points)
            }
            EvalError::DegenerateInput(msg) => write!(f, "Degenerate input: {}", msg),
            EvalError::EvaluationFailed { trigger, cause } => write!(
                f,
                "Evaluation failed: fallback after '{}' also failed: {}",
                trigger, cause
            ),
        }
    }
}

impl std::error::Error for EvalError {}
