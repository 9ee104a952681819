/// Data-access port for discharge series.
///
/// The evaluation pipeline never talks to storage directly. It is handed a
/// `SeriesSource` and asks it for one observed and one modeled series per
/// evaluation, which keeps storage clients out of global state and lets
/// tests swap in `memory::MemorySource`.
///
/// Submodules:
/// - `records` — CSV record parsing shared by the storage adapters.
/// - `s3`      — public streamflow bucket over HTTPS.
/// - `db`      — PostgreSQL discharge table.
/// - `memory`  — in-process series, for tests and demos.

pub mod db;
pub mod memory;
pub mod records;
pub mod s3;

use crate::model::{EvalError, SeriesKind, TimeSeries};

/// Everything a source needs to locate one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesQuery<'a> {
    pub kind: SeriesKind,
    /// USGS site id of the streamgauge.
    pub site_id: &'a str,
    /// NHD reach segment the model predicts for. Only used for modeled series.
    pub segment_id: Option<&'a str>,
    pub state_code: Option<&'a str>,
    /// Only used for modeled series.
    pub model_id: Option<&'a str>,
}

impl<'a> SeriesQuery<'a> {
    pub fn observed(site_id: &'a str, state_code: Option<&'a str>) -> Self {
        Self {
            kind: SeriesKind::Observed,
            site_id,
            segment_id: None,
            state_code,
            model_id: None,
        }
    }

    pub fn modeled(
        site_id: &'a str,
        segment_id: Option<&'a str>,
        state_code: Option<&'a str>,
        model_id: &'a str,
    ) -> Self {
        Self {
            kind: SeriesKind::Modeled,
            site_id,
            segment_id,
            state_code,
            model_id: Some(model_id),
        }
    }

    /// Human-readable key used in logs and `NotFound` errors.
    pub fn describe(&self) -> String {
        match self.kind {
            SeriesKind::Observed => format!("site {}", self.site_id),
            SeriesKind::Modeled => format!(
                "{} segment {}",
                self.model_id.unwrap_or("?"),
                self.segment_id.unwrap_or(self.site_id)
            ),
        }
    }
}

/// A synchronous supplier of discharge series.
///
/// Implementations return `EvalError::NotFound` when no record matches and
/// `EvalError::Storage` for transport failures.
pub trait SeriesSource {
    fn fetch_series(&self, query: &SeriesQuery<'_>) -> Result<TimeSeries, EvalError>;
}
