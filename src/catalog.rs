/// Model and site registry for the streamflow evaluation service.
///
/// Defines the hydrological models that can be evaluated, the default model
/// used by the fallback path, and the default Jordan River watershed sites
/// shown when no region is selected. All other modules should reference
/// model ids from here rather than hardcoding them.

use crate::model::SeriesKind;

// ---------------------------------------------------------------------------
// Model metadata
// ---------------------------------------------------------------------------

/// Metadata for a single evaluable model.
pub struct ModelInfo {
    /// Identifier used in storage keys and requests, e.g. "NWM_v2.1".
    pub id: &'static str,
    /// Label shown in the UI model picker.
    pub display_name: &'static str,
}

/// Model used when the request names no model, an unknown one, or the
/// requested evaluation cannot be computed.
pub const DEFAULT_MODEL_ID: &str = "NWM_v2.1";

/// Value column of stored observed series.
pub const OBSERVED_VALUE_COLUMN: &str = "USGS_flow";

/// All models with stored predictions, in UI order.
pub static MODEL_REGISTRY: &[ModelInfo] = &[
    ModelInfo {
        id: "NWM_v2.1",
        display_name: "National Water Model v2.1",
    },
    ModelInfo {
        id: "NWM_v3.0",
        display_name: "National Water Model v3.0",
    },
    ModelInfo {
        id: "MLP",
        display_name: "NWM MLP extension",
    },
    ModelInfo {
        id: "XGBoost",
        display_name: "NWM XGBoost extension",
    },
    ModelInfo {
        id: "CNN",
        display_name: "NWM CNN extension",
    },
    ModelInfo {
        id: "LSTM",
        display_name: "NWM LSTM extension",
    },
];

/// Looks up a model by id. Returns `None` if not registered.
pub fn find_model(model_id: &str) -> Option<&'static ModelInfo> {
    MODEL_REGISTRY.iter().find(|m| m.id == model_id)
}

/// Name of the value column in a stored series.
///
/// Model columns are keyed by the first three characters of the model id,
/// so both NWM versions share `NWM_flow`.
pub fn value_column(kind: SeriesKind, model_id: Option<&str>) -> String {
    match (kind, model_id) {
        (SeriesKind::Modeled, Some(id)) => {
            let prefix: String = id.chars().take(3).collect();
            format!("{}_flow", prefix)
        }
        _ => OBSERVED_VALUE_COLUMN.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Sites
// ---------------------------------------------------------------------------

/// USGS sites within the Jordan River watershed, used as the default region.
pub static DEFAULT_REACH_IDS: &[&str] = &[
    "10171000", "10166430", "10168000", "10164500", "10163000", "10157500", "10155500",
    "10156000", "10155200", "10155000", "10154200", "10153100", "10150500", "10149400",
    "10149000", "10147100", "10146400", "10145400", "10172700",
];

/// Restores the leading zero USGS ids lose when a CSV round-trips them
/// through an integer column. Non-numeric ids are returned trimmed but
/// otherwise unchanged.
pub fn normalize_site_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.len() < 8 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>8}", trimmed)
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
