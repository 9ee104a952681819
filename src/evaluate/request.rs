/// Request boundary.
///
/// The map UI sends loosely-typed string parameters, sometimes with
/// single-element list syntax left over from multi-select widgets
/// (`"[NWM_v2.1]"`). This module turns them into an `EvaluationRequest` and
/// parses the optional fields the requested evaluation depends on.

use chrono::NaiveDate;

use crate::catalog;
use crate::model::{DateWindow, EvalError, EvaluationRequest};

/// Date layouts accepted from the UI: the date picker's `mm-dd-yyyy` and ISO.
const DATE_FORMATS: &[&str] = &["%m-%d-%Y", "%Y-%m-%d"];

/// Strips whitespace and unwraps `"[a, b]"` to its first element. Empty
/// values count as absent.
fn clean_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let inner = match trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(list) => list.split(',').next().unwrap_or("").trim(),
        None => trimmed,
    };
    let inner = inner.trim_matches(|c| c == '\'' || c == '"').trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

impl EvaluationRequest {
    /// Builds a request from key/value parameters.
    ///
    /// Accepts both the feature-property names the map layer uses (`id`,
    /// `NHD_id`, `state`, `startdate`, `enddate`) and the form names
    /// (`site_id`, `segment_id`, `state_code`, `start-date`, `end-date`).
    /// Unknown keys are ignored. Only the site id is required.
    pub fn from_params<I, K, V>(params: I) -> Result<Self, EvalError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = EvaluationRequest::default();
        let mut site_id = None;

        for (key, value) in params {
            let value = clean_value(value.as_ref());
            match key.as_ref() {
                "id" | "site_id" => site_id = value,
                "NHD_id" | "segment_id" => request.segment_id = value,
                "state" | "state_code" => request.state_code = value,
                "model_id" => request.model_id = value,
                "startdate" | "start-date" | "start_date" => request.start_date = value,
                "enddate" | "end-date" | "end_date" => request.end_date = value,
                _ => {}
            }
        }

        let site_id = site_id.ok_or(EvalError::MissingParameter("site_id"))?;
        request.site_id = catalog::normalize_site_id(&site_id);
        Ok(request)
    }
}

/// Parses one request date.
pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, EvalError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| EvalError::DateParse {
            field,
            value: raw.to_string(),
        })
}

/// The model and window the user asked for, once validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedPlan {
    pub model_id: String,
    pub window: DateWindow,
}

/// Validates the parts of a request the requested evaluation needs.
///
/// Any error here is a fallback trigger.
pub fn requested_plan(request: &EvaluationRequest) -> Result<RequestedPlan, EvalError> {
    let model_id = request
        .model_id
        .as_deref()
        .ok_or(EvalError::MissingParameter("model_id"))?;
    if catalog::find_model(model_id).is_none() {
        return Err(EvalError::InvalidParameter {
            name: "model_id",
            value: model_id.to_string(),
        });
    }

    let start = request
        .start_date
        .as_deref()
        .ok_or(EvalError::MissingParameter("start_date"))?;
    let end = request
        .end_date
        .as_deref()
        .ok_or(EvalError::MissingParameter("end_date"))?;

    Ok(RequestedPlan {
        model_id: model_id.to_string(),
        window: DateWindow {
            start: parse_date("start_date", start)?,
            end: parse_date("end_date", end)?,
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
