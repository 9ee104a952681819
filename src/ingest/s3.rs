/// Streamflow bucket client
///
/// Retrieves observed (USGS NWIS) and modeled (NWM and its ML extensions)
/// discharge CSVs from the public `streamflow-app-data` bucket. The bucket
/// allows anonymous reads, so objects are fetched with plain HTTPS GETs; no
/// signing and no SDK.
///
/// Object layout:
///   observed: NWIS/NWIS_sites_{state}.h5/NWIS_{site}.csv
///   modeled:  {model}/NHD_segments_{state}.h5/{model}_{segment}.csv

use std::time::Duration;

use reqwest::StatusCode;

use crate::catalog;
use crate::ingest::records::parse_series_csv;
use crate::ingest::{SeriesQuery, SeriesSource};
use crate::logging::{self, Component};
use crate::model::{EvalError, SeriesKind, TimeSeries};

pub const DEFAULT_BUCKET_URL: &str = "https://streamflow-app-data.s3.amazonaws.com";

/// `SeriesSource` backed by the public bucket.
pub struct BucketSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BucketSource {
    /// Builds a source with its own HTTP client.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EvalError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EvalError::Storage(format!("HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Builds a source around an existing client.
    pub fn with_client(client: reqwest::blocking::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn object_url(&self, query: &SeriesQuery<'_>) -> Result<String, EvalError> {
        Ok(format!("{}/{}", self.base_url, object_key(query)?))
    }
}

/// Storage key of the CSV object holding `query`'s series.
///
/// Every object lives under a per-state prefix, so a state code is required.
/// Modeled series fall back to the site id when no segment id is given.
pub fn object_key(query: &SeriesQuery<'_>) -> Result<String, EvalError> {
    let state = query
        .state_code
        .filter(|s| !s.trim().is_empty())
        .ok_or(EvalError::MissingParameter("state_code"))?;

    match query.kind {
        SeriesKind::Observed => Ok(format!(
            "NWIS/NWIS_sites_{}.h5/NWIS_{}.csv",
            state, query.site_id
        )),
        SeriesKind::Modeled => {
            let model = query.model_id.ok_or(EvalError::MissingParameter("model_id"))?;
            let segment = query.segment_id.unwrap_or(query.site_id);
            Ok(format!(
                "{}/NHD_segments_{}.h5/{}_{}.csv",
                model, state, model, segment
            ))
        }
    }
}

impl SeriesSource for BucketSource {
    fn fetch_series(&self, query: &SeriesQuery<'_>) -> Result<TimeSeries, EvalError> {
        let url = self.object_url(query)?;
        logging::debug(Component::Storage, Some(query.site_id), &format!("GET {}", url));

        let result = fetch_csv(&self.client, &url, query);
        if let Err(e) = &result {
            logging::log_storage_failure(query.site_id, &format!("fetch {}", query.describe()), e);
        }
        result
    }
}

fn fetch_csv(
    client: &reqwest::blocking::Client,
    url: &str,
    query: &SeriesQuery<'_>,
) -> Result<TimeSeries, EvalError> {
    let response = client
        .get(url)
        .header("Accept", "text/csv")
        .send()
        .map_err(|e| EvalError::Storage(format!("request failed: {}", e)))?;

    let status = response.status();
    // Anonymous reads of a missing key come back as 403, not 404.
    if status == StatusCode::NOT_FOUND || status == StatusCode::FORBIDDEN {
        return Err(EvalError::NotFound {
            kind: query.kind,
            key: query.describe(),
        });
    }
    if !status.is_success() {
        return Err(EvalError::Storage(format!("HTTP error: {}", status.as_u16())));
    }

    let body = response
        .text()
        .map_err(|e| EvalError::Storage(format!("failed to read body: {}", e)))?;

    let column = catalog::value_column(query.kind, query.model_id);
    parse_series_csv(&body, query.kind, &column)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_key() {
        let query = SeriesQuery::observed("10171000", Some("UT"));
        assert_eq!(
            object_key(&query).unwrap(),
            "NWIS/NWIS_sites_UT.h5/NWIS_10171000.csv"
        );
    }

    #[test]
    fn test_modeled_key_uses_segment() {
        let query = SeriesQuery::modeled("10171000", Some("10375648"), Some("UT"), "NWM_v2.1");
        assert_eq!(
            object_key(&query).unwrap(),
            "NWM_v2.1/NHD_segments_UT.h5/NWM_v2.1_10375648.csv"
        );
    }

    #[test]
    fn test_modeled_key_without_segment_uses_site() {
        let query = SeriesQuery::modeled("10171000", None, Some("UT"), "LSTM");
        assert_eq!(
            object_key(&query).unwrap(),
            "LSTM/NHD_segments_UT.h5/LSTM_10171000.csv"
        );
    }

    #[test]
    fn test_missing_state_is_reported() {
        let query = SeriesQuery::observed("10171000", None);
        assert_eq!(object_key(&query), Err(EvalError::MissingParameter("state_code")));
        let blank = SeriesQuery::observed("10171000", Some("  "));
        assert_eq!(object_key(&blank), Err(EvalError::MissingParameter("state_code")));
    }

    #[test]
    fn test_object_url_trims_trailing_slash() {
        let source = BucketSource::with_client(
            reqwest::blocking::Client::new(),
            "https://streamflow-app-data.s3.amazonaws.com/",
        );
        let url = source
            .object_url(&SeriesQuery::observed("10171000", Some("UT")))
            .unwrap();
        assert_eq!(
            url,
            "https://streamflow-app-data.s3.amazonaws.com/NWIS/NWIS_sites_UT.h5/NWIS_10171000.csv"
        );
    }
}
