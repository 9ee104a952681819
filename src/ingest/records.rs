/// CSV record parsing for stored discharge series.
///
/// Stored objects look like
///
/// ```text
/// ,Datetime,USGS_flow
/// 0,2019-01-01,412.0
/// 1,2019-01-02,398.5
/// ```
///
/// The unnamed leading column is a leftover dataframe index and is ignored.
/// Model objects carry their value column as `{prefix}_flow` and sometimes
/// extra columns before it, so when the expected name is missing the last
/// column is used.

use crate::logging::{self, Component};
use crate::model::{EvalError, SeriesKind, TimeSeries, TimeSeriesPoint};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Name of the timestamp column in every stored series.
pub const DATETIME_COLUMN: &str = "Datetime";

/// Naive layouts accepted for the `Datetime` column, tried in order.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses a stored timestamp. Offset-bearing values are converted to UTC;
/// bare dates become midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a discharge value; empty, non-numeric, and non-finite cells are
/// treated as missing.
fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_index_column(name: &str) -> bool {
    name.is_empty() || name.starts_with("Unnamed")
}

/// Parses a stored CSV object into a series.
///
/// `value_column` names the preferred discharge column. Rows with a missing
/// value are dropped. Rows whose timestamp cannot be read are dropped too,
/// unless every data row is unreadable, which means the object itself is not
/// a discharge series.
pub fn parse_series_csv(
    body: &str,
    kind: SeriesKind,
    value_column: &str,
) -> Result<TimeSeries, EvalError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| EvalError::MalformedRecord(format!("CSV header: {}", e)))?
        .clone();

    let time_idx = headers
        .iter()
        .position(|h| h.trim() == DATETIME_COLUMN)
        .ok_or_else(|| {
            EvalError::MalformedRecord(format!("no '{}' column in {} series", DATETIME_COLUMN, kind))
        })?;

    let value_idx = headers
        .iter()
        .position(|h| h.trim() == value_column)
        .or_else(|| {
            headers
                .iter()
                .enumerate()
                .filter(|(i, h)| *i != time_idx && !is_index_column(h.trim()))
                .map(|(i, _)| i)
                .last()
        })
        .ok_or_else(|| {
            EvalError::MalformedRecord(format!("no value column in {} series", kind))
        })?;

    let mut points = Vec::new();
    let mut rows = 0usize;
    let mut bad_timestamps = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| EvalError::MalformedRecord(format!("CSV row: {}", e)))?;
        rows += 1;

        let Some(value) = record.get(value_idx).and_then(parse_value) else {
            continue;
        };
        match record.get(time_idx).and_then(parse_timestamp) {
            Some(timestamp) => points.push(TimeSeriesPoint { timestamp, value }),
            None => bad_timestamps += 1,
        }
    }

    if rows > 0 && bad_timestamps == rows {
        return Err(EvalError::MalformedRecord(format!(
            "no readable timestamps in {} rows of {} series",
            rows, kind
        )));
    }
    if bad_timestamps > 0 {
        logging::debug(
            Component::Storage,
            None,
            &format!("skipped {} {} rows with unreadable timestamps", bad_timestamps, kind),
        );
    }

    Ok(TimeSeries::new(kind, points))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(parse_timestamp("2019-01-01"), Some(ymd_hms(2019, 1, 1, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("2019-01-01 06:30:00"),
            Some(ymd_hms(2019, 1, 1, 6, 30, 0))
        );
        assert_eq!(
            parse_timestamp("2019-01-01T06:30:00"),
            Some(ymd_hms(2019, 1, 1, 6, 30, 0))
        );
        // Offsets normalise to UTC.
        assert_eq!(
            parse_timestamp("2019-01-01T06:00:00-06:00"),
            Some(ymd_hms(2019, 1, 1, 12, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2019-01-01 06:00:00+00:00"),
            Some(ymd_hms(2019, 1, 1, 6, 0, 0))
        );
        assert_eq!(parse_timestamp("not-a-date"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_observed_csv_with_index_column() {
        let body = ",Datetime,USGS_flow\n0,2019-01-01,412.0\n1,2019-01-02,398.5\n";
        let series = parse_series_csv(body, SeriesKind::Observed, "USGS_flow").expect("parses");
        assert_eq!(series.len(), 2);
        assert_eq!(series.value_at(ymd_hms(2019, 1, 2, 0, 0, 0)), Some(398.5));
    }

    #[test]
    fn test_model_csv_falls_back_to_last_column() {
        let body = "Unnamed: 0,feature_id,Datetime,NWM_v3_flow\n0,1001,2019-01-01,12.5\n";
        let series = parse_series_csv(body, SeriesKind::Modeled, "NWM_flow").expect("parses");
        assert_eq!(series.points()[0].value, 12.5);
    }

    #[test]
    fn test_named_value_column_preferred_over_last() {
        let body = ",Datetime,NWM_flow,extra\n0,2019-01-01,7.0,999.0\n";
        let series = parse_series_csv(body, SeriesKind::Modeled, "NWM_flow").expect("parses");
        assert_eq!(series.points()[0].value, 7.0);
    }

    #[test]
    fn test_missing_values_are_dropped() {
        let body = ",Datetime,USGS_flow\n0,2019-01-01,\n1,2019-01-02,NaN\n2,2019-01-03,5.0\n3,2019-01-04,ice\n";
        let series = parse_series_csv(body, SeriesKind::Observed, "USGS_flow").expect("parses");
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_duplicate_rows_keep_first() {
        let body = ",Datetime,USGS_flow\n0,2019-01-01,1.0\n1,2019-01-01,2.0\n";
        let series = parse_series_csv(body, SeriesKind::Observed, "USGS_flow").expect("parses");
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].value, 1.0);
    }

    #[test]
    fn test_header_only_is_empty_series() {
        let series = parse_series_csv(",Datetime,USGS_flow\n", SeriesKind::Observed, "USGS_flow")
            .expect("parses");
        assert!(series.is_empty());
    }

    #[test]
    fn test_missing_datetime_column_is_malformed() {
        let result = parse_series_csv("a,b\n1,2\n", SeriesKind::Observed, "USGS_flow");
        assert!(matches!(result, Err(EvalError::MalformedRecord(_))));
    }

    #[test]
    fn test_all_timestamps_unreadable_is_malformed() {
        let body = ",Datetime,USGS_flow\n0,yesterday,1.0\n1,today,2.0\n";
        let result = parse_series_csv(body, SeriesKind::Observed, "USGS_flow");
        assert!(matches!(result, Err(EvalError::MalformedRecord(_))));
    }
}
