/// PostgreSQL series source
///
/// Reads discharge series from a curated table instead of the public
/// bucket, for deployments that mirror the bucket into a database.
///
/// Expected table:
///
/// ```sql
/// CREATE TABLE streamflow.discharge (
///     id               BIGSERIAL PRIMARY KEY,
///     kind             TEXT NOT NULL,          -- 'observed' | 'modeled'
///     site_id          TEXT NOT NULL,          -- USGS site, or NHD segment for modeled rows
///     model_id         TEXT,                   -- NULL for observed rows
///     measurement_time TIMESTAMPTZ NOT NULL,
///     value_cfs        DOUBLE PRECISION
/// );
/// ```
///
/// Rows are read in insertion order (`id`) so duplicate timestamps resolve
/// to the first row loaded, the same as the CSV objects.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use postgres::{Client, NoTls};

use crate::ingest::{SeriesQuery, SeriesSource};
use crate::logging::{self, Component};
use crate::model::{EvalError, SeriesKind, TimeSeries, TimeSeriesPoint};

const OBSERVED_QUERY: &str = "
    SELECT measurement_time, value_cfs
    FROM streamflow.discharge
    WHERE kind = 'observed'
      AND site_id = $1
    ORDER BY id
";

const MODELED_QUERY: &str = "
    SELECT measurement_time, value_cfs
    FROM streamflow.discharge
    WHERE kind = 'modeled'
      AND site_id = $1
      AND model_id = $2
    ORDER BY id
";

/// `SeriesSource` over a PostgreSQL connection.
pub struct DbSource {
    client: Mutex<Client>,
}

impl DbSource {
    /// Connects without TLS, as the service does for its local database.
    pub fn connect(database_url: &str) -> Result<Self, EvalError> {
        let client = Client::connect(database_url, NoTls)
            .map_err(|e| EvalError::Storage(format!("database connect: {}", e)))?;
        logging::info(Component::Database, None, "Connected to discharge database");
        Ok(Self::new(client))
    }

    pub fn new(client: Client) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    /// Earliest and latest stored observation for a site.
    pub fn observed_range(
        &self,
        site_id: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, EvalError> {
        let mut client = self.lock()?;
        let row = client
            .query_one(
                "SELECT MIN(measurement_time), MAX(measurement_time)
                 FROM streamflow.discharge
                 WHERE kind = 'observed' AND site_id = $1",
                &[&site_id],
            )
            .map_err(db_error)?;

        let min: Option<DateTime<Utc>> = row.get(0);
        let max: Option<DateTime<Utc>> = row.get(1);

        match (min, max) {
            (Some(start), Some(end)) => Ok(Some((start, end))),
            _ => Ok(None),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Client>, EvalError> {
        self.client
            .lock()
            .map_err(|_| EvalError::Storage("database connection poisoned".to_string()))
    }
}

fn db_error(e: postgres::Error) -> EvalError {
    EvalError::Storage(format!("database: {}", e))
}

impl SeriesSource for DbSource {
    fn fetch_series(&self, query: &SeriesQuery<'_>) -> Result<TimeSeries, EvalError> {
        let mut client = self.lock()?;

        let rows = match query.kind {
            SeriesKind::Observed => client.query(OBSERVED_QUERY, &[&query.site_id]),
            SeriesKind::Modeled => {
                let model_id = query.model_id.ok_or(EvalError::MissingParameter("model_id"))?;
                let segment_id = query.segment_id.unwrap_or(query.site_id);
                client.query(MODELED_QUERY, &[&segment_id, &model_id])
            }
        }
        .map_err(|e| {
            let err = db_error(e);
            logging::log_storage_failure(query.site_id, &format!("query {}", query.describe()), &err);
            err
        })?;

        if rows.is_empty() {
            return Err(EvalError::NotFound {
                kind: query.kind,
                key: query.describe(),
            });
        }

        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            let measured: DateTime<Utc> = row.get(0);
            let value: Option<f64> = row.get(1);
            if let Some(value) = value.filter(|v| v.is_finite()) {
                points.push(TimeSeriesPoint {
                    timestamp: measured.naive_utc(),
                    value,
                });
            }
        }

        logging::debug(
            Component::Database,
            Some(query.site_id),
            &format!("loaded {} {} rows", points.len(), query.kind),
        );

        Ok(TimeSeries::new(query.kind, points))
    }
}
