/// Command-line entry point.
///
/// Usage:
///   streamflow_eval [--db] key=value ...
///
/// Example:
///   streamflow_eval id=10171000 NHD_id=10375648 state=UT model_id=NWM_v3.0 \
///       start-date=01-01-2019 end-date=06-11-2019
///
/// Prints the plot JSON on stdout. Logs go to stderr.

use std::process::ExitCode;

use streamflow_eval::config::EvalConfig;
use streamflow_eval::evaluate::{Evaluator, FallbackPolicy};
use streamflow_eval::ingest::SeriesSource;
use streamflow_eval::ingest::db::DbSource;
use streamflow_eval::ingest::s3::BucketSource;
use streamflow_eval::logging::{self, Component};
use streamflow_eval::model::{EvalError, EvaluationRequest};

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = match EvalConfig::load_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let use_db = args.iter().any(|a| a == "--db");
    let params = args
        .iter()
        .filter_map(|a| a.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()));

    let request = match EvaluationRequest::from_params(params) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: streamflow_eval [--db] id=<site> [NHD_id=<segment>] state=<XX> [model_id=<model>] [start-date=<mm-dd-yyyy>] [end-date=<mm-dd-yyyy>]");
            return ExitCode::FAILURE;
        }
    };

    let source: Box<dyn SeriesSource> = match open_source(&config, use_db) {
        Ok(source) => source,
        Err(e) => {
            logging::error(Component::System, None, &e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let evaluator = Evaluator::new(&*source, FallbackPolicy::from_config(&config.fallback));

    match evaluator.evaluate(&request) {
        Ok(evaluation) => match evaluation.plot.to_json() {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                logging::error(Component::System, Some(&request.site_id), &format!("JSON encoding failed: {}", e));
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Unable to evaluate site {}: {}", request.site_id, e);
            ExitCode::FAILURE
        }
    }
}

fn open_source(config: &EvalConfig, use_db: bool) -> Result<Box<dyn SeriesSource>, EvalError> {
    if use_db {
        let url = config
            .database
            .resolved_url()
            .ok_or(EvalError::MissingParameter("database.url / DATABASE_URL"))?;
        Ok(Box::new(DbSource::connect(&url)?))
    } else {
        Ok(Box::new(BucketSource::new(
            &config.storage.base_url,
            config.storage.timeout(),
        )?))
    }
}
