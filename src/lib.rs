pub mod analysis;
pub mod catalog;
pub mod config;
pub mod evaluate;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod plot;
