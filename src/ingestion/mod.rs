//! Data ingestion module - functional pipeline from price CSV to price-to-income documents

pub mod config;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod types;
pub mod utils;
pub mod write;

pub use config::Config;
pub use error::IngestionError;
pub use types::*;
