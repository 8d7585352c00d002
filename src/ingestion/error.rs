//! Typed failures raised by the ingestion stages

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("input file not found at {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("CSV is missing required column `{column}`")]
    MissingColumn { column: &'static str },

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("synthetic income for {year} is not positive")]
    NonPositiveIncome { year: i32 },
}
