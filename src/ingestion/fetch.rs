//! Fetch functions - locate the raw price export

use crate::ingestion::error::IngestionError;
use crate::ingestion::types::RawData;
use std::path::Path;
use tracing::info;

/// Locate the price CSV on disk. A missing file is fatal for the whole run.
pub fn fetch_price_csv(path: &Path) -> Result<RawData, IngestionError> {
    info!("Loading data from {}", path.display());

    if !path.is_file() {
        return Err(IngestionError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(RawData::File(path.to_path_buf()))
}
