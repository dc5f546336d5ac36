//! Training dataset ingestion
//!
//! Reads and writes the yield CSV layout:
//! `Nitrogen,Phosphorus,Potassium,Soil_pH,Rainfall,Sunlight,Yield`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::types::NUM_FEATURES;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed dataset row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("Row {row} has a non-finite value in column {column}")]
    NonFinite { row: usize, column: &'static str },

    #[error("Dataset {0} contains no rows")]
    Empty(PathBuf),

    #[error("Failed to write dataset: {0}")]
    Write(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One labelled observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldRecord {
    #[serde(rename = "Nitrogen")]
    pub nitrogen: f64,
    #[serde(rename = "Phosphorus")]
    pub phosphorus: f64,
    #[serde(rename = "Potassium")]
    pub potassium: f64,
    #[serde(rename = "Soil_pH")]
    pub soil_ph: f64,
    #[serde(rename = "Rainfall")]
    pub rainfall: f64,
    #[serde(rename = "Sunlight")]
    pub sunlight: f64,
    /// Observed yield (t/ha)
    #[serde(rename = "Yield")]
    pub yield_t_ha: f64,
}

impl YieldRecord {
    /// Features in `FEATURE_NAMES` order.
    pub const fn features(&self) -> [f64; NUM_FEATURES] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.soil_ph,
            self.rainfall,
            self.sunlight,
        ]
    }

    fn first_non_finite(&self) -> Option<&'static str> {
        let columns = [
            ("Nitrogen", self.nitrogen),
            ("Phosphorus", self.phosphorus),
            ("Potassium", self.potassium),
            ("Soil_pH", self.soil_ph),
            ("Rainfall", self.rainfall),
            ("Sunlight", self.sunlight),
            ("Yield", self.yield_t_ha),
        ];
        columns
            .into_iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(name, _)| name)
    }
}

/// Load every row of a yield CSV. Row numbers in errors are 1-based data rows.
pub fn load_dataset(path: &Path) -> Result<Vec<YieldRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<YieldRecord>().enumerate() {
        let row_no = i + 1;
        let record = row.map_err(|source| DatasetError::Row {
            row: row_no,
            source,
        })?;
        if let Some(column) = record.first_non_finite() {
            return Err(DatasetError::NonFinite {
                row: row_no,
                column,
            });
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(DatasetError::Empty(path.to_path_buf()));
    }

    info!(path = %path.display(), rows = records.len(), "Loaded yield dataset");
    Ok(records)
}

/// Write records with a header row, overwriting `path`.
pub fn write_dataset(path: &Path, records: &[YieldRecord]) -> Result<(), DatasetError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = records.len(), "Wrote yield dataset");
    Ok(())
}
