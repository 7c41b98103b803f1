//! The scalar dataset summary persisted per upload.
//!
//! Only derived metadata is ever stored; the full table is recomputed on
//! demand from the stored blob.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::decode::{FileKind, Table};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub name: String,
    #[serde(rename = "fileType")]
    pub file_type: FileKind,
    #[serde(rename = "fileSize")]
    pub file_size: u64,
    pub columns: Vec<String>,
    pub rows: usize,
    #[serde(rename = "blobKey")]
    pub blob_key: String,
}

impl DatasetSummary {
    pub fn from_table(
        name: impl Into<String>,
        file_type: FileKind,
        file_size: u64,
        blob_key: impl Into<String>,
        table: &Table,
    ) -> Self {
        DatasetSummary {
            name: name.into(),
            file_type,
            file_size,
            columns: table.columns().to_vec(),
            rows: table.row_count(),
            blob_key: blob_key.into(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating summary file {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing summary JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening summary file {path:?}"))?;
        let reader = BufReader::new(file);
        let summary = serde_json::from_reader(reader).context("Parsing summary JSON")?;
        Ok(summary)
    }
}
