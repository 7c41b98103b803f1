//! Blob storage boundary. Uploads live in an external object store; this
//! pipeline only ever fetches a whole object once per request. No retries,
//! no streaming — a failure here is caught by the analysis layer and turns
//! into fallback output.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

pub trait BlobStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>>;
}

/// Directory-backed store: keys are file names under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryStore { root: root.into() }
    }
}

impl BlobStore for DirectoryStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.root.join(key);
        fs::read(&path).with_context(|| format!("Fetching blob {path:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_store_reads_files_under_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("data.csv"), b"a,b\n1,2\n").expect("write blob");
        let store = DirectoryStore::new(dir.path());
        assert_eq!(store.fetch("data.csv").expect("fetch"), b"a,b\n1,2\n");
        assert!(store.fetch("missing.csv").is_err());
    }
}
