//! Stroke sidecar files
//!
//! Per-page stroke blobs are stored base64-encoded in a JSON file next to
//! the document. Each page decodes independently.

use crate::{write_atomic, StorageError};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const SIDECAR_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidecar {
    pub version: u32,
    pub page_count: usize,
    /// Page index -> base64 stroke blob
    #[serde(default)]
    pub pages: BTreeMap<usize, String>,
}

impl Sidecar {
    pub fn from_blobs(page_count: usize, blobs: &BTreeMap<usize, Vec<u8>>) -> Self {
        let pages = blobs
            .iter()
            .map(|(index, bytes)| (*index, general_purpose::STANDARD.encode(bytes)))
            .collect();

        Self { version: SIDECAR_VERSION, page_count, pages }
    }

    /// Raw blob for one page, `None` when the page has no strokes
    pub fn page_blob(&self, page: usize) -> Result<Option<Vec<u8>>, StorageError> {
        let Some(encoded) = self.pages.get(&page) else {
            return Ok(None);
        };
        general_purpose::STANDARD
            .decode(encoded)
            .map(Some)
            .map_err(|source| StorageError::Blob { page, source })
    }

    /// Every blob that decodes. Pages with a broken encoding are logged and
    /// left out, so the rest of the document still loads.
    pub fn blobs(&self) -> BTreeMap<usize, Vec<u8>> {
        let mut blobs = BTreeMap::new();
        for &page in self.pages.keys() {
            match self.page_blob(page) {
                Ok(Some(bytes)) => {
                    blobs.insert(page, bytes);
                }
                Ok(None) => {}
                Err(err) => log::warn!("skipping sidecar entry: {err}"),
            }
        }
        blobs
    }
}

/// Sidecar path for a document: `<document>.inkmargin.json`
pub fn sidecar_path(document: &Path) -> PathBuf {
    let mut path = document.as_os_str().to_owned();
    path.push(".inkmargin.json");
    PathBuf::from(path)
}

/// Write the sidecar for `document`, returning its path
pub fn save_sidecar(document: &Path, sidecar: &Sidecar) -> Result<PathBuf, StorageError> {
    let path = sidecar_path(document);
    let json = serde_json::to_vec_pretty(sidecar)?;
    write_atomic(&path, &json)?;

    log::debug!("wrote {} page blob(s) to {}", sidecar.pages.len(), path.display());
    Ok(path)
}

/// Sidecar for `document`, or `None` if it has none yet
pub fn load_sidecar(document: &Path) -> Result<Option<Sidecar>, StorageError> {
    let path = sidecar_path(document);
    if !path.exists() {
        return Ok(None);
    }
    read_sidecar_file(&path).map(Some)
}

/// Read a sidecar file by its own path
pub fn read_sidecar_file(path: &Path) -> Result<Sidecar, StorageError> {
    let bytes = fs::read(path)?;
    let sidecar: Sidecar = serde_json::from_slice(&bytes)?;
    if sidecar.version > SIDECAR_VERSION {
        return Err(StorageError::UnsupportedVersion(sidecar.version));
    }
    Ok(sidecar)
}

pub fn delete_sidecar(document: &Path) -> Result<(), StorageError> {
    let path = sidecar_path(document);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
