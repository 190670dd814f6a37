//! JSON-file margin settings store

use crate::write_atomic;
use inkmargin_core::{EngineError, EngineResult, MarginSettings, MarginSettingsStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MARGINS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MarginsEnvelope {
    version: u32,
    pages: Vec<MarginSettings>,
}

/// One JSON file per page set under a directory
#[derive(Debug, Clone)]
pub struct JsonMarginStore {
    dir: PathBuf,
}

impl JsonMarginStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, page_set_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_page_set_id(page_set_id)))
    }
}

impl MarginSettingsStore for JsonMarginStore {
    fn load(&self, page_set_id: &str) -> EngineResult<Option<Vec<MarginSettings>>> {
        let path = self.path_for(page_set_id);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|err| store_error(&path, err))?;
        let envelope: MarginsEnvelope =
            serde_json::from_slice(&bytes).map_err(|err| store_error(&path, err))?;
        Ok(Some(envelope.pages))
    }

    fn save(&self, page_set_id: &str, settings: &[MarginSettings]) -> EngineResult<()> {
        let path = self.path_for(page_set_id);
        fs::create_dir_all(&self.dir).map_err(|err| store_error(&self.dir, err))?;

        let envelope =
            MarginsEnvelope { version: MARGINS_SCHEMA_VERSION, pages: settings.to_vec() };
        let bytes = serde_json::to_vec_pretty(&envelope).map_err(|err| store_error(&path, err))?;
        write_atomic(&path, &bytes).map_err(|err| store_error(&path, err))
    }
}

/// File-name-safe form of a page set id: anything other than ASCII
/// alphanumerics, `-`, `_` and `.` becomes `_`
pub fn sanitize_page_set_id(page_set_id: &str) -> String {
    let sanitized: String = page_set_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        format!("_{sanitized}")
    } else {
        sanitized
    }
}

fn store_error(path: &Path, err: impl std::fmt::Display) -> EngineError {
    EngineError::MarginStore(format!("{}: {err}", path.display()))
}
