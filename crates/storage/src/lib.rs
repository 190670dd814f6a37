//! On-disk state for the annotation engine
//!
//! - `config.json` under the project data directory
//! - per-document margin settings under `margins/`
//! - `<document>.inkmargin.json` stroke sidecars next to the document

mod margins;
mod sidecar;

pub use margins::{sanitize_page_set_id, JsonMarginStore};
pub use sidecar::{
    delete_sidecar, load_sidecar, read_sidecar_file, save_sidecar, sidecar_path, Sidecar,
    SIDECAR_VERSION,
};

use directories::ProjectDirs;
use inkmargin_core::{EngineConfig, EngineError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("page {page}: stroke blob is not valid base64: {source}")]
    Blob {
        page: usize,
        #[source]
        source: base64::DecodeError,
    },
    #[error("unsupported sidecar version {0}")]
    UnsupportedVersion(u32),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigEnvelope {
    version: u32,
    config: EngineConfig,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "Inkmargin", "Inkmargin")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stored engine configuration, or defaults when none was saved
    pub fn load_engine_config(&self) -> Result<EngineConfig, StorageError> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(EngineConfig::default());
        }

        let bytes = fs::read(path)?;
        let envelope: ConfigEnvelope = serde_json::from_slice(&bytes)?;
        envelope.config.validate()?;

        Ok(envelope.config)
    }

    pub fn save_engine_config(&self, config: &EngineConfig) -> Result<(), StorageError> {
        config.validate()?;
        fs::create_dir_all(&self.root)?;

        let envelope = ConfigEnvelope { version: CONFIG_SCHEMA_VERSION, config: config.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        write_atomic(&self.config_path(), &bytes)?;
        Ok(())
    }

    /// Margin settings store rooted in this storage directory
    pub fn margin_store(&self) -> JsonMarginStore {
        JsonMarginStore::new(self.root.join("margins"))
    }

    fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }
}

/// Write through a temporary file and rename over the target
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, bytes)?;
    fs::rename(&temp, path)
}
