//! Ledger storage configuration module

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{string_or, EnvLookup};

/// Default folder holding one ledger file per tenant
pub const DEFAULT_DATA_DIR: &str = "guild_dbs";

/// Name of the sub-folder (inside the data dir) holding backups and staged uploads
pub const BACKUP_DIR_NAME: &str = "backups";

/// Where tenant ledgers live on disk
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Folder holding `{safe_name}_{tenant_id}.db` files
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl StorageConfig {
    /// Create a storage configuration rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load from `DATA_DIR`
    pub fn from_source(lookup: EnvLookup<'_>) -> Self {
        Self::new(string_or(lookup, "DATA_DIR", DEFAULT_DATA_DIR))
    }

    /// Root folder of per-tenant backup folders
    pub fn backup_root(&self) -> PathBuf {
        self.data_dir.join(BACKUP_DIR_NAME)
    }

    /// Data directory as a path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
