// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Engine settings.
//!
//! Every field has a default, so an empty JSON object is a complete configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ops::DEFAULT_MAX_CLONE_DEPTH;
use crate::store::scrap::{DEFAULT_MAX_ENTRIES, DEFAULT_PREVIEW_CHARS};
use crate::store::{ScrapStore, StoreError, WriteDurability};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Deepest subtree a copy or cut may descend into. Scrap records are not limited.
    pub max_clone_depth: usize,
    pub write_durability: WriteDurability,
    pub scrap: ScrapConfig,
    /// Characters kept in node and parent previews of scrap entries.
    pub preview_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_clone_depth: DEFAULT_MAX_CLONE_DEPTH,
            write_durability: WriteDurability::default(),
            scrap: ScrapConfig::default(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapConfig {
    /// Backing file; the store is in-memory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Oldest entries beyond this count are evicted.
    pub max_entries: usize,
}

impl Default for ScrapConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_clone_depth == 0 {
            return Err(ConfigError::Zero {
                field: "max_clone_depth",
            });
        }
        if self.scrap.max_entries == 0 {
            return Err(ConfigError::Zero {
                field: "scrap.max_entries",
            });
        }
        Ok(())
    }

    /// Opens (or creates in memory) the scrap store this configuration describes.
    pub fn open_scrap_store(&self) -> Result<ScrapStore, StoreError> {
        let store = match &self.scrap.path {
            Some(path) => ScrapStore::open(path)?,
            None => ScrapStore::in_memory(),
        };
        Ok(store
            .with_durability(self.write_durability)
            .with_max_entries(self.scrap.max_entries)
            .with_preview_chars(self.preview_chars))
    }
}
