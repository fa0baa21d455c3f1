// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{write_atomic, WriteDurability};
use crate::model::{Dialog, DialogId, NodeId, NodeKind, Parent, ScrapId};
use crate::ops::{self, EditError, InsertedSubtree, RootReply, Subtree};
use crate::query::Reachability;

const SCRAP_FILE_VERSION: u32 = 1;

pub const DEFAULT_MAX_ENTRIES: usize = 100;
pub const DEFAULT_PREVIEW_CHARS: usize = 30;

/// Why a subtree ended up in the scrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapOperation {
    Delete,
    Cut,
}

impl fmt::Display for ScrapOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => f.write_str("delete"),
            Self::Cut => f.write_str("cut"),
        }
    }
}

/// One removed subtree plus enough context to show and restore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapEntry {
    pub id: ScrapId,
    pub operation: ScrapOperation,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    pub source_dialog: DialogId,
    pub kind: NodeKind,
    pub node_preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_preview: Option<String>,
    /// Distance from the nearest start at removal time; `None` when the node was an orphan.
    #[serde(default)]
    pub depth: Option<u32>,
    pub descendant_count: usize,
    pub subtree: Subtree,
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    UnsupportedVersion {
        path: PathBuf,
        version: u32,
    },
    NotFound {
        id: ScrapId,
    },
    Edit(EditError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::UnsupportedVersion { path, version } => {
                write!(f, "scrap file {path:?} has unsupported version {version}")
            }
            Self::NotFound { id } => write!(f, "no scrap entry {id}"),
            Self::Edit(source) => write!(f, "{source}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Edit(source) => Some(source),
            Self::UnsupportedVersion { .. } | Self::NotFound { .. } => None,
        }
    }
}

impl From<EditError> for StoreError {
    fn from(source: EditError) -> Self {
        Self::Edit(source)
    }
}

/// Scrap records, optionally mirrored to one JSON file.
///
/// Entries are kept oldest first. Every change rewrites the file atomically; a store without a
/// path lives in memory only.
#[derive(Debug, Clone)]
pub struct ScrapStore {
    path: Option<PathBuf>,
    durability: WriteDurability,
    max_entries: usize,
    preview_chars: usize,
    entries: Vec<ScrapEntry>,
}

impl Default for ScrapStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ScrapStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            durability: WriteDurability::default(),
            max_entries: DEFAULT_MAX_ENTRIES,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            entries: Vec::new(),
        }
    }

    /// Opens the store backed by `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => parse_scrap_file(&path, &raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::info!(path = %path.display(), entries = entries.len(), "opened scrap store");
        Ok(Self {
            path: Some(path),
            entries,
            ..Self::in_memory()
        })
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn list(&self) -> &[ScrapEntry] {
        &self.entries
    }

    /// Entries removed from `file`, newest first.
    pub fn entries_for_file<'a>(
        &'a self,
        file: &'a Path,
    ) -> impl Iterator<Item = &'a ScrapEntry> + 'a {
        self.entries
            .iter()
            .rev()
            .filter(move |entry| entry.source_file.as_deref() == Some(file))
    }

    pub fn get(&self, id: &ScrapId) -> Option<&ScrapEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Records each of `roots` with the part of its subtree that deleting it would remove.
    ///
    /// Must be called before the nodes are removed. Either every root is recorded or none is.
    pub fn add_to_scrap(
        &mut self,
        dialog: &Dialog,
        roots: &[NodeId],
        operation: ScrapOperation,
        source_file: Option<&Path>,
    ) -> Result<Vec<ScrapId>, StoreError> {
        let reachability = Reachability::compute(dialog);
        let mut captured = Vec::with_capacity(roots.len());
        for root in roots {
            captured.push(self.capture_entry(
                dialog,
                &reachability,
                *root,
                operation,
                source_file,
            )?);
        }

        let ids = captured.iter().map(|entry| entry.id.clone()).collect::<Vec<_>>();
        let previous = self.entries.clone();
        self.entries.extend(captured);
        self.enforce_retention();
        if let Err(err) = self.persist() {
            self.entries = previous;
            return Err(err);
        }
        tracing::info!(count = ids.len(), %operation, "added to scrap");
        Ok(ids)
    }

    /// Single-node form of [`ScrapStore::add_to_scrap`].
    pub fn add_node_to_scrap(
        &mut self,
        dialog: &Dialog,
        root: NodeId,
        operation: ScrapOperation,
        source_file: Option<&Path>,
    ) -> Result<ScrapId, StoreError> {
        let mut ids = self.add_to_scrap(dialog, &[root], operation, source_file)?;
        Ok(ids.remove(0))
    }

    fn capture_entry(
        &self,
        dialog: &Dialog,
        reachability: &Reachability,
        root: NodeId,
        operation: ScrapOperation,
        source_file: Option<&Path>,
    ) -> Result<ScrapEntry, StoreError> {
        let plan = ops::plan_deletion(dialog, root)?;
        // The deletion plan bounds the walk, so no depth ceiling applies to scrap records.
        let subtree = Subtree::capture_within(dialog, root, &plan.doomed_set(), usize::MAX)?;
        let node_preview = subtree.root().data.preview(self.preview_chars);
        Ok(ScrapEntry {
            id: ScrapId::generate(),
            operation,
            timestamp: Utc::now(),
            source_file: source_file.map(Path::to_path_buf),
            source_dialog: dialog.id(),
            kind: subtree.root_kind(),
            node_preview,
            parent_preview: parent_preview(dialog, root, self.preview_chars),
            depth: reachability.depth(root),
            descendant_count: subtree.descendant_count(),
            subtree,
        })
    }

    /// Drops one entry without restoring it.
    pub fn remove(&mut self, id: &ScrapId) -> Result<Option<ScrapEntry>, StoreError> {
        let Some(index) = self.entries.iter().position(|entry| &entry.id == id) else {
            return Ok(None);
        };
        let removed = self.entries.remove(index);
        self.persist()?;
        Ok(Some(removed))
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.persist()
    }

    /// Re-inserts a scrapped subtree under `parent`, then forgets the entry.
    ///
    /// The entry is kept when insertion fails. Entries can only be restored at the root when their
    /// node is an entry.
    pub fn restore_from_scrap(
        &mut self,
        dialog: &mut Dialog,
        id: &ScrapId,
        parent: Parent,
    ) -> Result<InsertedSubtree, StoreError> {
        let index = self
            .entries
            .iter()
            .position(|entry| &entry.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;

        let inserted =
            ops::insert_subtree(dialog, parent, &self.entries[index].subtree, RootReply::Reject)?;

        let restored = self.entries.remove(index);
        tracing::info!(id = %restored.id, root = ?inserted.root, ?parent, "restored from scrap");
        if let Err(err) = self.persist() {
            tracing::warn!(error = %err, id = %restored.id, "failed to persist scrap store");
        }
        Ok(inserted)
    }

    fn enforce_retention(&mut self) {
        if self.entries.len() <= self.max_entries {
            return;
        }
        let excess = self.entries.len() - self.max_entries;
        let evicted = self.entries.drain(..excess).count();
        tracing::debug!(evicted, max_entries = self.max_entries, "evicted oldest scrap entries");
    }

    /// Writes the entries to the backing file, if any.
    pub fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = render_scrap_file(path, &self.entries)?;
        write_atomic(path, raw.as_bytes(), self.durability).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })
    }
}

// On-disk document and preview helpers.
include!("scrap/helpers.rs");
