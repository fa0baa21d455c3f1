// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One open conversation with its clipboard, scrap store and settings.
//!
//! [`EditSession`] is the surface a UI talks to. Deletions and cuts are recorded in the scrap
//! store before the graph changes, so every removal stays recoverable.

use std::path::{Path, PathBuf};

use crate::clipboard::Clipboard;
use crate::config::EngineConfig;
use crate::format::dlg::DanglingIndex;
use crate::io::{self, IoError};
use crate::model::{Dialog, NodeId, Parent, PointerId, ScrapId};
use crate::ops::{self, ApplyResult, DeletionReport, EditError, InsertedSubtree, Op};
use crate::query::{self, IntegrityIssue};
use crate::store::{ScrapEntry, ScrapOperation, ScrapStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("the session has no file path; use save_as")]
    NoPath,
}

/// Outcome of a delete or cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub scrap_id: ScrapId,
    pub report: DeletionReport,
}

#[derive(Debug)]
pub struct EditSession {
    dialog: Dialog,
    path: Option<PathBuf>,
    config: EngineConfig,
    clipboard: Clipboard,
    scrap: ScrapStore,
    /// Pointers the builder dropped when the file was opened.
    load_warnings: Vec<DanglingIndex>,
}

impl EditSession {
    /// Starts an empty, unsaved conversation.
    pub fn new(config: EngineConfig) -> Result<Self, SessionError> {
        let scrap = config.open_scrap_store()?;
        Ok(Self {
            dialog: Dialog::new(),
            path: None,
            config,
            clipboard: Clipboard::new(),
            scrap,
            load_warnings: Vec::new(),
        })
    }

    pub fn open(path: impl Into<PathBuf>, config: EngineConfig) -> Result<Self, SessionError> {
        let path = path.into();
        let report = io::load_dialog(&path)?;
        let scrap = config.open_scrap_store()?;
        for dropped in &report.dangling {
            tracing::warn!(
                path = %path.display(),
                parent = ?dropped.parent,
                index = dropped.index,
                "dropped pointer with unresolved index"
            );
        }
        Ok(Self {
            dialog: report.dialog,
            path: Some(path),
            config,
            clipboard: Clipboard::new(),
            scrap,
            load_warnings: report.dangling,
        })
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn scrap(&self) -> &ScrapStore {
        &self.scrap
    }

    pub fn load_warnings(&self) -> &[DanglingIndex] {
        &self.load_warnings
    }

    /// Scrap entries that came from this session's file, newest first.
    pub fn scrap_entries(&self) -> Vec<&ScrapEntry> {
        match &self.path {
            Some(path) => self.scrap.entries_for_file(path).collect(),
            None => self.scrap.list().iter().rev().collect(),
        }
    }

    pub fn apply(&mut self, base_rev: u64, ops: &[Op]) -> Result<ApplyResult, SessionError> {
        Ok(ops::apply_ops(&mut self.dialog, base_rev, ops)?)
    }

    /// Scraps `node`, then deletes it with its unshared descendants.
    pub fn delete_node(&mut self, node: NodeId) -> Result<Removal, SessionError> {
        self.remove(node, ScrapOperation::Delete)
    }

    pub fn copy(&mut self, node: NodeId) -> Result<(), SessionError> {
        self.clipboard
            .copy(&self.dialog, node, self.config.max_clone_depth)?;
        Ok(())
    }

    /// Copies `node` to the clipboard as cut, scraps it and deletes it.
    ///
    /// The clipboard is only updated when the deletion succeeds.
    pub fn cut(&mut self, node: NodeId) -> Result<Removal, SessionError> {
        let mut clipboard = self.clipboard.clone();
        clipboard.cut(&self.dialog, node, self.config.max_clone_depth)?;
        let removal = self.remove(node, ScrapOperation::Cut)?;
        self.clipboard = clipboard;
        Ok(removal)
    }

    fn remove(
        &mut self,
        node: NodeId,
        operation: ScrapOperation,
    ) -> Result<Removal, SessionError> {
        let scrap_id =
            self.scrap
                .add_node_to_scrap(&self.dialog, node, operation, self.path.as_deref())?;
        let report = match ops::delete_node(&mut self.dialog, node) {
            Ok(report) => report,
            Err(err) => {
                self.scrap.remove(&scrap_id)?;
                return Err(err.into());
            }
        };
        Ok(Removal { scrap_id, report })
    }

    pub fn paste_as_duplicate(&mut self, parent: Parent) -> Result<InsertedSubtree, SessionError> {
        Ok(self.clipboard.paste_as_duplicate(&mut self.dialog, parent)?)
    }

    pub fn paste_as_link(&mut self, parent: NodeId) -> Result<PointerId, SessionError> {
        Ok(self.clipboard.paste_as_link(&mut self.dialog, parent)?)
    }

    pub fn restore_from_scrap(
        &mut self,
        id: &ScrapId,
        parent: Parent,
    ) -> Result<InsertedSubtree, SessionError> {
        Ok(self.scrap.restore_from_scrap(&mut self.dialog, id, parent)?)
    }

    pub fn is_orphan(&self, node: NodeId) -> bool {
        query::is_orphan(&self.dialog, node)
    }

    pub fn orphans(&self) -> Vec<NodeId> {
        query::orphans(&self.dialog)
    }

    pub fn audit(&self) -> Vec<IntegrityIssue> {
        query::audit(&self.dialog)
    }

    pub fn save(&self) -> Result<(), SessionError> {
        let path = self.path.as_deref().ok_or(SessionError::NoPath)?;
        io::save_dialog(path, &self.dialog, self.config.write_durability)?;
        Ok(())
    }

    /// Saves to `path` and makes it the session's file.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        let path = path.into();
        io::save_dialog(&path, &self.dialog, self.config.write_durability)?;
        self.path = Some(path);
        Ok(())
    }
}
