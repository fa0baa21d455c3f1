// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Copy, cut and paste of conversation subtrees.
//!
//! The clipboard keeps a detached [`Subtree`] snapshot taken at copy time, so pasting a duplicate
//! works even after the original was edited or deleted. Pasting as a link instead points at the
//! original node and therefore requires it to still live in the destination dialog.

use crate::model::{Dialog, DialogError, DialogId, NodeId, Parent, PointerId};
use crate::ops::{self, EditError, InsertedSubtree, RootReply, Subtree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardContent {
    original_ref: NodeId,
    cloned_subtree: Subtree,
    was_cut: bool,
    source_dialog: DialogId,
}

impl ClipboardContent {
    pub fn original_ref(&self) -> NodeId {
        self.original_ref
    }

    pub fn cloned_subtree(&self) -> &Subtree {
        &self.cloned_subtree
    }

    pub fn was_cut(&self) -> bool {
        self.was_cut
    }

    pub fn source_dialog(&self) -> DialogId {
        self.source_dialog
    }
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: Option<ClipboardContent>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn content(&self) -> Option<&ClipboardContent> {
        self.content.as_ref()
    }

    pub fn clear(&mut self) {
        self.content = None;
    }

    /// Snapshots `node` and its non-link descendants. The previous content is kept on failure.
    pub fn copy(
        &mut self,
        dialog: &Dialog,
        node: NodeId,
        max_depth: usize,
    ) -> Result<(), EditError> {
        self.capture(dialog, node, max_depth, false)
    }

    /// Like [`Clipboard::copy`], but marks the content as cut.
    ///
    /// Removing the original is up to the caller; until then it still exists, yet linking to it
    /// is refused.
    pub fn cut(
        &mut self,
        dialog: &Dialog,
        node: NodeId,
        max_depth: usize,
    ) -> Result<(), EditError> {
        self.capture(dialog, node, max_depth, true)
    }

    fn capture(
        &mut self,
        dialog: &Dialog,
        node: NodeId,
        max_depth: usize,
        was_cut: bool,
    ) -> Result<(), EditError> {
        let cloned_subtree = Subtree::capture(dialog, node, max_depth)?;
        tracing::debug!(
            ?node,
            nodes = cloned_subtree.len(),
            was_cut,
            "captured clipboard subtree"
        );
        self.content = Some(ClipboardContent {
            original_ref: node,
            cloned_subtree,
            was_cut,
            source_dialog: dialog.id(),
        });
        Ok(())
    }

    /// Inserts a fresh copy of the snapshot under `parent`.
    ///
    /// Every call creates new nodes; the snapshot itself is never inserted.
    pub fn paste_as_duplicate(
        &self,
        dialog: &mut Dialog,
        parent: Parent,
    ) -> Result<InsertedSubtree, EditError> {
        let content = self.content.as_ref().ok_or(EditError::EmptyClipboard)?;
        ops::insert_subtree(
            dialog,
            parent,
            &content.cloned_subtree,
            RootReply::ConvertWithSpeaker,
        )
    }

    /// Adds a link pointer from `parent` to the original node.
    pub fn paste_as_link(
        &self,
        dialog: &mut Dialog,
        parent: NodeId,
    ) -> Result<PointerId, EditError> {
        let content = self.content.as_ref().ok_or(EditError::EmptyClipboard)?;
        if content.was_cut {
            return Err(EditError::SourceWasCut);
        }
        if content.source_dialog != dialog.id() {
            return Err(EditError::CrossDialogLink {
                source_dialog: content.source_dialog,
                destination: dialog.id(),
            });
        }
        if !dialog.contains(content.original_ref) {
            return Err(DialogError::UnknownNode(content.original_ref).into());
        }
        ops::add_link(dialog, parent, content.original_ref)
    }
}
