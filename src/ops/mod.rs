// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for dialogs.
//!
//! Operations are applied with optimistic concurrency (revision checks) against a working copy of
//! the dialog and committed only when every op succeeds, so a failed batch leaves the graph
//! untouched. Each batch produces a coarse delta the UI can use to refresh derived state.

pub mod clone;
pub mod delete;

use std::collections::HashSet;

use crate::format::dlg::schema::NO_QUEST_ENTRY;
use crate::model::{
    Dialog, DialogError, DialogId, LocString, NodeData, NodeId, NodeKind, Params, Parent,
    PointerData, PointerId, ResRef,
};

pub use clone::{insert_subtree, InsertedSubtree, RootReply, Subtree, SubtreeNode, SubtreePointer};
pub use clone::{SubtreeTarget, DEFAULT_MAX_CLONE_DEPTH};
pub use delete::{cleanup_dangling, delete_node, plan_deletion, DeletionPlan, DeletionReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Adds a node under `parent`: an entry plus start pointer at the root, otherwise a node of
    /// the kind opposite to the parent's, connected by a non-link pointer.
    AddNode {
        parent: Parent,
        data: NodeData,
    },
    UpdateNode {
        node: NodeId,
        patch: NodePatch,
    },
    UpdatePointer {
        pointer: PointerId,
        patch: PointerPatch,
    },
    /// Adds a link pointer from `parent` to an existing node.
    AddLink {
        parent: NodeId,
        target: NodeId,
    },
    /// Puts an existing entry on the start list.
    AddStart {
        target: NodeId,
    },
    /// Removes one pointer. The target is never deleted with it, so it may become an orphan.
    RemovePointer {
        pointer: PointerId,
    },
    MovePointer {
        pointer: PointerId,
        to_index: usize,
    },
    /// Deletes `node` and every descendant no one else holds on to.
    DeleteNode {
        node: NodeId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub text: Option<LocString>,
    pub speaker: Option<String>,
    pub comment: Option<String>,
    pub sound: Option<ResRef>,
    pub script: Option<ResRef>,
    pub action_params: Option<Params>,
    pub quest: Option<String>,
    /// `Some(None)` clears the journal entry.
    pub quest_entry: Option<Option<u32>>,
    pub animation: Option<u32>,
    pub anim_loop: Option<bool>,
    pub delay: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerPatch {
    pub condition: Option<ResRef>,
    pub condition_params: Option<Params>,
    /// Only accepted on link pointers.
    pub link_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// Coarse record of which nodes were added, removed or changed by a batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub updated: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<NodeId>,
    removed: HashSet<NodeId>,
    updated: HashSet<NodeId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, node: NodeId) {
        self.removed.remove(&node);
        self.updated.remove(&node);
        self.added.insert(node);
    }

    fn record_removed(&mut self, node: NodeId) {
        // Added and removed in the same batch: nothing to report.
        if self.added.remove(&node) {
            self.updated.remove(&node);
            return;
        }
        self.updated.remove(&node);
        self.removed.insert(node);
    }

    fn record_updated(&mut self, node: NodeId) {
        if self.added.contains(&node) || self.removed.contains(&node) {
            return;
        }
        self.updated.insert(node);
    }

    fn record_parent(&mut self, parent: Parent) {
        if let Parent::Node(node) = parent {
            self.record_updated(node);
        }
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();
        added.sort();
        removed.sort();
        updated.sort();
        Delta {
            added,
            removed,
            updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("stale base_rev (base_rev={base_rev}, current_rev={current_rev})")]
    Conflict { base_rev: u64, current_rev: u64 },
    #[error(transparent)]
    Graph(#[from] DialogError),
    #[error("a {child_kind} cannot be placed under {parent:?}")]
    TypeAlternationViolation { parent: Parent, child_kind: NodeKind },
    #[error("the clipboard source was cut; paste it as a duplicate instead")]
    SourceWasCut,
    #[error("cannot link across dialogs (source {source_dialog}, destination {destination})")]
    CrossDialogLink {
        source_dialog: DialogId,
        destination: DialogId,
    },
    #[error("subtree is deeper than {limit} levels")]
    MaxDepthExceeded { limit: usize },
    #[error("the clipboard is empty")]
    EmptyClipboard,
    #[error("reply {node:?} cannot carry a quest entry")]
    QuestEntryOnReply { node: Option<NodeId> },
    #[error("quest entry 0xFFFFFFFF is reserved for \"no entry\" (node {node:?})")]
    ReservedQuestEntry { node: Option<NodeId> },
    #[error("pointer {pointer} is not a link and has no link comment")]
    LinkCommentOnChild { pointer: PointerId },
}

/// Applies `ops` in order as one all-or-nothing batch.
pub fn apply_ops(dialog: &mut Dialog, base_rev: u64, ops: &[Op]) -> Result<ApplyResult, EditError> {
    let current_rev = dialog.rev();
    if base_rev != current_rev {
        return Err(EditError::Conflict {
            base_rev,
            current_rev,
        });
    }

    if ops.is_empty() {
        return Ok(ApplyResult {
            new_rev: current_rev,
            applied: 0,
            delta: Delta::default(),
        });
    }

    let mut next = dialog.clone();
    let mut delta = DeltaBuilder::default();
    for op in ops {
        apply_op(&mut next, op, &mut delta)?;
    }

    next.bump_rev();
    *dialog = next;
    tracing::debug!(rev = dialog.rev(), applied = ops.len(), "applied ops");
    Ok(ApplyResult {
        new_rev: dialog.rev(),
        applied: ops.len(),
        delta: delta.finish(),
    })
}

/// Runs `edit` against a working copy and commits it (bumping the revision) only on success.
pub(crate) fn transact<T>(
    dialog: &mut Dialog,
    edit: impl FnOnce(&mut Dialog) -> Result<T, EditError>,
) -> Result<T, EditError> {
    let mut next = dialog.clone();
    let out = edit(&mut next)?;
    next.bump_rev();
    *dialog = next;
    Ok(out)
}

/// Adds one link pointer from `parent` to `target` as a committed edit.
pub fn add_link(
    dialog: &mut Dialog,
    parent: NodeId,
    target: NodeId,
) -> Result<PointerId, EditError> {
    transact(dialog, |working| link_in_place(working, parent, target))
}

// Op-by-op implementation of `apply_ops`.
include!("ops_impl.rs");
