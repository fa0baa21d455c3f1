// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Parent-scoped subtree deletion.
//!
//! Deleting a node cascades into a non-link child only when every pointer to that child comes
//! from a node already being deleted and no link anywhere targets it. Everything else is left in
//! place, possibly as an orphan, so content referenced elsewhere is never lost.

use std::collections::HashSet;

use super::{transact, EditError};
use crate::model::{Dialog, DialogError, NodeId, Parent, PointerSite};

/// Which nodes a deletion would remove and which it would leave behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPlan {
    pub root: NodeId,
    /// Nodes to remove, `root` first, in discovery order.
    pub doomed: Vec<NodeId>,
    /// Non-link children of doomed nodes that survive because something else references them.
    pub preserved: Vec<NodeId>,
}

impl DeletionPlan {
    pub fn contains(&self, node: NodeId) -> bool {
        self.doomed.contains(&node)
    }

    pub fn doomed_set(&self) -> HashSet<NodeId> {
        self.doomed.iter().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeletionReport {
    pub deleted: Vec<NodeId>,
    pub preserved: Vec<NodeId>,
    /// Pointers dropped by the cleanup pass because their target was deleted.
    pub dangling_removed: Vec<PointerSite>,
}

/// Computes the cascade for deleting `root` without touching the dialog.
pub fn plan_deletion(dialog: &Dialog, root: NodeId) -> Result<DeletionPlan, EditError> {
    if !dialog.contains(root) {
        return Err(DialogError::UnknownNode(root).into());
    }

    let registry = dialog.link_registry();
    let mut doomed = vec![root];
    let mut doomed_set = HashSet::from([root]);

    // A child's eligibility can change once another of its parents joins the doomed set, so
    // iterate until nothing new qualifies.
    loop {
        let mut grew = false;
        for candidate in non_link_children(dialog, &doomed) {
            if doomed_set.contains(&candidate) || registry.is_link_target(candidate) {
                continue;
            }
            let owned_by_doomed = registry.incoming(candidate).all(|site| match site.parent {
                Parent::Root => false,
                Parent::Node(parent) => doomed_set.contains(&parent),
            });
            if owned_by_doomed {
                doomed_set.insert(candidate);
                doomed.push(candidate);
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }

    let preserved = non_link_children(dialog, &doomed)
        .into_iter()
        .filter(|child| !doomed_set.contains(child))
        .collect();

    Ok(DeletionPlan {
        root,
        doomed,
        preserved,
    })
}

/// Distinct non-link children of `parents`, in parent order.
fn non_link_children(dialog: &Dialog, parents: &[NodeId]) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for parent in parents {
        for pointer in dialog.outgoing(*parent) {
            if pointer.is_link() || !dialog.contains(pointer.target()) {
                continue;
            }
            if seen.insert(pointer.target()) {
                out.push(pointer.target());
            }
        }
    }
    out
}

/// Deletes `root` and its unshared descendants as one committed edit.
pub fn delete_node(dialog: &mut Dialog, root: NodeId) -> Result<DeletionReport, EditError> {
    transact(dialog, |working| delete_in_place(working, root))
}

pub(super) fn delete_in_place(
    dialog: &mut Dialog,
    root: NodeId,
) -> Result<DeletionReport, EditError> {
    let plan = plan_deletion(dialog, root)?;
    let removed = dialog.remove_nodes(&plan.doomed_set());
    let dangling_removed = cleanup_dangling(dialog);

    tracing::debug!(
        ?root,
        deleted = removed.len(),
        preserved = plan.preserved.len(),
        dangling = dangling_removed.len(),
        "deleted subtree"
    );
    Ok(DeletionReport {
        deleted: plan.doomed,
        preserved: plan.preserved,
        dangling_removed,
    })
}

/// Drops every pointer whose target no longer exists, start list included.
pub fn cleanup_dangling(dialog: &mut Dialog) -> Vec<PointerSite> {
    let live = dialog.nodes().map(|(id, _)| id).collect::<HashSet<_>>();
    let removed = dialog.retain_pointers(|_, pointer| live.contains(&pointer.target()));
    for site in &removed {
        tracing::warn!(
            pointer = %site.pointer,
            parent = ?site.parent,
            target = ?site.target,
            is_link = site.is_link,
            "removed dangling pointer"
        );
    }
    removed
}
