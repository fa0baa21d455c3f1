// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{Dialog, NodeId};

/// Nodes reachable from the start list through non-link pointers, with their depth.
///
/// Depth 0 is a start target. Link pointers are never followed: a node only referenced by links
/// is an orphan.
#[derive(Debug, Clone, Default)]
pub struct Reachability {
    depth: HashMap<NodeId, u32>,
}

impl Reachability {
    pub fn compute(dialog: &Dialog) -> Self {
        let mut depth: HashMap<NodeId, u32> = HashMap::with_capacity(dialog.node_count());
        let mut queue = VecDeque::new();

        for start in dialog.starts() {
            if dialog.contains(start.target()) && !depth.contains_key(&start.target()) {
                depth.insert(start.target(), 0);
                queue.push_back(start.target());
            }
        }

        while let Some(node) = queue.pop_front() {
            let next = depth.get(&node).copied().unwrap_or(0).saturating_add(1);
            for pointer in dialog.outgoing(node) {
                if pointer.is_link() || !dialog.contains(pointer.target()) {
                    continue;
                }
                if depth.contains_key(&pointer.target()) {
                    continue;
                }
                depth.insert(pointer.target(), next);
                queue.push_back(pointer.target());
            }
        }

        Self { depth }
    }

    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.depth.contains_key(&node)
    }

    /// Shortest non-link distance from a start target.
    pub fn depth(&self, node: NodeId) -> Option<u32> {
        self.depth.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }

    /// Nodes in `dialog` this reachability set does not cover, in persisted order.
    pub fn orphans(&self, dialog: &Dialog) -> Vec<NodeId> {
        dialog
            .nodes()
            .map(|(id, _)| id)
            .filter(|id| !self.is_reachable(*id))
            .collect()
    }
}

pub fn reachable(dialog: &Dialog) -> HashSet<NodeId> {
    Reachability::compute(dialog).depth.into_keys().collect()
}

/// True when `node` exists but no start reaches it through non-link pointers.
pub fn is_orphan(dialog: &Dialog, node: NodeId) -> bool {
    dialog.contains(node) && !Reachability::compute(dialog).is_reachable(node)
}

pub fn orphans(dialog: &Dialog) -> Vec<NodeId> {
    Reachability::compute(dialog).orphans(dialog)
}

/// Non-link descendants of `root` (excluding `root` unless it lies on a cycle), breadth first.
pub fn descendants(dialog: &Dialog, root: NodeId) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        for pointer in dialog.outgoing(node) {
            if pointer.is_link() || !dialog.contains(pointer.target()) {
                continue;
            }
            if seen.insert(pointer.target()) {
                out.push(pointer.target());
                queue.push_back(pointer.target());
            }
        }
    }
    out
}
