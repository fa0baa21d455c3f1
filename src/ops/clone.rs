// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Detached deep copies of subtrees.
//!
//! A [`Subtree`] holds nodes by local index, so it can outlive the dialog it came from, be
//! serialized into the scrap store, and be instantiated any number of times. Capturing keeps a
//! clone map from source handle to local index and consults it before recursing, which makes
//! shared and cyclic subtrees terminate with their topology intact.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{transact, EditError};
use crate::model::{
    Dialog, DialogError, DialogId, NodeData, NodeId, NodeKind, Parent, PointerData, PointerId,
};

/// Recursion ceiling for captures unless configured otherwise.
pub const DEFAULT_MAX_CLONE_DEPTH: usize = 100;

/// Where a captured pointer leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtreeTarget {
    /// Index into [`Subtree::nodes`].
    Local(usize),
    /// A node of the source dialog outside the captured set.
    External(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtreePointer {
    pub target: SubtreeTarget,
    pub is_link: bool,
    pub data: PointerData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtreeNode {
    pub kind: NodeKind,
    pub data: NodeData,
    pub pointers: Vec<SubtreePointer>,
}

/// A captured subtree; `nodes[0]` is its root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtree {
    source_dialog: DialogId,
    nodes: Vec<SubtreeNode>,
}

impl Subtree {
    /// Captures `root` and every node reachable from it through non-link pointers.
    pub fn capture(dialog: &Dialog, root: NodeId, max_depth: usize) -> Result<Self, EditError> {
        Capture::new(dialog, None, max_depth).run(root)
    }

    /// Captures `root` but only descends into nodes in `scope`; non-link children outside it are
    /// recorded as external targets.
    pub fn capture_within(
        dialog: &Dialog,
        root: NodeId,
        scope: &HashSet<NodeId>,
        max_depth: usize,
    ) -> Result<Self, EditError> {
        Capture::new(dialog, Some(scope), max_depth).run(root)
    }

    pub fn source_dialog(&self) -> DialogId {
        self.source_dialog
    }

    pub fn nodes(&self) -> &[SubtreeNode] {
        &self.nodes
    }

    pub fn root(&self) -> &SubtreeNode {
        &self.nodes[0]
    }

    pub fn root_kind(&self) -> NodeKind {
        self.root().kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Captured nodes below the root.
    pub fn descendant_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn external_targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().flat_map(|node| {
            node.pointers.iter().filter_map(|pointer| match pointer.target {
                SubtreeTarget::External(id) => Some(id),
                SubtreeTarget::Local(_) => None,
            })
        })
    }
}

struct Capture<'a> {
    dialog: &'a Dialog,
    scope: Option<&'a HashSet<NodeId>>,
    max_depth: usize,
    map: HashMap<NodeId, usize>,
    nodes: Vec<SubtreeNode>,
}

impl<'a> Capture<'a> {
    fn new(dialog: &'a Dialog, scope: Option<&'a HashSet<NodeId>>, max_depth: usize) -> Self {
        Self {
            dialog,
            scope,
            max_depth,
            map: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    fn run(mut self, root: NodeId) -> Result<Subtree, EditError> {
        self.walk(root)?;

        // Links captured before their target was reached point outside; resolve them now.
        for node in &mut self.nodes {
            for pointer in &mut node.pointers {
                if let SubtreeTarget::External(id) = pointer.target {
                    if let Some(local) = self.map.get(&id) {
                        pointer.target = SubtreeTarget::Local(*local);
                    }
                }
            }
        }

        Ok(Subtree {
            source_dialog: self.dialog.id(),
            nodes: self.nodes,
        })
    }

    fn descends_into(&self, node: NodeId) -> bool {
        self.scope.map_or(true, |scope| scope.contains(&node))
    }

    /// Records `node` and returns its local index.
    fn enter(&mut self, node: NodeId) -> Result<usize, EditError> {
        let source = self.dialog.node(node).ok_or(DialogError::UnknownNode(node))?;
        let index = self.nodes.len();
        self.map.insert(node, index);
        self.nodes.push(SubtreeNode {
            kind: source.kind(),
            data: source.data().clone(),
            pointers: Vec::with_capacity(source.pointers().len()),
        });
        Ok(index)
    }

    /// Depth-first pre-order walk on an explicit stack of (source, local index, next pointer).
    fn walk(&mut self, root: NodeId) -> Result<(), EditError> {
        let dialog = self.dialog;
        let mut stack = vec![(root, self.enter(root)?, 0usize)];

        while let Some(frame) = stack.last_mut() {
            let (node, index, cursor) = *frame;
            let Some(pointer) = dialog.outgoing(node).get(cursor) else {
                stack.pop();
                continue;
            };
            frame.2 += 1;

            let target = pointer.target();
            if !dialog.contains(target) {
                tracing::warn!(pointer = %pointer.id(), ?target, "not capturing dangling pointer");
                continue;
            }
            let captured = match self.map.get(&target).copied() {
                Some(local) => SubtreeTarget::Local(local),
                None if pointer.is_link() || !self.descends_into(target) => {
                    SubtreeTarget::External(target)
                }
                None => {
                    // The stack holds one frame per level, so its length is the child's depth.
                    if stack.len() > self.max_depth {
                        return Err(EditError::MaxDepthExceeded {
                            limit: self.max_depth,
                        });
                    }
                    let child = self.enter(target)?;
                    stack.push((target, child, 0));
                    SubtreeTarget::Local(child)
                }
            };
            self.nodes[index].pointers.push(SubtreePointer {
                target: captured,
                is_link: pointer.is_link(),
                data: pointer.data().clone(),
            });
        }
        Ok(())
    }
}

/// What to do with a reply pasted or restored at the root, where only entries may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootReply {
    /// Flip the whole subtree's kinds when the reply names a speaker; reject it otherwise.
    ConvertWithSpeaker,
    Reject,
}

/// Nodes created by [`insert_subtree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedSubtree {
    pub root: NodeId,
    /// New handles, index-aligned with [`Subtree::nodes`].
    pub nodes: Vec<NodeId>,
    /// Pointer connecting `root` to its new parent.
    pub pointer: PointerId,
    /// Whether node kinds were flipped to fit under the root.
    pub converted: bool,
    /// External targets that could not be re-attached.
    pub dropped_external: Vec<NodeId>,
}

/// Instantiates `subtree` under `parent` as one committed edit.
///
/// Kinds are validated against `parent` first; nothing is inserted when they do not alternate.
/// External targets are re-attached only inside the source dialog and only while they exist.
pub fn insert_subtree(
    dialog: &mut Dialog,
    parent: Parent,
    subtree: &Subtree,
    root_reply: RootReply,
) -> Result<InsertedSubtree, EditError> {
    if subtree.is_empty() {
        return Err(EditError::EmptyClipboard);
    }
    let flip = placement(dialog, parent, subtree, root_reply)?;
    transact(dialog, |working| instantiate(working, parent, subtree, flip))
}

/// Decides whether the subtree fits under `parent` and whether its kinds must flip.
fn placement(
    dialog: &Dialog,
    parent: Parent,
    subtree: &Subtree,
    root_reply: RootReply,
) -> Result<bool, EditError> {
    let root = subtree.root();
    match parent {
        Parent::Root => match (root.kind, root_reply) {
            (NodeKind::Entry, _) => Ok(false),
            (NodeKind::Reply, RootReply::ConvertWithSpeaker) if !root.data.speaker.is_empty() => {
                Ok(true)
            }
            (NodeKind::Reply, _) => Err(EditError::TypeAlternationViolation {
                parent,
                child_kind: NodeKind::Reply,
            }),
        },
        Parent::Node(node) => {
            let parent_kind = dialog.kind_of(node).ok_or(DialogError::UnknownNode(node))?;
            if parent_kind.child_kind() == root.kind {
                Ok(false)
            } else {
                Err(EditError::TypeAlternationViolation {
                    parent,
                    child_kind: root.kind,
                })
            }
        }
    }
}

fn instantiate(
    dialog: &mut Dialog,
    parent: Parent,
    subtree: &Subtree,
    flip: bool,
) -> Result<InsertedSubtree, EditError> {
    let mut ids = Vec::with_capacity(subtree.len());
    for node in subtree.nodes() {
        let mut data = node.data.clone();
        let kind = if flip { node.kind.flipped() } else { node.kind };
        if kind == NodeKind::Reply {
            data.quest_entry = None;
        }
        ids.push(dialog.insert_node(kind, data));
    }

    let same_dialog = dialog.id() == subtree.source_dialog();
    let mut dropped_external = Vec::new();
    for (node, id) in subtree.nodes().iter().zip(&ids) {
        let Some(owner_kind) = dialog.kind_of(*id) else {
            continue;
        };
        for pointer in &node.pointers {
            let target = match pointer.target {
                SubtreeTarget::Local(local) => match ids.get(local) {
                    Some(target) => *target,
                    None => continue,
                },
                SubtreeTarget::External(target) => {
                    let usable = same_dialog
                        && dialog.kind_of(target) == Some(owner_kind.child_kind());
                    if !usable {
                        tracing::warn!(?target, "dropping pointer to a node outside the subtree");
                        dropped_external.push(target);
                        continue;
                    }
                    target
                }
            };
            dialog.attach_pointer(
                Parent::Node(*id),
                None,
                target,
                pointer.is_link,
                pointer.data.clone(),
            )?;
        }
    }

    let root = ids[0];
    let pointer = dialog.attach_pointer(parent, None, root, false, PointerData::default())?;
    dialog.recalculate_indices();

    tracing::debug!(
        ?root,
        ?parent,
        nodes = ids.len(),
        converted = flip,
        dropped = dropped_external.len(),
        "inserted subtree"
    );
    Ok(InsertedSubtree {
        root,
        nodes: ids,
        pointer,
        converted: flip,
        dropped_external,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{insert_subtree, RootReply, Subtree, SubtreeTarget, DEFAULT_MAX_CLONE_DEPTH};
    use crate::model::fixtures;
    use crate::model::{Dialog, NodeData, NodeKind, Parent};
    use crate::ops::EditError;

    #[test]
    fn cyclic_subtree_capture_terminates_and_keeps_topology() {
        let cycle = fixtures::cycle(false);
        let subtree =
            Subtree::capture(&cycle.dialog, cycle.e0, DEFAULT_MAX_CLONE_DEPTH).expect("capture");
        assert_eq!(subtree.len(), 4);
        // R1's back edge leads to the captured root, not the original.
        assert_eq!(subtree.nodes()[3].pointers[0].target, SubtreeTarget::Local(0));
    }

    #[test]
    fn links_to_nodes_captured_later_are_resolved_locally() {
        // E0 links to B before its child path A -> E1 -> B reaches it.
        let mut dialog = Dialog::new();
        let e0 = fixtures::entry(&mut dialog, "E0");
        let r_a = fixtures::reply(&mut dialog, "A");
        let e1 = fixtures::entry(&mut dialog, "E1");
        let r_b = fixtures::reply(&mut dialog, "B");
        fixtures::link(&mut dialog, e0, r_b);
        fixtures::child(&mut dialog, e0, r_a);
        fixtures::child(&mut dialog, r_a, e1);
        fixtures::child(&mut dialog, e1, r_b);

        let subtree = Subtree::capture(&dialog, e0, DEFAULT_MAX_CLONE_DEPTH).expect("capture");
        assert_eq!(subtree.len(), 4);
        assert_eq!(subtree.external_targets().count(), 0);
        assert_eq!(subtree.root().pointers[0].target, SubtreeTarget::Local(3));
        assert!(subtree.root().pointers[0].is_link);
    }

    #[test]
    fn links_out_of_the_subtree_stay_external() {
        let lp = fixtures::link_parent();
        let subtree = Subtree::capture(&lp.dialog, lp.c, DEFAULT_MAX_CLONE_DEPTH).expect("capture");
        assert_eq!(subtree.len(), 1);
        assert_eq!(subtree.external_targets().collect::<Vec<_>>(), vec![lp.b]);
    }

    #[test]
    fn scoped_capture_stops_at_scope_edge() {
        let lp = fixtures::link_parent();
        let scope = HashSet::from([lp.a, lp.x]);
        let subtree = Subtree::capture_within(&lp.dialog, lp.a, &scope, DEFAULT_MAX_CLONE_DEPTH)
            .expect("capture");
        assert_eq!(subtree.len(), 2);
        assert_eq!(subtree.external_targets().collect::<Vec<_>>(), vec![lp.b]);
        assert!(!subtree.root().pointers[0].is_link);
    }

    #[test]
    fn depth_ceiling_aborts_capture() {
        let (dialog, root) = fixtures::chain(12);
        assert!(Subtree::capture(&dialog, root, 11).is_ok());
        assert_eq!(
            Subtree::capture(&dialog, root, 10),
            Err(EditError::MaxDepthExceeded { limit: 10 })
        );
    }

    #[test]
    fn capture_of_a_very_deep_chain_does_not_recurse() {
        let (dialog, root) = fixtures::chain(20_000);
        let subtree = Subtree::capture(&dialog, root, usize::MAX).expect("capture");
        assert_eq!(subtree.len(), 20_000);
        assert_eq!(subtree.nodes()[19_998].pointers[0].target, SubtreeTarget::Local(19_999));
    }

    #[test]
    fn insert_rejects_same_kind_parent_without_mutation() {
        let mut linear = fixtures::linear();
        let subtree =
            Subtree::capture(&linear.dialog, linear.r0, DEFAULT_MAX_CLONE_DEPTH).expect("capture");
        let before = linear.dialog.clone();
        let err = insert_subtree(
            &mut linear.dialog,
            Parent::Node(linear.r0),
            &subtree,
            RootReply::Reject,
        )
        .expect_err("reply under reply");
        assert!(matches!(err, EditError::TypeAlternationViolation { .. }));
        assert!(before.same_structure(&linear.dialog));
        assert_eq!(before.rev(), linear.dialog.rev());
    }

    #[test]
    fn root_reply_converts_only_with_speaker() {
        let mut dialog = Dialog::new();
        let mut data = NodeData::with_text("Player line");
        data.speaker = "henchman".to_owned();
        let reply = dialog.insert_node(NodeKind::Reply, data);
        let entry = fixtures::entry(&mut dialog, "Below");
        fixtures::child(&mut dialog, reply, entry);
        let subtree = Subtree::capture(&dialog, reply, DEFAULT_MAX_CLONE_DEPTH).expect("capture");

        let inserted = insert_subtree(
            &mut dialog,
            Parent::Root,
            &subtree,
            RootReply::ConvertWithSpeaker,
        )
        .expect("converted");
        assert!(inserted.converted);
        assert_eq!(dialog.kind_of(inserted.root), Some(NodeKind::Entry));
        assert_eq!(dialog.kind_of(inserted.nodes[1]), Some(NodeKind::Reply));

        let silent = dialog.insert_node(NodeKind::Reply, NodeData::with_text("No speaker"));
        let subtree = Subtree::capture(&dialog, silent, DEFAULT_MAX_CLONE_DEPTH).expect("capture");
        assert!(matches!(
            insert_subtree(&mut dialog, Parent::Root, &subtree, RootReply::ConvertWithSpeaker),
            Err(EditError::TypeAlternationViolation { .. })
        ));
        assert!(dialog.link_registry_matches_graph());
    }

    #[test]
    fn external_links_are_dropped_in_other_dialogs() {
        let lp = fixtures::link_parent();
        let subtree = Subtree::capture(&lp.dialog, lp.c, DEFAULT_MAX_CLONE_DEPTH).expect("capture");

        let mut same = lp.dialog.clone();
        let kept = insert_subtree(&mut same, Parent::Root, &subtree, RootReply::Reject)
            .expect("insert");
        assert!(kept.dropped_external.is_empty());
        assert_eq!(same.link_registry().incoming_links(lp.b).count(), 2);

        let mut other = Dialog::new();
        let dropped =
            insert_subtree(&mut other, Parent::Root, &subtree, RootReply::Reject).expect("insert");
        assert_eq!(dropped.dropped_external, vec![lp.b]);
        assert!(other.node(dropped.root).expect("root").pointers().is_empty());
    }
}
