// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use super::ids::{DialogId, NodeId, PointerId};
use super::link_registry::{LinkRegistry, PointerSite};
use super::node::{Node, NodeData, NodeKind};
use super::pointer::{Parent, Pointer, PointerData};
use super::resref::ResRef;

/// Conversation-wide settings stored on the root struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogMeta {
    pub delay_entry: u32,
    pub delay_reply: u32,
    /// Script run when the conversation ends normally.
    pub end_conversation: ResRef,
    /// Script run when the conversation is aborted.
    pub end_conver_abort: ResRef,
    pub prevent_zoom_in: bool,
}

impl Default for DialogMeta {
    fn default() -> Self {
        Self {
            delay_entry: 0,
            delay_reply: 0,
            end_conversation: ResRef::empty(),
            end_conver_abort: ResRef::empty(),
            prevent_zoom_in: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    #[error("node {0:?} is not part of this dialog")]
    UnknownNode(NodeId),
    #[error("pointer {0} is not part of this dialog")]
    UnknownPointer(PointerId),
}

/// Root aggregate of a conversation.
///
/// Nodes live in one generation-checked arena; `entries` and `replies` give each kind its
/// persisted order. Every structural primitive here updates the [`LinkRegistry`] in the same call.
///
/// Cloning keeps the dialog's identity: a clone is the same conversation at another point in time.
#[derive(Debug, Clone)]
pub struct Dialog {
    id: DialogId,
    meta: DialogMeta,
    nodes: SlotMap<NodeId, Node>,
    entries: Vec<NodeId>,
    replies: Vec<NodeId>,
    starts: Vec<Pointer>,
    registry: LinkRegistry,
    positions: HashMap<NodeId, u32>,
    next_pointer: u64,
    rev: u64,
}

impl Default for Dialog {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialog {
    pub fn new() -> Self {
        Self {
            id: DialogId::next(),
            meta: DialogMeta::default(),
            nodes: SlotMap::with_key(),
            entries: Vec::new(),
            replies: Vec::new(),
            starts: Vec::new(),
            registry: LinkRegistry::new(),
            positions: HashMap::new(),
            next_pointer: 1,
            rev: 0,
        }
    }

    pub fn id(&self) -> DialogId {
        self.id
    }

    pub fn meta(&self) -> &DialogMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut DialogMeta {
        &mut self.meta
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }

    pub fn entries(&self) -> &[NodeId] {
        &self.entries
    }

    pub fn replies(&self) -> &[NodeId] {
        &self.replies
    }

    pub fn collection(&self, kind: NodeKind) -> &[NodeId] {
        match kind {
            NodeKind::Entry => &self.entries,
            NodeKind::Reply => &self.replies,
        }
    }

    pub fn starts(&self) -> &[Pointer] {
        &self.starts
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node)
    }

    pub fn kind_of(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node).map(Node::kind)
    }

    /// Attribute access; attributes never affect structure so this bypasses the registry.
    pub fn node_data_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(node).map(Node::data_mut)
    }

    /// All nodes in persisted order: entries first, then replies.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.entries
            .iter()
            .chain(self.replies.iter())
            .filter_map(|id| self.nodes.get(*id).map(|node| (*id, node)))
    }

    /// Position of `node` within its kind's collection.
    pub fn position(&self, node: NodeId) -> Option<u32> {
        self.positions.get(&node).copied()
    }

    /// Rebuilds the position cache from the collections.
    pub fn recalculate_indices(&mut self) {
        self.positions.clear();
        for list in [&self.entries, &self.replies] {
            for (index, id) in list.iter().enumerate() {
                self.positions.insert(*id, index as u32);
            }
        }
    }

    pub fn link_registry(&self) -> &LinkRegistry {
        &self.registry
    }

    /// Adds an unconnected node to its kind's collection.
    ///
    /// Structural primitive for loaders and the edit layer. Editing code should go through
    /// [`crate::ops::apply_ops`], which connects the node and checks kind alternation.
    pub fn insert_node(&mut self, kind: NodeKind, data: NodeData) -> NodeId {
        let id = self.nodes.insert(Node::new(kind, data));
        let list = match kind {
            NodeKind::Entry => &mut self.entries,
            NodeKind::Reply => &mut self.replies,
        };
        list.push(id);
        self.positions.insert(id, (list.len() - 1) as u32);
        id
    }

    /// Removes a node and its outgoing pointers.
    ///
    /// Pointers elsewhere that target the node are left in place (dangling) for the cleanup pass
    /// to collect; the registry keeps describing them until then. Descendants are not touched;
    /// [`crate::ops::delete_node`] runs the full cascade and cleanup.
    pub fn remove_node(&mut self, node: NodeId) -> Option<Node> {
        let removed = self.remove_node_inner(node)?;
        self.recalculate_indices();
        Some(removed)
    }

    pub fn remove_nodes(&mut self, nodes: &HashSet<NodeId>) -> Vec<(NodeId, Node)> {
        let mut removed = Vec::with_capacity(nodes.len());
        for id in self
            .entries
            .iter()
            .chain(self.replies.iter())
            .copied()
            .filter(|id| nodes.contains(id))
            .collect::<Vec<_>>()
        {
            if let Some(node) = self.remove_node_inner(id) {
                removed.push((id, node));
            }
        }
        self.recalculate_indices();
        removed
    }

    fn remove_node_inner(&mut self, node: NodeId) -> Option<Node> {
        let removed = self.nodes.remove(node)?;
        for pointer in removed.pointers() {
            self.registry.unregister(pointer.id());
        }
        match removed.kind() {
            NodeKind::Entry => self.entries.retain(|id| *id != node),
            NodeKind::Reply => self.replies.retain(|id| *id != node),
        }
        self.positions.remove(&node);
        Some(removed)
    }

    fn alloc_pointer_id(&mut self) -> PointerId {
        let id = PointerId::from_raw(self.next_pointer);
        self.next_pointer = self.next_pointer.saturating_add(1);
        id
    }

    pub fn pointers_of(&self, parent: Parent) -> Option<&[Pointer]> {
        match parent {
            Parent::Root => Some(&self.starts),
            Parent::Node(node) => self.nodes.get(node).map(Node::pointers),
        }
    }

    fn pointer_list_mut(&mut self, parent: Parent) -> Option<&mut Vec<Pointer>> {
        match parent {
            Parent::Root => Some(&mut self.starts),
            Parent::Node(node) => self.nodes.get_mut(node).map(Node::pointers_mut),
        }
    }

    /// Attaches a pointer to `parent`, appending unless `index` is given.
    ///
    /// Only checks that both ends exist. Kind alternation and the entries-only start list are
    /// enforced by [`crate::ops::apply_ops`] and [`crate::ops::add_link`], not here; a pointer
    /// attached directly can break them and is then reported by [`crate::query::audit`].
    pub fn attach_pointer(
        &mut self,
        parent: Parent,
        index: Option<usize>,
        target: NodeId,
        is_link: bool,
        data: PointerData,
    ) -> Result<PointerId, DialogError> {
        let target_kind = self.kind_of(target).ok_or(DialogError::UnknownNode(target))?;
        if let Parent::Node(node) = parent {
            if !self.contains(node) {
                return Err(DialogError::UnknownNode(node));
            }
        }

        let id = self.alloc_pointer_id();
        let pointer = Pointer::new(id, target, target_kind, is_link, data);
        let list = self
            .pointer_list_mut(parent)
            .ok_or(DialogError::UnknownNode(target))?;
        match index {
            Some(index) if index < list.len() => list.insert(index, pointer),
            _ => list.push(pointer),
        }
        self.registry.register(PointerSite {
            pointer: id,
            parent,
            target,
            is_link,
        });
        Ok(id)
    }

    /// Parent and slot of a live pointer.
    pub fn pointer_slot(&self, pointer: PointerId) -> Option<(Parent, usize)> {
        let site = self.registry.site(pointer)?;
        let slot = self
            .pointers_of(site.parent)?
            .iter()
            .position(|candidate| candidate.id() == pointer)?;
        Some((site.parent, slot))
    }

    pub fn pointer(&self, pointer: PointerId) -> Option<&Pointer> {
        let (parent, slot) = self.pointer_slot(pointer)?;
        self.pointers_of(parent)?.get(slot)
    }

    /// Payload access for a pointer; target and link flag stay fixed.
    pub fn pointer_data_mut(&mut self, pointer: PointerId) -> Option<&mut PointerData> {
        let (parent, slot) = self.pointer_slot(pointer)?;
        self.pointer_list_mut(parent)?
            .get_mut(slot)
            .map(Pointer::data_mut)
    }

    pub fn remove_pointer(&mut self, pointer: PointerId) -> Result<(Parent, Pointer), DialogError> {
        let (parent, slot) = self
            .pointer_slot(pointer)
            .ok_or(DialogError::UnknownPointer(pointer))?;
        let list = self
            .pointer_list_mut(parent)
            .ok_or(DialogError::UnknownPointer(pointer))?;
        let removed = list.remove(slot);
        self.registry.unregister(pointer);
        Ok((parent, removed))
    }

    /// Moves a pointer to `to_index` among its siblings (clamped to the list end).
    pub fn move_pointer(&mut self, pointer: PointerId, to_index: usize) -> Result<(), DialogError> {
        let (parent, slot) = self
            .pointer_slot(pointer)
            .ok_or(DialogError::UnknownPointer(pointer))?;
        let list = self
            .pointer_list_mut(parent)
            .ok_or(DialogError::UnknownPointer(pointer))?;
        let moved = list.remove(slot);
        let to_index = to_index.min(list.len());
        list.insert(to_index, moved);
        Ok(())
    }

    /// Drops every pointer (start list included) for which `keep` returns false.
    pub fn retain_pointers(
        &mut self,
        mut keep: impl FnMut(Parent, &Pointer) -> bool,
    ) -> Vec<PointerSite> {
        let mut removed = Vec::new();

        let mut collect = |parent: Parent, list: &mut Vec<Pointer>| {
            list.retain(|pointer| {
                if keep(parent, pointer) {
                    return true;
                }
                removed.push(PointerSite {
                    pointer: pointer.id(),
                    parent,
                    target: pointer.target(),
                    is_link: pointer.is_link(),
                });
                false
            });
        };

        collect(Parent::Root, &mut self.starts);
        for (id, node) in self.nodes.iter_mut() {
            collect(Parent::Node(id), node.pointers_mut());
        }

        for site in &removed {
            self.registry.unregister(site.pointer);
        }
        removed
    }

    /// Discards the registry and re-derives it from the graph.
    pub fn rebuild_link_registry(&mut self) {
        self.registry = self.derive_registry();
    }

    fn derive_registry(&self) -> LinkRegistry {
        let mut registry = LinkRegistry::new();
        for pointer in &self.starts {
            registry.register(site_of(Parent::Root, pointer));
        }
        for (id, node) in self.nodes() {
            for pointer in node.pointers() {
                registry.register(site_of(Parent::Node(id), pointer));
            }
        }
        registry
    }

    /// True when the incrementally maintained registry agrees with a fresh derivation.
    pub fn link_registry_matches_graph(&self) -> bool {
        let fresh = self.derive_registry();
        if fresh.len() != self.registry.len() {
            return false;
        }
        let consistent = fresh
            .sites()
            .all(|site| self.registry.site(site.pointer) == Some(site));
        consistent
    }

    /// Structural equality across two dialogs: same metadata, same node attributes at the same
    /// positions, and the same pointers (compared by target position) in the same order.
    pub fn same_structure(&self, other: &Dialog) -> bool {
        if self.meta != other.meta
            || self.entries.len() != other.entries.len()
            || self.replies.len() != other.replies.len()
        {
            return false;
        }

        let pointers_match = |ours: &[Pointer], theirs: &[Pointer]| {
            ours.len() == theirs.len()
                && ours.iter().zip(theirs).all(|(a, b)| {
                    a.is_link() == b.is_link()
                        && a.target_kind() == b.target_kind()
                        && a.data() == b.data()
                        && self.position(a.target()) == other.position(b.target())
                })
        };
        if !pointers_match(&self.starts, &other.starts) {
            return false;
        }

        self.entries
            .iter()
            .zip(&other.entries)
            .chain(self.replies.iter().zip(&other.replies))
            .all(|(a, b)| match (self.node(*a), other.node(*b)) {
                (Some(ours), Some(theirs)) => {
                    ours.kind() == theirs.kind()
                        && ours.data() == theirs.data()
                        && pointers_match(ours.pointers(), theirs.pointers())
                }
                _ => false,
            })
    }

    /// Outgoing pointers of `node`; empty for unknown handles.
    pub(crate) fn outgoing(&self, node: NodeId) -> &[Pointer] {
        self.nodes.get(node).map_or(&[], Node::pointers)
    }
}

fn site_of(parent: Parent, pointer: &Pointer) -> PointerSite {
    PointerSite {
        pointer: pointer.id(),
        parent,
        target: pointer.target(),
        is_link: pointer.is_link(),
    }
}
