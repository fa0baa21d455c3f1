// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use smallvec::SmallVec;

use super::ids::{NodeId, PointerId};
use super::pointer::Parent;

/// Where a pointer lives and what it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerSite {
    pub pointer: PointerId,
    pub parent: Parent,
    pub target: NodeId,
    pub is_link: bool,
}

/// Derived index from node identity to every pointer targeting it.
///
/// The dialog keeps this in step with each structural change; it is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRegistry {
    incoming: HashMap<NodeId, SmallVec<[PointerId; 2]>>,
    sites: HashMap<PointerId, PointerSite>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, site: PointerSite) {
        if let Some(previous) = self.sites.insert(site.pointer, site) {
            self.detach(previous.target, previous.pointer);
        }
        self.incoming
            .entry(site.target)
            .or_default()
            .push(site.pointer);
    }

    pub(crate) fn unregister(&mut self, pointer: PointerId) -> Option<PointerSite> {
        let site = self.sites.remove(&pointer)?;
        self.detach(site.target, pointer);
        Some(site)
    }

    pub(crate) fn clear(&mut self) {
        self.incoming.clear();
        self.sites.clear();
    }

    fn detach(&mut self, target: NodeId, pointer: PointerId) {
        if let Some(list) = self.incoming.get_mut(&target) {
            list.retain(|candidate| *candidate != pointer);
            if list.is_empty() {
                self.incoming.remove(&target);
            }
        }
    }

    pub fn site(&self, pointer: PointerId) -> Option<&PointerSite> {
        self.sites.get(&pointer)
    }

    /// Every pointer targeting `node`, in registration order.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &PointerSite> + '_ {
        self.incoming
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|pointer| self.sites.get(pointer))
    }

    pub fn incoming_count(&self, node: NodeId) -> usize {
        self.incoming.get(&node).map_or(0, SmallVec::len)
    }

    pub fn incoming_links(&self, node: NodeId) -> impl Iterator<Item = &PointerSite> + '_ {
        self.incoming(node).filter(|site| site.is_link)
    }

    pub fn is_link_target(&self, node: NodeId) -> bool {
        self.incoming_links(node).next().is_some()
    }

    /// Distinct owners of pointers targeting `node`.
    pub fn parents(&self, node: NodeId) -> SmallVec<[Parent; 4]> {
        let mut parents = SmallVec::<[Parent; 4]>::new();
        for site in self.incoming(node) {
            if !parents.contains(&site.parent) {
                parents.push(site.parent);
            }
        }
        parents
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn sites(&self) -> impl Iterator<Item = &PointerSite> + '_ {
        self.sites.values()
    }
}
