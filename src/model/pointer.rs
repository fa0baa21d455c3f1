// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::ids::{NodeId, PointerId};
use super::node::{NodeKind, Params};
use super::resref::ResRef;

/// Per-edge attributes that travel with a pointer when it is copied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerData {
    /// Script that decides whether the target appears. Empty when unconditional.
    pub condition: ResRef,
    pub condition_params: Params,
    /// Comment attached to the link itself. Independent of the target node's comment and only
    /// persisted for link pointers.
    pub link_comment: String,
}

/// A directed edge from a node (or the dialog's start list) to a target node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    id: PointerId,
    target: NodeId,
    target_kind: NodeKind,
    is_link: bool,
    data: PointerData,
}

impl Pointer {
    pub(crate) fn new(
        id: PointerId,
        target: NodeId,
        target_kind: NodeKind,
        is_link: bool,
        data: PointerData,
    ) -> Self {
        Self {
            id,
            target,
            target_kind,
            is_link,
            data,
        }
    }

    pub fn id(&self) -> PointerId {
        self.id
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn target_kind(&self) -> NodeKind {
        self.target_kind
    }

    pub fn is_link(&self) -> bool {
        self.is_link
    }

    pub fn data(&self) -> &PointerData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut PointerData {
        &mut self.data
    }

    pub fn condition(&self) -> Option<&ResRef> {
        self.data.condition.non_empty()
    }

    pub fn link_comment(&self) -> &str {
        &self.data.link_comment
    }
}

/// Owner of a pointer: a node's outgoing list or the dialog's start list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parent {
    Root,
    Node(NodeId),
}

impl Parent {
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Root => None,
            Self::Node(node) => Some(node),
        }
    }
}
