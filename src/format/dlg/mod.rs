// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Conversation files on top of the generic container.
//!
//! [`read_dialog`] parses bytes and materializes a [`Dialog`]; [`write_dialog`] validates a dialog
//! and lays it out in the struct order the reference toolset produces.

mod builder;
pub mod schema;
mod writer;

#[cfg(test)]
mod tests;

use crate::model::{Dialog, NodeId, NodeKind, Parent, PointerId};

use super::gff::{FieldType, GffError};

pub use builder::{build_dialog, read_dialog};
pub use writer::write_dialog;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DlgError {
    #[error(transparent)]
    Gff(#[from] GffError),
    #[error("not a conversation file (type tag {found:?})")]
    WrongFileType { found: String },
    #[error("struct {struct_index} is missing required field {label:?}")]
    MissingRequiredField {
        struct_index: u32,
        label: &'static str,
    },
    #[error("struct {struct_index} field {label:?} is {found}, expected {expected}")]
    UnexpectedFieldType {
        struct_index: u32,
        label: &'static str,
        expected: FieldType,
        found: FieldType,
    },
    #[error("pointer {pointer} from {parent:?} targets {target:?}, which is not in the dialog")]
    DanglingPointer {
        pointer: PointerId,
        parent: Parent,
        target: NodeId,
    },
    #[error("pointer {pointer} from {parent:?} links a {parent_kind} to a {target_kind}")]
    TypeAlternation {
        pointer: PointerId,
        parent: Parent,
        parent_kind: NodeKind,
        target_kind: NodeKind,
    },
    #[error("entry {node:?} uses the reserved quest entry value 0xFFFFFFFF")]
    ReservedQuestEntry { node: NodeId },
    #[error("start pointer {pointer} targets reply {target:?}; only entries can start a conversation")]
    ReplyInStarts { pointer: PointerId, target: NodeId },
}

/// Pointer whose `Index` did not resolve to a node while building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingIndex {
    /// Owner of the dropped pointer (the start list for `Parent::Root`).
    pub parent: Parent,
    pub target_kind: NodeKind,
    pub index: u32,
    pub is_link: bool,
}

/// Result of building a dialog from a container.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub dialog: Dialog,
    /// Pointers skipped because their target index was out of range.
    pub dangling: Vec<DanglingIndex>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty()
    }
}
