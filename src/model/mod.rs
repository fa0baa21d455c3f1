// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core conversation model.
//!
//! A [`Dialog`] owns every node in one arena; pointers (including the start list) refer to nodes
//! by generation-checked [`NodeId`] handles and are indexed by the [`LinkRegistry`].

pub mod dialog;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod link_registry;
pub mod locstring;
pub mod node;
pub mod pointer;
pub mod resref;

pub use dialog::{Dialog, DialogError, DialogMeta};
pub use ids::{DialogId, Id, IdError, NodeId, PointerId, ScrapId};
pub use link_registry::{LinkRegistry, PointerSite};
pub use locstring::{LocString, DEFAULT_LANGUAGE, NO_STR_REF};
pub use node::{Node, NodeData, NodeKind, Params, DEFAULT_DELAY};
pub use pointer::{Parent, Pointer, PointerData};
pub use resref::{ResRef, ResRefError, RESREF_MAX_LEN};
