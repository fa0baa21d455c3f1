// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Colloquy: a conversation-graph engine for branching DLG dialogue files.
//!
//! Files are decoded by [`format`] into a [`model::Dialog`], edited through [`ops`],
//! [`clipboard`] and [`session`], inspected with [`query`], and written back in the layout the
//! game toolset expects. Removed subtrees are kept recoverable by the [`store`].

pub mod clipboard;
pub mod config;
pub mod format;
pub mod io;
pub mod model;
pub mod ops;
pub mod query;
pub mod session;
pub mod store;

pub use config::EngineConfig;
pub use model::{Dialog, NodeId, NodeKind, Parent};
pub use session::{EditSession, SessionError};
