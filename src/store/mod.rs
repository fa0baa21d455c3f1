// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence outside the dialog file.
//!
//! The scrap store keeps deleted subtrees recoverable; every file it (and the dialog saver)
//! writes goes through the same temp-file-and-rename helper.

mod atomic;
pub mod scrap;

use serde::{Deserialize, Serialize};

pub(crate) use atomic::write_atomic;
pub use scrap::{ScrapEntry, ScrapOperation, ScrapStore, StoreError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}
