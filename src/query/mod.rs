// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over a dialog.
//!
//! Reachability decides which nodes are orphans; the audit reports reference-integrity problems
//! without repairing them.

pub mod integrity;
pub mod reachability;

pub use integrity::{audit, IntegrityIssue};
pub use reachability::{descendants, is_orphan, orphans, reachable, Reachability};
