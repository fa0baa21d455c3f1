// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Binary encode/decode.
//!
//! `gff` is the generic struct/field/list container; `dlg` maps conversations onto it.

pub mod dlg;
pub mod gff;
