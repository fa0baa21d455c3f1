// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Loading and saving conversation files.
//!
//! The async variants run the blocking work on tokio's blocking pool.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::format::dlg::{read_dialog, write_dialog, BuildReport, DlgError};
use crate::model::Dialog;
use crate::store::{write_atomic, WriteDurability};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path:?}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: DlgError,
    },
    #[error("background task failed: {0}")]
    Task(String),
}

/// Reads and builds the dialog stored at `path`.
///
/// Pointers with unresolvable indices are dropped and listed in the report.
pub fn load_dialog(path: impl AsRef<Path>) -> Result<BuildReport, IoError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let report = read_dialog(&bytes).map_err(|source| IoError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        bytes = bytes.len(),
        entries = report.dialog.entries().len(),
        replies = report.dialog.replies().len(),
        dangling = report.dangling.len(),
        "loaded dialog"
    );
    Ok(report)
}

/// Encodes `dialog` and atomically replaces `path` with it.
///
/// Nothing is written when the dialog fails validation.
pub fn save_dialog(
    path: impl AsRef<Path>,
    dialog: &Dialog,
    durability: WriteDurability,
) -> Result<(), IoError> {
    let path = path.as_ref();
    let bytes = write_dialog(dialog).map_err(|source| IoError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &bytes, durability).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved dialog");
    Ok(())
}

pub async fn load_dialog_async(path: PathBuf) -> Result<BuildReport, IoError> {
    tokio::task::spawn_blocking(move || load_dialog(&path))
        .await
        .map_err(|err| IoError::Task(err.to_string()))?
}

/// Saves a snapshot of the dialog on the blocking pool.
///
/// Callers keep editing their own copy; pass a clone taken at save time.
pub async fn save_dialog_async(
    path: PathBuf,
    snapshot: Dialog,
    durability: WriteDurability,
) -> Result<(), IoError> {
    tokio::task::spawn_blocking(move || save_dialog(&path, &snapshot, durability))
        .await
        .map_err(|err| IoError::Task(err.to_string()))?
}
