// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#[derive(Debug, Serialize)]
struct ScrapFileRef<'a> {
    version: u32,
    entries: &'a [ScrapEntry],
}

/// Entries stay raw so one unreadable record does not take the rest down with it.
#[derive(Debug, Deserialize)]
struct ScrapFileJson {
    version: u32,
    #[serde(default)]
    entries: Vec<serde_json::Value>,
}

fn parse_scrap_file(path: &Path, raw: &str) -> Result<Vec<ScrapEntry>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let file: ScrapFileJson = serde_json::from_str(raw).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if file.version != SCRAP_FILE_VERSION {
        return Err(StoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: file.version,
        });
    }

    let mut entries = Vec::with_capacity(file.entries.len());
    for (index, value) in file.entries.into_iter().enumerate() {
        match serde_json::from_value::<ScrapEntry>(value) {
            Ok(entry) if entry.subtree.is_empty() => {
                tracing::warn!(path = %path.display(), index, "skipping scrap entry without nodes");
            }
            Ok(entry) => entries.push(entry),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    index,
                    error = %err,
                    "skipping unreadable scrap entry"
                );
            }
        }
    }
    Ok(entries)
}

fn render_scrap_file(path: &Path, entries: &[ScrapEntry]) -> Result<String, StoreError> {
    let file = ScrapFileRef {
        version: SCRAP_FILE_VERSION,
        entries,
    };
    let raw = serde_json::to_string_pretty(&file).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!("{raw}\n"))
}

/// Preview of the first node that holds a pointer to `node`.
fn parent_preview(dialog: &Dialog, node: NodeId, max_chars: usize) -> Option<String> {
    dialog
        .link_registry()
        .parents(node)
        .into_iter()
        .find_map(|parent| match parent {
            Parent::Root => None,
            Parent::Node(parent) => dialog.node(parent),
        })
        .map(|parent| parent.data().preview(max_chars))
}
