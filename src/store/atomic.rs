// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use super::WriteDurability;

/// Replaces `path` with `contents` via a sibling temp file, so readers never see a torn file.
///
/// Symlinked destinations are refused.
pub(crate) fn write_atomic(
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(io::Error::other("refusing to overwrite a symlink"));
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => return Err(io::Error::other("path has no parent")),
    };
    let Some(file_name) = path.file_name() else {
        return Err(io::Error::other("path has no file name"));
    };
    fs::create_dir_all(parent)?;

    let tmp_path = parent.join(format!(
        ".colloquy.tmp.{}.{}",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    ));

    let staged = fill_temp(&tmp_path, contents, durability)
        .and_then(|()| rename_overwrite(&tmp_path, path));
    if let Err(err) = staged {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    // The temp file is gone once renamed; a failed directory sync leaves only the new file.
    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            fs::File::open(parent)?.sync_all()?;
        }
    }

    tracing::debug!(path = %path.display(), bytes = contents.len(), ?durability, "wrote file");
    Ok(())
}

fn fill_temp(tmp_path: &Path, contents: &[u8], durability: WriteDurability) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp_path)?;
    file.write_all(contents)?;
    if durability == WriteDurability::Durable {
        file.sync_all()?;
    }
    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::write_atomic;
    use crate::store::WriteDurability;

    fn temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .expect("read dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(".colloquy.tmp."))
            .count()
    }

    #[test]
    fn replaces_existing_file_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.dlg");
        fs::write(&path, b"old").expect("seed");

        write_atomic(&path, b"new contents", WriteDurability::Durable).expect("write");

        assert_eq!(fs::read(&path).expect("read"), b"new contents");
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[test]
    fn failed_durable_write_removes_its_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("occupied");
        fs::create_dir(&path).expect("directory in the way");
        fs::write(path.join("inner"), b"x").expect("seed");

        assert!(write_atomic(&path, b"data", WriteDurability::Durable).is_err());
        assert_eq!(temp_files(dir.path()), 0);
        assert!(path.is_dir());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("scrap.json");
        write_atomic(&path, b"{}", WriteDurability::BestEffort).expect("write");
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn refuses_symlink_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let real = dir.path().join("real");
        fs::write(&real, b"keep").expect("seed");
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).expect("symlink");

        assert!(write_atomic(&link, b"clobber", WriteDurability::BestEffort).is_err());
        assert_eq!(fs::read(&real).expect("read"), b"keep");
    }
}
