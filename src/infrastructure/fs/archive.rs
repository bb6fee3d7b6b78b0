// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Archive classification and unpacking for downloaded artifacts.

use crate::infrastructure::constants::{SUFFIX_TAR_GZ, SUFFIX_TGZ, SUFFIX_ZIP};
use crate::shared::error::{Result, ToolchainError};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Supported artifact formats. Anything unrecognised is a raw executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    None,
    TarGz,
    Zip,
}

impl ArchiveKind {
    /// Classify by suffix of a URL path or file name. Case-sensitive; the
    /// content is never sniffed.
    pub fn detect(path: &str) -> Self {
        if path.ends_with(SUFFIX_TAR_GZ) || path.ends_with(SUFFIX_TGZ) {
            ArchiveKind::TarGz
        } else if path.ends_with(SUFFIX_ZIP) {
            ArchiveKind::Zip
        } else {
            ArchiveKind::None
        }
    }

    /// The matched suffix, if `path` is an archive.
    pub fn suffix_of(path: &str) -> Option<&'static str> {
        [SUFFIX_TAR_GZ, SUFFIX_TGZ, SUFFIX_ZIP]
            .into_iter()
            .find(|suffix| path.ends_with(suffix))
    }

    pub fn is_archive(&self) -> bool {
        !matches!(self, ArchiveKind::None)
    }
}

/// Unpack `archive` into `dest_dir`, keeping the directory layout of the
/// archive. Entries that would land outside `dest_dir` fail the extraction.
pub fn extract(kind: ArchiveKind, archive: &Path, dest_dir: &Path) -> Result<()> {
    fs::create_dir_all(dest_dir).map_err(|e| ToolchainError::filesystem(dest_dir, e))?;
    debug!(archive = %archive.display(), dest = %dest_dir.display(), ?kind, "Extracting archive");

    match kind {
        ArchiveKind::TarGz => extract_tar_gz(archive, dest_dir),
        ArchiveKind::Zip => extract_zip(archive, dest_dir),
        ArchiveKind::None => Err(ToolchainError::Archive(format!(
            "{} is not a recognised archive",
            archive.display()
        ))),
    }
}

fn extract_tar_gz(archive: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| ToolchainError::filesystem(archive, e))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));

    let entries = tar
        .entries()
        .map_err(|e| ToolchainError::Archive(format!("Failed to read tar: {}", e)))?;
    for entry in entries {
        let mut entry = entry
            .map_err(|e| ToolchainError::Archive(format!("Failed to read tar entry: {}", e)))?;
        let entry_path = entry
            .path()
            .map(|p| p.to_path_buf())
            .map_err(|e| ToolchainError::Archive(format!("Invalid path in tar: {}", e)))?;

        let unpacked = entry.unpack_in(dest_dir).map_err(|e| {
            ToolchainError::Archive(format!(
                "Failed to unpack '{}': {}",
                entry_path.display(),
                e
            ))
        })?;
        if !unpacked {
            return Err(ToolchainError::Archive(format!(
                "Entry '{}' escapes the extraction directory",
                entry_path.display()
            )));
        }
    }
    Ok(())
}

fn extract_zip(archive: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| ToolchainError::filesystem(archive, e))?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| ToolchainError::Archive(format!("Failed to open zip: {}", e)))?;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| ToolchainError::Archive(format!("Failed to read zip entry: {}", e)))?;

        let relative = entry.enclosed_name().ok_or_else(|| {
            ToolchainError::Archive(format!(
                "Entry '{}' escapes the extraction directory",
                entry.name()
            ))
        })?;
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| ToolchainError::filesystem(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ToolchainError::filesystem(parent, e))?;
        }
        let mut out = File::create(&out_path).map_err(|e| ToolchainError::filesystem(&out_path, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| {
            ToolchainError::Archive(format!("Failed to unpack '{}': {}", entry.name(), e))
        })?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))
                .map_err(|e| ToolchainError::filesystem(&out_path, e))?;
        }
    }
    Ok(())
}

/// Find the upstream binary inside an extracted tree.
///
/// Matches on file name anywhere below `dir`, also accepting `extension`
/// appended (e.g. `helm.exe`). Symlinks count when they resolve to a regular
/// file inside `dir`. The shallowest, then alphabetically first, match wins.
pub fn locate_binary(dir: &Path, upstream_binary_name: &str, extension: &str) -> Result<PathBuf> {
    let with_extension = format!("{}{}", upstream_binary_name, extension);
    let root = fs::canonicalize(dir).map_err(|e| ToolchainError::filesystem(dir, e))?;

    let mut candidates: Vec<(usize, PathBuf)> = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            ToolchainError::Archive(format!("Failed to walk {}: {}", dir.display(), e))
        })?;
        let matches = {
            let file_name = entry.file_name().to_string_lossy();
            file_name == upstream_binary_name || file_name == with_extension
        };
        if !matches {
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_file() || (file_type.is_symlink() && link_in_tree(entry.path(), &root)) {
            candidates.push((entry.depth(), entry.into_path()));
        }
    }

    candidates.sort_by_key(|(depth, _)| *depth);
    candidates
        .into_iter()
        .next()
        .map(|(_, path)| path)
        .ok_or_else(|| {
            ToolchainError::Archive(format!(
                "Binary '{}' not found in extracted archive",
                upstream_binary_name
            ))
        })
}

/// Whether the link at `path` ends at a regular file below `root`.
fn link_in_tree(path: &Path, root: &Path) -> bool {
    match fs::canonicalize(path) {
        Ok(target) => {
            let inside = target.starts_with(root) && target.is_file();
            if !inside {
                debug!(link = %path.display(), target = %target.display(), "Ignoring symlink");
            }
            inside
        }
        Err(e) => {
            debug!(link = %path.display(), error = %e, "Ignoring dangling symlink");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_detect() {
        assert_eq!(ArchiveKind::detect("/helm-v3.5.2-linux-amd64.tar.gz"), ArchiveKind::TarGz);
        assert_eq!(ArchiveKind::detect("/tool.tgz"), ArchiveKind::TarGz);
        assert_eq!(ArchiveKind::detect("/tool.zip"), ArchiveKind::Zip);
        assert_eq!(ArchiveKind::detect("/bin/linux/amd64/kubectl"), ArchiveKind::None);
        assert_eq!(ArchiveKind::detect("/tool.exe"), ArchiveKind::None);
        assert_eq!(ArchiveKind::detect("/tool.tar"), ArchiveKind::None);
        assert_eq!(ArchiveKind::detect("/TOOL.ZIP"), ArchiveKind::None);
        assert_eq!(ArchiveKind::detect(""), ArchiveKind::None);
    }

    #[test]
    fn test_suffix_of() {
        assert_eq!(ArchiveKind::suffix_of("a.tar.gz"), Some(".tar.gz"));
        assert_eq!(ArchiveKind::suffix_of("a.tgz"), Some(".tgz"));
        assert_eq!(ArchiveKind::suffix_of("a.zip"), Some(".zip"));
        assert_eq!(ArchiveKind::suffix_of("a.gz"), None);
        assert!(!ArchiveKind::detect("a.gz").is_archive());
    }

    #[test]
    fn test_extract_tar_gz_preserves_layout() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("helm.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("linux-amd64/helm", &b"#!/bin/sh\n"[..]),
                ("linux-amd64/LICENSE", &b"license"[..]),
            ],
        );

        let dest = dir.path().join("out");
        extract(ArchiveKind::TarGz, &archive, &dest).unwrap();
        assert!(dest.join("linux-amd64/helm").is_file());
        assert!(dest.join("linux-amd64/LICENSE").is_file());

        let found = locate_binary(&dest, "helm", "").unwrap();
        assert_eq!(found, dest.join("linux-amd64/helm"));
    }

    #[test]
    fn test_extract_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tool.zip");
        write_zip(
            &archive,
            &[
                ("windows-amd64/helm.exe", &b"MZ"[..]),
                ("README.md", &b"readme"[..]),
            ],
        );

        let dest = dir.path().join("out");
        extract(ArchiveKind::Zip, &archive, &dest).unwrap();
        assert!(dest.join("README.md").is_file());

        let found = locate_binary(&dest, "helm", ".exe").unwrap();
        assert_eq!(found, dest.join("windows-amd64/helm.exe"));
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tool.tar.gz");
        std::fs::write(&archive, b"definitely not gzip").unwrap();

        let result = extract(ArchiveKind::TarGz, &archive, &dir.path().join("out"));
        assert!(matches!(result, Err(ToolchainError::Archive(_))));
    }

    #[test]
    fn test_missing_binary_is_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("linux-amd64")).unwrap();
        std::fs::write(dir.path().join("linux-amd64/README.md"), b"").unwrap();

        let result = locate_binary(dir.path(), "helm", "");
        assert!(matches!(result, Err(ToolchainError::Archive(_))));
    }

    #[test]
    fn test_shallowest_match_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("a/b/kind"), b"deep").unwrap();
        std::fs::write(dir.path().join("kind"), b"top").unwrap();

        let found = locate_binary(dir.path(), "kind", "").unwrap();
        assert_eq!(found, dir.path().join("kind"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_binary_in_tar_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tool.tar.gz");
        {
            let file = File::create(&archive).unwrap();
            let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

            let data = b"real binary";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, "pkg/libexec/tool", &data[..])
                .unwrap();

            let mut link = tar::Header::new_gnu();
            link.set_entry_type(tar::EntryType::Symlink);
            link.set_size(0);
            link.set_mode(0o777);
            builder
                .append_link(&mut link, "pkg/bin/realname", "../libexec/tool")
                .unwrap();

            builder.into_inner().unwrap().finish().unwrap();
        }

        let dest = dir.path().join("out");
        extract(ArchiveKind::TarGz, &archive, &dest).unwrap();

        let found = locate_binary(&dest, "realname", "").unwrap();
        assert_eq!(found, dest.join("pkg/bin/realname"));
        assert_eq!(fs::read(&found).unwrap(), b"real binary");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_leaving_tree_is_ignored() {
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("elsewhere");
        fs::write(&target, b"not ours").unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("kind")).unwrap();
        std::os::unix::fs::symlink("missing", dir.path().join("kind.exe")).unwrap();

        let result = locate_binary(dir.path(), "kind", ".exe");
        assert!(matches!(result, Err(ToolchainError::Archive(_))));
    }
}
