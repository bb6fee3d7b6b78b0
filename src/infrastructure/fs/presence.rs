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

use crate::domain::tool::{Descriptor, Platform};
use crate::shared::error::{Result, ToolchainError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub fn versioned_path(install_dir: &Path, descriptor: &Descriptor, platform: &Platform) -> PathBuf {
    install_dir.join(descriptor.executable(platform))
}

/// Whether the versioned executable for `descriptor` is already installed.
///
/// Only the file name is probed; permissions and contents are not checked.
pub fn exists(install_dir: &Path, descriptor: &Descriptor, platform: &Platform) -> Result<bool> {
    let path = versioned_path(install_dir, descriptor, platform);
    match std::fs::metadata(&path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ToolchainError::filesystem(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tool::{Arch, Os};

    fn kubectl() -> Descriptor {
        Descriptor::new("kubectl", "1.19.6", "https://x.io")
    }

    #[test]
    fn test_missing_install_dir_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::new(Os::Linux, Arch::Amd64);
        let missing = dir.path().join("does-not-exist");
        assert!(!exists(&missing, &kubectl(), &platform).unwrap());
    }

    #[test]
    fn test_present_only_for_matching_version() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::new(Os::Linux, Arch::Amd64);
        std::fs::write(dir.path().join("kubectl-1.19.6"), b"").unwrap();
        // the stable name alone does not count
        std::fs::write(dir.path().join("kubectl"), b"").unwrap();

        assert!(exists(dir.path(), &kubectl(), &platform).unwrap());
        let newer = Descriptor::new("kubectl", "1.20.0", "https://x.io");
        assert!(!exists(dir.path(), &newer, &platform).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_stat_failure_is_filesystem_error() {
        // A regular file used as a directory makes stat fail with ENOTDIR.
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("file");
        std::fs::write(&not_a_dir, b"").unwrap();
        let platform = Platform::new(Os::Linux, Arch::Amd64);

        let result = exists(&not_a_dir, &kubectl(), &platform);
        assert!(matches!(result, Err(ToolchainError::Filesystem { .. })));
    }
}
