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
use crate::infrastructure::constants::EXECUTABLE_MODE;
use crate::shared::error::{Result, ToolchainError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Place `source` into `install_dir` as the versioned executable of
/// `descriptor` and point the stable-named symlink at it.
///
/// Returns the versioned path. Older versions are left on disk.
pub fn install_executable(
    source: &Path,
    descriptor: &Descriptor,
    install_dir: &Path,
    platform: &Platform,
) -> Result<PathBuf> {
    fs::create_dir_all(install_dir).map_err(|e| ToolchainError::filesystem(install_dir, e))?;

    let executable = descriptor.executable(platform);
    let versioned = install_dir.join(&executable);

    // Copy next to the target first so the versioned name only ever refers
    // to a complete file.
    let staging = install_dir.join(format!(".{}.partial", executable));
    if let Err(e) = copy_executable(source, &staging) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    fs::rename(&staging, &versioned).map_err(|e| {
        let _ = fs::remove_file(&staging);
        ToolchainError::filesystem(&versioned, e)
    })?;
    debug!(path = %versioned.display(), "Installed versioned executable");

    let stable = install_dir.join(descriptor.stable_name());
    remove_stable_link(&stable)?;
    create_symlink(Path::new(&executable), &stable)?;

    info!(
        tool = %descriptor.name,
        version = %descriptor.version,
        link = %stable.display(),
        "Activated {}",
        executable
    );
    Ok(versioned)
}

fn copy_executable(source: &Path, dest: &Path) -> Result<()> {
    fs::copy(source, dest).map_err(|e| ToolchainError::filesystem(dest, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dest, fs::Permissions::from_mode(EXECUTABLE_MODE))
            .map_err(|e| ToolchainError::filesystem(dest, e))?;
    }
    #[cfg(not(unix))]
    let _ = EXECUTABLE_MODE;

    Ok(())
}

/// Remove a previous stable-named file or symlink, dangling links included.
fn remove_stable_link(stable: &Path) -> Result<()> {
    match fs::symlink_metadata(stable) {
        Ok(_) => fs::remove_file(stable).map_err(|e| ToolchainError::filesystem(stable, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ToolchainError::filesystem(stable, e)),
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| ToolchainError::filesystem(link, e))
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_file(target, link)
        .map_err(|e| ToolchainError::filesystem(link, e))
}
