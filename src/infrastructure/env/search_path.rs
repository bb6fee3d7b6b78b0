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

//! Executable search path handling.
//!
//! A `SearchPath` is created once at startup and shared by reference with
//! everything that installs tools. Its first successful `ensure_on_path`
//! call is the only one that touches the environment; every later call is a
//! no-op for the lifetime of that instance. Tests build their own instance
//! over an `InMemoryEnvironment` to exercise the behaviour repeatedly.

use crate::infrastructure::constants::PATH_ENV;
use crate::shared::error::{Result, ToolchainError};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Read/write access to environment variables.
pub trait Environment: Send + Sync {
    fn var(&self, key: &str) -> Option<OsString>;

    fn set_var(&self, key: &str, value: &OsStr);
}

/// The real process environment. Child processes spawned afterwards inherit
/// any change.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }

    fn set_var(&self, key: &str, value: &OsStr) {
        std::env::set_var(key, value);
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEnvironment {
    vars: Mutex<HashMap<String, OsString>>,
}

impl InMemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(key: &str, value: impl Into<OsString>) -> Self {
        let env = Self::default();
        env.set_var(key, &value.into());
        env
    }
}

impl Environment for InMemoryEnvironment {
    fn var(&self, key: &str) -> Option<OsString> {
        self.vars
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set_var(&self, key: &str, value: &OsStr) {
        self.vars
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_os_string());
    }
}

/// Fail if `dir` cannot be stored as a single search path segment, e.g.
/// because it contains the platform separator.
pub fn check_entry(dir: &Path) -> Result<()> {
    std::env::join_paths(std::iter::once(dir)).map_err(|e| unusable_entry(dir, e))?;
    Ok(())
}

/// Compute `current` with `dir` in front, or `None` if `dir` is already one
/// of its segments.
pub fn prepend_path(current: Option<&OsStr>, dir: &Path) -> Result<Option<OsString>> {
    let segments: Vec<_> = current
        .map(|value| std::env::split_paths(value).collect())
        .unwrap_or_default();
    if segments.iter().any(|segment| segment == dir) {
        return Ok(None);
    }

    let joined = std::env::join_paths(
        std::iter::once(dir.to_path_buf()).chain(segments.into_iter()),
    )
    .map_err(|e| unusable_entry(dir, e))?;
    Ok(Some(joined))
}

fn unusable_entry(dir: &Path, err: std::env::JoinPathsError) -> ToolchainError {
    ToolchainError::filesystem(
        dir,
        std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("cannot be added to {}: {}", PATH_ENV, err),
        ),
    )
}

pub struct SearchPath {
    env: Arc<dyn Environment>,
    applied: Mutex<bool>,
}

impl SearchPath {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self {
            env,
            applied: Mutex::new(false),
        }
    }

    pub fn process() -> Self {
        Self::new(Arc::new(ProcessEnvironment))
    }

    /// Make `dir` resolvable through the search path.
    ///
    /// Returns `true` only for the call that actually changed the variable.
    pub fn ensure_on_path(&self, dir: &Path) -> Result<bool> {
        let mut applied = self
            .applied
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *applied {
            debug!(dir = %dir.display(), "Search path already handled for this process");
            return Ok(false);
        }

        let current = self.env.var(PATH_ENV);
        let changed = match prepend_path(current.as_deref(), dir)? {
            Some(updated) => {
                self.env.set_var(PATH_ENV, &updated);
                info!(dir = %dir.display(), "Prepended install directory to {}", PATH_ENV);
                true
            }
            None => {
                debug!(dir = %dir.display(), "Install directory already on {}", PATH_ENV);
                false
            }
        };
        *applied = true;
        Ok(changed)
    }

    pub fn current(&self) -> Option<OsString> {
        self.env.var(PATH_ENV)
    }
}
