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

use crate::domain::install::policy::InstallPolicy;
use crate::infrastructure::constants::{
    APP_DIR_NAME, BIN_DIR_NAME, DEFAULT_DOWNLOAD_TIMEOUT_SECS,
};
use std::path::PathBuf;
use std::time::Duration;

/// Per-invocation install settings. Never persisted.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub install_dir: PathBuf,
    pub install_policy: InstallPolicy,
    pub non_interactive: bool,
    pub dry_run: bool,
    pub download_timeout: Duration,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            install_dir: default_install_dir(),
            install_policy: InstallPolicy::default(),
            non_interactive: false,
            dry_run: false,
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
        }
    }
}

impl InstallOptions {
    pub fn with_install_dir(mut self, install_dir: impl Into<PathBuf>) -> Self {
        self.install_dir = install_dir.into();
        self
    }

    pub fn with_policy(mut self, policy: InstallPolicy) -> Self {
        self.install_policy = policy;
        self
    }

    pub fn non_interactive(mut self, non_interactive: bool) -> Self {
        self.non_interactive = non_interactive;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }
}

/// `~/.kube-toolchain/bin`, or a relative `.kube-toolchain/bin` when no home
/// directory can be determined.
pub fn default_install_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(APP_DIR_NAME)
        .join(BIN_DIR_NAME)
}
