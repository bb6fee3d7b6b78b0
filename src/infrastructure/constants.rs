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

/// Per-user application paths (relative to the home directory)
pub const APP_DIR_NAME: &str = ".kube-toolchain";
pub const BIN_DIR_NAME: &str = "bin";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variables
pub const CONF_FILE_ENV: &str = "KUBE_TOOLCHAIN_CONF_FILE";
pub const PATH_ENV: &str = "PATH";

/// Download settings
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60 * 60;
pub const USER_AGENT: &str = concat!("kube-toolchain/", env!("CARGO_PKG_VERSION"));

/// Scratch directories created next to downloads
pub const DOWNLOAD_TEMP_PREFIX: &str = "kube-toolchain-download-";
pub const EXTRACT_DIR_NAME: &str = "extracted";

/// Installed executable permissions
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Platform executable extension
pub const WINDOWS_EXECUTABLE_EXTENSION: &str = ".exe";

/// Archive suffixes
pub const SUFFIX_TAR_GZ: &str = ".tar.gz";
pub const SUFFIX_TGZ: &str = ".tgz";
pub const SUFFIX_ZIP: &str = ".zip";
