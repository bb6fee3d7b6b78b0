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

//! Optional TOML configuration file
//!
//! ```toml
//! install_dir = "/opt/kube-toolchain/bin"
//! install_policy = "IfNotPresent"
//! non_interactive = true
//! download_timeout_secs = 600
//! ```

use crate::domain::install::{InstallOptions, InstallPolicy};
use crate::infrastructure::constants::{APP_DIR_NAME, CONFIG_FILE_NAME, CONF_FILE_ENV};
use crate::infrastructure::env::Environment;
use crate::shared::error::{Result, ToolchainError};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Every key is optional; unset keys fall through to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConf {
    pub install_dir: Option<PathBuf>,
    pub install_policy: Option<InstallPolicy>,
    pub non_interactive: Option<bool>,
    pub download_timeout_secs: Option<u64>,
}

impl ToolchainConf {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| ToolchainError::filesystem(path, e))?;
        let conf: Self = toml::from_str(&content)?;
        conf.validate()?;
        Ok(conf)
    }

    /// `~/.kube-toolchain/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Find and load the configuration.
    ///
    /// An explicit path or one named by `KUBE_TOOLCHAIN_CONF_FILE` must
    /// exist. The file under the home directory is used only if present;
    /// without any file the defaults apply.
    pub fn load(explicit: Option<&Path>, env: &dyn Environment) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "Loading configuration from --config-file");
            return Self::from(path);
        }

        if let Some(path) = env.var(CONF_FILE_ENV).filter(|value| !value.is_empty()) {
            let path = PathBuf::from(path);
            debug!(path = %path.display(), "Loading configuration from {}", CONF_FILE_ENV);
            return Self::from(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "Loading configuration");
                Self::from(path)
            }
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.download_timeout_secs == Some(0) {
            return Err(ToolchainError::config_error(
                "download_timeout_secs must be greater than zero",
            ));
        }
        if let Some(dir) = &self.install_dir {
            if dir.as_os_str().is_empty() {
                return Err(ToolchainError::config_error("install_dir must not be empty"));
            }
        }
        Ok(())
    }

    /// Layer the file's values over `options`.
    pub fn apply(&self, mut options: InstallOptions) -> InstallOptions {
        if let Some(dir) = &self.install_dir {
            options.install_dir = dir.clone();
        }
        if let Some(policy) = self.install_policy {
            options.install_policy = policy;
        }
        if let Some(non_interactive) = self.non_interactive {
            options.non_interactive = non_interactive;
        }
        if let Some(secs) = self.download_timeout_secs {
            options.download_timeout = Duration::from_secs(secs);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::env::InMemoryEnvironment;

    #[test]
    fn test_parse_full_file() {
        let conf: ToolchainConf = toml::from_str(
            r#"
            install_dir = "/opt/tools/bin"
            install_policy = "Never"
            non_interactive = true
            download_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(conf.install_dir, Some(PathBuf::from("/opt/tools/bin")));
        assert_eq!(conf.install_policy, Some(InstallPolicy::Never));
        assert_eq!(conf.non_interactive, Some(true));
        assert_eq!(conf.download_timeout_secs, Some(30));
    }

    #[test]
    fn test_lowercase_policy_alias() {
        let conf: ToolchainConf = toml::from_str(r#"install_policy = "if-not-present""#).unwrap();
        assert_eq!(conf.install_policy, Some(InstallPolicy::IfNotPresent));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<ToolchainConf>("install_path = \"/x\"").is_err());
    }

    #[test]
    fn test_apply_keeps_unset_values() {
        let conf = ToolchainConf {
            install_policy: Some(InstallPolicy::Always),
            ..Default::default()
        };
        let base = InstallOptions::default().with_install_dir("/tmp/bin");
        let options = conf.apply(base);

        assert_eq!(options.install_policy, InstallPolicy::Always);
        assert_eq!(options.install_dir, PathBuf::from("/tmp/bin"));
        assert_eq!(options.download_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn test_load_from_env_variable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "non_interactive = true\n").unwrap();
        let env = InMemoryEnvironment::with_var(CONF_FILE_ENV, path.as_os_str());

        let conf = ToolchainConf::load(None, &env).unwrap();
        assert_eq!(conf.non_interactive, Some(true));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let env = InMemoryEnvironment::new();
        let result = ToolchainConf::load(Some(Path::new("/nonexistent/config.toml")), &env);
        assert!(matches!(result, Err(ToolchainError::Filesystem { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "download_timeout_secs = 0\n").unwrap();

        let result = ToolchainConf::from(&path);
        assert!(matches!(result, Err(ToolchainError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "install_policy = \"Never\"\ninstall_dir = [\n").unwrap();

        let result = ToolchainConf::from(&path);
        assert!(matches!(result, Err(ToolchainError::TomlParse(_))));
    }
}
