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

use std::path::{Path, PathBuf};
use thiserror::Error;
pub type Result<T> = std::result::Result<T, ToolchainError>;

#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid URL '{url}': {reason}")]
    Url { url: String, reason: String },

    #[error("Download of {url} failed with HTTP status {status}")]
    Download { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dependency {name} version {version} is missing and the install policy is Never")]
    PolicyViolation { name: String, version: String },

    #[error("Duplicate tool descriptor: '{0}'")]
    DuplicateDescriptor(String),

    #[error("Invalid tool descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Unknown tool: '{0}'")]
    UnknownTool(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl From<tera::Error> for ToolchainError {
    fn from(err: tera::Error) -> Self {
        // tera keeps the useful part of the message in the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ToolchainError::Template(message)
    }
}

impl From<reqwest::Error> for ToolchainError {
    fn from(err: reqwest::Error) -> Self {
        ToolchainError::Http(err.to_string())
    }
}

impl From<dialoguer::Error> for ToolchainError {
    fn from(err: dialoguer::Error) -> Self {
        ToolchainError::Prompt(err.to_string())
    }
}

impl ToolchainError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn filesystem(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Url {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn policy_violation(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::PolicyViolation {
            name: name.into(),
            version: version.into(),
        }
    }
}
