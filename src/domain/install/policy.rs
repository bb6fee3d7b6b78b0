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

use crate::shared::error::ToolchainError;
use serde::{Deserialize, Serialize};

/// Rule governing whether an install attempt should proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InstallPolicy {
    #[serde(alias = "always")]
    Always,
    #[default]
    #[serde(alias = "if-not-present")]
    IfNotPresent,
    #[serde(alias = "never")]
    Never,
}

impl InstallPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallPolicy::Always => "Always",
            InstallPolicy::IfNotPresent => "IfNotPresent",
            InstallPolicy::Never => "Never",
        }
    }
}

impl std::fmt::Display for InstallPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InstallPolicy {
    type Err = ToolchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Always" | "always" => Ok(InstallPolicy::Always),
            "IfNotPresent" | "if-not-present" | "ifnotpresent" => Ok(InstallPolicy::IfNotPresent),
            "Never" | "never" => Ok(InstallPolicy::Never),
            _ => Err(ToolchainError::ConfigError(format!(
                "Invalid install policy: {} (expected Always, IfNotPresent or Never)",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Proceed,
    Skip,
    /// The dependency is required but the policy forbids installing it.
    Violation,
}

pub fn decide(policy: InstallPolicy, present: bool) -> Action {
    match (policy, present) {
        (InstallPolicy::Always, _) => Action::Proceed,
        (InstallPolicy::IfNotPresent, true) => Action::Skip,
        (InstallPolicy::IfNotPresent, false) => Action::Proceed,
        (InstallPolicy::Never, true) => Action::Skip,
        (InstallPolicy::Never, false) => Action::Violation,
    }
}
