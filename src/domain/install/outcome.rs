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

use serde::Serialize;

/// Why an install call returned successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Installed,
    SkippedAlreadyPresent,
    /// Present, and the `Never` policy forbids touching it.
    SkippedPolicy,
    SkippedUserDeclined,
    /// Dry run: the install would have proceeded.
    WouldInstall,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Installed => "Installed",
            Outcome::SkippedAlreadyPresent => "Already present",
            Outcome::SkippedPolicy => "Skipped (policy)",
            Outcome::SkippedUserDeclined => "Declined",
            Outcome::WouldInstall => "Would install",
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Outcome::SkippedAlreadyPresent | Outcome::SkippedPolicy | Outcome::SkippedUserDeclined
        )
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-descriptor result of a bulk install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub name: String,
    pub version: String,
    pub outcome: Outcome,
}
