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

use crate::domain::tool::platform::Platform;
use crate::shared::error::{Result, ToolchainError};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Tools installed before any Kubernetes-flavoured command runs.
const KUBERNETES_TOOLS: [&str; 3] = ["kubectl", "clusterctl", "kind"];

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("static regex is valid"))
}

/// An installable, versioned third-party executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    pub name: String,
    /// File name of the binary inside an unpacked archive.
    pub upstream_binary_name: String,
    pub version: String,
    pub url_template: String,
}

impl Descriptor {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        url_template: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            upstream_binary_name: name.clone(),
            name,
            version: version.into(),
            url_template: url_template.into(),
        }
    }

    pub fn with_upstream_binary_name(mut self, upstream: impl Into<String>) -> Self {
        self.upstream_binary_name = upstream.into();
        self
    }

    /// Versioned on-disk file name: `<name><extension>-<version>`.
    pub fn executable(&self, platform: &Platform) -> String {
        format!("{}{}-{}", self.name, platform.extension(), self.version)
    }

    /// Version-independent name the active symlink is created under.
    pub fn stable_name(&self) -> &str {
        &self.name
    }

    pub fn validate(&self) -> Result<()> {
        if !name_pattern().is_match(&self.name) {
            return Err(ToolchainError::InvalidDescriptor(format!(
                "name '{}' must be a non-empty lower-case single token",
                self.name
            )));
        }
        if self.upstream_binary_name.trim().is_empty() {
            return Err(ToolchainError::InvalidDescriptor(format!(
                "'{}' has an empty upstream binary name",
                self.name
            )));
        }
        if self.version.trim().is_empty() {
            return Err(ToolchainError::InvalidDescriptor(format!(
                "'{}' has an empty version",
                self.name
            )));
        }
        if self.url_template.trim().is_empty() {
            return Err(ToolchainError::InvalidDescriptor(format!(
                "'{}' has an empty URL template",
                self.name
            )));
        }
        Ok(())
    }
}

/// Ordered, immutable set of known tools with unique names.
#[derive(Debug, Clone)]
pub struct Registry {
    descriptors: Vec<Descriptor>,
}

impl Registry {
    pub fn new(descriptors: Vec<Descriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            descriptor.validate()?;
            if !seen.insert(descriptor.name.as_str()) {
                return Err(ToolchainError::DuplicateDescriptor(descriptor.name.clone()));
            }
        }
        Ok(Self { descriptors })
    }

    /// The tools this binary knows how to install.
    ///
    /// Built on first use; an invalid built-in table aborts the process.
    pub fn builtin() -> &'static Registry {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Registry::new(builtin_descriptors()).expect("built-in tool descriptors are valid")
        })
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Look up several tools by name, keeping the requested order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Descriptor>> {
        names
            .iter()
            .map(|name| {
                self.get(name.as_ref())
                    .cloned()
                    .ok_or_else(|| ToolchainError::UnknownTool(name.as_ref().to_string()))
            })
            .collect()
    }

    /// Everything Kubernetes-flavoured commands shell out to.
    pub fn kubernetes(&self) -> Vec<Descriptor> {
        self.descriptors
            .iter()
            .filter(|d| KUBERNETES_TOOLS.contains(&d.name.as_str()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn builtin_descriptors() -> Vec<Descriptor> {
    vec![
        Descriptor::new(
            "kubectl",
            "1.19.6",
            "https://dl.k8s.io/release/v{{ version }}/bin/{{ os }}/{{ arch }}/kubectl{{ extension }}",
        ),
        Descriptor::new(
            "clusterctl",
            "0.3.14",
            "https://github.com/kubernetes-sigs/cluster-api/releases/download/v{{ version }}/clusterctl-{{ os }}-{{ arch }}{{ extension }}",
        ),
        Descriptor::new(
            "kind",
            "0.10.0",
            "https://github.com/kubernetes-sigs/kind/releases/download/v{{ version }}/kind-{{ os }}-{{ arch }}",
        ),
        Descriptor::new(
            "helm",
            "3.5.2",
            "https://get.helm.sh/helm-v{{ version }}-{{ os }}-{{ arch }}.{% if os == \"windows\" %}zip{% else %}tar.gz{% endif %}",
        ),
    ]
}
