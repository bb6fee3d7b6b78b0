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

//! Shared fixtures for integration tests

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use kube_toolchain::domain::tool::{Arch, Os};
use kube_toolchain::{
    DependencyManager, Descriptor, HttpDownloader, InMemoryEnvironment, Platform, Prompter,
    SearchPath,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FAKE_BINARY_CONTENT: &[u8] = b"#!/bin/sh\necho fake tool\n";
pub const INITIAL_PATH: &str = "/usr/local/bin:/usr/bin";

pub fn linux() -> Platform {
    Platform::new(Os::Linux, Arch::Amd64)
}

/// Descriptor whose artifact lives at `/<name>-<version>-<os>-<arch><suffix>`
/// on the mock server.
pub fn descriptor(server: &MockServer, name: &str, version: &str, suffix: &str) -> Descriptor {
    Descriptor::new(
        name,
        version,
        format!(
            "{}/{}-{{{{ version }}}}-{{{{ os }}}}-{{{{ arch }}}}{}",
            server.uri(),
            name,
            suffix
        ),
    )
}

/// Request path `descriptor` resolves to on linux/amd64.
pub fn artifact_path(name: &str, version: &str, suffix: &str) -> String {
    format!("/{}-{}-linux-amd64{}", name, version, suffix)
}

/// Manager for linux/amd64 over an in-memory environment seeded with
/// `INITIAL_PATH`.
pub fn manager(prompter: Arc<dyn Prompter>) -> (DependencyManager, Arc<InMemoryEnvironment>) {
    let env = Arc::new(InMemoryEnvironment::with_var("PATH", INITIAL_PATH));
    let search_path = Arc::new(SearchPath::new(env.clone()));
    let manager = DependencyManager::new(
        Arc::new(HttpDownloader::new().unwrap()),
        prompter,
        search_path,
    )
    .unwrap()
    .with_platform(linux());
    (manager, env)
}

/// Serve `body` at `route`, expecting exactly `times` requests.
pub async fn mock_artifact(server: &MockServer, route: &str, body: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mock_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Fail the test if anything at all is requested.
pub async fn mock_no_requests(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

pub fn tar_gz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Prompter with canned answers that counts how often it was asked.
pub struct ScriptedPrompter {
    pub answer: bool,
    pub selection: Option<Vec<usize>>,
    pub calls: AtomicUsize,
}

impl ScriptedPrompter {
    pub fn confirming(answer: bool) -> Self {
        Self {
            answer,
            selection: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn selecting(selection: Vec<usize>) -> Self {
        Self {
            answer: true,
            selection: Some(selection),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, _prompt: &str) -> kube_toolchain::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }

    fn select_multi(
        &self,
        _prompt: &str,
        items: &[String],
        _preselected: &[bool],
    ) -> kube_toolchain::Result<Vec<usize>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .selection
            .clone()
            .unwrap_or_else(|| (0..items.len()).collect()))
    }
}
