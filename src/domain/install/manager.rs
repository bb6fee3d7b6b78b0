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

//! Install orchestration.
//!
//! `DependencyManager` ties the pipeline together:
//! presence check, policy decision, confirmation, URL rendering, download,
//! optional extraction, installation and search-path update. Every stage
//! checks the cancellation token before it starts.

use crate::domain::install::options::InstallOptions;
use crate::domain::install::outcome::{InstallReport, Outcome};
use crate::domain::install::policy::{decide, Action, InstallPolicy};
use crate::domain::tool::{render, Descriptor, Platform};
use crate::infrastructure::constants::{DOWNLOAD_TEMP_PREFIX, EXTRACT_DIR_NAME};
use crate::infrastructure::env::search_path::check_entry;
use crate::infrastructure::env::SearchPath;
use crate::infrastructure::fs::{archive, installer, presence, ArchiveKind};
use crate::infrastructure::http::ToolDownloader;
use crate::infrastructure::prompt::Prompter;
use crate::shared::error::{Result, ToolchainError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct DependencyManager {
    downloader: Arc<dyn ToolDownloader>,
    prompter: Arc<dyn Prompter>,
    search_path: Arc<SearchPath>,
    platform: Platform,
}

impl DependencyManager {
    /// Create a manager for the host platform.
    pub fn new(
        downloader: Arc<dyn ToolDownloader>,
        prompter: Arc<dyn Prompter>,
        search_path: Arc<SearchPath>,
    ) -> Result<Self> {
        Ok(Self {
            downloader,
            prompter,
            search_path,
            platform: Platform::current()?,
        })
    }

    /// Render URLs and executable names for `platform` instead of the host.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Make sure a single dependency is installed according to `options`.
    pub async fn install(
        &self,
        cancel: &CancellationToken,
        descriptor: &Descriptor,
        options: &InstallOptions,
    ) -> Result<Outcome> {
        let action = self.plan(cancel, descriptor, options)?;

        match action {
            Action::Violation => Err(ToolchainError::policy_violation(
                &descriptor.name,
                &descriptor.version,
            )),
            Action::Skip => Ok(skip_outcome(options.install_policy)),
            Action::Proceed => {
                if options.dry_run {
                    self.log_dry_run(descriptor, options);
                    return Ok(Outcome::WouldInstall);
                }

                if !options.non_interactive {
                    let question = format!(
                        "Install missing dependency {} version {}?",
                        descriptor.name, descriptor.version
                    );
                    if !self.prompter.confirm(&question)? {
                        info!(tool = %descriptor.name, "Install declined");
                        return Ok(Outcome::SkippedUserDeclined);
                    }
                }

                self.fetch_and_install(cancel, descriptor, options).await?;
                Ok(Outcome::Installed)
            }
        }
    }

    /// Install a batch of dependencies.
    ///
    /// The policy is evaluated for the whole batch first, so a violation
    /// anywhere aborts before anything is downloaded. Interactive runs get a
    /// single selection prompt. The chosen tools are then installed one by
    /// one in the given order; the first failure ends the batch.
    pub async fn install_bulk(
        &self,
        cancel: &CancellationToken,
        descriptors: &[Descriptor],
        options: &InstallOptions,
    ) -> Result<Vec<InstallReport>> {
        let mut actions = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let action = self.plan(cancel, descriptor, options)?;
            if action == Action::Violation {
                return Err(ToolchainError::policy_violation(
                    &descriptor.name,
                    &descriptor.version,
                ));
            }
            actions.push(action);
        }

        let pending: Vec<usize> = actions
            .iter()
            .enumerate()
            .filter(|(_, action)| **action == Action::Proceed)
            .map(|(i, _)| i)
            .collect();

        let chosen = if pending.is_empty() || options.dry_run || options.non_interactive {
            pending
        } else {
            let items: Vec<String> = pending
                .iter()
                .map(|&i| format!("{} {}", descriptors[i].name, descriptors[i].version))
                .collect();
            let preselected = vec![true; items.len()];
            let mut picked: Vec<usize> = self
                .prompter
                .select_multi("Select dependencies to install", &items, &preselected)?
                .into_iter()
                .filter_map(|k| pending.get(k).copied())
                .collect();
            picked.sort_unstable();
            picked.dedup();
            picked
        };

        let mut outcomes: Vec<Outcome> = actions
            .iter()
            .map(|action| match action {
                Action::Skip => skip_outcome(options.install_policy),
                _ => Outcome::SkippedUserDeclined,
            })
            .collect();

        for index in chosen {
            let descriptor = &descriptors[index];
            outcomes[index] = if options.dry_run {
                self.log_dry_run(descriptor, options);
                Outcome::WouldInstall
            } else {
                self.fetch_and_install(cancel, descriptor, options).await?;
                Outcome::Installed
            };
        }

        Ok(descriptors
            .iter()
            .zip(outcomes)
            .map(|(descriptor, outcome)| InstallReport {
                name: descriptor.name.clone(),
                version: descriptor.version.clone(),
                outcome,
            })
            .collect())
    }

    fn plan(
        &self,
        cancel: &CancellationToken,
        descriptor: &Descriptor,
        options: &InstallOptions,
    ) -> Result<Action> {
        ensure_not_cancelled(cancel)?;
        check_entry(&options.install_dir)?;
        let present = presence::exists(&options.install_dir, descriptor, &self.platform)?;
        let action = decide(options.install_policy, present);
        debug!(
            tool = %descriptor.name,
            version = %descriptor.version,
            present,
            policy = %options.install_policy,
            ?action,
            "Evaluated install policy"
        );
        if action == Action::Violation {
            warn!(
                tool = %descriptor.name,
                version = %descriptor.version,
                "Dependency is missing and the Never policy forbids installing it"
            );
        }
        Ok(action)
    }

    async fn fetch_and_install(
        &self,
        cancel: &CancellationToken,
        descriptor: &Descriptor,
        options: &InstallOptions,
    ) -> Result<PathBuf> {
        ensure_not_cancelled(cancel)?;
        let url = render(descriptor, &self.platform)?;
        let kind = ArchiveKind::detect(url.path());
        info!(tool = %descriptor.name, version = %descriptor.version, %url, "Installing dependency");

        // Dropped on every exit path, taking partial downloads with it.
        let workdir = tempfile::Builder::new()
            .prefix(DOWNLOAD_TEMP_PREFIX)
            .tempdir()
            .map_err(|e| ToolchainError::filesystem(std::env::temp_dir(), e))?;
        let file_name = format!(
            "{}{}",
            descriptor.executable(&self.platform),
            ArchiveKind::suffix_of(url.path()).unwrap_or("")
        );
        let download = workdir.path().join(file_name);

        self.downloader
            .download(&url, &download, options.download_timeout, cancel)
            .await?;

        ensure_not_cancelled(cancel)?;
        let binary = if kind.is_archive() {
            let extract_dir = workdir.path().join(EXTRACT_DIR_NAME);
            archive::extract(kind, &download, &extract_dir)?;
            archive::locate_binary(
                &extract_dir,
                &descriptor.upstream_binary_name,
                self.platform.extension(),
            )?
        } else {
            download
        };

        ensure_not_cancelled(cancel)?;
        let installed =
            installer::install_executable(&binary, descriptor, &options.install_dir, &self.platform)?;

        ensure_not_cancelled(cancel)?;
        self.search_path.ensure_on_path(&options.install_dir)?;

        Ok(installed)
    }

    fn log_dry_run(&self, descriptor: &Descriptor, options: &InstallOptions) {
        match render(descriptor, &self.platform) {
            Ok(url) => info!(
                tool = %descriptor.name,
                version = %descriptor.version,
                %url,
                install_dir = %options.install_dir.display(),
                "Dry run: would install"
            ),
            Err(e) => warn!(tool = %descriptor.name, error = %e, "Dry run: URL does not render"),
        }
    }
}

fn skip_outcome(policy: InstallPolicy) -> Outcome {
    match policy {
        InstallPolicy::Never => Outcome::SkippedPolicy,
        _ => Outcome::SkippedAlreadyPresent,
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ToolchainError::Cancelled);
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::domain::tool::{Arch, Os};
    use crate::infrastructure::env::InMemoryEnvironment;
    use crate::infrastructure::prompt::AutoAccept;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use url::Url;

    #[derive(Default)]
    struct FakeDownloader {
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl ToolDownloader for FakeDownloader {
        async fn download(
            &self,
            url: &Url,
            dest: &Path,
            _timeout: Duration,
            _cancel: &CancellationToken,
        ) -> Result<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            std::fs::write(dest, b"binary").unwrap();
            Ok(6)
        }
    }

    struct Declining;

    impl Prompter for Declining {
        fn confirm(&self, _prompt: &str) -> Result<bool> {
            Ok(false)
        }

        fn select_multi(&self, _: &str, _: &[String], _: &[bool]) -> Result<Vec<usize>> {
            Ok(Vec::new())
        }
    }

    fn manager(
        downloader: Arc<FakeDownloader>,
        prompter: Arc<dyn Prompter>,
    ) -> DependencyManager {
        let search_path = Arc::new(SearchPath::new(Arc::new(InMemoryEnvironment::new())));
        DependencyManager::new(downloader, prompter, search_path)
            .unwrap()
            .with_platform(Platform::new(Os::Linux, Arch::Amd64))
    }

    fn tool(name: &str) -> Descriptor {
        Descriptor::new(
            name,
            "1.0.0",
            "https://example.com/{{ version }}/{{ os }}/{{ arch }}/tool",
        )
    }

    #[tokio::test]
    async fn test_install_missing_tool() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(FakeDownloader::default());
        let manager = manager(downloader.clone(), Arc::new(AutoAccept));
        let options = InstallOptions::default()
            .with_install_dir(dir.path())
            .non_interactive(true);

        let outcome = manager
            .install(&CancellationToken::new(), &tool("toola"), &options)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Installed);
        assert!(dir.path().join("toola-1.0.0").is_file());
        assert_eq!(
            downloader.urls.lock().unwrap().as_slice(),
            ["https://example.com/1.0.0/linux/amd64/tool".to_string()]
        );
    }

    #[tokio::test]
    async fn test_declined_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(FakeDownloader::default());
        let manager = manager(downloader.clone(), Arc::new(Declining));
        let options = InstallOptions::default().with_install_dir(dir.path());

        let outcome = manager
            .install(&CancellationToken::new(), &tool("toola"), &options)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::SkippedUserDeclined);
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unusable_install_dir_fails_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let install_dir = dir.path().join("a:b");
        let downloader = Arc::new(FakeDownloader::default());
        let manager = manager(downloader.clone(), Arc::new(AutoAccept));
        let options = InstallOptions::default()
            .with_install_dir(&install_dir)
            .non_interactive(true);

        let result = manager
            .install(&CancellationToken::new(), &tool("toola"), &options)
            .await;

        assert!(matches!(result, Err(ToolchainError::Filesystem { path, .. }) if path == install_dir));
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 0);
        assert!(!install_dir.exists());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(FakeDownloader::default());
        let manager = manager(downloader.clone(), Arc::new(AutoAccept));
        let options = InstallOptions::default()
            .with_install_dir(dir.path())
            .non_interactive(true);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = manager.install(&cancel, &tool("toola"), &options).await;
        assert!(matches!(result, Err(ToolchainError::Cancelled)));
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bulk_deselection_reports_declined() {
        struct KeepSecond;
        impl Prompter for KeepSecond {
            fn confirm(&self, _prompt: &str) -> Result<bool> {
                Ok(true)
            }
            fn select_multi(&self, _: &str, items: &[String], preselected: &[bool]) -> Result<Vec<usize>> {
                assert_eq!(items, ["toola 1.0.0".to_string(), "toolb 1.0.0".to_string()]);
                assert_eq!(preselected, [true, true]);
                Ok(vec![1])
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(FakeDownloader::default());
        let manager = manager(downloader.clone(), Arc::new(KeepSecond));
        let options = InstallOptions::default().with_install_dir(dir.path());

        let reports = manager
            .install_bulk(
                &CancellationToken::new(),
                &[tool("toola"), tool("toolb")],
                &options,
            )
            .await
            .unwrap();

        assert_eq!(reports[0].outcome, Outcome::SkippedUserDeclined);
        assert_eq!(reports[1].outcome, Outcome::Installed);
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_skip_outcome_follows_policy() {
        assert_eq!(skip_outcome(InstallPolicy::Never), Outcome::SkippedPolicy);
        assert_eq!(
            skip_outcome(InstallPolicy::IfNotPresent),
            Outcome::SkippedAlreadyPresent
        );
    }
}
