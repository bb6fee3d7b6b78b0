//! Dependency install commands

use crate::cli::display::{TableRenderer, ToolInfo};
use crate::domain::config::ToolchainConf;
use crate::domain::install::{DependencyManager, InstallOptions, InstallPolicy};
use crate::domain::tool::{render, Platform, Registry};
use crate::infrastructure::env::search_path::prepend_path;
use crate::infrastructure::env::{ProcessEnvironment, SearchPath};
use crate::infrastructure::fs::presence;
use crate::infrastructure::http::HttpDownloader;
use crate::infrastructure::prompt::{AutoAccept, Prompter, TerminalPrompter};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug, Clone)]
pub struct InstallCommand {
    /// Tools to install (defaults to kubectl, clusterctl and kind)
    #[arg(value_name = "TOOL")]
    pub tools: Vec<String>,

    /// Install every known tool
    #[arg(long, conflicts_with = "tools")]
    pub all: bool,

    /// Install policy: Always, IfNotPresent or Never
    #[arg(long)]
    pub policy: Option<InstallPolicy>,

    /// Directory the executables are placed in
    #[arg(long, value_name = "DIR")]
    pub install_dir: Option<PathBuf>,

    /// Never prompt; install everything the policy allows
    #[arg(long, short = 'y')]
    pub non_interactive: bool,

    /// Report what would be installed without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Per-download timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Configuration file (TOML)
    /// Falls back to KUBE_TOOLCHAIN_CONF_FILE, then ~/.kube-toolchain/config.toml
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
pub struct ListCommand {
    /// Directory the executables are placed in
    #[arg(long, value_name = "DIR")]
    pub install_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct PathCommand {
    /// Directory the executables are placed in
    #[arg(long, value_name = "DIR")]
    pub install_dir: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,
}

/// Defaults, then the configuration file, then the `--install-dir` flag.
fn base_options(
    config_file: Option<&Path>,
    install_dir: Option<&Path>,
) -> anyhow::Result<InstallOptions> {
    let conf = ToolchainConf::load(config_file, &ProcessEnvironment)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    let mut options = conf.apply(InstallOptions::default());
    if let Some(dir) = install_dir {
        options.install_dir = dir.to_path_buf();
    }
    Ok(options)
}

impl InstallCommand {
    pub fn resolve_options(&self) -> anyhow::Result<InstallOptions> {
        let mut options = base_options(self.config_file.as_deref(), self.install_dir.as_deref())?;
        if let Some(policy) = self.policy {
            options.install_policy = policy;
        }
        if self.non_interactive {
            options.non_interactive = true;
        }
        if let Some(secs) = self.timeout {
            if secs == 0 {
                anyhow::bail!("--timeout must be greater than zero");
            }
            options.download_timeout = Duration::from_secs(secs);
        }
        options.dry_run = self.dry_run;
        Ok(options)
    }

    pub async fn execute(&self) -> anyhow::Result<()> {
        let registry = Registry::builtin();
        let descriptors = if self.all {
            registry.descriptors().to_vec()
        } else if self.tools.is_empty() {
            registry.kubernetes()
        } else {
            registry.select(&self.tools)?
        };

        let mut options = self.resolve_options()?;
        if !options.non_interactive && !options.dry_run && !std::io::stdin().is_terminal() {
            warn!("stdin is not a terminal, continuing without prompts");
            options.non_interactive = true;
        }

        let prompter: Arc<dyn Prompter> = if options.non_interactive {
            Arc::new(AutoAccept)
        } else {
            Arc::new(TerminalPrompter::new())
        };
        let manager = DependencyManager::new(
            Arc::new(HttpDownloader::new()?),
            prompter,
            Arc::new(SearchPath::process()),
        )?;

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, cancelling");
                on_interrupt.cancel();
            }
        });

        let reports = manager
            .install_bulk(&cancel, &descriptors, &options)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to install dependencies: {}", e))?;

        let renderer = TableRenderer::new();
        println!("{}", renderer.render_install_report(&reports));
        if options.dry_run {
            println!("Dry run: nothing was downloaded or installed");
        }

        Ok(())
    }
}

impl ListCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let options = base_options(self.config_file.as_deref(), self.install_dir.as_deref())?;
        let platform = Platform::current()?;
        let tools = collect_tool_info(Registry::builtin(), &options.install_dir, &platform)?;

        let output = match self.output {
            OutputFormat::Table => TableRenderer::new().render_tool_list(&tools),
            OutputFormat::Json => serde_json::to_string_pretty(&tools)?,
            OutputFormat::Yaml => serde_yaml::to_string(&tools)?,
        };
        println!("{}", output);

        Ok(())
    }
}

/// Registry entries with their rendered source and install state.
pub fn collect_tool_info(
    registry: &Registry,
    install_dir: &Path,
    platform: &Platform,
) -> anyhow::Result<Vec<ToolInfo>> {
    registry
        .descriptors()
        .iter()
        .map(|descriptor| -> anyhow::Result<ToolInfo> {
            Ok(ToolInfo {
                name: descriptor.name.clone(),
                version: descriptor.version.clone(),
                url: render(descriptor, platform)?.to_string(),
                installed: presence::exists(install_dir, descriptor, platform)?,
                path: presence::versioned_path(install_dir, descriptor, platform)
                    .display()
                    .to_string(),
            })
        })
        .collect()
}

impl PathCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let options = base_options(self.config_file.as_deref(), self.install_dir.as_deref())?;
        let current = SearchPath::process().current();

        let value = match prepend_path(current.as_deref(), &options.install_dir)? {
            Some(updated) => updated,
            None => current.unwrap_or_default(),
        };
        println!("{}", value.to_string_lossy());

        Ok(())
    }
}
