// CLI command definitions

use super::tools::{InstallCommand, ListCommand, PathCommand};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "kube-toolchain",
    version,
    about = "Installer for the Kubernetes command line tools",
    long_about = "Downloads and installs pinned versions of kubectl, clusterctl, kind and helm, \
                  and makes them reachable on PATH"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Install missing tools (defaults to kubectl, clusterctl and kind)
    Install(InstallCommand),

    /// List known tools and whether they are installed
    List(ListCommand),

    /// Print PATH with the install directory prepended
    Path(PathCommand),
}
