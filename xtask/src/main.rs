//! Build automation for kube-toolchain
//!
//! Usage: cargo xtask <command>

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

const BIN_NAME: &str = "kube-toolchain";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for kube-toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project
    Build {
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        /// Run only the tests/ integration suites
        #[arg(long)]
        integration: bool,
    },
    /// Package a release archive named the way cargo-binstall expects
    Dist {
        /// Target triple (defaults to the host)
        #[arg(long)]
        target: Option<String>,
    },
    /// Install the binary under a prefix
    Install {
        /// Installation prefix
        #[arg(long, default_value = "/usr/local")]
        prefix: String,
    },
    /// Dry-run install of every known tool through the built binary
    Smoke,
    /// Run CI checks (format, clippy, test)
    Ci,
    /// Format code
    Format {
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    sh.change_dir(project_root());

    match cli.command {
        Commands::Build { release } => build(&sh, release),
        Commands::Test { integration } => test(&sh, integration),
        Commands::Dist { target } => dist(&sh, target.as_deref()),
        Commands::Install { prefix } => install(&sh, &prefix),
        Commands::Smoke => smoke(&sh),
        Commands::Ci => ci(&sh),
        Commands::Format { check } => format(&sh, check),
        Commands::Clippy => clippy(&sh),
    }
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    println!("🔨 Building {}...", BIN_NAME);

    if release {
        cmd!(sh, "cargo build --release").run()?;
        println!("✅ Release build completed: target/release/{}", BIN_NAME);
    } else {
        cmd!(sh, "cargo build").run()?;
        println!("✅ Debug build completed: target/debug/{}", BIN_NAME);
    }

    Ok(())
}

fn test(sh: &Shell, integration: bool) -> Result<()> {
    println!("🧪 Running tests...");

    if integration {
        cmd!(sh, "cargo test -p kube-toolchain --tests").run()?;
    } else {
        cmd!(sh, "cargo test --workspace").run()?;
    }

    println!("✅ All tests passed");
    Ok(())
}

fn dist(sh: &Shell, target: Option<&str>) -> Result<()> {
    println!("📦 Creating distribution package...");

    let release_dir = match target {
        Some(triple) => {
            cmd!(sh, "cargo build --release --target {triple}").run()?;
            format!("target/{}/release", triple)
        }
        None => {
            cmd!(sh, "cargo build --release").run()?;
            "target/release".to_string()
        }
    };

    let dist_dir = project_root().join("dist");
    sh.create_dir(&dist_dir)?;
    sh.copy_file(
        project_root().join(&release_dir).join(BIN_NAME),
        dist_dir.join(BIN_NAME),
    )?;

    let archive_name = match target {
        Some(triple) => format!("{}-{}.tar.gz", BIN_NAME, triple),
        None => format!("{}-{}.tar.gz", BIN_NAME, env!("CARGO_PKG_VERSION")),
    };
    cmd!(sh, "tar -czf {archive_name} -C dist {BIN_NAME}")
        .run()
        .context("Failed to create tarball")?;

    println!("✅ Distribution package created: {}", archive_name);
    Ok(())
}

fn install(sh: &Shell, prefix: &str) -> Result<()> {
    println!("📥 Installing {} to {}...", BIN_NAME, prefix);

    let binary = project_root().join("target/release").join(BIN_NAME);
    if !binary.exists() {
        println!("Building release binary first...");
        cmd!(sh, "cargo build --release").run()?;
    }

    let bin_dir = Path::new(prefix).join("bin");
    sh.create_dir(&bin_dir)?;

    let install_path = bin_dir.join(BIN_NAME);
    sh.copy_file(&binary, &install_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&install_path, std::fs::Permissions::from_mode(0o755))?;
    }

    println!("✅ Installed to: {}", install_path.display());
    Ok(())
}

fn smoke(sh: &Shell) -> Result<()> {
    println!("💨 Dry-run install of all tools...");

    let scratch = sh.create_temp_dir()?;
    let install_dir = scratch.path().join("bin");
    cmd!(
        sh,
        "cargo run --quiet -- install --all --dry-run -y --install-dir {install_dir}"
    )
    .run()?;
    cmd!(sh, "cargo run --quiet -- list --install-dir {install_dir}").run()?;

    println!("✅ Smoke run completed");
    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    println!("🔍 Running CI checks...");

    println!("\n📝 Checking formatting...");
    format(sh, true)?;

    println!("\n🔧 Running clippy...");
    clippy(sh)?;

    println!("\n🧪 Running tests...");
    test(sh, false)?;

    println!("\n✅ All CI checks passed!");
    Ok(())
}

fn format(sh: &Shell, check: bool) -> Result<()> {
    if check {
        cmd!(sh, "cargo fmt --all -- --check").run()?;
        println!("✅ Code formatting is correct");
    } else {
        cmd!(sh, "cargo fmt --all").run()?;
        println!("✅ Code formatted");
    }
    Ok(())
}

fn clippy(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
    println!("✅ Clippy checks passed");
    Ok(())
}

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
