//! Command-line interface for sminstall.
//!
//! sminstall has a single command: install or upgrade SourceMod in a game
//! directory. Which one happens is decided by the directory itself (see
//! [`crate::installer`]); the flags only pick the package and tune the merge.
//!
//! # Examples
//!
//! ```bash
//! # Upgrade to the newest 1.10 build for this OS
//! sminstall ~/tf2/tf
//!
//! # Follow the stable branch, keep plugins as they are
//! sminstall ~/tf2/tf --branch stable --no-upgrade-plugins
//!
//! # Install from a package downloaded by hand, no prompts
//! sminstall /srv/csgo/csgo --archive sourcemod-1.11.0-git6934-linux.tar.gz --accept-license
//!
//! # See what would change, as JSON
//! sminstall ~/tf2/tf --dry-run --format json
//! ```
//!
//! # Output
//!
//! The report goes to stdout. Logs and progress bars go to stderr, so
//! `--format json` output can be piped as-is.

pub mod common;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::InstallerConfig;
use crate::constants::CONFIG_ENV_VAR;
use crate::installer::{AcceptLicense, InstallOptions, Installer, LicenseGate};
use crate::release::{PackageSource, Platform, ReleaseResolver, SourceOptions};
use crate::utils::platform::resolve_path;
use common::{JsonOutput, TerminalLicenseGate, render_text};

/// Runtime settings derived from the global flags.
///
/// Passed explicitly instead of through environment variables so that tests
/// can drive [`Cli::execute_with_config`] in-process.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging.
    pub log_level: Option<String>,
    pub no_progress: bool,
    /// Explicit config file.
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "sminstall",
    about = "Installs or upgrades SourceMod",
    version,
    author,
    disable_version_flag = true,
    long_about = "Installs SourceMod into a game server directory, or upgrades an existing \
                  installation without overwriting configuration or losing relocated plugins."
)]
pub struct Cli {
    /// The server's game directory (e.g. ~/tf2/tf)
    directory: String,

    /// The server's operating system [default: this machine's]
    #[arg(long)]
    platform: Option<Platform>,

    /// The SourceMod version to install [default: 1.10, or default_version from the config]
    #[arg(long)]
    version: Option<String>,

    /// The SourceMod branch to install; resolves the version (stable, dev)
    #[arg(long)]
    branch: Option<String>,

    /// A URL to a SourceMod package (ignores version, platform and branch)
    #[arg(long)]
    url: Option<String>,

    /// An existing package to install, either an archive or an extracted
    /// directory (ignores version, platform, branch and url)
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Do not copy plugins from the upgrade package (ignored on first install)
    #[arg(long)]
    no_upgrade_plugins: bool,

    /// Accept the SourceMod license without prompting
    #[arg(long)]
    accept_license: bool,

    /// Show what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Path to the sminstall config file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Enable verbose output (debug logs, unchanged files in the report)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress log output; the report and errors are still printed
    #[arg(short, long)]
    quiet: bool,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    /// Runs the command with configuration taken from the flags.
    ///
    /// # Errors
    ///
    /// Any fatal error, or [`crate::core::InstallerError::UpgradeIncomplete`]
    /// when some files could not be written.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Runs the command with explicit runtime settings.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        init_logging(config.log_level.as_deref());

        let settings = InstallerConfig::load_with_optional(config.config_path.clone()).await?;
        let layout = settings.layout()?;
        let game_dir = resolve_path(&self.directory)?;
        let show_progress = !config.no_progress && io::stderr().is_terminal();
        debug!("Game directory: {}", game_dir.display());

        let source = PackageSource::select(
            SourceOptions {
                archive: self.archive.clone(),
                url: self.url.clone(),
                version: self.version.clone(),
                branch: self.branch.clone(),
                platform: self.platform,
            },
            &settings.default_version,
        );
        debug!("Package source: {source:?}");

        let resolver = ReleaseResolver::new(&settings)?.with_progress(show_progress);
        let package = source.materialize(&resolver, show_progress).await?;

        let installer = Installer::new(
            layout,
            InstallOptions {
                skip_plugins: self.no_upgrade_plugins,
                dry_run: self.dry_run,
                show_progress,
            },
        );

        let mut gate: Box<dyn LicenseGate> = if self.accept_license {
            Box::new(AcceptLicense)
        } else if self.format == OutputFormat::Json {
            Box::new(TerminalLicenseGate::new(io::stderr()))
        } else {
            Box::new(TerminalLicenseGate::new(io::stdout()))
        };
        let summary = installer.run(package.root(), &game_dir, gate.as_mut())?;

        match self.format {
            OutputFormat::Text => print!("{}", render_text(&game_dir, &summary, self.verbose)),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&JsonOutput::new(&game_dir, &summary))?);
            }
        }

        summary.ensure_complete()?;
        Ok(())
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `level` when set;
/// `None` leaves logging off.
fn init_logging(level: Option<&str>) {
    let Some(level) = level else {
        return;
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
