//! Common utilities for the CLI: the interactive license prompt and report output.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use crate::constants::LICENSE_PROMPT;
use crate::installer::{InstallMode, InstallSummary, LicenseGate};
use crate::merge::ReportSummary;

/// Shows the license and asks `[y/N]` on the terminal.
///
/// Both stdin and the output stream must be terminals: a prompt written into
/// a redirected stream cannot be seen. Otherwise the answer is "no" and the
/// operator is told about `--accept-license`.
pub struct TerminalLicenseGate<W: Write + IsTerminal> {
    out: W,
}

impl<W: Write + IsTerminal> TerminalLicenseGate<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + IsTerminal> LicenseGate for TerminalLicenseGate<W> {
    fn accept(&mut self, license: &str) -> Result<bool> {
        if !can_prompt(io::stdin().is_terminal(), self.out.is_terminal()) {
            eprintln!("{}", "License acceptance required (non-interactive mode).".yellow());
            eprintln!("Re-run with {} to accept the SourceMod license.", "--accept-license".cyan());
            return Ok(false);
        }

        writeln!(self.out, "{}", license.trim_end())?;
        writeln!(self.out)?;
        write!(self.out, "{} {} ", LICENSE_PROMPT, "[y/N]".green())?;
        self.out.flush()?;

        let mut response = String::new();
        io::stdin().lock().read_line(&mut response).context("Failed to read answer")?;
        Ok(parse_confirmation(&response))
    }
}

#[must_use]
pub const fn can_prompt(stdin_is_terminal: bool, output_is_terminal: bool) -> bool {
    stdin_is_terminal && output_is_terminal
}

/// `y`, `yes`, `true`, `on` and `1` (any case) confirm; anything else declines.
#[must_use]
pub fn parse_confirmation(response: &str) -> bool {
    matches!(response.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "true" | "on" | "1")
}

/// Machine-readable report written by `--format json`.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    pub generated_at: DateTime<Utc>,
    pub game_dir: &'a Path,
    pub counts: ReportSummary,
    #[serde(flatten)]
    pub summary: &'a InstallSummary,
}

impl<'a> JsonOutput<'a> {
    #[must_use]
    pub fn new(game_dir: &'a Path, summary: &'a InstallSummary) -> Self {
        Self {
            generated_at: Utc::now(),
            game_dir,
            counts: summary.report.summary(),
            summary,
        }
    }
}

/// Renders the text report, framed by what kind of run it was.
#[must_use]
pub fn render_text(game_dir: &Path, summary: &InstallSummary, verbose: bool) -> String {
    let mut out = String::new();
    let heading = match summary.mode {
        InstallMode::FreshInstall => format!("Performing full install of SourceMod into {}", game_dir.display()),
        InstallMode::Upgrade => format!("Upgrading SourceMod in {}", game_dir.display()),
    };
    out.push_str(&heading.bold().to_string());
    out.push('\n');
    out.push_str(&summary.report.render_text(verbose));

    if summary.dry_run {
        out.push_str(&"Dry run: no files were changed.".yellow().to_string());
        out.push('\n');
    } else if !summary.report.has_failures() {
        let done = match summary.mode {
            InstallMode::FreshInstall => "Installation complete.",
            InstallMode::Upgrade => "Upgrade complete.",
        };
        out.push_str(&done.green().to_string());
        out.push('\n');
    }
    out
}
