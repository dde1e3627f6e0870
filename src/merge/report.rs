//! The result of a run: every action with its outcome, plus warnings.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

use super::planner::MergePlan;
use super::types::{ActionKind, MergeAction, Outcome};
use crate::core::MergeWarning;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub action: MergeAction,
    pub outcome: Outcome,
}

/// Ordered report in plan order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeReport {
    pub entries: Vec<ReportEntry>,
    pub warnings: Vec<MergeWarning>,
}

/// Outcome counts for the closing line of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub applied: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub planned: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl MergeReport {
    /// Report for a dry run: writing actions are `Planned`, preserves are `Skipped`.
    #[must_use]
    pub fn from_plan(plan: MergePlan) -> Self {
        let entries = plan
            .actions
            .into_iter()
            .map(|action| {
                let outcome = if action.kind.writes() { Outcome::Planned } else { Outcome::Skipped };
                ReportEntry { action, outcome }
            })
            .collect();
        Self {
            entries,
            warnings: plan.warnings,
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|entry| entry.outcome.is_failed())
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            warnings: self.warnings.len(),
            ..ReportSummary::default()
        };
        for entry in &self.entries {
            match entry.outcome {
                Outcome::Applied => summary.applied += 1,
                Outcome::Unchanged => summary.unchanged += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Planned => summary.planned += 1,
                Outcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    /// Human-readable report. Unchanged files are left out unless `verbose`.
    #[must_use]
    pub fn render_text(&self, verbose: bool) -> String {
        let mut out = String::new();

        for entry in &self.entries {
            let action = &entry.action;
            let kind = format!("{:>9}", action.kind.to_string());
            let line = match &entry.outcome {
                Outcome::Applied | Outcome::Planned => {
                    let kind = match action.kind {
                        ActionKind::Create => kind.green(),
                        ActionKind::RelocateOverwrite => kind.cyan(),
                        _ => kind.yellow(),
                    };
                    let planned = if entry.outcome == Outcome::Planned { " (dry run)".dimmed().to_string() } else { String::new() };
                    if action.kind == ActionKind::RelocateOverwrite && action.target != action.source.rel {
                        format!("{kind} {} <- {}{planned}", action.target, action.source.rel)
                    } else {
                        format!("{kind} {}{planned}", action.target)
                    }
                }
                Outcome::Skipped => {
                    let reason = action.skip_reason.map(|reason| format!(" ({reason})")).unwrap_or_default();
                    format!("{} {}{}", kind.blue(), action.target, reason.dimmed())
                }
                Outcome::Unchanged if verbose => format!("{} {}", format!("{:>9}", "unchanged").dimmed(), action.target),
                Outcome::Unchanged => continue,
                Outcome::Failed { reason } => {
                    format!("{} {}: {}", format!("{:>9}", "failed").red().bold(), action.target, reason)
                }
            };
            let _ = writeln!(out, "{line}");
        }

        for warning in &self.warnings {
            let _ = writeln!(out, "{}: {}", "warning".yellow().bold(), warning);
        }

        let summary = self.summary();
        let _ = write!(
            out,
            "{} written, {} unchanged, {} preserved",
            summary.applied, summary.unchanged, summary.skipped
        );
        if summary.planned > 0 {
            let _ = write!(out, ", {} planned", summary.planned);
        }
        if summary.failed > 0 {
            let _ = write!(out, ", {}", format!("{} failed", summary.failed).red());
        }
        if summary.warnings > 0 {
            let _ = write!(out, ", {} warning(s)", summary.warnings);
        }
        out.push('\n');
        out
    }
}
