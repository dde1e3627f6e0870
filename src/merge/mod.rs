//! The merge engine: classify, index, plan, apply.
//!
//! A run flows through four stages, each in its own module:
//!
//! 1. [`PathClassifier`] assigns every relative path a [`Category`].
//! 2. [`InstallationIndex`] records what is already installed, including
//!    plugins the operator moved into subdirectories.
//! 3. [`MergePlanner`] turns the package tree and the index into an ordered
//!    [`MergePlan`] without touching the installation.
//! 4. [`MergeExecutor`] applies the plan and produces a [`MergeReport`].
//!
//! ```rust,no_run
//! use sminstall_cli::merge::{InstallationIndex, MergeExecutor, MergeLayout, MergePlanner, PathClassifier};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let layout = MergeLayout::default();
//! let classifier = PathClassifier::new(&layout);
//! let game = Path::new("/srv/tf2/tf");
//!
//! let index = InstallationIndex::build(game, &classifier);
//! let plan = MergePlanner::new(&classifier, &layout).plan(Path::new("/tmp/sourcemod"), &index)?;
//! let report = MergeExecutor::new(game).apply(plan);
//! print!("{}", report.render_text(false));
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod executor;
pub mod index;
pub mod layout;
pub mod planner;
pub mod report;
pub mod types;

pub use classifier::{ClassificationRule, PathClassifier, PathMatcher};
pub use executor::MergeExecutor;
pub use index::{IndexedFile, InstallationIndex};
pub use layout::MergeLayout;
pub use planner::{MergePlan, MergePlanner, PlanOptions};
pub use report::{MergeReport, ReportEntry, ReportSummary};
pub use types::{ActionKind, Category, FileEntry, MergeAction, Outcome, RelPath, SkipReason};
