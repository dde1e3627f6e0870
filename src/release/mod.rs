//! Obtaining a SourceMod package tree for the merge engine.
//!
//! The merge engine only ever sees a directory. This module gets one, from
//! a local directory, a local archive, an explicit URL, or sourcemod.net's
//! release endpoints, and guarantees it is fully on disk before planning
//! starts.

pub mod archive;
pub mod platform;
pub mod resolver;
pub mod source;

pub use archive::{ArchiveKind, extract_archive};
pub use platform::Platform;
pub use resolver::{ReleaseResolver, version_from_downloads_page};
pub use source::{MaterializedSource, PackageSource, SourceOptions};
