//! Integration test suite for sminstall
//!
//! End-to-end tests driving the library pipeline on real temporary
//! directory trees, and the `sminstall` binary through `assert_cmd`. No test
//! touches the network: packages are always given with `--archive`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **common**: Package and installation fixtures
//! - **upgrade**: Upgrade merge scenarios (preservation, relocation, failures)
//! - **fresh_install**: First install and the license gate
//! - **cli**: The binary's flags, exit codes and output formats

mod common;

mod cli;
mod fresh_install;
mod upgrade;
