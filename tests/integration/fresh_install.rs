//! First installation into a game directory without SourceMod.

use sminstall_cli::core::InstallerError;
use sminstall_cli::installer::{AcceptLicense, InstallMode, InstallOptions, Installer};
use sminstall_cli::merge::{ActionKind, MergeLayout, Outcome};
use sminstall_cli::test_utils::TestTree;

use crate::common::{LICENSE, PACKAGE_FILES, package};

fn installer() -> Installer {
    Installer::new(MergeLayout::default(), InstallOptions::default())
}

#[test]
fn test_fresh_install_copies_the_whole_package() {
    let source = package();
    let target = TestTree::new().file("maps/ctf_2fort.bsp", "map");

    let summary = installer().run(source.root(), target.root(), &mut AcceptLicense).unwrap();

    assert_eq!(summary.mode, InstallMode::FreshInstall);
    for (rel, content) in PACKAGE_FILES {
        assert_eq!(target.read(rel), *content, "{rel}");
    }
    assert_eq!(target.read("maps/ctf_2fort.bsp"), "map");
    assert_eq!(summary.report.summary().applied, PACKAGE_FILES.len());
    assert!(summary.report.entries.iter().all(|e| e.action.kind == ActionKind::Create));
    summary.ensure_complete().unwrap();
}

#[test]
fn test_license_is_shown_before_writing() {
    let source = package();
    let target = TestTree::new();

    let mut seen = None;
    let mut gate = |license: &str| -> anyhow::Result<bool> {
        seen = Some(license.to_string());
        Ok(true)
    };
    installer().run(source.root(), target.root(), &mut gate).unwrap();

    assert_eq!(seen.as_deref(), Some(LICENSE));
}

#[test]
fn test_declined_license_leaves_directory_untouched() {
    let source = package();
    let target = TestTree::new().file("maps/ctf_2fort.bsp", "map");

    let mut gate = |_: &str| -> anyhow::Result<bool> { Ok(false) };
    let err = installer().run(source.root(), target.root(), &mut gate).unwrap_err();

    assert!(matches!(err.downcast_ref::<InstallerError>(), Some(InstallerError::LicenseDeclined)));
    assert_eq!(target.files(), ["maps/ctf_2fort.bsp"]);
}

#[test]
fn test_gate_error_aborts_install() {
    let source = package();
    let target = TestTree::new();

    let mut gate = |_: &str| -> anyhow::Result<bool> { anyhow::bail!("terminal closed") };
    let err = installer().run(source.root(), target.root(), &mut gate).unwrap_err();

    assert!(err.to_string().contains("terminal closed"));
    assert!(target.files().is_empty());
}

#[test]
fn test_package_without_license_is_rejected() {
    let source = PACKAGE_FILES
        .iter()
        .filter(|(rel, _)| !rel.ends_with("LICENSE.txt"))
        .fold(TestTree::new(), |tree, (rel, content)| tree.file(rel, *content));
    let target = TestTree::new();

    let err = installer().run(source.root(), target.root(), &mut AcceptLicense).unwrap_err();

    assert!(matches!(err.downcast_ref::<InstallerError>(), Some(InstallerError::LicenseNotFound { .. })));
    assert!(target.files().is_empty());
}

#[test]
fn test_game_directory_is_created_when_missing() {
    let source = package();
    let parent = TestTree::new();
    let game_dir = parent.path("servers/tf");

    let summary = installer().run(source.root(), &game_dir, &mut AcceptLicense).unwrap();

    assert_eq!(summary.mode, InstallMode::FreshInstall);
    assert!(game_dir.join("addons/sourcemod/plugins/basechat.smx").is_file());
}

#[test]
fn test_fresh_install_dry_run_plans_every_file() {
    let source = package();
    let target = TestTree::new();
    let installer = Installer::new(
        MergeLayout::default(),
        InstallOptions {
            dry_run: true,
            ..InstallOptions::default()
        },
    );

    let mut gate = |_: &str| -> anyhow::Result<bool> { Ok(false) };
    let summary = installer.run(source.root(), target.root(), &mut gate).unwrap();

    assert!(summary.report.entries.iter().all(|e| e.outcome == Outcome::Planned));
    assert_eq!(summary.report.entries.len(), PACKAGE_FILES.len());
    assert!(target.files().is_empty());
}

#[test]
fn test_file_as_game_directory_is_rejected() {
    let source = package();
    let parent = TestTree::new().file("tf", "not a directory");

    let err = installer().run(source.root(), &parent.path("tf"), &mut AcceptLicense).unwrap_err();

    assert!(matches!(err.downcast_ref::<InstallerError>(), Some(InstallerError::TargetNotDirectory { .. })));
}
