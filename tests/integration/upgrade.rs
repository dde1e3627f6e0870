//! Upgrading an existing, customised installation.

use sminstall_cli::core::{InstallerError, MergeWarning};
use sminstall_cli::installer::{AcceptLicense, InstallMode, InstallOptions, InstallSummary, Installer};
use sminstall_cli::merge::{ActionKind, MergeLayout, Outcome, RelPath, SkipReason};
use sminstall_cli::test_utils::TestTree;

use crate::common::{PACKAGE_FILES, customised_installation, package};

fn upgrade(source: &TestTree, target: &TestTree, options: InstallOptions) -> InstallSummary {
    upgrade_with(MergeLayout::default(), source, target, options)
}

fn upgrade_with(layout: MergeLayout, source: &TestTree, target: &TestTree, options: InstallOptions) -> InstallSummary {
    let mut gate = |_: &str| -> anyhow::Result<bool> { panic!("license gate consulted during upgrade") };
    Installer::new(layout, options).run(source.root(), target.root(), &mut gate).unwrap()
}

fn outcome_of<'a>(summary: &'a InstallSummary, target: &str) -> &'a Outcome {
    let target = RelPath::normalize(target);
    &summary
        .report
        .entries
        .iter()
        .find(|entry| entry.action.target == target)
        .unwrap_or_else(|| panic!("no action for {target}"))
        .outcome
}

#[test]
fn test_upgrade_preserves_existing_config() {
    let source = package();
    let target = customised_installation();

    let summary = upgrade(&source, &target, InstallOptions::default());

    assert_eq!(summary.mode, InstallMode::Upgrade);
    assert_eq!(target.read("addons/sourcemod/configs/core.cfg"), "\"Core\" { \"Logging\" \"off\" } // operator");
    assert_eq!(target.read("addons/sourcemod/configs/admins_simple.ini"), "\"STEAM_0:1:1\" \"99:z\"");
    assert_eq!(outcome_of(&summary, "addons/sourcemod/configs/core.cfg"), &Outcome::Skipped);

    let core = summary.report.entries.iter().find(|e| e.action.target.to_string().ends_with("core.cfg")).unwrap();
    assert_eq!(core.action.kind, ActionKind::SkipPreserve);
    assert_eq!(core.action.skip_reason, Some(SkipReason::ProtectedConfig));
}

#[test]
fn test_upgrade_preserves_game_level_sourcemod_configs() {
    let source = package().file("cfg/sourcemod/basevotes.cfg", "sm_vote_delay 30");
    let target = customised_installation();

    let summary = upgrade(&source, &target, InstallOptions::default());

    assert_eq!(target.read("cfg/sourcemod/sourcemod.cfg"), "sm_show_activity 0 // operator");
    let entry = summary
        .report
        .entries
        .iter()
        .find(|e| e.action.target.to_string() == "cfg/sourcemod/sourcemod.cfg")
        .unwrap();
    assert_eq!(entry.action.kind, ActionKind::SkipPreserve);
    assert_eq!(entry.action.skip_reason, Some(SkipReason::ProtectedConfig));
    assert_eq!(entry.outcome, Outcome::Skipped);

    // A config the installation does not have yet is still delivered
    assert_eq!(target.read("cfg/sourcemod/basevotes.cfg"), "sm_vote_delay 30");
    assert_eq!(outcome_of(&summary, "cfg/sourcemod/basevotes.cfg"), &Outcome::Applied);
}

#[test]
fn test_upgrade_updates_relocated_plugins_in_place() {
    let source = package();
    let target = customised_installation();

    let summary = upgrade(&source, &target, InstallOptions::default());

    assert_eq!(target.read("addons/sourcemod/plugins/chat/basechat.smx"), "basechat-v2");
    assert!(!target.exists("addons/sourcemod/plugins/basechat.smx"));

    // A plugin the operator disabled stays disabled, but is updated
    assert_eq!(target.read("addons/sourcemod/plugins/disabled/funcommands.smx"), "funcommands-v2");
    assert!(!target.exists("addons/sourcemod/plugins/funcommands.smx"));

    assert_eq!(target.read("addons/sourcemod/plugins/admin-flatfile.smx"), "admin-flatfile-v2");
    assert_eq!(outcome_of(&summary, "addons/sourcemod/plugins/chat/basechat.smx"), &Outcome::Applied);
    assert!(summary.report.warnings.is_empty());
}

#[test]
fn test_upgrade_overwrites_and_creates_ordinary_files() {
    let source = package();
    let target = customised_installation();

    let summary = upgrade(&source, &target, InstallOptions::default());
    summary.ensure_complete().unwrap();

    assert_eq!(target.read("addons/sourcemod/bin/sourcemod.logic.so"), "logic-v2");
    assert_eq!(target.read("addons/sourcemod/scripting/basechat.sp"), "// basechat source v2");
    assert_eq!(target.read("addons/sourcemod/translations/common.phrases.txt"), "\"Phrases\" { v2 }");
    assert_eq!(target.read("addons/metamod/sourcemod.vdf"), PACKAGE_FILES[0].1);
}

#[test]
fn test_upgrade_never_deletes() {
    let source = package();
    let target = customised_installation();
    let before = target.files();

    upgrade(&source, &target, InstallOptions::default());

    let after = target.files();
    for file in &before {
        assert!(after.contains(file), "{file} was removed");
    }
    assert_eq!(target.read("addons/sourcemod/plugins/thirdparty/rtv_extended.smx"), "third party");
    assert_eq!(target.read("addons/sourcemod/logs/L20240101.log"), "log line");
}

#[test]
fn test_second_run_changes_nothing() {
    let source = package();
    let target = customised_installation();

    upgrade(&source, &target, InstallOptions::default());
    let snapshot: Vec<(String, String)> = target.files().into_iter().map(|f| (target.read(&f), f)).collect();

    let second = upgrade(&source, &target, InstallOptions::default());

    let summary = second.report.summary();
    assert_eq!(summary.applied, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.unchanged + summary.skipped, second.report.entries.len());
    let now: Vec<(String, String)> = target.files().into_iter().map(|f| (target.read(&f), f)).collect();
    assert_eq!(snapshot, now);
}

#[test]
fn test_same_named_package_plugins_settle_after_one_run() {
    let source = package()
        .file("addons/sourcemod/plugins/x.smx", "top")
        .file("addons/sourcemod/plugins/disabled/x.smx", "dis");
    let target = customised_installation();

    let runs: Vec<InstallSummary> = (0..3).map(|_| upgrade(&source, &target, InstallOptions::default())).collect();

    assert_eq!(target.read("addons/sourcemod/plugins/x.smx"), "top");
    assert_eq!(target.read("addons/sourcemod/plugins/disabled/x.smx"), "dis");
    assert_eq!(runs[1].report.summary().applied, 0);
    assert_eq!(runs[2].report.summary().applied, 0);
    assert!(runs.iter().all(|run| run.report.warnings.is_empty()));
}

#[test]
fn test_brand_new_plugin_is_created_at_package_path() {
    let source = package().file("addons/sourcemod/plugins/newfeature.smx", "new");
    let target = customised_installation();

    let summary = upgrade(&source, &target, InstallOptions::default());

    assert_eq!(target.read("addons/sourcemod/plugins/newfeature.smx"), "new");
    assert_eq!(outcome_of(&summary, "addons/sourcemod/plugins/newfeature.smx"), &Outcome::Applied);
}

#[test]
fn test_new_plugins_can_be_created_disabled() {
    let source = package().file("addons/sourcemod/plugins/newfeature.smx", "new");
    let target = customised_installation();
    let layout = MergeLayout {
        new_plugins_disabled: true,
        ..MergeLayout::default()
    };

    upgrade_with(layout, &source, &target, InstallOptions::default());

    assert_eq!(target.read("addons/sourcemod/plugins/disabled/newfeature.smx"), "new");
    assert!(!target.exists("addons/sourcemod/plugins/newfeature.smx"));
    // Existing plugins are still updated where they are
    assert_eq!(target.read("addons/sourcemod/plugins/chat/basechat.smx"), "basechat-v2");
}

#[test]
fn test_no_upgrade_plugins_leaves_binaries_alone() {
    let source = package().file("addons/sourcemod/plugins/newfeature.smx", "new");
    let target = customised_installation();

    let summary = upgrade(
        &source,
        &target,
        InstallOptions {
            skip_plugins: true,
            ..InstallOptions::default()
        },
    );

    assert_eq!(target.read("addons/sourcemod/plugins/chat/basechat.smx"), "basechat-v1");
    assert_eq!(target.read("addons/sourcemod/plugins/admin-flatfile.smx"), "admin-flatfile-v1");
    assert!(!target.exists("addons/sourcemod/plugins/newfeature.smx"));
    assert!(
        summary
            .report
            .entries
            .iter()
            .filter(|e| e.action.skip_reason == Some(SkipReason::PluginsExcluded))
            .all(|e| e.outcome == Outcome::Skipped)
    );

    // Everything that is not a plugin binary is still upgraded
    assert_eq!(target.read("addons/sourcemod/bin/sourcemod.logic.so"), "logic-v2");
    assert_eq!(target.read("addons/sourcemod/scripting/basechat.sp"), "// basechat source v2");
}

#[test]
fn test_duplicate_plugin_names_update_one_and_warn() {
    let source = package();
    let target = customised_installation().file("addons/sourcemod/plugins/zz_old/basechat.smx", "basechat-v0");

    let summary = upgrade(&source, &target, InstallOptions::default());

    assert_eq!(target.read("addons/sourcemod/plugins/chat/basechat.smx"), "basechat-v2");
    assert_eq!(target.read("addons/sourcemod/plugins/zz_old/basechat.smx"), "basechat-v0");
    assert!(summary.report.warnings.iter().any(|w| matches!(
        w,
        MergeWarning::AmbiguousRelocation { name, chosen, .. }
            if name == "basechat.smx" && chosen.to_string() == "addons/sourcemod/plugins/chat/basechat.smx"
    )));
}

#[test]
fn test_refresh_config_dirs_are_overwritten() {
    let source = package().file("addons/sourcemod/configs/geoip/GeoIP.dat", "geo-v2");
    let target = customised_installation().file("addons/sourcemod/configs/geoip/GeoIP.dat", "geo-v1");
    let layout = MergeLayout {
        refresh_config_dirs: vec![RelPath::normalize("addons/sourcemod/configs/geoip")],
        ..MergeLayout::default()
    };

    upgrade_with(layout, &source, &target, InstallOptions::default());

    assert_eq!(target.read("addons/sourcemod/configs/geoip/GeoIP.dat"), "geo-v2");
    assert_eq!(target.read("addons/sourcemod/configs/core.cfg"), "\"Core\" { \"Logging\" \"off\" } // operator");
}

#[test]
fn test_one_failed_file_does_not_abort_the_upgrade() {
    let source = package();
    // A directory squatting on a file path makes that single write fail
    let target = customised_installation().file("addons/sourcemod/translations/common.phrases.txt/blocker", "x");

    let summary = upgrade(&source, &target, InstallOptions::default());

    let failed: Vec<String> = summary.report.failed().map(|e| e.action.target.to_string()).collect();
    assert_eq!(failed, ["addons/sourcemod/translations/common.phrases.txt"]);
    assert!(target.path("addons/sourcemod/translations/common.phrases.txt").is_dir());

    assert_eq!(target.read("addons/sourcemod/bin/sourcemod.logic.so"), "logic-v2");
    assert_eq!(target.read("addons/sourcemod/plugins/chat/basechat.smx"), "basechat-v2");
    assert_eq!(target.read("addons/metamod/sourcemod.vdf"), PACKAGE_FILES[0].1);

    assert!(matches!(summary.ensure_complete(), Err(InstallerError::UpgradeIncomplete { failed: 1 })));
}

#[test]
fn test_dry_run_upgrade_writes_nothing() {
    let source = package();
    let target = customised_installation();
    let before: Vec<(String, String)> = target.files().into_iter().map(|f| (target.read(&f), f)).collect();

    let summary = upgrade(
        &source,
        &target,
        InstallOptions {
            dry_run: true,
            ..InstallOptions::default()
        },
    );

    let after: Vec<(String, String)> = target.files().into_iter().map(|f| (target.read(&f), f)).collect();
    assert_eq!(before, after);
    assert!(summary.dry_run);
    assert_eq!(outcome_of(&summary, "addons/sourcemod/plugins/chat/basechat.smx"), &Outcome::Planned);
    assert_eq!(outcome_of(&summary, "addons/sourcemod/configs/core.cfg"), &Outcome::Skipped);
}

#[test]
fn test_upgrade_accepts_gate_that_is_never_asked() {
    let source = package();
    let target = customised_installation();

    let summary = Installer::new(MergeLayout::default(), InstallOptions::default())
        .run(source.root(), target.root(), &mut AcceptLicense)
        .unwrap();
    assert_eq!(summary.mode, InstallMode::Upgrade);
}
