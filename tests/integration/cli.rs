//! The `sminstall` binary end to end, installing from extracted package directories.

use predicates::prelude::*;
use serde_json::Value;
use sminstall_cli::test_utils::TestTree;

use crate::common::{customised_installation, empty_config, package, sminstall};

#[test]
fn test_upgrade_text_report() {
    let source = package();
    let target = customised_installation();
    let config = empty_config();

    sminstall(&config)
        .arg(target.root())
        .arg("--archive")
        .arg(source.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("Upgrading SourceMod in"))
        .stdout(predicate::str::contains("relocate addons/sourcemod/plugins/chat/basechat.smx <- addons/sourcemod/plugins/basechat.smx"))
        .stdout(predicate::str::contains("addons/sourcemod/configs/core.cfg (existing configuration)"))
        .stdout(predicate::str::contains("Upgrade complete."));

    assert_eq!(target.read("addons/sourcemod/plugins/chat/basechat.smx"), "basechat-v2");
    assert_eq!(target.read("addons/sourcemod/configs/core.cfg"), "\"Core\" { \"Logging\" \"off\" } // operator");
}

#[test]
fn test_upgrade_json_report() {
    let source = package();
    let target = customised_installation();
    let config = empty_config();

    let output = sminstall(&config)
        .arg(target.root())
        .arg("--archive")
        .arg(source.root())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["mode"], "upgrade");
    assert_eq!(json["dry_run"], false);
    assert_eq!(json["counts"]["failed"], 0);
    assert_eq!(json["counts"]["skipped"], 3);

    let entries = json["report"]["entries"].as_array().unwrap();
    let basechat = entries
        .iter()
        .find(|e| e["action"]["target"] == "addons/sourcemod/plugins/chat/basechat.smx")
        .unwrap();
    assert_eq!(basechat["action"]["kind"], "relocate_overwrite");
    assert_eq!(basechat["outcome"]["status"], "applied");
}

#[test]
fn test_fresh_install_requires_license_acceptance() {
    let source = package();
    let target = TestTree::new();
    let config = empty_config();

    sminstall(&config)
        .arg(target.root())
        .arg("--archive")
        .arg(source.root())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--accept-license"))
        .stderr(predicate::str::contains("License agreement was not accepted"));

    assert!(target.files().is_empty());
}

#[test]
fn test_fresh_install_with_accept_license() {
    let source = package();
    let target = TestTree::new();
    let config = empty_config();

    sminstall(&config)
        .arg(target.root())
        .arg("--archive")
        .arg(source.root())
        .arg("--accept-license")
        .assert()
        .success()
        .stdout(predicate::str::contains("Performing full install of SourceMod into"))
        .stdout(predicate::str::contains("Installation complete."));

    assert_eq!(target.read("addons/sourcemod/plugins/basechat.smx"), "basechat-v2");
}

#[test]
fn test_dry_run_changes_nothing() {
    let source = package();
    let target = customised_installation();
    let before = target.files();
    let config = empty_config();

    sminstall(&config)
        .arg(target.root())
        .arg("--archive")
        .arg(source.root())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("(dry run)"))
        .stdout(predicate::str::contains("Dry run: no files were changed."));

    assert_eq!(target.files(), before);
    assert_eq!(target.read("addons/sourcemod/plugins/chat/basechat.smx"), "basechat-v1");
}

#[test]
fn test_no_upgrade_plugins_flag() {
    let source = package();
    let target = customised_installation();
    let config = empty_config();

    sminstall(&config)
        .arg(target.root())
        .arg("--archive")
        .arg(source.root())
        .arg("--no-upgrade-plugins")
        .assert()
        .success()
        .stdout(predicate::str::contains("(plugin upgrades disabled)"));

    assert_eq!(target.read("addons/sourcemod/plugins/chat/basechat.smx"), "basechat-v1");
    assert_eq!(target.read("addons/sourcemod/bin/sourcemod.logic.so"), "logic-v2");
}

#[test]
fn test_config_file_enables_disabled_new_plugins() {
    let source = package().file("addons/sourcemod/plugins/newfeature.smx", "new");
    let target = customised_installation();
    let config = TestTree::new().file("config.toml", "new_plugins_disabled = true\n");

    sminstall(&config)
        .arg(target.root())
        .arg("--archive")
        .arg(source.root())
        .assert()
        .success();

    assert_eq!(target.read("addons/sourcemod/plugins/disabled/newfeature.smx"), "new");
}

#[test]
fn test_failed_file_exits_non_zero_after_applying_the_rest() {
    let source = package();
    let target = customised_installation().file("addons/sourcemod/translations/common.phrases.txt/blocker", "x");
    let config = empty_config();

    sminstall(&config)
        .arg(target.root())
        .arg("--archive")
        .arg(source.root())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("failed addons/sourcemod/translations/common.phrases.txt"))
        .stdout(predicate::str::contains("Upgrade complete.").not())
        .stderr(predicate::str::contains("Upgrade finished with 1 failed file(s)"));

    assert_eq!(target.read("addons/sourcemod/plugins/chat/basechat.smx"), "basechat-v2");
}

#[test]
fn test_missing_package_directory() {
    let target = customised_installation();
    let config = empty_config();
    let missing = TestTree::new();

    sminstall(&config)
        .arg(target.root())
        .arg("--archive")
        .arg(missing.path("nothing-here.zip"))
        .arg("--url")
        .arg("not a url")
        .assert()
        .failure();

    assert_eq!(target.read("addons/sourcemod/bin/sourcemod.logic.so"), "logic-v1");
}

#[test]
fn test_invalid_platform_is_rejected() {
    let config = empty_config();

    sminstall(&config)
        .arg("tf")
        .args(["--platform", "amiga"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("amiga"));
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let source = package();
    let target = customised_installation();
    let config = TestTree::new().file("config.toml", "plugin_dir = \"addons/sourcemod/plugins\"\n");

    sminstall(&config)
        .arg(target.root())
        .arg("--archive")
        .arg(source.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("plugin_dir"));

    assert_eq!(target.read("addons/sourcemod/bin/sourcemod.logic.so"), "logic-v1");
}
