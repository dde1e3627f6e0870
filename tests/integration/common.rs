//! Shared fixtures: a small but realistic SourceMod package and installation.

use assert_cmd::Command;
use sminstall_cli::test_utils::{TestTree, init_test_logging};

pub const LICENSE: &str = "SOURCEMOD LICENSE\nGNU General Public License v3\n";

/// Files of a stock package, as `(path, content)`.
pub const PACKAGE_FILES: &[(&str, &str)] = &[
    ("addons/metamod/sourcemod.vdf", "\"Metamod Plugin\" { \"file\" \"addons/sourcemod/bin/sourcemod_mm\" }"),
    ("addons/sourcemod/LICENSE.txt", LICENSE),
    ("addons/sourcemod/bin/sourcemod.logic.so", "logic-v2"),
    ("addons/sourcemod/configs/admins_simple.ini", "// stock admins"),
    ("addons/sourcemod/configs/core.cfg", "\"Core\" { \"Logging\" \"on\" }"),
    ("addons/sourcemod/plugins/admin-flatfile.smx", "admin-flatfile-v2"),
    ("addons/sourcemod/plugins/basechat.smx", "basechat-v2"),
    ("addons/sourcemod/plugins/funcommands.smx", "funcommands-v2"),
    ("addons/sourcemod/scripting/basechat.sp", "// basechat source v2"),
    ("addons/sourcemod/translations/common.phrases.txt", "\"Phrases\" { v2 }"),
    ("cfg/sourcemod/sourcemod.cfg", "sm_show_activity 13"),
];

pub fn package() -> TestTree {
    init_test_logging(None);
    PACKAGE_FILES.iter().fold(TestTree::new(), |tree, (rel, content)| tree.file(rel, *content))
}

/// An installation of an older release that the operator has customised:
/// edited `core.cfg` and `cfg/sourcemod/sourcemod.cfg`, `funcommands.smx` moved into `plugins/disabled/`,
/// `basechat.smx` moved into `plugins/chat/`, and a third-party plugin.
pub fn customised_installation() -> TestTree {
    TestTree::new()
        .file("addons/metamod/sourcemod.vdf", "old vdf")
        .file("addons/sourcemod/bin/sourcemod.logic.so", "logic-v1")
        .file("addons/sourcemod/configs/core.cfg", "\"Core\" { \"Logging\" \"off\" } // operator")
        .file("addons/sourcemod/configs/admins_simple.ini", "\"STEAM_0:1:1\" \"99:z\"")
        .file("addons/sourcemod/plugins/admin-flatfile.smx", "admin-flatfile-v1")
        .file("addons/sourcemod/plugins/chat/basechat.smx", "basechat-v1")
        .file("addons/sourcemod/plugins/disabled/funcommands.smx", "funcommands-v1")
        .file("addons/sourcemod/plugins/thirdparty/rtv_extended.smx", "third party")
        .file("addons/sourcemod/scripting/basechat.sp", "// basechat source v1")
        .file("addons/sourcemod/logs/L20240101.log", "log line")
        .file("cfg/sourcemod/sourcemod.cfg", "sm_show_activity 0 // operator")
}

/// A directory holding an empty `config.toml`, so runs never pick up the
/// developer's own `~/.sminstall/config.toml`.
pub fn empty_config() -> TestTree {
    TestTree::new().file("config.toml", "")
}

/// The `sminstall` binary with progress and colour off, reading `config/config.toml`.
pub fn sminstall(config: &TestTree) -> Command {
    let mut cmd = Command::cargo_bin("sminstall").expect("sminstall binary");
    cmd.env("NO_COLOR", "1")
        .env_remove("SMINSTALL_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--no-progress")
        .arg("--config")
        .arg(config.path("config.toml"));
    cmd
}
