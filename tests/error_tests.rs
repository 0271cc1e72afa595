//! Error scenario integration tests

use assert_cmd::Command;
use predicates::prelude::*;

fn common_clipboard_bin() -> Command {
    Command::cargo_bin("common-clipboard").expect("binary is built")
}

#[test]
fn config_get_unknown_key() {
    common_clipboard_bin()
        .args(["config", "get", "unknown_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_unknown_key() {
    common_clipboard_bin()
        .args(["config", "set", "unknown_key", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Valid keys"));
}

#[cfg(target_os = "linux")]
mod isolated {
    use super::*;
    use std::path::Path;

    fn isolated_bin(home: &Path) -> Command {
        let mut cmd = common_clipboard_bin();
        cmd.env("HOME", home)
            .env("XDG_CONFIG_HOME", home.join("config"))
            .env("XDG_RUNTIME_DIR", home)
            .env_remove("COMMON_CLIPBOARD_PORT")
            .env_remove("RUST_LOG");
        cmd
    }

    fn write_config(home: &Path, content: &str) {
        let dir = home.join("config").join("common-clipboard");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), content).unwrap();
    }

    #[test]
    fn config_set_rejects_invalid_port() {
        let home = tempfile::tempdir().unwrap();
        isolated_bin(home.path())
            .args(["config", "set", "port", "0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("port"));
    }

    #[test]
    fn config_set_then_get() {
        let home = tempfile::tempdir().unwrap();
        isolated_bin(home.path())
            .args(["config", "set", "tick_interval", "500ms"])
            .assert()
            .success();

        isolated_bin(home.path())
            .args(["config", "get", "tick_interval"])
            .assert()
            .success()
            .stdout(predicate::str::contains("500ms"));

        isolated_bin(home.path())
            .args(["config", "get", "port"])
            .assert()
            .success()
            .stdout(predicate::str::contains("(not set)"));
    }

    #[test]
    fn config_init_twice_fails() {
        let home = tempfile::tempdir().unwrap();
        isolated_bin(home.path()).args(["config", "init"]).assert().success();
        isolated_bin(home.path())
            .args(["config", "init"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn invalid_backend_is_usage_error() {
        let home = tempfile::tempdir().unwrap();
        isolated_bin(home.path())
            .args(["--backend", "x11"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid clipboard backend"));
    }

    #[test]
    fn malformed_config_file_value_is_usage_error() {
        let home = tempfile::tempdir().unwrap();
        write_config(home.path(), "tick_interval = \"fast\"\n");
        isolated_bin(home.path())
            .assert()
            .code(2)
            .stderr(predicate::str::contains("tick_interval"));
    }

    #[test]
    fn ctl_without_running_node() {
        let home = tempfile::tempdir().unwrap();
        isolated_bin(home.path())
            .args(["ctl", "status"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No node running"));
    }
}
