//! CLI integration tests for easel.
//!
//! These run the real binary against small on-disk projects. The projects
//! used here have no extension and no translations, so no external tools
//! are needed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the easel binary command.
fn easel() -> Command {
    let mut cmd = Command::cargo_bin("easel").unwrap();
    cmd.env_remove("EASEL_LOG");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

const TOOL_MANIFEST: &str = r#"
[package]
name = "tool"
version = "0.1.0"
packages = ["tool"]
scripts = ["tool.py"]

[version]
text = 'BUILD_VERSION = "0.1.0"'
"#;

/// Write a scripts-only project and return its root.
fn tool_project(dir: &Path) -> PathBuf {
    let root = dir.join("tool-project");
    fs::create_dir_all(root.join("tool")).unwrap();
    fs::write(root.join("Easel.toml"), TOOL_MANIFEST).unwrap();
    fs::write(root.join("tool/__init__.py"), "").unwrap();
    fs::write(root.join("tool/cli.py"), "def main():\n    pass\n").unwrap();
    fs::write(
        root.join("tool.py"),
        "#!/usr/bin/env python3\nimport tool.cli\ntool.cli.main()\n",
    )
    .unwrap();
    root
}

// ============================================================================
// global flags
// ============================================================================

#[test]
fn test_help_lists_commands() {
    easel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build_ext"))
        .stdout(predicate::str::contains("build_translations"))
        .stdout(predicate::str::contains("install_scripts"))
        .stdout(predicate::str::contains("run_build"));
}

#[test]
fn test_version() {
    easel()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("easel"));
}

#[test]
fn test_missing_manifest_fails() {
    let tmp = temp_dir();

    easel()
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("Easel.toml"));
}

#[test]
fn test_malformed_manifest_reports_parse_error() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("Easel.toml"), "[package]\nname = 3\n").unwrap();

    easel()
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Easel.toml"));
}

// ============================================================================
// easel build
// ============================================================================

#[test]
fn test_build_stages_sources_and_scripts() {
    let tmp = temp_dir();
    let root = tool_project(tmp.path());

    easel().arg("build").current_dir(&root).assert().success();

    assert!(root.join("build/lib/tool/__init__.py").is_file());
    assert!(root.join("build/lib/tool/cli.py").is_file());
    assert!(root.join("build/scripts/tool.py").is_file());
}

#[test]
fn test_build_from_subdirectory() {
    let tmp = temp_dir();
    let root = tool_project(tmp.path());

    easel().arg("build").current_dir(root.join("tool")).assert().success();

    assert!(root.join("build/scripts/tool.py").is_file());
}

#[test]
fn test_dry_run_build_writes_nothing() {
    let tmp = temp_dir();
    let root = tool_project(tmp.path());

    easel()
        .args(["--dry-run", "build"])
        .current_dir(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("would copy"));

    assert!(!root.join("build").exists());
}

#[test]
fn test_manifest_path_flag() {
    let tmp = temp_dir();
    let root = tool_project(tmp.path());

    easel()
        .args(["build", "--manifest-path", "tool-project/Easel.toml"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(root.join("build/lib/tool/cli.py").is_file());
}

#[test]
fn test_build_ext_without_extension_is_noop() {
    let tmp = temp_dir();
    let root = tool_project(tmp.path());

    easel().arg("build_ext").current_dir(&root).assert().success();

    assert!(!root.join("build/lib").exists());
}

#[test]
fn test_flags_without_extension_fails() {
    let tmp = temp_dir();
    let root = tool_project(tmp.path());

    easel()
        .arg("flags")
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no [extension] table"));
}

// ============================================================================
// easel install_scripts
// ============================================================================

#[test]
fn test_install_scripts_injects_header() {
    let tmp = temp_dir();
    let root = tool_project(tmp.path());
    let bin = tmp.path().join("bin");

    easel()
        .args(["install_scripts", "--install-dir"])
        .arg(&bin)
        .current_dir(&root)
        .assert()
        .success();

    let installed = fs::read_to_string(bin.join("tool")).unwrap();
    assert!(installed.starts_with("#!/usr/bin/env python3\n"));
    assert!(installed.contains("BUILD_VERSION = \"0.1.0\""));
    assert!(installed.ends_with("tool.cli.main()\n"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(bin.join("tool")).unwrap().permissions().mode();
        assert_eq!(mode & 0o555, 0o555);
    }
}

#[test]
fn test_install_scripts_writes_record() {
    let tmp = temp_dir();
    let root = tool_project(tmp.path());

    easel()
        .args(["install_scripts", "--install-dir", "out/bin", "--record", "record.json"])
        .current_dir(&root)
        .assert()
        .success();

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("record.json")).unwrap()).unwrap();
    let files = record["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0]["path"].as_str().unwrap().ends_with("tool"));
}

#[test]
fn test_install_scripts_without_destination_fails() {
    let tmp = temp_dir();
    let root = tool_project(tmp.path());

    easel()
        .arg("install_scripts")
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--install-dir"));
}

// ============================================================================
// easel run_build
// ============================================================================

#[test]
fn test_testdrive_alias_dry_run() {
    let tmp = temp_dir();
    let root = tool_project(tmp.path());

    easel()
        .args(["--dry-run", "testdrive", "--", "--verbose"])
        .current_dir(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("would run"))
        .stderr(predicate::str::contains("--verbose"));
}

// ============================================================================
// easel completions
// ============================================================================

#[test]
fn test_completions_bash() {
    easel()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("easel"));
}

// ============================================================================
// stub tools (Unix)
// ============================================================================

#[cfg(unix)]
mod stub_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Write an executable shell script.
    fn stub(dir: &Path, name: &str, body: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// msgfmt stand-in that creates whatever follows `-o`.
    fn msgfmt_stub(dir: &Path) -> PathBuf {
        stub(
            dir,
            "msgfmt",
            "out=\"\"\n\
             while [ $# -gt 0 ]; do\n\
             \x20 if [ \"$1\" = \"-o\" ]; then out=\"$2\"; fi\n\
             \x20 shift\n\
             done\n\
             : > \"$out\"\n",
        )
    }

    fn translated_project(dir: &Path) -> PathBuf {
        let root = tool_project(dir);
        let manifest =
            format!("{}\n[translations]\nsource-dir = \"po\"\ndomain = \"tool\"\n", TOOL_MANIFEST);
        fs::write(root.join("Easel.toml"), manifest).unwrap();
        fs::create_dir_all(root.join("po")).unwrap();
        fs::write(root.join("po/de.po"), "msgid \"\"\nmsgstr \"\"\n").unwrap();
        fs::write(root.join("po/fr.po"), "msgid \"\"\nmsgstr \"\"\n").unwrap();
        root
    }

    #[test]
    fn test_build_translations_with_stub_msgfmt() {
        let tmp = temp_dir();
        let root = translated_project(tmp.path());
        let msgfmt = msgfmt_stub(&tmp.path().join("stubs"));

        easel()
            .arg("build_translations")
            .env("MSGFMT", &msgfmt)
            .current_dir(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("Compiled 2 catalog(s)"))
            .stderr(predicate::str::contains("running"));

        assert!(root.join("build/temp/locale/de/LC_MESSAGES/tool.mo").is_file());
        assert!(root.join("build/temp/locale/fr/LC_MESSAGES/tool.mo").is_file());

        // Second run finds everything fresh.
        easel()
            .arg("build_translations")
            .env("MSGFMT", &msgfmt)
            .current_dir(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("Compiled 0 catalog(s)"))
            .stderr(predicate::str::contains("running").not());
    }

    #[test]
    fn test_failing_msgfmt_exits_with_error() {
        let tmp = temp_dir();
        let root = translated_project(tmp.path());
        let msgfmt = stub(&tmp.path().join("stubs"), "msgfmt", "echo 'bad catalog' >&2\nexit 1\n");

        easel()
            .arg("build_translations")
            .env("MSGFMT", &msgfmt)
            .current_dir(&root)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("error:"))
            .stderr(predicate::str::contains("bad catalog"));
    }

    #[test]
    fn test_silent_msgfmt_is_consistency_error() {
        let tmp = temp_dir();
        let root = translated_project(tmp.path());
        let msgfmt = stub(&tmp.path().join("stubs"), "msgfmt", "exit 0\n");

        easel()
            .arg("build_translations")
            .env("MSGFMT", &msgfmt)
            .current_dir(&root)
            .assert()
            .failure()
            .stderr(predicate::str::contains("tool.mo"));
    }

    #[test]
    fn test_flags_with_stub_pkg_config() {
        let tmp = temp_dir();
        let root = tool_project(tmp.path());
        let manifest = format!(
            "{}\n[extension]\nname = \"_tool\"\nsources = [\"tool/ext.cpp\"]\npackages = [\"libfoo\"]\n",
            TOOL_MANIFEST
        );
        fs::write(root.join("Easel.toml"), manifest).unwrap();
        let pkg_config = stub(
            &tmp.path().join("stubs"),
            "pkg-config",
            "case \"$1\" in\n\
             \x20 --libs) echo '-L/opt/foo/lib -lfoo' ;;\n\
             \x20 --cflags) echo '-I/opt/foo/include -DFOO' ;;\n\
             esac\n",
        );

        easel()
            .args(["flags", "--compile"])
            .env("PKG_CONFIG", &pkg_config)
            .current_dir(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("-I/opt/foo/include"))
            .stdout(predicate::str::contains("-DFOO"))
            .stdout(predicate::str::contains("-lfoo").not());

        easel()
            .args(["flags", "--link"])
            .env("PKG_CONFIG", &pkg_config)
            .current_dir(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("-L/opt/foo/lib"))
            .stdout(predicate::str::contains("-lfoo"));
    }

    #[test]
    fn test_missing_pkg_config_is_configuration_error() {
        let tmp = temp_dir();
        let root = tool_project(tmp.path());
        let manifest = format!(
            "{}\n[extension]\nname = \"_tool\"\nsources = [\"tool/ext.cpp\"]\npackages = [\"libfoo\"]\n",
            TOOL_MANIFEST
        );
        fs::write(root.join("Easel.toml"), manifest).unwrap();

        easel()
            .arg("flags")
            .env("PKG_CONFIG", tmp.path().join("no-such-pkg-config"))
            .current_dir(&root)
            .assert()
            .failure()
            .stderr(predicate::str::contains("error:"));
    }
}
