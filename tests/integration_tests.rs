//! Integration tests for drydock
//!
//! These tests exercise the CLI end to end: snapshot files are built with
//! the library's own builder, then served back through the inspection
//! commands, and assistant transcripts are run through `process`.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use drydock::snapshot::SnapshotBuilder;

/// Helper to create a drydock Command
fn drydock() -> Command {
    cargo_bin_cmd!("drydock")
}

/// Helper to create a temporary working directory
fn create_temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Write a small three-file snapshot into `dir` and return its path.
fn write_sample_snapshot(dir: &TempDir) -> PathBuf {
    let snapshot = SnapshotBuilder::new("acme/widgets", "main")
        .add_file("README.md", "# Widgets\n\nA sample project.\n")
        .add_file("src/main.rs", "fn main() {\n    println!(\"widgets\");\n}\n")
        .add_file("src/lib.rs", "pub fn answer() -> u32 {\n    42\n}\n")
        .build();

    let path = dir.path().join("snapshot.json");
    fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();
    path
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_drydock_help() {
        drydock()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("fetch"))
            .stdout(predicate::str::contains("process"));
    }

    #[test]
    fn test_drydock_version() {
        drydock().arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        drydock().arg("frobnicate").assert().failure();
    }
}

// =============================================================================
// Snapshot Inspection Tests
// =============================================================================

mod snapshot_inspection {
    use super::*;

    #[test]
    fn test_ls_lists_all_files() {
        let dir = create_temp_dir();
        let snapshot = write_sample_snapshot(&dir);

        drydock()
            .current_dir(dir.path())
            .arg("ls")
            .arg(&snapshot)
            .assert()
            .success()
            .stdout(predicate::str::contains("README.md"))
            .stdout(predicate::str::contains("src/main.rs"))
            .stdout(predicate::str::contains("src/lib.rs"))
            .stdout(predicate::str::contains("3 file(s)"));
    }

    #[test]
    fn test_ls_with_pattern() {
        let dir = create_temp_dir();
        let snapshot = write_sample_snapshot(&dir);

        drydock()
            .current_dir(dir.path())
            .arg("ls")
            .arg(&snapshot)
            .arg("--pattern")
            .arg("src/*.rs")
            .assert()
            .success()
            .stdout(predicate::str::contains("src/main.rs"))
            .stdout(predicate::str::contains("src/lib.rs"))
            .stdout(predicate::str::contains("README.md").not());
    }

    #[test]
    fn test_ls_pattern_without_matches() {
        let dir = create_temp_dir();
        let snapshot = write_sample_snapshot(&dir);

        drydock()
            .current_dir(dir.path())
            .arg("ls")
            .arg(&snapshot)
            .arg("--pattern")
            .arg("*.py")
            .assert()
            .success()
            .stdout(predicate::str::contains("No files matching *.py"));
    }

    #[test]
    fn test_cat_prints_file_content() {
        let dir = create_temp_dir();
        let snapshot = write_sample_snapshot(&dir);

        drydock()
            .current_dir(dir.path())
            .arg("cat")
            .arg(&snapshot)
            .arg("src/lib.rs")
            .assert()
            .success()
            .stdout(predicate::str::contains("pub fn answer() -> u32"));
    }

    #[test]
    fn test_cat_missing_file_fails() {
        let dir = create_temp_dir();
        let snapshot = write_sample_snapshot(&dir);

        drydock()
            .current_dir(dir.path())
            .arg("cat")
            .arg(&snapshot)
            .arg("src/missing.rs")
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found in snapshot"));
    }

    #[test]
    fn test_info_snapshot_summary() {
        let dir = create_temp_dir();
        let snapshot = write_sample_snapshot(&dir);

        drydock()
            .current_dir(dir.path())
            .arg("info")
            .arg(&snapshot)
            .assert()
            .success()
            .stdout(predicate::str::contains("acme/widgets"))
            .stdout(predicate::str::contains("main"))
            .stdout(predicate::str::contains("Files:      3"));
    }

    #[test]
    fn test_info_single_file_metadata() {
        let dir = create_temp_dir();
        let snapshot = write_sample_snapshot(&dir);

        drydock()
            .current_dir(dir.path())
            .arg("info")
            .arg(&snapshot)
            .arg("--file")
            .arg("src/main.rs")
            .assert()
            .success()
            .stdout(predicate::str::contains("Path:     src/main.rs"))
            .stdout(predicate::str::contains("Name:     main.rs"))
            .stdout(predicate::str::contains("Language: rust"))
            .stdout(predicate::str::contains("Tracked:  true"));
    }

    #[test]
    fn test_invalid_snapshot_file_fails() {
        let dir = create_temp_dir();
        let path = dir.path().join("garbage.json");
        fs::write(&path, "this is not json").unwrap();

        drydock()
            .current_dir(dir.path())
            .arg("ls")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a valid snapshot file"));
    }

    #[test]
    fn test_missing_snapshot_file_fails() {
        let dir = create_temp_dir();

        drydock()
            .current_dir(dir.path())
            .arg("ls")
            .arg(dir.path().join("nope.json"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to read snapshot file"));
    }
}

// =============================================================================
// Response Processing Tests
// =============================================================================

mod response_processing {
    use super::*;

    #[test]
    fn test_process_code_response() {
        let dir = create_temp_dir();
        let transcript = dir.path().join("reply.txt");
        fs::write(
            &transcript,
            "Here is the fix:\n\n```python\ndef add(a, b):\n    return a + b\n```\n",
        )
        .unwrap();

        drydock()
            .current_dir(dir.path())
            .arg("process")
            .arg(&transcript)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"response_type\": \"code\""))
            .stdout(predicate::str::contains("\"language\": \"python\""))
            .stdout(predicate::str::contains("def add(a, b):"));
    }

    #[test]
    fn test_process_diff_response() {
        let dir = create_temp_dir();
        let transcript = dir.path().join("reply.txt");
        fs::write(
            &transcript,
            "--- a/src/app.py\n+++ b/src/app.py\n@@ -1,2 +1,2 @@\n-old_line\n+new_line\n",
        )
        .unwrap();

        drydock()
            .current_dir(dir.path())
            .arg("process")
            .arg(&transcript)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"response_type\": \"diff\""))
            .stdout(predicate::str::contains("src/app.py"));
    }

    #[test]
    fn test_process_reads_stdin() {
        let dir = create_temp_dir();

        drydock()
            .current_dir(dir.path())
            .arg("process")
            .arg("-")
            .write_stdin("Please add `src/util.py` to the chat so I can fix it.")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"file_requests\""))
            .stdout(predicate::str::contains("src/util.py"));
    }

    #[test]
    fn test_process_plain_text() {
        let dir = create_temp_dir();
        let transcript = dir.path().join("reply.txt");
        fs::write(&transcript, "The project looks healthy overall.").unwrap();

        drydock()
            .current_dir(dir.path())
            .arg("process")
            .arg(&transcript)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"response_type\": \"text\""));
    }

    #[test]
    fn test_process_missing_transcript_fails() {
        let dir = create_temp_dir();

        drydock()
            .current_dir(dir.path())
            .arg("process")
            .arg(dir.path().join("absent.txt"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to read transcript"));
    }
}

// =============================================================================
// Configuration Tests
// =============================================================================

mod configuration {
    use super::*;

    #[test]
    fn test_config_dir_flag_with_toml() {
        let config_dir = create_temp_dir();
        fs::write(
            config_dir.path().join("drydock.toml"),
            r#"
[fetch]
max_file_bytes = 65536
max_files = 100

[model]
default = "haiku"
"#,
        )
        .unwrap();

        let dir = create_temp_dir();
        let snapshot = write_sample_snapshot(&dir);

        drydock()
            .current_dir(dir.path())
            .arg("--config-dir")
            .arg(config_dir.path())
            .arg("ls")
            .arg(&snapshot)
            .assert()
            .success()
            .stdout(predicate::str::contains("3 file(s)"));
    }

    #[test]
    fn test_invalid_config_toml_fails() {
        let config_dir = create_temp_dir();
        fs::write(config_dir.path().join("drydock.toml"), "not [valid toml").unwrap();

        drydock()
            .current_dir(config_dir.path())
            .arg("--config-dir")
            .arg(config_dir.path())
            .arg("process")
            .arg("-")
            .write_stdin("hello")
            .assert()
            .failure();
    }

    #[test]
    fn test_runs_without_config_file() {
        let dir = create_temp_dir();
        let snapshot = write_sample_snapshot(&dir);

        drydock()
            .current_dir(dir.path())
            .arg("info")
            .arg(&snapshot)
            .assert()
            .success();
    }
}
