//! Integration tests for the `review-sweep` binary
//!
//! These run the compiled binary against a temporary workspace and only use
//! URL lists that need no network.

use crate::common::Workspace;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Writes a config pointing every path into `workspace`
fn write_config(workspace: &Workspace) -> PathBuf {
    let path = workspace.dir.path().join("review-sweep.toml");
    let content = format!(
        r#"
[crawler]
workers = 2
settle-delay = {{ min-ms = 0, max-ms = 0 }}
scroll-pause = {{ min-ms = 0, max-ms = 0 }}
politeness-pause = {{ min-ms = 0, max-ms = 0 }}

[input]
url-list = "{}"

[output]
dataset-dir = "{}"
history-path = "{}"
"#,
        workspace.url_list().display(),
        workspace.dataset_dir().display(),
        workspace.history_path().display()
    );
    fs::write(&path, content).expect("Failed to write config");
    path
}

fn run_binary(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_review-sweep"))
        .args(args)
        .output()
        .expect("Failed to run review-sweep")
}

#[test]
fn test_fresh_with_missing_url_list_keeps_history() {
    let workspace = Workspace::new();
    let config = write_config(&workspace);
    fs::write(workspace.history_path(), "https://example.com/ha-noi/pho-thin\n").unwrap();

    let output = run_binary(&[config.to_str().unwrap(), "--fresh", "-q"]);

    assert!(!output.status.success());
    assert_eq!(
        workspace.history_lines(),
        vec!["https://example.com/ha-noi/pho-thin"]
    );
}

#[test]
fn test_fresh_with_url_list_resets_history() {
    let workspace = Workspace::new();
    let config = write_config(&workspace);
    workspace.write_url_list(&[]);
    fs::write(workspace.history_path(), "https://example.com/ha-noi/pho-thin\n").unwrap();

    let output = run_binary(&[config.to_str().unwrap(), "--fresh", "-q"]);

    assert!(output.status.success());
    assert!(!workspace.history_path().exists());
}

#[test]
fn test_missing_url_list_exits_non_zero() {
    let workspace = Workspace::new();
    let config = write_config(&workspace);

    let output = run_binary(&[config.to_str().unwrap(), "-q"]);

    assert!(!output.status.success());
    assert!(!workspace.history_path().exists());
    assert!(!workspace.dataset_dir().exists());
}

#[test]
fn test_stats_counts_torn_shard_line() {
    let workspace = Workspace::new();
    let config = write_config(&workspace);
    fs::create_dir_all(workspace.dataset_dir()).unwrap();

    let mut shard = br#"{"review_id":"ha-noi_12345","source_name":"pho-thin","locality":"ha-noi","author":"Lan","text":"Ngon","score":8.0}"#.to_vec();
    shard.push(b'\n');
    shard.extend_from_slice(b"{\"review_id\":\"ha-noi_54321\",\"text\":\"Ngon qu");
    shard.push(0xC3);
    fs::write(workspace.dataset_dir().join("reviews_MienBac.jsonl"), shard).unwrap();

    let output = run_binary(&[config.to_str().unwrap(), "--stats"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Reviews stored: 1"));
    assert!(stdout.contains("MienBac: 1 malformed, 0 without text"));
}
