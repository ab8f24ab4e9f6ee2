//! End-to-end CLI tests for the wordcounter binary.

#![allow(deprecated)]

mod support;

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use support::article_html;
use support::socket_guard::start_mock_server_or_skip;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_lines(dir: &Path, name: &str, lines: &[String]) -> std::path::PathBuf {
    let file = dir.join(name);
    std::fs::write(&file, lines.join("\n")).unwrap();
    file
}

fn bank_file(dir: &Path) -> std::path::PathBuf {
    let words: Vec<String> = ["The", "cart", "SMART", "news", "design", "go"]
        .iter()
        .map(ToString::to_string)
        .collect();
    write_lines(dir, "bank.txt", &words)
}

async fn mount_articles(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_html(
            "The Smart Cart",
            "smart design",
            &["The cart is smart."],
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_html(
            "Cart news",
            "",
            &["A cart and another cart.", "Go go go."],
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

fn report(stdout: &[u8]) -> Vec<(String, u64)> {
    let json: Value = serde_json::from_slice(stdout).expect("stdout is JSON");
    json.as_array()
        .expect("report is an array")
        .iter()
        .map(|entry| {
            (
                entry["word"].as_str().unwrap().to_string(),
                entry["count"].as_u64().unwrap(),
            )
        })
        .collect()
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("wordcounter").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetch a batch of articles"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("wordcounter").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wordcounter"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("wordcounter").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_missing_urls_file_fails() {
    let dir = TempDir::new().unwrap();
    let bank = bank_file(dir.path());

    let mut cmd = Command::cargo_bin("wordcounter").unwrap();
    cmd.arg(dir.path().join("absent.txt"))
        .arg("--bank")
        .arg(&bank)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error reading URLs"));
}

#[test]
fn test_binary_missing_bank_file_fails() {
    let dir = TempDir::new().unwrap();
    let urls = write_lines(dir.path(), "urls.txt", &["http://127.0.0.1:9/a".to_string()]);

    let mut cmd = Command::cargo_bin("wordcounter").unwrap();
    cmd.arg(&urls)
        .arg("--bank")
        .arg(dir.path().join("absent_bank.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error reading word bank"));
}

#[test]
fn test_binary_rejects_sub_unit_rate_limit() {
    let dir = TempDir::new().unwrap();
    let urls = write_lines(dir.path(), "urls.txt", &[]);
    let bank = bank_file(dir.path());

    let mut cmd = Command::cargo_bin("wordcounter").unwrap();
    cmd.arg(&urls)
        .arg("--bank")
        .arg(&bank)
        .args(["--rate-limit", "0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pipeline configuration"));
}

#[test]
fn test_binary_empty_url_list_prints_empty_report() {
    let dir = TempDir::new().unwrap();
    let urls = write_lines(dir.path(), "urls.txt", &[String::new(), "   ".to_string()]);
    let bank = bank_file(dir.path());

    let mut cmd = Command::cargo_bin("wordcounter").unwrap();
    let assert = cmd
        .arg(&urls)
        .arg("--bank")
        .arg(&bank)
        .arg("-q")
        .assert()
        .success();

    assert!(report(&assert.get_output().stdout).is_empty());
}

#[tokio::test]
async fn test_binary_reports_top_words_and_tolerates_failures() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_articles(&server).await;

    let dir = TempDir::new().unwrap();
    let urls = write_lines(
        dir.path(),
        "urls.txt",
        &[
            format!("{}/one", server.uri()),
            String::new(),
            format!("  {}/two  ", server.uri()),
            format!("{}/missing", server.uri()),
        ],
    );
    let bank = bank_file(dir.path());

    let mut cmd = Command::cargo_bin("wordcounter").unwrap();
    let assert = cmd
        .arg(&urls)
        .arg("--bank")
        .arg(&bank)
        .arg("-q")
        .assert()
        .success();

    let words = report(&assert.get_output().stdout);
    assert_eq!(
        words,
        vec![
            ("cart".to_string(), 5),
            ("smart".to_string(), 3),
            ("the".to_string(), 2),
            ("design".to_string(), 1),
            ("news".to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn test_binary_top_flag_limits_report() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_articles(&server).await;

    let dir = TempDir::new().unwrap();
    let urls = write_lines(
        dir.path(),
        "urls.txt",
        &[
            format!("{}/one", server.uri()),
            format!("{}/two", server.uri()),
        ],
    );
    let bank = bank_file(dir.path());

    let mut cmd = Command::cargo_bin("wordcounter").unwrap();
    let assert = cmd
        .arg(&urls)
        .arg("--bank")
        .arg(&bank)
        .args(["--top", "2", "-q"])
        .assert()
        .success();

    let words = report(&assert.get_output().stdout);
    assert_eq!(
        words,
        vec![("cart".to_string(), 5), ("smart".to_string(), 3)]
    );
}

#[tokio::test]
async fn test_binary_logs_failed_urls_to_stderr() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_articles(&server).await;

    let dir = TempDir::new().unwrap();
    let urls = write_lines(
        dir.path(),
        "urls.txt",
        &[format!("{}/missing", server.uri())],
    );
    let bank = bank_file(dir.path());

    let mut cmd = Command::cargo_bin("wordcounter").unwrap();
    cmd.arg(&urls)
        .arg("--bank")
        .arg(&bank)
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("Error fetching URL"))
        .stderr(predicate::str::contains("/missing"));
}
