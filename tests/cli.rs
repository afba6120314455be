//! 命令行工具冒烟测试

#![cfg(feature = "cli")]

use std::fs;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{search_response, watch_response};

fn write_json(dir: &TempDir, name: &str, value: &Value) -> String {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_vec(value).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_process_writes_patched_json() {
    let dir = TempDir::new().unwrap();
    let original = write_json(&dir, "original.json", &search_response("Titre", &["traduit"], "Chaîne"));
    let clean = write_json(&dir, "clean.json", &search_response("Title", &["original"], "Channel"));
    let output = dir.path().join("patched.json");

    Command::cargo_bin("notranslate")
        .unwrap()
        .args(["process", "--original", &original, "--clean", &clean, "--descriptions"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let patched: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let video = &patched["contents"]["sectionListRenderer"]["contents"][0]["itemSectionRenderer"]
        ["contents"][0]["videoRenderer"];
    assert_eq!(video["title"]["runs"][0]["text"], "Title");
    assert_eq!(video["descriptionSnippet"]["runs"][0]["text"], "original");

    println!("✅ CLI process wrote patched JSON");
}

#[test]
fn test_process_without_titles() {
    let dir = TempDir::new().unwrap();
    let translated = search_response("Titre", &["traduit"], "Chaîne");
    let original = write_json(&dir, "original.json", &translated);
    let clean = write_json(&dir, "clean.json", &search_response("Title", &["original"], "Channel"));

    let assert = Command::cargo_bin("notranslate")
        .unwrap()
        .args(["process", "--original", &original, "--clean", &clean, "--no-titles"])
        .assert()
        .success();

    let stdout: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(stdout, translated);

    println!("✅ CLI respected --no-titles");
}

#[test]
fn test_chapters_from_response() {
    let dir = TempDir::new().unwrap();
    let input = write_json(
        &dir,
        "watch.json",
        &watch_response("Title", "0:00 Intro\n1:02:03 Finale"),
    );

    let assert = Command::cargo_bin("notranslate")
        .unwrap()
        .args(["chapters", "--input", &input])
        .assert()
        .success();

    let chapters: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(chapters[1]["start_seconds"], 3723);
    assert_eq!(chapters[1]["title"], "Finale");

    println!("✅ CLI parsed chapters");
}

#[test]
fn test_missing_input_fails() {
    Command::cargo_bin("notranslate")
        .unwrap()
        .args(["extract", "--input", "/nonexistent/response.json"])
        .assert()
        .failure();

    println!("✅ CLI reported missing file");
}

#[test]
fn test_env_docs_lists_variables() {
    let assert = Command::cargo_bin("notranslate")
        .unwrap()
        .arg("env-docs")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("NOTRANSLATE_LOG_LEVEL"));

    println!("✅ CLI printed env docs");
}
