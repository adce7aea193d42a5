use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn scan_lists_matching_files() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("Views"))?;
    fs::write(dir.path().join("App.swift"), "")?;
    fs::write(dir.path().join("Views/Home.swift"), "")?;
    fs::write(dir.path().join("notes.md"), "")?;

    Command::cargo_bin("pbxgen")?
        .args(["scan", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("App.swift")
                .and(predicate::str::contains("Home.swift"))
                .and(predicate::str::contains("notes.md").not()),
        );

    Ok(())
}

#[test]
fn scan_emits_json_report() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("a.m"), "")?;
    fs::write(dir.path().join("a.h"), "")?;
    fs::write(dir.path().join("a.swift"), "")?;

    let output = Command::cargo_bin("pbxgen")?
        .args(["scan", dir.path().to_str().unwrap(), "--ext", "m", "--ext", "h", "--json"])
        .output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["filter"], serde_json::json!(["m", "h"]));
    assert_eq!(report["files"].as_array().unwrap().len(), 2);

    Ok(())
}

#[test]
fn scan_of_missing_directory_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    Command::cargo_bin("pbxgen")?
        .args(["scan", dir.path().join("nope").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    Ok(())
}
