use std::error::Error;
use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("pbxgen")?)
}

fn touch(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path.parent().unwrap())?;
    fs::write(path, "")?;
    Ok(())
}

const MANIFEST: &str = r#"{
    "name": "Demo",
    "bundle_identifier": "com.example.demo",
    "targets": [
        { "name": "Demo", "root": "Demo", "resources": ["Data/seed.json"] },
        { "name": "DemoWidget", "kind": "app-extension", "root": "Widget" }
    ]
}"#;

fn demo_layout(root: &Path) -> Result<(), Box<dyn Error>> {
    touch(&root.join("Demo/DemoApp.swift"))?;
    touch(&root.join("Demo/Views/Home.swift"))?;
    touch(&root.join("Demo/Data/seed.json"))?;
    touch(&root.join("Widget/Widget.swift"))?;
    fs::write(root.join("pbxgen.json"), MANIFEST)?;
    Ok(())
}

#[test]
fn generate_writes_project_from_manifest() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    demo_layout(dir.path())?;

    cli()?
        .args(["--root", dir.path().to_str().unwrap(), "generate"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Generated")
                .and(predicate::str::contains("Demo: 2 sources, 1 resources"))
                .and(predicate::str::contains("DemoWidget: 1 sources, 0 resources")),
        );

    let pbxproj = dir.path().join("Demo.xcodeproj").join("project.pbxproj");
    let contents = fs::read_to_string(&pbxproj)?;
    assert!(contents.contains("/* Home.swift in Sources */"));
    assert!(contents.contains("/* seed.json in Resources */"));
    assert!(contents.contains("PRODUCT_BUNDLE_IDENTIFIER = com.example.demo.DemoWidget;"));

    cli()?
        .args(["--root", dir.path().to_str().unwrap(), "generate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is up to date"));
    assert_eq!(fs::read_to_string(&pbxproj)?, contents);

    Ok(())
}

#[test]
fn dry_run_prints_descriptor_without_writing() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    demo_layout(dir.path())?;

    cli()?
        .args(["--root", dir.path().to_str().unwrap(), "generate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("// !$*UTF8*$!"));

    assert!(!dir.path().join("Demo.xcodeproj").exists());
    Ok(())
}

#[test]
fn missing_scan_root_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    demo_layout(dir.path())?;
    fs::remove_dir_all(dir.path().join("Widget"))?;

    cli()?
        .args(["--root", dir.path().to_str().unwrap(), "generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    Ok(())
}

#[test]
fn explicit_missing_manifest_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    cli()?
        .args([
            "--root",
            dir.path().to_str().unwrap(),
            "generate",
            "--manifest",
            "absent.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));

    Ok(())
}

#[test]
fn init_writes_default_manifest_once() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    cli()?
        .args(["--root", dir.path().to_str().unwrap(), "init"])
        .assert()
        .success();
    let manifest = fs::read_to_string(dir.path().join("pbxgen.json"))?;
    assert!(manifest.contains("\"PoemForTheMoment\""));
    assert!(manifest.contains("\"NotificationContent\""));

    cli()?
        .args(["--root", dir.path().to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    cli()?
        .args(["--root", dir.path().to_str().unwrap(), "init", "--force"])
        .assert()
        .success();

    Ok(())
}
