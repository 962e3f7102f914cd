//! Integration tests driving the obs2denote binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn obs2denote() -> Command {
    Command::new(env!("CARGO_BIN_EXE_obs2denote"))
}

fn write_vault(root: &Path) -> PathBuf {
    let vault = root.join("vault");
    fs::create_dir_all(vault.join(".obsidian")).unwrap();
    fs::create_dir_all(vault.join("projects")).unwrap();
    fs::create_dir_all(vault.join("attachments")).unwrap();

    fs::write(
        vault.join("index.md"),
        "---\ntitle: Index\ntags: [main]\ncreated: 2024-01-15\n---\n# Index\nSee [[project1]].",
    )
    .unwrap();
    fs::write(
        vault.join("projects/project1.md"),
        "---\ntitle: Project Alpha\n---\n# Project Alpha\n![[diagram.png]]",
    )
    .unwrap();
    fs::write(vault.join("attachments/diagram.png"), b"fake png data").unwrap();
    vault
}

fn org_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "org"))
        .collect();
    files.sort();
    files
}

#[test]
fn test_directory_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let vault = write_vault(dir.path());
    let out = dir.path().join("out");

    let status = obs2denote().arg(&vault).arg(&out).arg("-q").status().unwrap();
    assert!(status.success());

    let files = org_files(&out);
    assert_eq!(files.len(), 2);

    let index = files
        .iter()
        .find(|p| p.file_name().unwrap().to_string_lossy().contains("index"))
        .unwrap();
    assert!(index.file_name().unwrap().to_string_lossy().starts_with("20240115T000000--index"));
    let content = fs::read_to_string(index).unwrap();
    assert!(content.contains("#+title: Index"));

    // the referenced asset was copied and renamed
    let assets: Vec<_> = fs::read_dir(out.join("assets")).unwrap().collect();
    assert_eq!(assets.len(), 1);
}

#[test]
fn test_single_file_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let note = dir.path().join("note.md");
    fs::write(&note, "---\ntitle: Solo\ncreated: 2024-06-01\n---\nbody").unwrap();
    let out = dir.path().join("out");

    let output = obs2denote().arg(&note).arg(&out).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("20240601T000000--solo.org"));
    assert!(out.join("20240601T000000--solo.org").exists());
}

#[test]
fn test_markdown_format_flag() {
    let dir = tempfile::tempdir().unwrap();
    let vault = write_vault(dir.path());
    let out = dir.path().join("out");

    let status = obs2denote()
        .arg(&vault)
        .arg(&out)
        .args(["-f", "md", "-q"])
        .status()
        .unwrap();
    assert!(status.success());

    let md_files: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "md"))
        .collect();
    assert_eq!(md_files.len(), 2);

    let content = fs::read_to_string(&md_files[0]).unwrap();
    assert!(content.starts_with("---\n"));
    assert!(content.contains("identifier: "));
}

#[test]
fn test_preserve_structure() {
    let dir = tempfile::tempdir().unwrap();
    let vault = write_vault(dir.path());
    let out = dir.path().join("out");

    let status = obs2denote()
        .arg(&vault)
        .arg(&out)
        .args(["--preserve-structure", "-q"])
        .status()
        .unwrap();
    assert!(status.success());

    assert_eq!(org_files(&out).len(), 1);
    assert_eq!(org_files(&out.join("projects")).len(), 1);
}

#[test]
fn test_invalid_input_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = obs2denote()
        .arg(dir.path().join("does-not-exist"))
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("neither a file nor a directory"));
}

#[test]
fn test_per_file_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let vault = write_vault(dir.path());
    // Invalid UTF-8 fails to read as a string but must not abort the batch.
    fs::write(vault.join("broken.md"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();
    let out = dir.path().join("out");

    let output = obs2denote().arg(&vault).arg(&out).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Converted 2 files, 1 failed"));
}

#[test]
fn test_config_file_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let vault = write_vault(dir.path());
    fs::write(vault.join("_obs2denote.toml"), "[output]\nformat = \"md\"\n").unwrap();
    let out = dir.path().join("out");

    let status = obs2denote().arg(&vault).arg(&out).arg("-q").status().unwrap();
    assert!(status.success());

    let md_files: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "md"))
        .collect();
    assert_eq!(md_files.len(), 2);
    assert!(org_files(&out).is_empty());
}
