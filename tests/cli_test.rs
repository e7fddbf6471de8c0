use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn htmltxt() -> Command {
    let mut cmd = Command::cargo_bin("htmltxt").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn single_file_to_stdout() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, "<html><title>T</title><h1>Hi</h1><p>Body</p></html>").unwrap();

    htmltxt()
        .arg(&page)
        .arg("--stdout")
        .arg("--quiet")
        .assert()
        .success()
        .stdout("T\n\n\nHI\nBody\n");
}

#[test]
fn folder_saved_with_txt_extension() {
    let dir = TempDir::new().unwrap();
    let site = dir.path().join("site");
    fs::create_dir(&site).unwrap();
    fs::write(site.join("index.html"), "<ul><li>one</li><li>two</li></ul>").unwrap();
    fs::write(site.join("style.css"), "p { color: red }").unwrap();

    let target = dir.path().join("combined");
    htmltxt()
        .arg(&site)
        .arg("--output")
        .arg(&target)
        .arg("--quiet")
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("combined.txt")).unwrap();
    assert_eq!(written, "one\ntwo\n");
}

#[test]
fn failing_file_degrades_to_empty_contribution() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("good.html"), "<p>good</p>").unwrap();
    fs::write(dir.path().join("bad.html"), [0xff, 0xfe, 0x00]).unwrap();

    let output = htmltxt()
        .arg(dir.path())
        .arg("--stdout")
        .arg("--quiet")
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    assert!(text == "good\n\n\n" || text == "\n\ngood\n");
}

#[test]
fn folder_without_html_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "nothing here").unwrap();

    htmltxt()
        .arg(dir.path())
        .arg("--stdout")
        .arg("--output-format")
        .arg("plain")
        .assert()
        .code(6)
        .stderr(predicate::str::contains("No files with extensions html, htm"));
}

#[test]
fn missing_save_path_cancels() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.html"), "<p>a</p>").unwrap();

    htmltxt()
        .arg(dir.path())
        .arg("--output-format")
        .arg("plain")
        .assert()
        .code(10)
        .stderr(predicate::str::contains("File save operation was canceled."));
}

#[test]
fn existing_output_needs_force() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, "<p>fresh</p>").unwrap();
    let target = dir.path().join("out.txt");
    fs::write(&target, "stale").unwrap();

    htmltxt()
        .arg(&page)
        .arg("-o")
        .arg(&target)
        .arg("-q")
        .assert()
        .code(8);
    assert_eq!(fs::read_to_string(&target).unwrap(), "stale");

    htmltxt()
        .arg(&page)
        .arg("-o")
        .arg(&target)
        .arg("-q")
        .arg("--force")
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&target).unwrap(), "fresh\n");
}

#[test]
fn dedupe_nested_flag() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("nested.html");
    fs::write(&page, "<ul><li>outer <p>inner</p></li></ul>").unwrap();

    htmltxt()
        .arg(&page)
        .arg("--stdout")
        .arg("-q")
        .assert()
        .success()
        .stdout("outer inner\ninner\n");

    htmltxt()
        .arg(&page)
        .arg("--stdout")
        .arg("-q")
        .arg("--dedupe-nested")
        .assert()
        .success()
        .stdout("outer inner\n");
}
