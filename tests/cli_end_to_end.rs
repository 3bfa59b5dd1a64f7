use assert_cmd::Command;
use predicates::str::contains;
use std::io::Write;
use tempfile::NamedTempFile;

fn markdown_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    file.write_all(contents.as_bytes()).expect("write markdown");
    file
}

fn richchunk() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("richchunk"));
    cmd.env_remove("RICHCHUNK_CONFIG_FILE")
        .env_remove("RUST_LOG")
        .arg("--log-level")
        .arg("error");
    cmd
}

#[test]
fn chunks_file_as_json() {
    let input = markdown_file("Hello **world**\n");
    let assert = richchunk().arg(input.path()).assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value[0]["text"], "Hello world");
    assert_eq!(value[0]["entities"][0]["type"], "bold");
    assert_eq!(value[0]["entities"][0]["offset"], 6);
    assert_eq!(value[0]["entities"][0]["length"], 5);
}

#[test]
fn reads_stdin_and_respects_length_flag() {
    let markdown = "first paragraph here\n\nsecond paragraph here\n";
    richchunk()
        .arg("--max-chunk-length")
        .arg("24")
        .arg("--format")
        .arg("text")
        .write_stdin(markdown)
        .assert()
        .success()
        .stdout(contains("--- chunk 1/2 (20 units) ---\nfirst paragraph here\n"))
        .stdout(contains("--- chunk 2/2 (21 units) ---\nsecond paragraph here\n"));
}

#[test]
fn environment_overrides_render_settings() {
    let input = markdown_file("[docs][rd]\n\n[rd]: https://docs.rs\n");
    let assert = richchunk()
        .env("RICHCHUNK__RENDER__LINK_REFERENCE", "")
        .arg(input.path())
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value[0]["text"], "docs");
}

#[test]
fn tiny_budget_is_rejected() {
    richchunk()
        .arg("--max-chunk-length")
        .arg("4")
        .write_stdin("text\n")
        .assert()
        .failure()
        .stderr(contains("max_chunk_length must be at least 16"));
}

#[test]
fn missing_input_file_fails() {
    richchunk()
        .arg("does-not-exist.md")
        .assert()
        .failure()
        .stderr(contains("failed to read `does-not-exist.md`"));
}
