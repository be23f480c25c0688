
use assert_cmd::Command;
use compress_quick::constants::{BACKEND_URL_ENV, MAX_UPLOAD_SIZE};
use predicates::prelude::*;
use server::CompressionServer;
use std::fs::{self, File};
use std::io::Write;
use std::net::TcpListener;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("compress-quick").unwrap();
    cmd.env_remove(BACKEND_URL_ENV);
    cmd
}

fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> String {
    let path = dir.path().join(name);
    File::create(&path).unwrap().write_all(data).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_help() {
    cmd().arg("--help").assert().success();
}

#[test]
fn test_compress_help() {
    cmd().args(["compress", "--help"]).assert().success();
}

#[test]
fn test_check_help() {
    cmd().args(["check", "--help"]).assert().success();
}

#[test]
fn test_compress_missing_args() {
    cmd().arg("compress").assert().failure();
}

#[test]
fn test_compress_nonexistent_file() {
    cmd()
        .args(["compress", "nonexistent.jpg", "-b", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_compress_without_backend_url() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(&temp_dir, "photo.png", b"fake png data");

    cmd()
        .args(["compress", &input])
        .arg("-o")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));

    assert!(!temp_dir.path().join("compressed-photo.png").exists());
}

#[test]
fn test_compress_rejects_pdf() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(&temp_dir, "report.pdf", b"%PDF-1.7");

    cmd()
        .args(["compress", &input, "-b", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type"));
}

#[test]
fn test_compress_unreachable_backend() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let backend = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let temp_dir = TempDir::new().unwrap();
    let input = write_file(&temp_dir, "photo.jpg", b"fake jpg data");

    cmd()
        .args(["compress", &input, "-b", &backend, "--timeout", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not connect"));
}

#[test]
fn test_compress_saves_download() {
    let (_runtime, server) = CompressionServer::start_blocking(200, "image/png", &b"squeezed"[..]);
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(&temp_dir, "photo.png", &[0x42; 4096]);
    let out_dir = temp_dir.path().join("downloads");

    cmd()
        .args(["compress", &input, "-b", &server.base_url])
        .arg("-o")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Savings"))
        .stdout(predicate::str::contains("Original preview: file://"))
        .stdout(predicate::str::contains("Compressed preview: file://"));

    let fields = server.received();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "image");
    assert_eq!(fields[0].file_name.as_deref(), Some("photo.png"));
    assert_eq!(fields[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(fields[0].bytes.len(), 4096);
    assert_eq!(fs::read(out_dir.join("compressed-photo.png")).unwrap(), b"squeezed");
}

#[test]
fn test_compress_reads_backend_from_env() {
    let (_runtime, server) = CompressionServer::start_blocking(200, "image/png", &b"tiny"[..]);
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(&temp_dir, "scan", &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

    cmd()
        .env(BACKEND_URL_ENV, &server.base_url)
        .args(["compress", &input, "--quiet"])
        .arg("-o")
        .arg(temp_dir.path())
        .assert()
        .success();

    assert_eq!(
        server.received()[0].content_type.as_deref(),
        Some("image/png")
    );
    assert!(temp_dir.path().join("compressed-scan").exists());
}

#[test]
fn test_check_accepts_image() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(&temp_dir, "photo.webp", b"fake webp data");

    cmd()
        .args(["check", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ready to upload"));
}

#[test]
fn test_check_rejects_text_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(&temp_dir, "notes.txt", b"not an image");

    cmd()
        .args(["check", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("would be rejected"));
}

#[test]
fn test_compress_rejects_oversized_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("huge.png");
    File::create(&path)
        .unwrap()
        .set_len(20 * MAX_UPLOAD_SIZE)
        .unwrap();

    cmd()
        .args(["compress", &path.to_string_lossy(), "-b", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too large"));
}

#[test]
fn test_check_reports_oversized_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("huge.webp");
    File::create(&path)
        .unwrap()
        .set_len(20 * MAX_UPLOAD_SIZE)
        .unwrap();

    cmd()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("too large"));
}

#[test]
fn test_check_nonexistent_file() {
    cmd().args(["check", "nonexistent.jpg"]).assert().failure();
}
