//! Integration tests for the chnode CLI.

#![allow(deprecated)] // cargo_bin is deprecated but the replacement requires macros

use std::io::Write;
use std::path::Path;
use std::process::Output;

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VERSION: &str = "1.2.3";

fn chnode(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("chnode").unwrap();
    cmd.env("HOME", root)
        .env("CHNODE_DIR", root.join("cache"))
        .env("CHNODE_PREFIX", root.join("prefix"))
        .env("CHNODE_CONFIG", root.join("missing-config.toml"))
        .env("CHNODE_OS", "linux")
        .env("CHNODE_ARCH", "x64")
        .env_remove("CHNODE_DIST_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Run a command off the async runtime so the mock server keeps serving
async fn run(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn archive_name(version: &str) -> String {
    format!("node-v{}-linux-x64.tar.gz", version)
}

/// A release tarball whose binaries are shell scripts printing the version
fn release_tarball(version: &str) -> Vec<u8> {
    let root = format!("node-v{}-linux-x64", version);
    let script = format!("#!/bin/sh\necho v{}\n", version);
    let mut builder = tar::Builder::new(Vec::new());

    for file in [
        "bin/node",
        "lib/node_modules/npm/bin/npm-cli.js",
        "lib/node_modules/npm/bin/npx-cli.js",
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(script.len() as u64);
        header.set_mode(0o755);
        builder
            .append_data(&mut header, format!("{}/{}", root, file), script.as_bytes())
            .unwrap();
    }

    for (name, target) in [
        ("bin/npm", "../lib/node_modules/npm/bin/npm-cli.js"),
        ("bin/npx", "../lib/node_modules/npm/bin/npx-cli.js"),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_size(0);
        header.set_mode(0o777);
        builder
            .append_link(&mut header, format!("{}/{}", root, name), target)
            .unwrap();
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&builder.into_inner().unwrap()).unwrap();
    encoder.finish().unwrap()
}

/// Serve a well-formed release for `version` from `server`
async fn mount_release(server: &MockServer, version: &str) {
    let name = archive_name(version);
    let archive = release_tarball(version);
    let manifest = format!("{}  {}\n", hex::encode(Sha256::digest(&archive)), name);

    Mock::given(method("GET"))
        .and(path(format!("/v{}/{}", version, name)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v{}/SHASUMS256.txt", version)))
        .respond_with(ResponseTemplate::new(200).set_body_string(manifest))
        .mount(server)
        .await;
}

#[test]
fn test_help_does_not_touch_cache() {
    let temp = TempDir::new().unwrap();

    for arg in ["help", "-h", "--help"] {
        chnode(temp.path())
            .arg(arg)
            .assert()
            .success()
            .stdout(predicate::str::contains("Install and use different versions of Node.js"))
            .stdout(predicate::str::contains("chnode use"));
    }

    assert!(!temp.path().join("cache").exists());
    assert!(!temp.path().join("prefix").exists());
}

#[test]
fn test_empty_stdin_shows_help() {
    let temp = TempDir::new().unwrap();

    chnode(temp.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));

    assert!(!temp.path().join("cache").exists());
}

#[test]
fn test_oversized_stdin_fails() {
    let temp = TempDir::new().unwrap();

    chnode(temp.path())
        .write_stdin("1".repeat(200))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_malformed_version_fails() {
    let temp = TempDir::new().unwrap();

    for bad in ["1.2", "1.2.3.4", "1..3"] {
        chnode(temp.path())
            .arg(bad)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("error:"));
    }

    assert!(!temp.path().join("cache").exists());
}

#[test]
fn test_json_error_output() {
    let temp = TempDir::new().unwrap();

    chnode(temp.path())
        .args(["--json", "1.2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\"category\": \"parse\""));
}

#[test]
fn test_use_without_version_file_fails() {
    let temp = TempDir::new().unwrap();

    chnode(temp.path())
        .arg("use")
        .arg("--cwd")
        .arg(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains(".node-version"));
}

#[test]
fn test_list_empty_cache() {
    let temp = TempDir::new().unwrap();

    chnode(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No versions cached"));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_install_then_restore_offline() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_release(&server, VERSION).await;

    let mut cmd = chnode(temp.path());
    cmd.env("CHNODE_DIST_URL", server.uri()).arg(VERSION);
    run(cmd)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("installed"));

    let release = temp.path().join("cache").join(VERSION).join("release");
    assert!(release.join("bin/node").is_file());
    for name in ["node", "npm", "npx"] {
        let link = temp.path().join("prefix/bin").join(name);
        assert!(std::fs::read_link(&link).unwrap().starts_with(&release));
    }

    // A cached version never needs the network again
    drop(server);
    let mut cmd = chnode(temp.path());
    cmd.env("CHNODE_DIST_URL", "http://127.0.0.1:9/").arg(VERSION);
    run(cmd)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("restored from cache"));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_missing_release_leaves_no_version_dir() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;

    let mut cmd = chnode(temp.path());
    cmd.env("CHNODE_DIST_URL", server.uri()).arg("9.9.9");
    run(cmd)
        .await
        .assert()
        .code(1)
        .stderr(predicate::str::contains("404"));

    assert!(temp.path().join("cache").is_dir());
    assert!(!temp.path().join("cache").join("9.9.9").exists());
    assert!(!temp.path().join("prefix/bin/node").exists());
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_stdin_and_version_file() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_release(&server, VERSION).await;
    mount_release(&server, "2.0.0").await;

    let mut cmd = chnode(temp.path());
    cmd.env("CHNODE_DIST_URL", server.uri())
        .write_stdin(format!("{}\n", VERSION));
    run(cmd).await.assert().success();
    assert!(temp.path().join("cache").join(VERSION).is_dir());

    let project = temp.path().join("project");
    let nested = project.join("packages").join("web");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(project.join(".node-version"), "2.0.0\n").unwrap();

    let mut cmd = chnode(temp.path());
    cmd.env("CHNODE_DIST_URL", server.uri())
        .arg("use")
        .arg("--cwd")
        .arg(&nested);
    run(cmd).await.assert().success();

    let node = std::fs::read_link(temp.path().join("prefix/bin/node")).unwrap();
    assert!(node.starts_with(temp.path().join("cache").join("2.0.0")));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_list_current_and_remove() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_release(&server, VERSION).await;
    mount_release(&server, "2.0.0").await;

    for version in ["2.0.0", VERSION] {
        let mut cmd = chnode(temp.path());
        cmd.env("CHNODE_DIST_URL", server.uri()).arg(version);
        run(cmd).await.assert().success();
    }

    let mut cmd = chnode(temp.path());
    cmd.args(["--json", "list"]);
    run(cmd)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("\"active\": \"1.2.3\""))
        .stdout(predicate::str::contains("2.0.0"));

    let mut cmd = chnode(temp.path());
    cmd.arg("current");
    run(cmd)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3"));

    let mut cmd = chnode(temp.path());
    cmd.args(["remove", VERSION]);
    run(cmd)
        .await
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force"));
    assert!(temp.path().join("cache").join(VERSION).is_dir());

    let mut cmd = chnode(temp.path());
    cmd.args(["rm", "2.0.0"]);
    run(cmd).await.assert().success();
    assert!(!temp.path().join("cache").join("2.0.0").exists());

    let mut cmd = chnode(temp.path());
    cmd.args(["remove", "--force", VERSION]);
    run(cmd).await.assert().success();
    assert!(!temp.path().join("cache").join(VERSION).exists());
}
