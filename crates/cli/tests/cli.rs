//! End-to-end tests for the cdeploy binary
//!
//! These run without network access: config lives in a temp dir and the sync
//! is performed by a stand-in `aws` script.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn cdeploy(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cdeploy"))
        .args(args)
        .env("CDEPLOY_CONFIG_DIR", config_dir)
        .env("AWS_CONFIG_FILE", config_dir.join("aws-config"))
        .env("AWS_SHARED_CREDENTIALS_FILE", config_dir.join("aws-credentials"))
        .env("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE")
        .env("AWS_SECRET_ACCESS_KEY", "secret")
        .env_remove("AWS_PROFILE")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run cdeploy")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = cdeploy(&["--help"], dir.path());
    assert!(output.status.success());

    let help = stdout(&output);
    for command in ["deploy", "resolve", "distributions", "site", "completions"] {
        assert!(help.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_site_lifecycle() {
    let dir = TempDir::new().unwrap();

    let output = cdeploy(
        &[
            "site",
            "set",
            "blog",
            "./public",
            "s3://blog-bucket/www",
            "www.example.com",
            "--delete",
            "--exclude",
            "*.map",
        ],
        dir.path(),
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(dir.path().join("config.toml").exists());

    let output = cdeploy(&["--json", "site", "list"], dir.path());
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let sites = json["sites"].as_array().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0]["name"], "blog");
    assert_eq!(sites[0]["target"], "s3://blog-bucket/www");
    assert_eq!(sites[0]["delete"], true);
    assert_eq!(sites[0]["exclude"][0], "*.map");

    let output = cdeploy(&["site", "remove", "blog"], dir.path());
    assert!(output.status.success());

    let output = cdeploy(&["site", "remove", "blog"], dir.path());
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_site_set_rejects_bad_target() {
    let dir = TempDir::new().unwrap();
    let output = cdeploy(
        &["site", "set", "blog", "./public", "http://bucket", "E2QWRUHAPOMQZL"],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("config.toml").exists());
}

#[test]
fn test_deploy_unknown_site() {
    let dir = TempDir::new().unwrap();
    let output = cdeploy(&["deploy", "missing"], dir.path());
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("missing"));
}

#[test]
fn test_deploy_requires_target() {
    let dir = TempDir::new().unwrap();
    let output = cdeploy(
        &["deploy", "--source", ".", "--distribution", "E2QWRUHAPOMQZL"],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--target"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = cdeploy(&["deploy", "--no-such-flag"], dir.path());
    assert_eq!(output.status.code(), Some(2));
}

#[cfg(unix)]
fn fake_aws(dir: &Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-aws");
    std::fs::write(&script, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[test]
fn test_deploy_dry_run_reports_paths() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("public");
    std::fs::create_dir(&source).unwrap();
    let script = fake_aws(
        dir.path(),
        "echo '(dryrun) upload: ./public/index.html to s3://bucket/site/index.html'\n\
         echo '(dryrun) delete: s3://bucket/site/old.css'\n\
         echo 'Completed 2 file(s)'\n",
    );

    let output = cdeploy(
        &[
            "--json",
            "deploy",
            "--source",
            source.to_str().unwrap(),
            "--target",
            "s3://bucket/site",
            "--distribution",
            "E2QWRUHAPOMQZL",
            "--path",
            "/*",
            "--dry-run",
            "--skip-bucket-check",
            "--region",
            "us-east-1",
            "--aws-cli",
            script.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["distribution_id"], "E2QWRUHAPOMQZL");
    assert_eq!(report["target"], "s3://bucket/site");
    assert_eq!(report["events"], 2);
    assert_eq!(
        report["paths"],
        serde_json::json!(["/index.html", "/old.css", "/*"])
    );
    assert_eq!(report["invalidation"]["status"], "dry_run");
}

#[cfg(unix)]
#[test]
fn test_deploy_failed_sync_exits_external() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("public");
    std::fs::create_dir(&source).unwrap();
    let script = fake_aws(dir.path(), "echo 'fatal error: access denied' >&2\nexit 1\n");

    let output = cdeploy(
        &[
            "deploy",
            "--source",
            source.to_str().unwrap(),
            "--target",
            "s3://bucket/site",
            "--distribution",
            "E2QWRUHAPOMQZL",
            "--skip-bucket-check",
            "--region",
            "us-east-1",
            "--no-progress",
            "--aws-cli",
            script.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("access denied"));
}

#[cfg(unix)]
#[test]
fn test_deploy_malformed_transcript_rejected() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("public");
    std::fs::create_dir(&source).unwrap();
    let script = fake_aws(dir.path(), "echo 'upload: ./public/a.html to somewhere'\n");

    let output = cdeploy(
        &[
            "deploy",
            "--source",
            source.to_str().unwrap(),
            "--target",
            "s3://bucket/site",
            "--distribution",
            "E2QWRUHAPOMQZL",
            "--skip-bucket-check",
            "--region",
            "us-east-1",
            "--aws-cli",
            script.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(6));
}

#[cfg(unix)]
#[test]
fn test_interrupt_during_sync_exits_130() {
    use std::process::Stdio;
    use std::time::Duration;

    let dir = TempDir::new().unwrap();
    let source = dir.path().join("public");
    std::fs::create_dir(&source).unwrap();
    let script = fake_aws(dir.path(), "sleep 10\n");

    let child = Command::new(env!("CARGO_BIN_EXE_cdeploy"))
        .args([
            "--no-progress",
            "deploy",
            "--source",
            source.to_str().unwrap(),
            "--target",
            "s3://bucket/site",
            "--distribution",
            "E2QWRUHAPOMQZL",
            "--skip-bucket-check",
            "--region",
            "us-east-1",
            "--aws-cli",
            script.to_str().unwrap(),
        ])
        .env("CDEPLOY_CONFIG_DIR", dir.path())
        .env("AWS_CONFIG_FILE", dir.path().join("aws-config"))
        .env("AWS_SHARED_CREDENTIALS_FILE", dir.path().join("aws-credentials"))
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    std::thread::sleep(Duration::from_secs(1));
    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(130));
}
