//! Integration tests for the n8n-stack CLI surface.
//!
//! Every test pins `N8N_STACK_CONFIG` to a temp path and supplies the hosted
//! zone ID, so nothing reads `~/.n8n-stack` or calls AWS.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const OVERRIDE_VARS: &[&str] = &[
    "DOMAIN_NAME",
    "HOSTED_ZONE_NAME",
    "AWS_ACCOUNT_ID",
    "AWS_REGION",
    "CERTBOT_EMAIL",
];

fn n8n_stack(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("n8n-stack"));
    cmd.env("NO_COLOR", "1")
        .env("N8N_STACK_CONFIG", dir.path().join("config.yaml"))
        .env("HOSTED_ZONE_ID", "Z0123456789TEST");
    for var in OVERRIDE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

// --- Help and version ---

#[test]
fn test_cli_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    n8n_stack(&dir)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Single-instance n8n deployment on AWS"));
}

#[test]
fn test_cli_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    n8n_stack(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("synth"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("destroy"));
}

#[test]
fn test_version_command_shows_version() {
    let dir = TempDir::new().unwrap();
    n8n_stack(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("n8n-stack 0.1.0"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let dir = TempDir::new().unwrap();
    n8n_stack(&dir)
        .args(["version", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""version": "0.1.0""#));
}

#[test]
fn test_no_color_env_any_value_is_accepted() {
    let dir = TempDir::new().unwrap();
    for value in ["1", "true", "yes", ""] {
        n8n_stack(&dir)
            .arg("version")
            .env("NO_COLOR", value)
            .assert()
            .success()
            .stdout(predicate::str::contains("n8n-stack 0.1.0"));
    }
}

#[test]
fn test_no_color_env_with_flag_and_subcommand_runs() {
    let dir = TempDir::new().unwrap();
    n8n_stack(&dir)
        .args(["--no-color", "config", "show"])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("domain.name:"));
}

// --- synth ---

#[test]
fn test_synth_prints_template_to_stdout() {
    let dir = TempDir::new().unwrap();
    let out = n8n_stack(&dir).arg("synth").assert().success();
    let template: Value = serde_json::from_slice(&out.get_output().stdout).unwrap();

    let record = &template["Resources"]["N8nARecord"]["Properties"];
    assert_eq!(record["HostedZoneId"], "Z0123456789TEST");
    assert_eq!(record["Name"], "n8n.aws.yyogestiono.com.");
    assert_eq!(
        template["Resources"]["N8nInstance"]["Properties"]["InstanceType"],
        "t3.nano"
    );
    for key in ["InstanceId", "PublicIP", "N8nUrl", "SSHCommand"] {
        assert!(template["Outputs"].get(key).is_some(), "missing output {key}");
    }
}

#[test]
fn test_synth_out_writes_template_file() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("cdk.out");
    n8n_stack(&dir)
        .args(["synth", "--out"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("N8nStack.template.json"));

    let body = std::fs::read_to_string(out_dir.join("N8nStack.template.json")).unwrap();
    let template: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
}

#[test]
fn test_synth_json_reports_digest_and_zone_source() {
    let dir = TempDir::new().unwrap();
    let out = n8n_stack(&dir).args(["synth", "--json"]).assert().success();
    let report: Value = serde_json::from_slice(&out.get_output().stdout).unwrap();
    assert_eq!(report["stack"], "N8nStack");
    assert_eq!(report["zoneSource"], "configured");
    assert_eq!(report["digest"].as_str().unwrap().len(), 64);
    assert!(report["template"]["Resources"].is_object());
}

#[test]
fn test_synth_follows_domain_override() {
    let dir = TempDir::new().unwrap();
    let out = n8n_stack(&dir)
        .arg("synth")
        .env("DOMAIN_NAME", "flows.example.com")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&out.get_output().stdout);
    assert!(stdout.contains("flows.example.com."));
    assert!(stdout.contains("https://flows.example.com"));
}

#[test]
fn test_synth_invalid_region_fails_with_config_code() {
    let dir = TempDir::new().unwrap();
    n8n_stack(&dir)
        .args(["synth", "--json"])
        .env("AWS_REGION", "mars")
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""code": "CONFIG""#));
}

// --- render ---

#[test]
fn test_render_prints_user_data_with_literal_id() {
    let dir = TempDir::new().unwrap();
    n8n_stack(&dir)
        .args(["render", "--file-system-id", "fs-0abc"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#!/bin/bash"))
        .stdout(predicate::str::contains("fs-0abc.efs.us-east-1.amazonaws.com"));
}

#[test]
fn test_render_out_writes_all_files() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("boot");
    n8n_stack(&dir)
        .args(["render", "--out"])
        .arg(&out_dir)
        .assert()
        .success();
    for name in ["user-data.sh", "docker-compose.yml", "nginx.conf", "init-cert.sh"] {
        assert!(out_dir.join(name).is_file(), "{name} not written");
    }
}

// --- destroy ---

#[test]
fn test_destroy_help_is_available() {
    let dir = TempDir::new().unwrap();
    n8n_stack(&dir)
        .args(["destroy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete the stack"));
}
