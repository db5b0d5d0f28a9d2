//! Config file, environment layer, and context cache tests.

#![allow(clippy::expect_used, clippy::unwrap_used, unsafe_code)]

use n8n_stack::application::ports::{ConfigStore, ContextStore, LookupContext};
use n8n_stack::application::services::config_service;
use n8n_stack::domain::error::error_code;
use n8n_stack::domain::{EnvOverrides, HostedZone, StackConfig};
use n8n_stack::infra::config::{CONFIG_ENV, YamlConfigStore, env_overrides};
use n8n_stack::infra::context::{CONTEXT_FILE, JsonContextStore};
use serial_test::serial;

#[test]
fn test_missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = YamlConfigStore::at(dir.path().join("config.yaml"));
    assert_eq!(store.load().unwrap(), StackConfig::default());
}

#[test]
fn test_set_value_persists_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");
    let store = YamlConfigStore::at(&path);

    config_service::set_value(&store, "domain.name", "flows.example.com").unwrap();
    config_service::set_value(&store, "instance.type", "t3.small").unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.domain.name, "flows.example.com");
    assert_eq!(loaded.instance.instance_type, "t3.small");
    assert_eq!(loaded.app.image, "n8nio/n8n:latest");
}

#[cfg(unix)]
#[test]
fn test_saved_config_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let store = YamlConfigStore::at(&path);
    store.save(&StackConfig::default()).unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_set_value_rejects_invalid_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let store = YamlConfigStore::at(&path);
    assert!(config_service::set_value(&store, "env.region", "mars").is_err());
    assert!(!path.exists());
}

#[test]
fn test_malformed_file_is_reported_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "domain: [unclosed").unwrap();
    let err = YamlConfigStore::at(&path).load().unwrap_err();
    assert!(format!("{err:#}").contains("config.yaml"), "got: {err:#}");
}

#[test]
fn test_effective_config_rejects_blank_values_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let store = YamlConfigStore::at(&path);

    std::fs::write(&path, "app:\n  timezone: \"\"\n").unwrap();
    let err = config_service::effective_config(&store, &EnvOverrides::default()).unwrap_err();
    assert_eq!(error_code(&err), "CONFIG");

    std::fs::write(&path, "domain:\n  zone_id: \"  \"\n").unwrap();
    let err = config_service::effective_config(&store, &EnvOverrides::default()).unwrap_err();
    assert_eq!(error_code(&err), "CONFIG");
    assert!(err.to_string().contains("domain.zone_id"), "got: {err}");
}

#[test]
fn test_effective_config_applies_overrides_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = YamlConfigStore::at(dir.path().join("config.yaml"));
    config_service::set_value(&store, "certificate.email", "file@example.com").unwrap();

    let env = EnvOverrides {
        certbot_email: Some("env@example.com".into()),
        ..EnvOverrides::default()
    };
    let cfg = config_service::effective_config(&store, &env).unwrap();
    assert_eq!(cfg.certificate.email, "env@example.com");
    assert_eq!(
        store.load().unwrap().certificate.email,
        "file@example.com",
        "overrides are never persisted"
    );
}

#[test]
#[serial]
fn test_env_overrides_read_process_environment() {
    // SAFETY: `#[serial]` keeps env-mutating tests from running concurrently.
    unsafe {
        std::env::set_var("DOMAIN_NAME", "flows.example.com");
        std::env::set_var("HOSTED_ZONE_ID", "Z0123");
    }
    let env = env_overrides().unwrap();
    unsafe {
        std::env::remove_var("DOMAIN_NAME");
        std::env::remove_var("HOSTED_ZONE_ID");
    }
    assert_eq!(env.domain_name.as_deref(), Some("flows.example.com"));
    assert_eq!(env.hosted_zone_id.as_deref(), Some("Z0123"));
}

#[test]
#[serial]
fn test_config_env_var_selects_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.yaml");
    // SAFETY: `#[serial]` keeps env-mutating tests from running concurrently.
    unsafe { std::env::set_var(CONFIG_ENV, &path) };
    let resolved = YamlConfigStore::new().path().unwrap();
    unsafe { std::env::remove_var(CONFIG_ENV) };
    assert_eq!(resolved, path);
}

#[test]
fn test_context_store_round_trip_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonContextStore::beside(&dir.path().join("config.yaml"));
    assert_eq!(store.path().unwrap(), dir.path().join(CONTEXT_FILE));
    assert!(store.load().unwrap().is_empty());

    let mut ctx = LookupContext::new();
    ctx.insert(
        "hosted-zone:account=default:domainName=example.com:region=us-east-1".into(),
        HostedZone::new("Z1", "example.com"),
    );
    store.save(&ctx).unwrap();
    assert_eq!(store.load().unwrap(), ctx);

    assert!(store.clear().unwrap());
    assert!(!store.clear().unwrap(), "second clear finds nothing");
}
