//! Zone resolution and synthesis service tests.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use n8n_stack::application::ports::ContextStore;
use n8n_stack::application::services::synth_service;
use n8n_stack::application::services::zone_service::{ZoneSource, resolve_zone};
use n8n_stack::domain::error::error_code;
use n8n_stack::domain::stack::{ids, kinds};
use n8n_stack::domain::zone::lookup_key;
use n8n_stack::domain::{HostedZone, StackConfig};
use n8n_stack::infra::templates::EmbeddedTemplates;
use serde_json::Value;

use crate::mocks::{MemoryContextStore, StubZoneLookup};

fn config() -> StackConfig {
    StackConfig::default()
}

#[tokio::test]
async fn test_resolve_zone_uses_configured_id_without_lookup() {
    let mut cfg = config();
    cfg.domain.zone_id = Some("/hostedzone/ZCONF".into());
    let lookup = StubZoneLookup::missing();
    let cache = MemoryContextStore::default();

    let (zone, source) = resolve_zone(&cfg, &lookup, &cache).await.unwrap();
    assert_eq!(zone, HostedZone::new("ZCONF", "aws.yyogestiono.com"));
    assert_eq!(source, ZoneSource::Configured);
    assert_eq!(lookup.calls.get(), 0);
    assert_eq!(cache.saves.get(), 0);
}

#[tokio::test]
async fn test_resolve_zone_caches_lookup_result() {
    let cfg = config();
    let lookup = StubZoneLookup::found("/hostedzone/ZLOOK", "aws.yyogestiono.com.");
    let cache = MemoryContextStore::default();

    let (first, source) = resolve_zone(&cfg, &lookup, &cache).await.unwrap();
    assert_eq!(source, ZoneSource::Looked);
    assert_eq!(first.id, "ZLOOK");

    let (second, source) = resolve_zone(&cfg, &lookup, &cache).await.unwrap();
    assert_eq!(source, ZoneSource::Cached);
    assert_eq!(second, first);
    assert_eq!(lookup.calls.get(), 1, "second resolution must hit the cache");

    let key = lookup_key("aws.yyogestiono.com", None, "us-east-1");
    assert!(cache.load().unwrap().contains_key(&key));
}

#[tokio::test]
async fn test_resolve_zone_cache_is_scoped_by_region() {
    let mut cfg = config();
    let lookup = StubZoneLookup::found("ZLOOK", "aws.yyogestiono.com");
    let cache = MemoryContextStore::default();
    resolve_zone(&cfg, &lookup, &cache).await.unwrap();

    cfg.env.region = "eu-west-1".into();
    let (_, source) = resolve_zone(&cfg, &lookup, &cache).await.unwrap();
    assert_eq!(source, ZoneSource::Looked);
    assert_eq!(lookup.calls.get(), 2);
}

#[tokio::test]
async fn test_resolve_zone_failure_is_zone_lookup_error() {
    let lookup = StubZoneLookup::missing();
    let cache = MemoryContextStore::default();
    let err = resolve_zone(&config(), &lookup, &cache).await.unwrap_err();
    assert_eq!(error_code(&err), "ZONE_LOOKUP");
    assert!(err.to_string().contains("aws.yyogestiono.com"), "got: {err}");
    assert_eq!(cache.saves.get(), 0, "failures are not cached");
}

#[tokio::test]
async fn test_synthesize_embeds_file_system_reference_in_user_data() {
    let lookup = StubZoneLookup::found("ZLOOK", "aws.yyogestiono.com");
    let cache = MemoryContextStore::default();
    let synthesis = synth_service::synthesize(&config(), &lookup, &cache, &EmbeddedTemplates)
        .await
        .unwrap();

    let template: Value = serde_json::from_str(&synthesis.body).unwrap();
    let parts = template["Resources"][ids::INSTANCE]["Properties"]["UserData"]["Fn::Base64"]
        ["Fn::Join"][1]
        .as_array()
        .unwrap()
        .clone();
    assert!(
        parts.contains(&serde_json::json!({ "Ref": ids::FILE_SYSTEM })),
        "user data must reference the file system"
    );
    let text: String = parts.iter().filter_map(Value::as_str).collect();
    assert!(text.starts_with("#!/bin/bash\nset -euo pipefail\n"));
    assert!(text.contains(".efs.us-east-1.amazonaws.com:/ /mnt/efs"));
    assert!(!text.contains("{{"), "unrendered placeholder left in user data");
    assert!(!text.contains("${Token["), "token must be replaced by a reference");
}

#[tokio::test]
async fn test_synthesize_is_deterministic() {
    let lookup = StubZoneLookup::found("ZLOOK", "aws.yyogestiono.com");
    let cache = MemoryContextStore::default();
    let a = synth_service::synthesize(&config(), &lookup, &cache, &EmbeddedTemplates)
        .await
        .unwrap();
    let b = synth_service::synthesize(&config(), &lookup, &cache, &EmbeddedTemplates)
        .await
        .unwrap();
    assert_eq!(a.body, b.body);
    assert_eq!(a.digest, b.digest);
    assert_eq!(a.digest.len(), 64);
}

#[tokio::test]
async fn test_domain_change_moves_record_and_certificate_together() {
    let lookup = StubZoneLookup::found("ZLOOK", "example.com");
    let cache = MemoryContextStore::default();
    let mut cfg = config();
    cfg.domain.name = "flows.example.com".into();

    let synthesis = synth_service::synthesize(&cfg, &lookup, &cache, &EmbeddedTemplates)
        .await
        .unwrap();
    let record = &synthesis.stack.template.resources[ids::DNS_RECORD].properties;
    assert_eq!(record["Name"], "flows.example.com.");
    assert!(
        synthesis
            .stack
            .boot
            .init_cert
            .contains("DOMAIN_NAME=\"flows.example.com\"")
    );
    assert!(synthesis.stack.boot.nginx_conf.contains("server_name flows.example.com;"));
    assert!(!synthesis.body.contains("n8n.aws.yyogestiono.com"), "old domain leaked");
}

#[tokio::test]
async fn test_synthesize_declares_exactly_one_instance_and_file_system() {
    let lookup = StubZoneLookup::found("ZLOOK", "aws.yyogestiono.com");
    let cache = MemoryContextStore::default();
    let synthesis = synth_service::synthesize(&config(), &lookup, &cache, &EmbeddedTemplates)
        .await
        .unwrap();
    let t = &synthesis.stack.template;
    assert_eq!(t.count_of_type(kinds::INSTANCE), 1);
    assert_eq!(t.count_of_type(kinds::FILE_SYSTEM), 1);
    assert_eq!(t.count_of_type(kinds::MOUNT_TARGET), 1);
    assert_eq!(t.count_of_type(kinds::RECORD_SET), 1);
}

#[tokio::test]
async fn test_synthesize_rejects_invalid_config_before_lookup() {
    let lookup = StubZoneLookup::found("ZLOOK", "aws.yyogestiono.com");
    let cache = MemoryContextStore::default();
    let mut cfg = config();
    cfg.certificate.email = "not-an-email".into();
    let err = synth_service::synthesize(&cfg, &lookup, &cache, &EmbeddedTemplates)
        .await
        .unwrap_err();
    assert_eq!(error_code(&err), "CONFIG");
    assert_eq!(lookup.calls.get(), 0);
}
