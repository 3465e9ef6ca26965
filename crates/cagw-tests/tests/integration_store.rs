// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Store Integration Tests
//!
//! Integration tests for cagw-store functionality including:
//!
//! - Memory and filesystem backends behind the same trait object
//! - Role and profile records under both missing-profile policies
//! - Certificate records keyed by kind, role and serial
//!
//! ## Test Categories
//!
//! - `test_backend_*`: Raw key/value behavior
//! - `test_config_*`: Role and profile resolution
//! - `test_records_*`: Certificate record persistence

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use cagw_core::error::{CagwError, ConfigurationError, StorageError};
use cagw_core::model::{CertificateRecord, ProfileConfig, RoleConfig};
use cagw_core::types::{OutputFormat, ProfileId, ProfilePolicy, RecordKind, RoleId, SerialNumber};
use cagw_store::config_store::{profile_key, role_key};
use cagw_store::{CertificateRecordStore, ConfigStore, FileSystemStorage, MemoryStorage, StorageBackend};
use cagw_tests::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

fn backends(dir: &tempfile::TempDir) -> Vec<Arc<dyn StorageBackend>> {
    vec![
        Arc::new(MemoryStorage::new()),
        Arc::new(FileSystemStorage::new(dir.path().join("data"))),
    ]
}

fn sample_role() -> RoleConfig {
    let pki = TestPki::generate();
    RoleConfig {
        pem_bundle: pki.client_bundle_pem(),
        private_key: None,
        url: GATEWAY_URL.to_string(),
        ca_certs: pki.ca_pem(),
        ca_id: None,
        profile_id: Some(ProfileId::new(TLS_PROFILE)),
        profiles: GatewayFixtures::profile_summaries(),
    }
}

fn sample_record(serial: &str, kind: RecordKind) -> CertificateRecord {
    CertificateRecord {
        serial_number: SerialNumber::new(serial),
        certificate: "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n".into(),
        private_key: None,
        private_key_type: None,
        chain: None,
        format: OutputFormat::Pem,
        kind,
        created_at: Utc::now(),
    }
}

// =============================================================================
// Backend Tests
// =============================================================================

#[tokio::test]
async fn test_backend_put_get_delete() {
    let dir = temp_test_dir("cagw-store");
    for storage in backends(&dir) {
        assert_eq!(storage.get("config/web").await.unwrap(), None);

        storage.put("config/web", b"one".to_vec()).await.unwrap();
        storage.put("config/web", b"two".to_vec()).await.unwrap();
        assert_eq!(storage.get("config/web").await.unwrap(), Some(b"two".to_vec()));

        storage.delete("config/web").await.unwrap();
        storage.delete("config/web").await.unwrap();
        assert_eq!(storage.get("config/web").await.unwrap(), None, "{}", storage.name());
    }
}

#[tokio::test]
async fn test_backend_list_children() {
    let dir = temp_test_dir("cagw-store");
    for storage in backends(&dir) {
        storage.put("config/web", b"{}".to_vec()).await.unwrap();
        storage.put("config/web/profiles/prof-tls", b"{}".to_vec()).await.unwrap();
        storage.put("config/api", b"{}".to_vec()).await.unwrap();

        let children = storage.list("config/").await.unwrap();
        assert_eq!(children, vec!["api", "web", "web/"], "{}", storage.name());
        assert!(storage.list("missing/").await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_backend_rejects_bad_keys() {
    let dir = temp_test_dir("cagw-store");
    for storage in backends(&dir) {
        for key in ["", "/abs", "a//b", "../escape", "a/./b"] {
            let err = storage.get(key).await.expect_err(key);
            assert!(matches!(err, StorageError::InvalidKey { .. }), "{key}");
        }
        assert!(storage.list("config").await.is_err());
    }
}

// =============================================================================
// Config Tests
// =============================================================================

#[tokio::test]
async fn test_config_role_round_trip() {
    let dir = temp_test_dir("cagw-store");
    let role = RoleId::new(TEST_ROLE);
    for storage in backends(&dir) {
        let store = ConfigStore::new(Arc::clone(&storage), ProfilePolicy::Strict);
        let config = sample_role();
        store.put_role(&role, &config).await.unwrap();

        let resolved = store.resolve_role(&role).await.unwrap();
        assert_eq!(resolved.url, GATEWAY_URL);
        assert_eq!(resolved.effective_ca_id(&role), TEST_ROLE);
        assert!(resolved.has_profile(&ProfileId::new(SMIME_PROFILE)));
        assert!(storage.get(&role_key(&role)).await.unwrap().is_some());

        assert_eq!(store.list_roles().await.unwrap(), vec![TEST_ROLE.to_string()]);
        store.delete_role(&role).await.unwrap();
        let err = store.resolve_role(&role).await.unwrap_err();
        assert!(matches!(
            err,
            CagwError::Configuration(ConfigurationError::RoleNotFound { .. })
        ));
    }
}

#[tokio::test]
async fn test_config_strict_policy_rejects_missing_profile() {
    let store = ConfigStore::new(Arc::new(MemoryStorage::new()), ProfilePolicy::Strict);
    let err = store
        .resolve_profile(&RoleId::new(TEST_ROLE), &ProfileId::new(TLS_PROFILE))
        .await
        .unwrap_err();
    assert_error_contains(&err, "configuration", TLS_PROFILE);
}

#[tokio::test]
async fn test_config_legacy_policy_substitutes_default() {
    let store = ConfigStore::new(Arc::new(MemoryStorage::new()), ProfilePolicy::LegacyDefault);
    let profile = store
        .resolve_profile(&RoleId::new(TEST_ROLE), &ProfileId::new(TLS_PROFILE))
        .await
        .unwrap();
    assert_eq!(profile.id, TLS_PROFILE);
    assert_eq!(profile.common_name_variable.as_deref(), Some("cn"));
    assert_eq!(profile.ttl, HOUR * 2160);
    assert_eq!(profile.max_ttl, Duration::ZERO);
}

#[tokio::test]
async fn test_config_stored_profile_wins() {
    let dir = temp_test_dir("cagw-store");
    let role = RoleId::new(TEST_ROLE);
    for storage in backends(&dir) {
        let store = ConfigStore::new(Arc::clone(&storage), ProfilePolicy::LegacyDefault);
        let mut config = ProfileConfig::legacy_default();
        config.id = SMIME_PROFILE.to_string();
        config.ttl = HOUR;
        config.max_ttl = HOUR * 24;
        store.put_profile(&role, &config).await.unwrap();

        let profile_id = ProfileId::new(SMIME_PROFILE);
        assert!(storage.get(&profile_key(&role, &profile_id)).await.unwrap().is_some());

        let resolved = store.resolve_profile(&role, &profile_id).await.unwrap();
        assert_eq!(resolved, config);
        assert_eq!(store.list_profiles(&role).await.unwrap(), vec![SMIME_PROFILE.to_string()]);
    }
}

// =============================================================================
// Record Tests
// =============================================================================

#[tokio::test]
async fn test_records_keyed_by_kind_and_role() {
    let dir = temp_test_dir("cagw-store");
    let web = RoleId::new(TEST_ROLE);
    let api = RoleId::new("api");
    for storage in backends(&dir) {
        let records = CertificateRecordStore::new(Arc::clone(&storage));
        records.put(&web, &sample_record("123456", RecordKind::Issue)).await.unwrap();
        records.put(&web, &sample_record("98765", RecordKind::Sign)).await.unwrap();
        records.put(&api, &sample_record("111", RecordKind::Issue)).await.unwrap();

        assert!(storage.get("issue/web/123456").await.unwrap().is_some());
        assert!(storage.get("sign/web/98765").await.unwrap().is_some());

        let issued = records.list(RecordKind::Issue, &web).await.unwrap();
        assert_eq!(issued, vec![SerialNumber::new("123456")]);

        let record = records
            .get(RecordKind::Sign, &web, &SerialNumber::new("98765"))
            .await
            .unwrap();
        assert_eq!(record.kind, RecordKind::Sign);
    }
}

#[tokio::test]
async fn test_records_missing_serial() {
    let records = CertificateRecordStore::new(Arc::new(MemoryStorage::new()));
    let err = records
        .get(RecordKind::Issue, &RoleId::new(TEST_ROLE), &SerialNumber::new("42"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);
    assert_eq!(
        err.to_string(),
        "could not find certificate with the serial number: 42"
    );
}
