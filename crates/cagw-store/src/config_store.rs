// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role and profile configuration records.
//!
//! Records live under `config/<role>` and `config/<role>/profiles/<profile>`.
//! Each record is a single JSON document; resolution never merges fragments.
//! What happens when a profile record is absent depends on the injected
//! [`ProfilePolicy`].

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use cagw_core::error::{CagwResult, ConfigurationError, StorageError};
use cagw_core::model::{ProfileConfig, RoleConfig};
use cagw_core::types::{ProfileId, ProfilePolicy, RoleId};

use crate::backend::StorageBackend;

/// Storage prefix for configuration records.
pub const CONFIG_PREFIX: &str = "config";

/// Returns the storage key of a role record.
pub fn role_key(role: &RoleId) -> String {
    format!("{}/{}", CONFIG_PREFIX, role)
}

/// Returns the storage key of a profile record.
pub fn profile_key(role: &RoleId, profile: &ProfileId) -> String {
    format!("{}/{}/profiles/{}", CONFIG_PREFIX, role, profile)
}

// =============================================================================
// ConfigStore
// =============================================================================

/// Resolves and writes role and profile configuration.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    storage: Arc<dyn StorageBackend>,
    policy: ProfilePolicy,
}

impl ConfigStore {
    /// Creates a store over `storage` with the given missing-profile policy.
    pub fn new(storage: Arc<dyn StorageBackend>, policy: ProfilePolicy) -> Self {
        Self { storage, policy }
    }

    /// Returns the missing-profile policy.
    pub fn policy(&self) -> ProfilePolicy {
        self.policy
    }

    /// Resolves the role record.
    #[instrument(skip(self), fields(role = %role))]
    pub async fn resolve_role(&self, role: &RoleId) -> CagwResult<RoleConfig> {
        match self.read_json(&role_key(role)).await? {
            Some(config) => Ok(config),
            None => Err(ConfigurationError::role_not_found(role.as_str()).into()),
        }
    }

    /// Resolves the profile record, applying the policy when it is absent.
    #[instrument(skip(self), fields(role = %role, profile = %profile))]
    pub async fn resolve_profile(
        &self,
        role: &RoleId,
        profile: &ProfileId,
    ) -> CagwResult<ProfileConfig> {
        if let Some(config) = self.read_json(&profile_key(role, profile)).await? {
            return Ok(config);
        }

        match self.policy {
            ProfilePolicy::Strict => {
                Err(ConfigurationError::profile_not_found(role.as_str(), profile.as_str()).into())
            }
            ProfilePolicy::LegacyDefault => {
                debug!("No profile record, substituting the legacy default");
                let mut config = ProfileConfig::legacy_default();
                config.id = profile.to_string();
                Ok(config)
            }
        }
    }

    /// Replaces the role record.
    pub async fn put_role(&self, role: &RoleId, config: &RoleConfig) -> CagwResult<()> {
        self.write_json(&role_key(role), config).await
    }

    /// Removes the role record. Profile records are left in place.
    pub async fn delete_role(&self, role: &RoleId) -> CagwResult<()> {
        Ok(self.storage.delete(&role_key(role)).await?)
    }

    /// Lists configured role names.
    pub async fn list_roles(&self) -> CagwResult<Vec<String>> {
        let entries = self.storage.list(&format!("{}/", CONFIG_PREFIX)).await?;
        Ok(entries.into_iter().filter(|e| !e.ends_with('/')).collect())
    }

    /// Replaces a profile record. The key comes from `config.id`.
    pub async fn put_profile(&self, role: &RoleId, config: &ProfileConfig) -> CagwResult<()> {
        let profile = ProfileId::new(config.id.clone());
        self.write_json(&profile_key(role, &profile), config).await
    }

    /// Lists profile ids configured for a role.
    pub async fn list_profiles(&self, role: &RoleId) -> CagwResult<Vec<String>> {
        let prefix = format!("{}/{}/profiles/", CONFIG_PREFIX, role);
        let entries = self.storage.list(&prefix).await?;
        Ok(entries.into_iter().filter(|e| !e.ends_with('/')).collect())
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> CagwResult<Option<T>> {
        let Some(bytes) = self.storage.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ConfigurationError::corrupt(key, e.to_string()).into())
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> CagwResult<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| StorageError::serialization(key, e.to_string()))?;
        self.storage.put(key, bytes).await?;
        debug!(key, "Stored configuration record");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStorage;
    use cagw_core::error::CagwError;
    use std::time::Duration;

    fn role_config() -> RoleConfig {
        RoleConfig {
            pem_bundle: "CERT".to_string(),
            private_key: None,
            url: "https://gw.example.com".to_string(),
            ca_certs: "CA".to_string(),
            ca_id: Some("ca-1".to_string()),
            profile_id: Some(ProfileId::new("p1")),
            profiles: Vec::new(),
        }
    }

    fn store(policy: ProfilePolicy) -> (Arc<MemoryStorage>, ConfigStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = ConfigStore::new(storage.clone(), policy);
        (storage, store)
    }

    #[tokio::test]
    async fn test_role_round_trip() {
        let (_, store) = store(ProfilePolicy::Strict);
        let role = RoleId::new("web");

        let err = store.resolve_role(&role).await.unwrap_err();
        assert!(err.is_not_found());

        store.put_role(&role, &role_config()).await.unwrap();
        let resolved = store.resolve_role(&role).await.unwrap();
        assert_eq!(resolved.ca_id.as_deref(), Some("ca-1"));
        assert_eq!(store.list_roles().await.unwrap(), vec!["web".to_string()]);

        store.delete_role(&role).await.unwrap();
        assert!(store.resolve_role(&role).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_profile_strict() {
        let (_, store) = store(ProfilePolicy::Strict);
        let err = store
            .resolve_profile(&RoleId::new("web"), &ProfileId::new("p1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CagwError::Configuration(ConfigurationError::ProfileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_profile_legacy_default() {
        let (_, store) = store(ProfilePolicy::LegacyDefault);
        let profile = store
            .resolve_profile(&RoleId::new("web"), &ProfileId::new("p1"))
            .await
            .unwrap();
        assert_eq!(profile.common_name_variable.as_deref(), Some("cn"));
        assert_eq!(profile.ttl, Duration::from_secs(2160 * 3600));
        assert_eq!(profile.max_ttl, Duration::ZERO);
        assert_eq!(profile.id, "p1");
    }

    #[tokio::test]
    async fn test_profile_round_trip_and_listing() {
        let (_, store) = store(ProfilePolicy::Strict);
        let role = RoleId::new("web");
        store.put_role(&role, &role_config()).await.unwrap();

        let mut profile = ProfileConfig::legacy_default();
        profile.id = "p1".to_string();
        profile.ttl = Duration::from_secs(3600);
        store.put_profile(&role, &profile).await.unwrap();

        let resolved = store.resolve_profile(&role, &ProfileId::new("p1")).await.unwrap();
        assert_eq!(resolved, profile);
        assert_eq!(store.list_profiles(&role).await.unwrap(), vec!["p1".to_string()]);
        // The role directory must not show up as a role of its own.
        assert_eq!(store.list_roles().await.unwrap(), vec!["web".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_record() {
        let (storage, store) = store(ProfilePolicy::Strict);
        storage.put("config/web", b"{not json".to_vec()).await.unwrap();

        let err = store.resolve_role(&RoleId::new("web")).await.unwrap_err();
        assert!(matches!(
            err,
            CagwError::Configuration(ConfigurationError::Corrupt { ref key, .. }) if key == "config/web"
        ));
    }
}
