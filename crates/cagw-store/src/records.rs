// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Persisted certificate records, keyed `<issue|sign>/<role>/<serial>`.

use std::sync::Arc;

use tracing::{debug, instrument};

use cagw_core::error::{CagwResult, StorageError};
use cagw_core::model::CertificateRecord;
use cagw_core::types::{RecordKind, RoleId, SerialNumber};

use crate::backend::StorageBackend;

/// Stores and reads certificate records.
#[derive(Debug, Clone)]
pub struct CertificateRecordStore {
    storage: Arc<dyn StorageBackend>,
}

impl CertificateRecordStore {
    /// Creates a record store over `storage`.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Persists `record` under its kind, `role` and serial number.
    #[instrument(skip(self, record), fields(kind = %record.kind, role = %role, serial = %record.serial_number))]
    pub async fn put(&self, role: &RoleId, record: &CertificateRecord) -> CagwResult<()> {
        let key = CertificateRecord::storage_key(record.kind, role, &record.serial_number);
        let bytes = serde_json::to_vec(record)
            .map_err(|e| StorageError::serialization(&key, e.to_string()))?;
        self.storage.put(&key, bytes).await?;
        debug!(key, "Stored certificate record");
        Ok(())
    }

    /// Reads one record.
    pub async fn get(
        &self,
        kind: RecordKind,
        role: &RoleId,
        serial: &SerialNumber,
    ) -> CagwResult<CertificateRecord> {
        let key = CertificateRecord::storage_key(kind, role, serial);
        let bytes = self.storage.get(&key).await?.ok_or_else(|| {
            StorageError::not_found(
                &key,
                format!("could not find certificate with the serial number: {}", serial),
            )
        })?;

        serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::serialization(&key, e.to_string()).into())
    }

    /// Lists serial numbers stored for `role`.
    pub async fn list(&self, kind: RecordKind, role: &RoleId) -> CagwResult<Vec<SerialNumber>> {
        let prefix = format!("{}/{}/", kind.prefix(), role);
        let entries = self.storage.list(&prefix).await?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.ends_with('/'))
            .map(SerialNumber::new)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStorage;
    use cagw_core::types::OutputFormat;
    use chrono::Utc;

    fn record(kind: RecordKind, serial: &str) -> CertificateRecord {
        CertificateRecord {
            serial_number: SerialNumber::new(serial),
            certificate: "-----BEGIN CERTIFICATE-----\n...".to_string(),
            private_key: None,
            private_key_type: None,
            chain: None,
            format: OutputFormat::Pem,
            kind,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_put_get_list() {
        let store = CertificateRecordStore::new(Arc::new(MemoryStorage::new()));
        let role = RoleId::new("web");

        store.put(&role, &record(RecordKind::Issue, "123456")).await.unwrap();
        store.put(&role, &record(RecordKind::Sign, "98765")).await.unwrap();

        let fetched = store
            .get(RecordKind::Issue, &role, &SerialNumber::new("123456"))
            .await
            .unwrap();
        assert_eq!(fetched.serial_number.as_str(), "123456");

        let issued = store.list(RecordKind::Issue, &role).await.unwrap();
        assert_eq!(issued, vec![SerialNumber::new("123456")]);
        let signed = store.list(RecordKind::Sign, &role).await.unwrap();
        assert_eq!(signed, vec![SerialNumber::new("98765")]);
    }

    #[tokio::test]
    async fn test_not_found_message() {
        let store = CertificateRecordStore::new(Arc::new(MemoryStorage::new()));
        let err = store
            .get(RecordKind::Sign, &RoleId::new("web"), &SerialNumber::new("42"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "could not find certificate with the serial number: 42"
        );
    }
}
