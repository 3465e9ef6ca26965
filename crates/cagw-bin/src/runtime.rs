// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Assembly order:
//!
//! 1. Load and validate configuration
//! 2. Open the storage backend
//! 3. Build the mTLS transport and the enrollment service
//! 4. Serve the API until shutdown

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use cagw_api::ApiServer;
use cagw_client::{GatewayTransport, HttpsTransport, TlsClientFactory};
use cagw_config::{load_config, CagwConfig, StorageBackendKind};
use cagw_engine::{EngineSettings, EnrollmentService};
use cagw_store::{FileSystemStorage, MemoryStorage, StorageBackend};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ServiceRuntime
// =============================================================================

/// Owns the loaded configuration and runs the service until shutdown.
#[derive(Debug)]
pub struct ServiceRuntime {
    config: Arc<CagwConfig>,
    shutdown: ShutdownCoordinator,
}

impl ServiceRuntime {
    /// Creates a runtime for `config`.
    pub fn new(config: CagwConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CagwConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Engine switches taken from configuration.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            profile_policy: self.config.engine.profile_policy,
            subject_syntax: self.config.engine.subject_syntax,
        }
    }

    /// Opens the configured storage backend.
    pub async fn open_storage(&self) -> BinResult<Arc<dyn StorageBackend>> {
        let storage: Arc<dyn StorageBackend> = match self.config.storage.backend {
            StorageBackendKind::Memory => {
                warn!("Using in-memory storage; roles and certificates are lost on restart");
                Arc::new(MemoryStorage::new())
            }
            StorageBackendKind::Filesystem => {
                let path = &self.config.storage.path;
                let fs = FileSystemStorage::open(path).await.map_err(|e| {
                    BinError::init(format!("Failed to open storage at {}: {}", path.display(), e))
                })?;
                info!(path = %path.display(), "Filesystem storage ready");
                Arc::new(fs)
            }
        };
        Ok(storage)
    }

    /// Builds the HTTPS transport with the configured timeouts.
    pub fn transport(&self) -> Arc<dyn GatewayTransport> {
        let factory = TlsClientFactory::new(
            self.config.engine.request_timeout,
            self.config.engine.connect_timeout,
        );
        Arc::new(HttpsTransport::new(factory))
    }

    /// Builds the enrollment service over the configured collaborators.
    pub async fn build_service(&self) -> BinResult<EnrollmentService> {
        let storage = self.open_storage().await?;
        Ok(EnrollmentService::new(storage, self.transport(), self.engine_settings()))
    }

    /// Runs until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting CAGW enrollment engine v{}", cagw_core::VERSION);

        let service = self.build_service().await?;

        if !self.config.api.enabled {
            warn!("API is disabled; nothing to serve until shutdown");
            self.shutdown.wait_for_shutdown().await;
            return Ok(());
        }

        let server = ApiServer::from_service(service, self.config.api.clone());
        let addr = server.addr();
        let signal = self.shutdown.shutdown_signal();
        let mut server_task = tokio::spawn(server.run_with_shutdown(signal.wait()));

        info!(%addr, "CAGW is ready");

        let stopped_early = tokio::select! {
            _ = self.shutdown.wait_for_shutdown() => None,
            joined = &mut server_task => Some(joined),
        };

        let result = match stopped_early {
            Some(joined) => {
                // The server stopped on its own, usually a bind failure.
                self.shutdown.initiate_shutdown();
                joined
            }
            None => {
                info!("Shutdown initiated, draining API server...");
                server_task.await
            }
        };

        result
            .map_err(|e| BinError::runtime(format!("API server task failed: {}", e)))??;

        info!("CAGW shutdown complete");
        Ok(())
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for [`ServiceRuntime`].
#[derive(Debug, Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<CagwConfig>,
    memory_storage: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: CagwConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Forces the in-memory storage backend.
    pub fn memory_storage(mut self, enabled: bool) -> Self {
        self.memory_storage = enabled;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<ServiceRuntime> {
        let mut config = match self.config {
            Some(cfg) => cfg,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;

                load_config(&path).map_err(|e| {
                    BinError::config(format!("Failed to load config from {}: {}", path.display(), e))
                })?
            }
        };

        if self.memory_storage {
            config.storage.backend = StorageBackendKind::Memory;
        }
        config.validate()?;

        Ok(ServiceRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================
