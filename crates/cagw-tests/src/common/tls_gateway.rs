// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Local Mutual-TLS Gateway
//!
//! Serves an axum router over HTTPS on `127.0.0.1` with a server identity
//! issued by the [`TestPki`] CA. Clients must present a certificate chaining
//! to the same CA or the handshake fails.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use rustls::crypto::ring::default_provider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use tokio::task::JoinHandle;

use super::fixtures::TestPki;

/// A running HTTPS gateway stand-in that requires client certificates.
#[derive(Debug)]
pub struct TlsGateway {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TlsGateway {
    /// Starts serving `router` on an ephemeral loopback port.
    pub fn spawn(pki: &TestPki, router: Router) -> Self {
        let config = RustlsConfig::from_config(Arc::new(server_config(pki)));

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let addr = listener.local_addr().expect("local addr");

        let server = axum_server::from_tcp_rustls(listener, config);
        let task = tokio::spawn(async move {
            if let Err(e) = server.serve(router.into_make_service()).await {
                tracing::warn!(error = %e, "TLS gateway stopped");
            }
        });

        Self { addr, task }
    }

    /// Bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `https://` base URL for role configurations.
    pub fn url(&self) -> String {
        format!("https://{}", self.addr)
    }
}

impl Drop for TlsGateway {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn server_config(pki: &TestPki) -> ServerConfig {
    let provider = Arc::new(default_provider());

    let mut roots = RootCertStore::empty();
    roots
        .add(CertificateDer::from(pki.ca_cert.to_der().expect("ca der")))
        .expect("trust gateway CA");
    let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
        .build()
        .expect("client verifier");

    let (cert, key) = pki.server_identity();
    let chain = vec![
        CertificateDer::from(cert.to_der().expect("server der")),
        CertificateDer::from(pki.ca_cert.to_der().expect("ca der")),
    ];
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
        key.private_key_to_pkcs8().expect("server key"),
    ));

    ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_client_cert_verifier(verifier)
        .with_single_cert(chain, key)
        .expect("server identity")
}
