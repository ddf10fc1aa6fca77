//! Shared helpers for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use container_registry_client::registry::{HttpTransport, PreparedRequest, RawResponse};
use container_registry_client::{NoAuthAuthenticator, RegistryClient, Result};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Transport that records every request and answers from a queue.
/// An empty queue answers `200 {}`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<PreparedRequest>>,
    responses: Mutex<VecDeque<RawResponse>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_json(&self, status: u16, body: &str) {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        self.responses.lock().unwrap().push_back(RawResponse::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            body.as_bytes().to_vec(),
        ));
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> PreparedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was recorded")
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request);
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or_else(|| {
            RawResponse::new(StatusCode::OK, HeaderMap::new(), b"{}".to_vec())
        }))
    }
}

/// Client wired to a recording transport
pub fn recording_client() -> (RegistryClient, Arc<RecordingTransport>) {
    let transport = RecordingTransport::new();
    let client = RegistryClient::builder()
        .with_service_url("https://registry.test")
        .with_authenticator(NoAuthAuthenticator)
        .with_transport(transport.clone())
        .build()
        .unwrap();
    (client, transport)
}

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Client talking to a local mock server over real HTTP
pub fn http_client(base_url: &str) -> RegistryClient {
    RegistryClient::builder()
        .with_service_url(base_url)
        .with_authenticator(NoAuthAuthenticator)
        .build()
        .unwrap()
}
