//! Account authentication policy operations
//!
//! - GET   /api/v1/auth
//! - PATCH /api/v1/auth

use crate::error::Result;
use crate::models::AuthOptions;
use crate::registry::request::{Endpoint, Operation, ResponseKind};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Options for [`RegistryClient::get_auth`](crate::RegistryClient::get_auth)
#[derive(Debug, Clone, Default)]
pub struct GetAuthOptions {
    pub headers: BTreeMap<String, String>,
}

impl GetAuthOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Operation for GetAuthOptions {
    type Output = AuthOptions;

    const ENDPOINT: Endpoint = Endpoint {
        name: "get_auth",
        method: Method::GET,
        path: "/api/v1/auth",
        response: ResponseKind::Json,
    };

    custom_headers!();
}

/// Options for [`RegistryClient::update_auth`](crate::RegistryClient::update_auth)
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateAuthOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_authz: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_only: Option<bool>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl UpdateAuthOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iam_authz(mut self, enabled: bool) -> Self {
        self.iam_authz = Some(enabled);
        self
    }

    pub fn with_private_only(mut self, enabled: bool) -> Self {
        self.private_only = Some(enabled);
        self
    }
}

impl Operation for UpdateAuthOptions {
    type Output = ();

    const ENDPOINT: Endpoint = Endpoint {
        name: "update_auth",
        method: Method::PATCH,
        path: "/api/v1/auth",
        response: ResponseKind::Empty,
    };

    fn body(&self) -> Result<Option<Value>> {
        Ok(Some(serde_json::to_value(self)?))
    }

    custom_headers!();
}
