//! Retention policy operations
//!
//! - GET  /api/v1/retentions
//! - POST /api/v1/retentions
//! - POST /api/v1/retentions/analyze
//! - GET  /api/v1/retentions/{namespace}

use crate::error::Result;
use crate::error::handlers::ValidationErrorHandler;
use crate::models::RetentionPolicy;
use crate::registry::request::{Endpoint, Operation, ResponseKind};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

simple_options!(
    /// Options for [`RegistryClient::list_retention_policies`](crate::RegistryClient::list_retention_policies).
    /// The result is keyed by namespace.
    ListRetentionPoliciesOptions,
    "list_retention_policies",
    "/api/v1/retentions",
    BTreeMap<String, RetentionPolicy>
);

/// Policy fields shared by set and analyze
macro_rules! policy_options {
    ($(#[$doc:meta])* $name:ident, $op:literal, $path:literal, $output:ty, $response:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, Serialize)]
        pub struct $name {
            pub namespace: String,
            /// Images kept per repository; `-1` keeps everything
            #[serde(skip_serializing_if = "Option::is_none")]
            pub images_per_repo: Option<i64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            pub retain_untagged: Option<bool>,
            #[serde(skip)]
            pub headers: BTreeMap<String, String>,
        }

        impl $name {
            pub fn new(namespace: impl Into<String>) -> Self {
                Self {
                    namespace: namespace.into(),
                    ..Self::default()
                }
            }

            pub fn with_images_per_repo(mut self, count: i64) -> Self {
                self.images_per_repo = Some(count);
                self
            }

            pub fn with_retain_untagged(mut self, retain: bool) -> Self {
                self.retain_untagged = Some(retain);
                self
            }
        }

        impl From<RetentionPolicy> for $name {
            fn from(policy: RetentionPolicy) -> Self {
                Self {
                    namespace: policy.namespace,
                    images_per_repo: policy.images_per_repo,
                    retain_untagged: policy.retain_untagged,
                    headers: BTreeMap::new(),
                }
            }
        }

        impl Operation for $name {
            type Output = $output;

            const ENDPOINT: Endpoint = Endpoint {
                name: $op,
                method: Method::POST,
                path: $path,
                response: $response,
            };

            fn validate(&self) -> Result<()> {
                ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "namespace", &self.namespace)
            }

            fn body(&self) -> Result<Option<Value>> {
                Ok(Some(serde_json::to_value(self)?))
            }

            custom_headers!();
        }
    };
}

policy_options!(
    /// Options for [`RegistryClient::set_retention_policy`](crate::RegistryClient::set_retention_policy)
    SetRetentionPolicyOptions,
    "set_retention_policy",
    "/api/v1/retentions",
    (),
    ResponseKind::Empty
);

policy_options!(
    /// Options for [`RegistryClient::analyze_retention_policy`](crate::RegistryClient::analyze_retention_policy).
    /// The result maps each repository to the images the policy would delete.
    AnalyzeRetentionPolicyOptions,
    "analyze_retention_policy",
    "/api/v1/retentions/analyze",
    BTreeMap<String, Vec<String>>,
    ResponseKind::Json
);

/// Options for [`RegistryClient::get_retention_policy`](crate::RegistryClient::get_retention_policy)
#[derive(Debug, Clone, Default)]
pub struct GetRetentionPolicyOptions {
    pub namespace: String,
    pub headers: BTreeMap<String, String>,
}

impl GetRetentionPolicyOptions {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            headers: BTreeMap::new(),
        }
    }
}

impl Operation for GetRetentionPolicyOptions {
    type Output = RetentionPolicy;

    const ENDPOINT: Endpoint = Endpoint {
        name: "get_retention_policy",
        method: Method::GET,
        path: "/api/v1/retentions/{namespace}",
        response: ResponseKind::Json,
    };

    fn validate(&self) -> Result<()> {
        ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "namespace", &self.namespace)
    }

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("namespace", self.namespace.as_str())]
    }

    custom_headers!();
}
