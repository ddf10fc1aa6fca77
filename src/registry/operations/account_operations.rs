//! Account wide operations: messages, plans, quotas and settings
//!
//! - GET   /api/v1/messages
//! - GET   /api/v1/plans
//! - PATCH /api/v1/plans
//! - GET   /api/v1/quotas
//! - PATCH /api/v1/quotas
//! - GET   /api/v1/settings
//! - PATCH /api/v1/settings

use crate::error::Result;
use crate::models::{AccountSettings, Plan, Quota};
use crate::registry::request::{Endpoint, Operation, ResponseKind};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

simple_options!(
    /// Options for [`RegistryClient::get_messages`](crate::RegistryClient::get_messages)
    GetMessagesOptions,
    "get_messages",
    "/api/v1/messages",
    String
);

simple_options!(
    /// Options for [`RegistryClient::get_plans`](crate::RegistryClient::get_plans)
    GetPlansOptions,
    "get_plans",
    "/api/v1/plans",
    Plan
);

simple_options!(
    /// Options for [`RegistryClient::get_quota`](crate::RegistryClient::get_quota)
    GetQuotaOptions,
    "get_quota",
    "/api/v1/quotas",
    Quota
);

simple_options!(
    /// Options for [`RegistryClient::get_settings`](crate::RegistryClient::get_settings)
    GetSettingsOptions,
    "get_settings",
    "/api/v1/settings",
    AccountSettings
);

/// Options for [`RegistryClient::update_plans`](crate::RegistryClient::update_plans)
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePlansOptions {
    /// Target plan, `free` or `standard`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl UpdatePlansOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }
}

impl Operation for UpdatePlansOptions {
    type Output = ();

    const ENDPOINT: Endpoint = Endpoint {
        name: "update_plans",
        method: Method::PATCH,
        path: "/api/v1/plans",
        response: ResponseKind::Empty,
    };

    fn body(&self) -> Result<Option<Value>> {
        Ok(Some(serde_json::to_value(self)?))
    }

    custom_headers!();
}

/// Options for [`RegistryClient::update_quota`](crate::RegistryClient::update_quota)
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateQuotaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_megabytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_megabytes: Option<i64>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl UpdateQuotaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage_megabytes(mut self, megabytes: i64) -> Self {
        self.storage_megabytes = Some(megabytes);
        self
    }

    pub fn with_traffic_megabytes(mut self, megabytes: i64) -> Self {
        self.traffic_megabytes = Some(megabytes);
        self
    }
}

impl Operation for UpdateQuotaOptions {
    type Output = ();

    const ENDPOINT: Endpoint = Endpoint {
        name: "update_quota",
        method: Method::PATCH,
        path: "/api/v1/quotas",
        response: ResponseKind::Empty,
    };

    fn body(&self) -> Result<Option<Value>> {
        Ok(Some(serde_json::to_value(self)?))
    }

    custom_headers!();
}

/// Options for [`RegistryClient::update_settings`](crate::RegistryClient::update_settings)
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateSettingsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_metrics: Option<bool>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl UpdateSettingsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform_metrics(mut self, enabled: bool) -> Self {
        self.platform_metrics = Some(enabled);
        self
    }
}

impl Operation for UpdateSettingsOptions {
    type Output = ();

    const ENDPOINT: Endpoint = Endpoint {
        name: "update_settings",
        method: Method::PATCH,
        path: "/api/v1/settings",
        response: ResponseKind::Empty,
    };

    fn body(&self) -> Result<Option<Value>> {
        Ok(Some(serde_json::to_value(self)?))
    }

    custom_headers!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_body_carries_only_set_limits() {
        let options = UpdateQuotaOptions::new().with_traffic_megabytes(5120);
        assert_eq!(
            options.body().unwrap().unwrap(),
            serde_json::json!({"traffic_megabytes": 5120})
        );
    }

    #[test]
    fn custom_headers_are_not_part_of_the_body() {
        let options = UpdatePlansOptions::new()
            .with_plan("standard")
            .with_header("X-Trace", "1");
        assert_eq!(
            options.body().unwrap().unwrap(),
            serde_json::json!({"plan": "standard"})
        );
        assert_eq!(options.custom_headers().get("X-Trace").map(String::as_str), Some("1"));
    }
}
