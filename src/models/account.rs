//! Account level settings, plans and quotas

use serde::{Deserialize, Serialize};

/// Registry settings of an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSettings {
    /// Whether registry metrics are published to the platform monitoring service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_metrics: Option<bool>,
}

/// Authentication policy of an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOptions {
    /// Enable role based authorization when authenticating with an API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_authz: Option<bool>,
    /// Restrict the account to private endpoints only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_only: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_bytes: Option<i64>,
}

/// Current usage against the configured limits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<QuotaDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<QuotaDetails>,
}

impl Quota {
    /// Remaining storage in bytes, when both limit and usage are known
    pub fn storage_remaining(&self) -> Option<i64> {
        let limit = self.limit.as_ref()?.storage_bytes?;
        let usage = self.usage.as_ref()?.storage_bytes?;
        Some(limit - usage)
    }
}
