use serde::{Deserialize, Serialize};

/// Namespace scoped cleanup rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Absent in some list responses, where the map key names the namespace
    #[serde(default)]
    pub namespace: String,
    /// Images kept per repository; `-1` keeps everything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images_per_repo: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retain_untagged: Option<bool>,
}

impl RetentionPolicy {
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
