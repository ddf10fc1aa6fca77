use serde::{Deserialize, Serialize};

/// Recently deleted image held in the trash
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trash {
    #[serde(rename = "daysUntilExpiry", skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Tags that could and could not be restored from the trash
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsuccessful: Option<Vec<String>>,
}
