//! Image summaries, inspection documents and delete results

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Container configuration embedded in an image inspection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stderr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domainname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposed_ports: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<HealthConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_build: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_stdin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin_once: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_signal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

/// Container health check; durations are in nanoseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBulkDeleteError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome of a bulk delete, keyed by the requested image names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBulkDeleteResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BTreeMap<String, ImageBulkDeleteError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<Vec<String>>,
}

impl ImageBulkDeleteResult {
    pub fn failed(&self) -> impl Iterator<Item = (&String, &ImageBulkDeleteError)> {
        self.error.iter().flat_map(|errors| errors.iter())
    }

    pub fn is_complete_success(&self) -> bool {
        self.error.as_ref().is_none_or(|errors| errors.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDeleteResult {
    #[serde(rename = "Untagged", skip_serializing_if = "Option::is_none")]
    pub untagged: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unix seconds at which the tag was pushed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
}

/// A manifest digest with every repository and tag that points at it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDigest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_type: Option<String>,
    /// repository -> tag -> tag details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_tags: Option<BTreeMap<String, BTreeMap<String, Tag>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RootFs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_layer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<String>>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub fs_type: Option<String>,
}

/// Docker style inspection document of an image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageInspection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Config>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_config: Option<Config>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(rename = "RootFS", skip_serializing_if = "Option::is_none")]
    pub root_fs: Option<RootFs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_size: Option<i64>,
}

/// Image summary returned by the image listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteApiImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_issue_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    /// digest -> tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_tags: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exempt_issue_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_digests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vulnerability_count: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspection_uses_docker_field_names() {
        let doc = r#"{
            "Architecture": "amd64",
            "Id": "sha256:abc",
            "Os": "linux",
            "Config": {"Cmd": ["/bin/sh"], "Env": ["PATH=/usr/bin"], "ExposedPorts": {"80/tcp": {}}},
            "RootFS": {"Type": "layers", "Layers": ["sha256:l1", "sha256:l2"]},
            "Size": 2048
        }"#;

        let inspection: ImageInspection = serde_json::from_str(doc).unwrap();
        assert_eq!(inspection.architecture.as_deref(), Some("amd64"));
        assert_eq!(inspection.id.as_deref(), Some("sha256:abc"));

        let root_fs = inspection.root_fs.unwrap();
        assert_eq!(root_fs.fs_type.as_deref(), Some("layers"));
        assert_eq!(root_fs.layers.unwrap().len(), 2);

        let config = inspection.config.unwrap();
        assert_eq!(config.cmd, Some(vec!["/bin/sh".to_string()]));
        assert!(config.exposed_ports.unwrap().contains_key("80/tcp"));
    }

    #[test]
    fn image_summary_tolerates_missing_fields() {
        let image: RemoteApiImage =
            serde_json::from_str(r#"{"RepoTags":["us.icr.io/birds/parrot:1"],"VulnerabilityCount":3}"#)
                .unwrap();
        assert_eq!(image.vulnerability_count, Some(3));
        assert!(image.size.is_none());
    }

    #[test]
    fn bulk_delete_result_reports_failures() {
        let result: ImageBulkDeleteResult = serde_json::from_str(
            r#"{"success":["us.icr.io/birds/a:1"],
                "error":{"us.icr.io/birds/b:1":{"code":"CRG0004E","message":"not found"}}}"#,
        )
        .unwrap();

        assert!(!result.is_complete_success());
        let failed: Vec<_> = result.failed().map(|(name, _)| name.as_str()).collect();
        assert_eq!(failed, vec!["us.icr.io/birds/b:1"]);
    }

    #[test]
    fn digests_nest_repositories_and_tags() {
        let digest: ImageDigest = serde_json::from_str(
            r#"{"id":"sha256:d1","manifestType":"OCI Image Manifest",
                "repoTags":{"us.icr.io/birds/parrot":{"1":{"created":1600000000}}},"size":10}"#,
        )
        .unwrap();

        let tags = &digest.repo_tags.unwrap()["us.icr.io/birds/parrot"];
        assert_eq!(tags["1"].created, Some(1600000000));
    }
}
