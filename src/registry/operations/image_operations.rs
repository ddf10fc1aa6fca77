//! Image level operations
//!
//! - GET    /api/v1/images
//! - POST   /api/v1/images/bulkdelete
//! - POST   /api/v1/images/digests
//! - POST   /api/v1/images/tags
//! - DELETE /api/v1/images/{image}
//! - GET    /api/v1/images/{image}/json
//! - GET    /api/v1/images/{image}/manifest
//! - DELETE /api/v1/tags/{image}

use super::push_query;
use crate::error::Result;
use crate::error::handlers::ValidationErrorHandler;
use crate::models::{ImageBulkDeleteResult, ImageDeleteResult, ImageDigest, ImageInspection, RemoteApiImage};
use crate::registry::request::{Endpoint, Operation, ResponseKind};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Filters for [`RegistryClient::list_images`](crate::RegistryClient::list_images)
#[derive(Debug, Clone, Default)]
pub struct ListImagesOptions {
    pub namespace: Option<String>,
    /// Include images from the provider's public namespaces
    pub include_ibm: Option<bool>,
    /// Include private images
    pub include_private: Option<bool>,
    /// Include multi-architecture manifest lists
    pub include_manifest_lists: Option<bool>,
    /// Include vulnerability counts in the summaries
    pub vulnerabilities: Option<bool>,
    pub repository: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl ListImagesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn with_include_ibm(mut self, include: bool) -> Self {
        self.include_ibm = Some(include);
        self
    }

    pub fn with_include_private(mut self, include: bool) -> Self {
        self.include_private = Some(include);
        self
    }

    pub fn with_include_manifest_lists(mut self, include: bool) -> Self {
        self.include_manifest_lists = Some(include);
        self
    }

    pub fn with_vulnerabilities(mut self, include: bool) -> Self {
        self.vulnerabilities = Some(include);
        self
    }
}

impl Operation for ListImagesOptions {
    type Output = Vec<RemoteApiImage>;

    const ENDPOINT: Endpoint = Endpoint {
        name: "list_images",
        method: Method::GET,
        path: "/api/v1/images",
        response: ResponseKind::Json,
    };

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_query(&mut params, "namespace", &self.namespace);
        push_query(&mut params, "includeIBM", &self.include_ibm);
        push_query(&mut params, "includePrivate", &self.include_private);
        push_query(&mut params, "includeManifestLists", &self.include_manifest_lists);
        push_query(&mut params, "vulnerabilities", &self.vulnerabilities);
        push_query(&mut params, "repository", &self.repository);
        params
    }

    custom_headers!();
}

/// Options for [`RegistryClient::bulk_delete_images`](crate::RegistryClient::bulk_delete_images)
#[derive(Debug, Clone, Default)]
pub struct BulkDeleteImagesOptions {
    /// Full image names (`registry/namespace/repo:tag` or `@digest`)
    pub bulk_delete: Vec<String>,
    pub headers: BTreeMap<String, String>,
}

impl BulkDeleteImagesOptions {
    pub fn new<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bulk_delete: images.into_iter().map(Into::into).collect(),
            headers: BTreeMap::new(),
        }
    }
}

impl Operation for BulkDeleteImagesOptions {
    type Output = ImageBulkDeleteResult;

    const ENDPOINT: Endpoint = Endpoint {
        name: "bulk_delete_images",
        method: Method::POST,
        path: "/api/v1/images/bulkdelete",
        response: ResponseKind::Json,
    };

    fn validate(&self) -> Result<()> {
        ValidationErrorHandler::require_non_empty_list(
            Self::ENDPOINT.name,
            "bulk_delete",
            &self.bulk_delete,
        )?;
        for image in &self.bulk_delete {
            ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "bulk_delete entry", image)?;
        }
        Ok(())
    }

    fn body(&self) -> Result<Option<Value>> {
        Ok(Some(serde_json::to_value(&self.bulk_delete)?))
    }

    custom_headers!();
}

/// Filters for [`RegistryClient::list_image_digests`](crate::RegistryClient::list_image_digests)
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListImageDigestsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_tagged: Option<bool>,
    /// Skip the vulnerability assessment data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_va: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_ibm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<String>>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl ListImageDigestsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclude_tagged(mut self, exclude: bool) -> Self {
        self.exclude_tagged = Some(exclude);
        self
    }

    pub fn with_exclude_va(mut self, exclude: bool) -> Self {
        self.exclude_va = Some(exclude);
        self
    }

    pub fn with_include_ibm(mut self, include: bool) -> Self {
        self.include_ibm = Some(include);
        self
    }

    pub fn with_repositories<I, S>(mut self, repositories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repositories = Some(repositories.into_iter().map(Into::into).collect());
        self
    }
}

impl Operation for ListImageDigestsOptions {
    type Output = Vec<ImageDigest>;

    const ENDPOINT: Endpoint = Endpoint {
        name: "list_image_digests",
        method: Method::POST,
        path: "/api/v1/images/digests",
        response: ResponseKind::Json,
    };

    fn body(&self) -> Result<Option<Value>> {
        Ok(Some(serde_json::to_value(self)?))
    }

    custom_headers!();
}

/// Options for [`RegistryClient::tag_image`](crate::RegistryClient::tag_image)
#[derive(Debug, Clone, Default)]
pub struct TagImageOptions {
    /// Existing image, `registry/namespace/repo:tag`
    pub fromimage: String,
    /// New reference in the same registry
    pub toimage: String,
    pub headers: BTreeMap<String, String>,
}

impl TagImageOptions {
    pub fn new(fromimage: impl Into<String>, toimage: impl Into<String>) -> Self {
        Self {
            fromimage: fromimage.into(),
            toimage: toimage.into(),
            headers: BTreeMap::new(),
        }
    }
}

impl Operation for TagImageOptions {
    type Output = ();

    const ENDPOINT: Endpoint = Endpoint {
        name: "tag_image",
        method: Method::POST,
        path: "/api/v1/images/tags",
        response: ResponseKind::Empty,
    };

    fn validate(&self) -> Result<()> {
        ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "fromimage", &self.fromimage)?;
        ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "toimage", &self.toimage)
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("fromimage", self.fromimage.clone()),
            ("toimage", self.toimage.clone()),
        ]
    }

    custom_headers!();
}

/// Single image reference, shared by the per-image operations
macro_rules! image_options {
    ($(#[$doc:meta])* $name:ident, $op:literal, $method:expr, $path:literal, $output:ty, $response:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            /// Full image reference, `registry/namespace/repo:tag` or `@digest`
            pub image: String,
            pub headers: BTreeMap<String, String>,
        }

        impl $name {
            pub fn new(image: impl Into<String>) -> Self {
                Self {
                    image: image.into(),
                    headers: BTreeMap::new(),
                }
            }
        }

        impl Operation for $name {
            type Output = $output;

            const ENDPOINT: Endpoint = Endpoint {
                name: $op,
                method: $method,
                path: $path,
                response: $response,
            };

            fn validate(&self) -> Result<()> {
                ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "image", &self.image)
            }

            fn path_params(&self) -> Vec<(&'static str, &str)> {
                vec![("image", self.image.as_str())]
            }

            custom_headers!();
        }
    };
}

image_options!(
    /// Options for [`RegistryClient::delete_image`](crate::RegistryClient::delete_image)
    DeleteImageOptions,
    "delete_image",
    Method::DELETE,
    "/api/v1/images/{image}",
    ImageDeleteResult,
    ResponseKind::Json
);

image_options!(
    /// Options for [`RegistryClient::inspect_image`](crate::RegistryClient::inspect_image)
    InspectImageOptions,
    "inspect_image",
    Method::GET,
    "/api/v1/images/{image}/json",
    ImageInspection,
    ResponseKind::Json
);

image_options!(
    /// Options for [`RegistryClient::get_image_manifest`](crate::RegistryClient::get_image_manifest).
    /// The manifest is returned as an opaque JSON object.
    GetImageManifestOptions,
    "get_image_manifest",
    Method::GET,
    "/api/v1/images/{image}/manifest",
    Map<String, Value>,
    ResponseKind::Json
);

image_options!(
    /// Options for [`RegistryClient::delete_image_tag`](crate::RegistryClient::delete_image_tag).
    /// Removes one tag without deleting the image itself.
    DeleteImageTagOptions,
    "delete_image_tag",
    Method::DELETE,
    "/api/v1/tags/{image}",
    ImageDeleteResult,
    ResponseKind::Json
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_images_only_sends_set_filters() {
        let options = ListImagesOptions::new()
            .with_namespace("birds")
            .with_include_ibm(false);

        assert_eq!(
            options.query_params(),
            vec![
                ("namespace", "birds".to_string()),
                ("includeIBM", "false".to_string())
            ]
        );
        assert!(ListImagesOptions::new().query_params().is_empty());
    }

    #[test]
    fn bulk_delete_body_is_a_json_array() {
        let options = BulkDeleteImagesOptions::new(["us.icr.io/birds/a:1", "us.icr.io/birds/b:1"]);
        assert_eq!(
            options.body().unwrap().unwrap(),
            serde_json::json!(["us.icr.io/birds/a:1", "us.icr.io/birds/b:1"])
        );
    }

    #[test]
    fn bulk_delete_rejects_empty_input() {
        assert!(BulkDeleteImagesOptions::new(Vec::<String>::new()).validate().is_err());
        assert!(BulkDeleteImagesOptions::new([""]).validate().is_err());
    }

    #[test]
    fn digests_body_skips_unset_fields() {
        let options = ListImageDigestsOptions::new().with_repositories(["us.icr.io/birds/parrot"]);
        assert_eq!(
            options.body().unwrap().unwrap(),
            serde_json::json!({"repositories": ["us.icr.io/birds/parrot"]})
        );
        assert_eq!(
            ListImageDigestsOptions::new().body().unwrap().unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn tag_image_requires_both_references() {
        assert!(TagImageOptions::new("a:1", "").validate().is_err());
        assert!(TagImageOptions::new("", "a:2").validate().is_err());
        assert!(TagImageOptions::new("a:1", "a:2").validate().is_ok());
    }

    #[test]
    fn per_image_operations_use_the_image_path_parameter() {
        let options = InspectImageOptions::new("us.icr.io/birds/parrot:1");
        assert_eq!(options.path_params(), vec![("image", "us.icr.io/birds/parrot:1")]);
        assert!(DeleteImageTagOptions::default().validate().is_err());
    }
}
