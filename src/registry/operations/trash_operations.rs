//! Trash operations
//!
//! - GET  /api/v1/trash
//! - POST /api/v1/trash/{digest}/restoretags
//! - POST /api/v1/trash/{image}/restore

use super::push_query;
use crate::error::Result;
use crate::error::handlers::ValidationErrorHandler;
use crate::models::{RestoreResult, Trash};
use crate::registry::request::{Endpoint, Operation, ResponseKind};
use reqwest::Method;
use std::collections::BTreeMap;

/// Options for [`RegistryClient::list_deleted_images`](crate::RegistryClient::list_deleted_images).
/// The result is keyed by image digest.
#[derive(Debug, Clone, Default)]
pub struct ListDeletedImagesOptions {
    pub namespace: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl ListDeletedImagesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

impl Operation for ListDeletedImagesOptions {
    type Output = BTreeMap<String, Trash>;

    const ENDPOINT: Endpoint = Endpoint {
        name: "list_deleted_images",
        method: Method::GET,
        path: "/api/v1/trash",
        response: ResponseKind::Json,
    };

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_query(&mut params, "namespace", &self.namespace);
        params
    }

    custom_headers!();
}

/// Options for [`RegistryClient::restore_tags`](crate::RegistryClient::restore_tags)
#[derive(Debug, Clone, Default)]
pub struct RestoreTagsOptions {
    /// `registry/namespace/repo@sha256:...` of the trashed image
    pub digest: String,
    pub headers: BTreeMap<String, String>,
}

impl RestoreTagsOptions {
    pub fn new(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
            headers: BTreeMap::new(),
        }
    }
}

impl Operation for RestoreTagsOptions {
    type Output = RestoreResult;

    const ENDPOINT: Endpoint = Endpoint {
        name: "restore_tags",
        method: Method::POST,
        path: "/api/v1/trash/{digest}/restoretags",
        response: ResponseKind::Json,
    };

    fn validate(&self) -> Result<()> {
        ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "digest", &self.digest)
    }

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("digest", self.digest.as_str())]
    }

    custom_headers!();
}

/// Options for [`RegistryClient::restore_image`](crate::RegistryClient::restore_image)
#[derive(Debug, Clone, Default)]
pub struct RestoreImageOptions {
    /// `registry/namespace/repo:tag` of the trashed image
    pub image: String,
    pub headers: BTreeMap<String, String>,
}

impl RestoreImageOptions {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            headers: BTreeMap::new(),
        }
    }
}

impl Operation for RestoreImageOptions {
    type Output = ();

    const ENDPOINT: Endpoint = Endpoint {
        name: "restore_image",
        method: Method::POST,
        path: "/api/v1/trash/{image}/restore",
        response: ResponseKind::Empty,
    };

    fn validate(&self) -> Result<()> {
        ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "image", &self.image)
    }

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("image", self.image.as_str())]
    }

    custom_headers!();
}
