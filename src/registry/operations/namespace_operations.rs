//! Namespace operations
//!
//! - GET    /api/v1/namespaces
//! - GET    /api/v1/namespaces/details
//! - PUT    /api/v1/namespaces/{name}
//! - PATCH  /api/v1/namespaces/{name}
//! - DELETE /api/v1/namespaces/{name}

use crate::error::Result;
use crate::error::handlers::ValidationErrorHandler;
use crate::models::{Namespace, NamespaceDetails};
use crate::registry::request::{Endpoint, Operation, ResponseKind};
use reqwest::Method;
use std::collections::BTreeMap;

/// Resource group header sent when creating or assigning a namespace
pub const RESOURCE_GROUP_HEADER: &str = "X-Auth-Resource-Group";

#[derive(Debug, Clone, Default)]
pub struct ListNamespacesOptions {
    pub headers: BTreeMap<String, String>,
}

impl ListNamespacesOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Operation for ListNamespacesOptions {
    type Output = Vec<String>;

    const ENDPOINT: Endpoint = Endpoint {
        name: "list_namespaces",
        method: Method::GET,
        path: "/api/v1/namespaces",
        response: ResponseKind::Json,
    };

    custom_headers!();
}

#[derive(Debug, Clone, Default)]
pub struct ListNamespaceDetailsOptions {
    pub headers: BTreeMap<String, String>,
}

impl ListNamespaceDetailsOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Operation for ListNamespaceDetailsOptions {
    type Output = Vec<NamespaceDetails>;

    const ENDPOINT: Endpoint = Endpoint {
        name: "list_namespace_details",
        method: Method::GET,
        path: "/api/v1/namespaces/details",
        response: ResponseKind::Json,
    };

    custom_headers!();
}

/// Options for [`RegistryClient::create_namespace`](crate::RegistryClient::create_namespace)
#[derive(Debug, Clone, Default)]
pub struct CreateNamespaceOptions {
    pub name: String,
    /// Resource group to create the namespace in; the account default otherwise
    pub x_auth_resource_group: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl CreateNamespaceOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.x_auth_resource_group = Some(resource_group.into());
        self
    }
}

impl Operation for CreateNamespaceOptions {
    type Output = Namespace;

    const ENDPOINT: Endpoint = Endpoint {
        name: "create_namespace",
        method: Method::PUT,
        path: "/api/v1/namespaces/{name}",
        response: ResponseKind::Json,
    };

    fn validate(&self) -> Result<()> {
        ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "name", &self.name)
    }

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str())]
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        self.x_auth_resource_group
            .iter()
            .map(|rg| (RESOURCE_GROUP_HEADER, rg.clone()))
            .collect()
    }

    custom_headers!();
}

/// Options for [`RegistryClient::assign_namespace`](crate::RegistryClient::assign_namespace)
#[derive(Debug, Clone, Default)]
pub struct AssignNamespaceOptions {
    pub name: String,
    /// Resource group the namespace is moved into
    pub x_auth_resource_group: String,
    pub headers: BTreeMap<String, String>,
}

impl AssignNamespaceOptions {
    pub fn new(name: impl Into<String>, resource_group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x_auth_resource_group: resource_group.into(),
            headers: BTreeMap::new(),
        }
    }
}

impl Operation for AssignNamespaceOptions {
    type Output = Namespace;

    const ENDPOINT: Endpoint = Endpoint {
        name: "assign_namespace",
        method: Method::PATCH,
        path: "/api/v1/namespaces/{name}",
        response: ResponseKind::Json,
    };

    fn validate(&self) -> Result<()> {
        ValidationErrorHandler::require_non_empty(
            Self::ENDPOINT.name,
            "x_auth_resource_group",
            &self.x_auth_resource_group,
        )?;
        ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "name", &self.name)
    }

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str())]
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![(RESOURCE_GROUP_HEADER, self.x_auth_resource_group.clone())]
    }

    custom_headers!();
}

#[derive(Debug, Clone, Default)]
pub struct DeleteNamespaceOptions {
    pub name: String,
    pub headers: BTreeMap<String, String>,
}

impl DeleteNamespaceOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            headers: BTreeMap::new(),
        }
    }
}

impl Operation for DeleteNamespaceOptions {
    type Output = ();

    const ENDPOINT: Endpoint = Endpoint {
        name: "delete_namespace",
        method: Method::DELETE,
        path: "/api/v1/namespaces/{name}",
        response: ResponseKind::Empty,
    };

    fn validate(&self) -> Result<()> {
        ValidationErrorHandler::require_non_empty(Self::ENDPOINT.name, "name", &self.name)
    }

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str())]
    }

    custom_headers!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_sends_resource_group_only_when_set() {
        assert!(CreateNamespaceOptions::new("birds").headers().is_empty());
        assert_eq!(
            CreateNamespaceOptions::new("birds")
                .with_resource_group("rg-1")
                .headers(),
            vec![(RESOURCE_GROUP_HEADER, "rg-1".to_string())]
        );
    }

    #[test]
    fn assign_requires_a_resource_group() {
        let err = AssignNamespaceOptions::new("birds", "").validate().unwrap_err();
        assert!(err.to_string().contains("x_auth_resource_group"));
        assert!(AssignNamespaceOptions::new("birds", "rg-1").validate().is_ok());
    }
}
