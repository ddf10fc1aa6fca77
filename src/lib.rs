//! Container Registry API client library
//!
//! A typed async client for the registry REST API: account auth settings,
//! images, namespaces, plans, quotas, retention policies and the trash.
//!
//! ```no_run
//! use container_registry_client::{IamAuthenticator, RegistryClient};
//! use container_registry_client::operations::ListNamespacesOptions;
//!
//! # async fn run() -> container_registry_client::Result<()> {
//! let client = RegistryClient::builder()
//!     .with_region("us-south")?
//!     .with_authenticator(IamAuthenticator::new("my-api-key")?)
//!     .with_account("0123456789abcdef")
//!     .build()?;
//!
//! let namespaces = client.list_namespaces(&ListNamespacesOptions::new()).await?;
//! println!("{:?}", namespaces.result);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod regions;
pub mod registry;

pub use config::ServiceConfig;
pub use error::{RegistryError, Result};
pub use regions::service_url_for_region;
pub use registry::operations;
pub use registry::{
    AuthType, Authenticator, BasicAuthenticator, BearerTokenAuthenticator, DetailedResponse,
    IamAuthenticator, NoAuthAuthenticator, Operation, RegistryClient, RegistryClientBuilder,
    RequestContext,
};
