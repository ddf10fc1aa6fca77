//! Registry API client
//!
//! This module provides the client, its per-operation options, the
//! authenticators and the HTTP transport used to talk to the registry API.

pub mod auth;
pub mod client;
pub mod operations;
pub mod request;
pub mod token_manager;
pub mod transport;

pub use auth::{
    AuthType, Authenticator, BasicAuthenticator, BearerTokenAuthenticator, IamAuthenticator,
    NoAuthAuthenticator,
};
pub use client::{ACCOUNT_HEADER, RegistryClient, RegistryClientBuilder};
pub use request::{DetailedResponse, Endpoint, Operation, RequestContext, ResponseKind};
pub use transport::{HttpTransport, PreparedRequest, RawResponse, ReqwestTransport, RetryPolicy};
