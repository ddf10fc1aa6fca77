//! Wire models of the registry API
//!
//! Flat projections of the JSON documents the service returns. Every field
//! the API may omit is an `Option` and is skipped when serializing.

pub mod account;
pub mod images;
pub mod namespaces;
pub mod retention;
pub mod trash;

pub use account::{AccountSettings, AuthOptions, Plan, Quota, QuotaDetails};
pub use images::{
    Config, HealthConfig, ImageBulkDeleteError, ImageBulkDeleteResult, ImageDeleteResult,
    ImageDigest, ImageInspection, RemoteApiImage, RootFs, Tag,
};
pub use namespaces::{Namespace, NamespaceDetails};
pub use retention::RetentionPolicy;
pub use trash::{RestoreResult, Trash};
