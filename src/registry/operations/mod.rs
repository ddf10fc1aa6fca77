//! Remote operations of the registry API
//!
//! Each submodule holds the options types of one API area. The table at the
//! bottom of this file generates the typed [`RegistryClient`] methods.

use super::client::RegistryClient;
use super::request::{DetailedResponse, Operation, RequestContext};
use crate::error::Result;

macro_rules! custom_headers {
    () => {
        fn custom_headers(&self) -> &std::collections::BTreeMap<String, String> {
            &self.headers
        }

        fn custom_headers_mut(&mut self) -> &mut std::collections::BTreeMap<String, String> {
            &mut self.headers
        }
    };
}

/// Parameterless GET operation
macro_rules! simple_options {
    ($(#[$doc:meta])* $name:ident, $op:literal, $path:literal, $output:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            pub headers: std::collections::BTreeMap<String, String>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl $crate::registry::request::Operation for $name {
            type Output = $output;

            const ENDPOINT: $crate::registry::request::Endpoint = $crate::registry::request::Endpoint {
                name: $op,
                method: reqwest::Method::GET,
                path: $path,
                response: $crate::registry::request::ResponseKind::Json,
            };

            custom_headers!();
        }
    };
}

pub mod account_operations;
pub mod auth_operations;
pub mod image_operations;
pub mod namespace_operations;
pub mod retention_operations;
pub mod trash_operations;

pub use account_operations::{
    GetMessagesOptions, GetPlansOptions, GetQuotaOptions, GetSettingsOptions, UpdatePlansOptions,
    UpdateQuotaOptions, UpdateSettingsOptions,
};
pub use auth_operations::{GetAuthOptions, UpdateAuthOptions};
pub use image_operations::{
    BulkDeleteImagesOptions, DeleteImageOptions, DeleteImageTagOptions, GetImageManifestOptions,
    InspectImageOptions, ListImageDigestsOptions, ListImagesOptions, TagImageOptions,
};
pub use namespace_operations::{
    AssignNamespaceOptions, CreateNamespaceOptions, DeleteNamespaceOptions,
    ListNamespaceDetailsOptions, ListNamespacesOptions, RESOURCE_GROUP_HEADER,
};
pub use retention_operations::{
    AnalyzeRetentionPolicyOptions, GetRetentionPolicyOptions, ListRetentionPoliciesOptions,
    SetRetentionPolicyOptions,
};
pub use trash_operations::{ListDeletedImagesOptions, RestoreImageOptions, RestoreTagsOptions};

/// Append `key=value` when the option is set
pub(crate) fn push_query<T: ToString>(
    params: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: &Option<T>,
) {
    if let Some(value) = value {
        params.push((key, value.to_string()));
    }
}

macro_rules! client_operations {
    ($( $(#[$doc:meta])* $name:ident, $name_with_context:ident => $options:ty; )*) => {
        impl RegistryClient {
            $(
                $(#[$doc])*
                pub async fn $name(
                    &self,
                    options: &$options,
                ) -> Result<DetailedResponse<<$options as Operation>::Output>> {
                    self.execute(Some(options)).await
                }

                #[doc = concat!("[`", stringify!($name), "`](Self::", stringify!($name), ") under a caller supplied deadline or cancellation token.")]
                pub async fn $name_with_context(
                    &self,
                    ctx: &RequestContext,
                    options: &$options,
                ) -> Result<DetailedResponse<<$options as Operation>::Output>> {
                    self.execute_with_context(ctx, Some(options)).await
                }
            )*
        }
    };
}

client_operations! {
    /// Get the account's IAM authorization and private-only settings
    get_auth, get_auth_with_context => GetAuthOptions;
    /// Update the account's authentication settings
    update_auth, update_auth_with_context => UpdateAuthOptions;
    /// List images visible to the account
    list_images, list_images_with_context => ListImagesOptions;
    /// Delete several images in one call; partial failures are reported per image
    bulk_delete_images, bulk_delete_images_with_context => BulkDeleteImagesOptions;
    /// List manifest digests and the tags that reference them
    list_image_digests, list_image_digests_with_context => ListImageDigestsOptions;
    /// Add a tag to an existing image
    tag_image, tag_image_with_context => TagImageOptions;
    /// Delete an image and every tag that points at it
    delete_image, delete_image_with_context => DeleteImageOptions;
    /// Docker style inspection of an image
    inspect_image, inspect_image_with_context => InspectImageOptions;
    /// Raw manifest of an image
    get_image_manifest, get_image_manifest_with_context => GetImageManifestOptions;
    /// Service announcement for the account, if any
    get_messages, get_messages_with_context => GetMessagesOptions;
    /// Names of the namespaces the account owns
    list_namespaces, list_namespaces_with_context => ListNamespacesOptions;
    /// Namespaces with their resource group assignment
    list_namespace_details, list_namespace_details_with_context => ListNamespaceDetailsOptions;
    /// Create a namespace
    create_namespace, create_namespace_with_context => CreateNamespaceOptions;
    /// Move an unassigned namespace into a resource group
    assign_namespace, assign_namespace_with_context => AssignNamespaceOptions;
    /// Delete a namespace and all images in it
    delete_namespace, delete_namespace_with_context => DeleteNamespaceOptions;
    /// Current pricing plan
    get_plans, get_plans_with_context => GetPlansOptions;
    /// Change the pricing plan
    update_plans, update_plans_with_context => UpdatePlansOptions;
    /// Storage and traffic usage and limits
    get_quota, get_quota_with_context => GetQuotaOptions;
    /// Change storage and traffic limits
    update_quota, update_quota_with_context => UpdateQuotaOptions;
    /// Retention policies of every namespace
    list_retention_policies, list_retention_policies_with_context => ListRetentionPoliciesOptions;
    /// Create or replace the retention policy of a namespace
    set_retention_policy, set_retention_policy_with_context => SetRetentionPolicyOptions;
    /// Preview which images a retention policy would delete
    analyze_retention_policy, analyze_retention_policy_with_context => AnalyzeRetentionPolicyOptions;
    /// Retention policy of one namespace
    get_retention_policy, get_retention_policy_with_context => GetRetentionPolicyOptions;
    /// Account registry settings
    get_settings, get_settings_with_context => GetSettingsOptions;
    /// Update account registry settings
    update_settings, update_settings_with_context => UpdateSettingsOptions;
    /// Remove a single tag
    delete_image_tag, delete_image_tag_with_context => DeleteImageTagOptions;
    /// Images in the trash, keyed by digest
    list_deleted_images, list_deleted_images_with_context => ListDeletedImagesOptions;
    /// Restore the tags of a trashed digest
    restore_tags, restore_tags_with_context => RestoreTagsOptions;
    /// Restore a trashed image by tag
    restore_image, restore_image_with_context => RestoreImageOptions;
}
