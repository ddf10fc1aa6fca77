//! Command-line argument parsing

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "crctl")]
#[command(about = "Manage container registry namespaces, images, quotas and retention policies")]
#[command(version)]
pub struct Args {
    /// Service URL, overrides CONTAINER_REGISTRY_URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Region whose endpoint should be used (e.g. us-south, eu-central)
    #[arg(long, short = 'r', global = true, conflicts_with = "url")]
    pub region: Option<String>,

    /// Account id sent in the Account header
    #[arg(long, short = 'a', global = true)]
    pub account: Option<String>,

    /// Overall timeout for the call in seconds
    #[arg(long, short = 't', global = true)]
    pub timeout: Option<u64>,

    /// Retry idempotent requests up to this many times
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the account's IAM authorization and private-only settings
    GetAuth,
    /// Update the account's authentication settings
    UpdateAuth {
        #[arg(long)]
        iam_authz: Option<bool>,
        #[arg(long)]
        private_only: Option<bool>,
    },
    /// List images
    ListImages {
        #[arg(long)]
        namespace: Option<String>,
        #[arg(long)]
        repository: Option<String>,
        #[arg(long)]
        include_ibm: Option<bool>,
        #[arg(long)]
        include_private: Option<bool>,
        #[arg(long)]
        include_manifest_lists: Option<bool>,
        #[arg(long)]
        vulnerabilities: Option<bool>,
    },
    /// Delete several images at once
    BulkDeleteImages {
        #[arg(required = true)]
        images: Vec<String>,
    },
    /// List image digests and their tags
    ListImageDigests {
        #[arg(long)]
        exclude_tagged: Option<bool>,
        #[arg(long)]
        exclude_va: Option<bool>,
        #[arg(long)]
        include_ibm: Option<bool>,
        /// Repository to include, may be repeated
        #[arg(long = "repository")]
        repositories: Vec<String>,
    },
    /// Add a tag to an existing image
    TagImage { from: String, to: String },
    /// Delete an image and all of its tags
    DeleteImage { image: String },
    /// Inspect an image
    InspectImage { image: String },
    /// Print the manifest of an image
    GetImageManifest { image: String },
    /// Show service messages
    GetMessages,
    /// List namespace names
    ListNamespaces,
    /// List namespaces with resource group details
    ListNamespaceDetails,
    /// Create a namespace
    CreateNamespace {
        name: String,
        #[arg(long)]
        resource_group: Option<String>,
    },
    /// Assign a namespace to a resource group
    AssignNamespace {
        name: String,
        #[arg(long)]
        resource_group: String,
    },
    /// Delete a namespace
    DeleteNamespace { name: String },
    /// Show the pricing plan
    GetPlans,
    /// Change the pricing plan
    UpdatePlans {
        #[arg(long)]
        plan: Option<String>,
    },
    /// Show quota usage and limits
    GetQuota,
    /// Change quota limits
    UpdateQuota {
        #[arg(long)]
        storage_megabytes: Option<i64>,
        #[arg(long)]
        traffic_megabytes: Option<i64>,
    },
    /// List retention policies of every namespace
    ListRetentionPolicies,
    /// Set the retention policy of a namespace
    SetRetentionPolicy {
        namespace: String,
        #[arg(long)]
        images_per_repo: Option<i64>,
        #[arg(long)]
        retain_untagged: Option<bool>,
    },
    /// Show which images a retention policy would delete
    AnalyzeRetentionPolicy {
        namespace: String,
        #[arg(long)]
        images_per_repo: Option<i64>,
        #[arg(long)]
        retain_untagged: Option<bool>,
    },
    /// Show the retention policy of a namespace
    GetRetentionPolicy { namespace: String },
    /// Show account registry settings
    GetSettings,
    /// Update account registry settings
    UpdateSettings {
        #[arg(long)]
        platform_metrics: Option<bool>,
    },
    /// Remove a single tag
    DeleteImageTag { image: String },
    /// List images in the trash
    ListDeletedImages {
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Restore the tags of a trashed digest
    RestoreTags { digest: String },
    /// Restore a trashed image
    RestoreImage { image: String },
    /// List known regions and their endpoints
    Regions,
}
