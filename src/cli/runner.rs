//! Runs a parsed `crctl` command against the registry API

use crate::cli::args::{Args, Command};
use crate::config::{DEFAULT_SERVICE_NAME, ServiceConfig};
use crate::error::{RegistryError, Result};
use crate::regions::{self, service_url_for_region};
use crate::registry::operations::*;
use crate::registry::{Operation, RegistryClient, RequestContext};
use serde::Serialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct Runner {
    args: Args,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    pub async fn run(&self) -> Result<()> {
        if let Command::Regions = self.args.command {
            let table: Vec<_> = regions::regions()
                .map(|name| -> Result<_> {
                    Ok(json!({ "region": name, "url": service_url_for_region(name)? }))
                })
                .collect::<Result<_>>()?;
            return print_json(&table);
        }

        let client = self.create_client()?;
        let ctx = self.request_context();
        let started = Instant::now();

        self.dispatch(&client, &ctx).await?;

        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "command finished");
        Ok(())
    }

    fn create_client(&self) -> Result<RegistryClient> {
        let config = ServiceConfig::from_env(DEFAULT_SERVICE_NAME)?;
        let mut client = RegistryClient::from_config(&config)?;

        if let Some(url) = &self.args.url {
            client.set_service_url(url)?;
        } else if let Some(region) = &self.args.region {
            client.set_service_url(service_url_for_region(region)?)?;
        }
        if let Some(account) = &self.args.account {
            client.set_default_account(Some(account.clone()));
        }
        if let Some(retries) = self.args.retries {
            if retries == 0 {
                client.disable_retries();
            } else {
                client.enable_retries(retries, Duration::ZERO);
            }
        }

        info!(url = client.service_url(), "using registry endpoint");
        Ok(client)
    }

    fn request_context(&self) -> RequestContext {
        match self.args.timeout {
            Some(secs) => RequestContext::new().with_timeout(Duration::from_secs(secs)),
            None => RequestContext::new(),
        }
    }

    async fn dispatch(&self, client: &RegistryClient, ctx: &RequestContext) -> Result<()> {
        match self.args.command.clone() {
            Command::GetAuth => call(client, ctx, GetAuthOptions::new()).await,
            Command::UpdateAuth {
                iam_authz,
                private_only,
            } => {
                let mut options = UpdateAuthOptions::new();
                options.iam_authz = iam_authz;
                options.private_only = private_only;
                call(client, ctx, options).await
            }
            Command::ListImages {
                namespace,
                repository,
                include_ibm,
                include_private,
                include_manifest_lists,
                vulnerabilities,
            } => {
                let options = ListImagesOptions {
                    namespace,
                    repository,
                    include_ibm,
                    include_private,
                    include_manifest_lists,
                    vulnerabilities,
                    ..ListImagesOptions::default()
                };
                call(client, ctx, options).await
            }
            Command::BulkDeleteImages { images } => {
                call(client, ctx, BulkDeleteImagesOptions::new(images)).await
            }
            Command::ListImageDigests {
                exclude_tagged,
                exclude_va,
                include_ibm,
                repositories,
            } => {
                let options = ListImageDigestsOptions {
                    exclude_tagged,
                    exclude_va,
                    include_ibm,
                    repositories: (!repositories.is_empty()).then_some(repositories),
                    ..ListImageDigestsOptions::default()
                };
                call(client, ctx, options).await
            }
            Command::TagImage { from, to } => call(client, ctx, TagImageOptions::new(from, to)).await,
            Command::DeleteImage { image } => call(client, ctx, DeleteImageOptions::new(image)).await,
            Command::InspectImage { image } => {
                call(client, ctx, InspectImageOptions::new(image)).await
            }
            Command::GetImageManifest { image } => {
                call(client, ctx, GetImageManifestOptions::new(image)).await
            }
            Command::GetMessages => call(client, ctx, GetMessagesOptions::new()).await,
            Command::ListNamespaces => call(client, ctx, ListNamespacesOptions::new()).await,
            Command::ListNamespaceDetails => {
                call(client, ctx, ListNamespaceDetailsOptions::new()).await
            }
            Command::CreateNamespace {
                name,
                resource_group,
            } => {
                let mut options = CreateNamespaceOptions::new(name);
                if let Some(group) = resource_group {
                    options = options.with_resource_group(group);
                }
                call(client, ctx, options).await
            }
            Command::AssignNamespace {
                name,
                resource_group,
            } => call(client, ctx, AssignNamespaceOptions::new(name, resource_group)).await,
            Command::DeleteNamespace { name } => {
                call(client, ctx, DeleteNamespaceOptions::new(name)).await
            }
            Command::GetPlans => call(client, ctx, GetPlansOptions::new()).await,
            Command::UpdatePlans { plan } => {
                let mut options = UpdatePlansOptions::new();
                options.plan = plan;
                call(client, ctx, options).await
            }
            Command::GetQuota => call(client, ctx, GetQuotaOptions::new()).await,
            Command::UpdateQuota {
                storage_megabytes,
                traffic_megabytes,
            } => {
                let mut options = UpdateQuotaOptions::new();
                options.storage_megabytes = storage_megabytes;
                options.traffic_megabytes = traffic_megabytes;
                call(client, ctx, options).await
            }
            Command::ListRetentionPolicies => {
                call(client, ctx, ListRetentionPoliciesOptions::new()).await
            }
            Command::SetRetentionPolicy {
                namespace,
                images_per_repo,
                retain_untagged,
            } => {
                let mut options = SetRetentionPolicyOptions::new(namespace);
                options.images_per_repo = images_per_repo;
                options.retain_untagged = retain_untagged;
                call(client, ctx, options).await
            }
            Command::AnalyzeRetentionPolicy {
                namespace,
                images_per_repo,
                retain_untagged,
            } => {
                let mut options = AnalyzeRetentionPolicyOptions::new(namespace);
                options.images_per_repo = images_per_repo;
                options.retain_untagged = retain_untagged;
                call(client, ctx, options).await
            }
            Command::GetRetentionPolicy { namespace } => {
                call(client, ctx, GetRetentionPolicyOptions::new(namespace)).await
            }
            Command::GetSettings => call(client, ctx, GetSettingsOptions::new()).await,
            Command::UpdateSettings { platform_metrics } => {
                let mut options = UpdateSettingsOptions::new();
                options.platform_metrics = platform_metrics;
                call(client, ctx, options).await
            }
            Command::DeleteImageTag { image } => {
                call(client, ctx, DeleteImageTagOptions::new(image)).await
            }
            Command::ListDeletedImages { namespace } => {
                let mut options = ListDeletedImagesOptions::new();
                options.namespace = namespace;
                call(client, ctx, options).await
            }
            Command::RestoreTags { digest } => {
                call(client, ctx, RestoreTagsOptions::new(digest)).await
            }
            Command::RestoreImage { image } => {
                call(client, ctx, RestoreImageOptions::new(image)).await
            }
            Command::Regions => Err(RegistryError::Configuration(
                "regions does not call the API".to_string(),
            )),
        }
    }
}

/// Execute one operation and print its result, or its status when the
/// operation has no result body
async fn call<O>(client: &RegistryClient, ctx: &RequestContext, options: O) -> Result<()>
where
    O: Operation,
    O::Output: Serialize,
{
    let response = client.execute_with_context(ctx, Some(&options)).await?;
    let status = response.status_code();
    match response.into_result() {
        Some(result) => print_json(&result),
        None => print_json(&json!({ "status": status })),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
