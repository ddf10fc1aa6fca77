//! Options are checked before any request leaves the client

mod common;

use common::recording_client;
use container_registry_client::RegistryError;
use container_registry_client::operations::*;

macro_rules! assert_nil_rejected {
    ($client:expr, $($options:ty),+ $(,)?) => {
        $(
            let err = $client.execute::<$options>(None).await.unwrap_err();
            assert!(
                matches!(err, RegistryError::Validation(ref m) if m.contains("options cannot be nil")),
                "{} accepted missing options: {:?}",
                stringify!($options),
                err
            );
        )+
    };
}

#[tokio::test]
async fn missing_options_fail_for_every_operation() {
    let (client, transport) = recording_client();

    assert_nil_rejected!(
        client,
        GetAuthOptions,
        UpdateAuthOptions,
        ListImagesOptions,
        BulkDeleteImagesOptions,
        ListImageDigestsOptions,
        TagImageOptions,
        DeleteImageOptions,
        InspectImageOptions,
        GetImageManifestOptions,
        GetMessagesOptions,
        ListNamespacesOptions,
        ListNamespaceDetailsOptions,
        CreateNamespaceOptions,
        AssignNamespaceOptions,
        DeleteNamespaceOptions,
        GetPlansOptions,
        UpdatePlansOptions,
        GetQuotaOptions,
        UpdateQuotaOptions,
        ListRetentionPoliciesOptions,
        SetRetentionPolicyOptions,
        AnalyzeRetentionPolicyOptions,
        GetRetentionPolicyOptions,
        GetSettingsOptions,
        UpdateSettingsOptions,
        DeleteImageTagOptions,
        ListDeletedImagesOptions,
        RestoreTagsOptions,
        RestoreImageOptions,
    );

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn empty_required_fields_are_rejected() {
    let (client, transport) = recording_client();

    let errors = vec![
        client.delete_image(&DeleteImageOptions::new("")).await.unwrap_err(),
        client.inspect_image(&InspectImageOptions::new("")).await.unwrap_err(),
        client.get_image_manifest(&GetImageManifestOptions::new("")).await.unwrap_err(),
        client.delete_image_tag(&DeleteImageTagOptions::new("")).await.unwrap_err(),
        client.tag_image(&TagImageOptions::new("", "birds/b:2")).await.unwrap_err(),
        client.tag_image(&TagImageOptions::new("birds/a:1", "")).await.unwrap_err(),
        client
            .bulk_delete_images(&BulkDeleteImagesOptions::new(Vec::<String>::new()))
            .await
            .unwrap_err(),
        client.create_namespace(&CreateNamespaceOptions::new("")).await.unwrap_err(),
        client.delete_namespace(&DeleteNamespaceOptions::new("")).await.unwrap_err(),
        client
            .assign_namespace(&AssignNamespaceOptions::new("birds", ""))
            .await
            .unwrap_err(),
        client
            .assign_namespace(&AssignNamespaceOptions::new("", "rg-1"))
            .await
            .unwrap_err(),
        client
            .set_retention_policy(&SetRetentionPolicyOptions::new(""))
            .await
            .unwrap_err(),
        client
            .analyze_retention_policy(&AnalyzeRetentionPolicyOptions::new(""))
            .await
            .unwrap_err(),
        client
            .get_retention_policy(&GetRetentionPolicyOptions::new(""))
            .await
            .unwrap_err(),
        client.restore_tags(&RestoreTagsOptions::new("")).await.unwrap_err(),
        client.restore_image(&RestoreImageOptions::new("")).await.unwrap_err(),
    ];

    for err in errors {
        assert!(matches!(err, RegistryError::Validation(_)), "{:?}", err);
        assert!(err.is_client_side());
    }
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn validation_message_names_the_field() {
    let (client, _) = recording_client();
    let err = client
        .create_namespace(&CreateNamespaceOptions::new(""))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation error: create_namespace: name cannot be empty"
    );
}

#[tokio::test]
async fn empty_service_url_fails_before_sending() {
    let (mut client, transport) = recording_client();
    client.set_service_url("").unwrap();

    let err = client
        .list_namespaces(&ListNamespacesOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::ServiceUrlMissing));
    assert!(transport.requests().is_empty());

    // Validation still wins over the missing URL
    let err = client
        .delete_namespace(&DeleteNamespaceOptions::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));
}

#[tokio::test]
async fn dot_segments_in_path_values_are_rejected() {
    let (client, transport) = recording_client();

    let errors = vec![
        client.delete_namespace(&DeleteNamespaceOptions::new("..")).await.unwrap_err(),
        client.create_namespace(&CreateNamespaceOptions::new(".")).await.unwrap_err(),
        client
            .get_retention_policy(&GetRetentionPolicyOptions::new("."))
            .await
            .unwrap_err(),
        client.delete_image(&DeleteImageOptions::new("..")).await.unwrap_err(),
        client.restore_tags(&RestoreTagsOptions::new("..")).await.unwrap_err(),
    ];

    for err in errors {
        assert!(matches!(err, RegistryError::Validation(_)), "{:?}", err);
    }
    assert!(transport.requests().is_empty());

    // Dots inside a value are ordinary characters
    client
        .delete_image(&DeleteImageOptions::new("us.icr.io/birds/a:1.0"))
        .await
        .unwrap();
    assert_eq!(transport.requests().len(), 1);
}
