use crate::config::StorageConfig;
use crate::services::storage::S3ObjectStore;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::config::retry::RetryConfig;
use std::sync::Arc;
use tracing::info;

/// Build an S3 client for `config`: static credentials, endpoint override,
/// path-style addressing and no SDK retries (one remote call per operation).
pub async fn build_client(config: &StorageConfig) -> aws_sdk_s3::Client {
    let aws_config = aws_config::from_env()
        .endpoint_url(&config.endpoint_url)
        .region(Region::new(config.region.clone()))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .retry_config(RetryConfig::disabled())
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

pub async fn setup_storage(config: &StorageConfig) -> Arc<S3ObjectStore> {
    info!(
        "☁️  S3 Storage: {} (Bucket: {}, Public: {})",
        config.endpoint_url, config.bucket, config.public_base_url
    );

    let s3_client = build_client(config).await;

    // Ensure bucket exists
    match s3_client.head_bucket().bucket(&config.bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", config.bucket),
        Err(_) => {
            info!("🪣 Bucket '{}' not found, creating...", config.bucket);
            if let Err(e) = s3_client.create_bucket().bucket(&config.bucket).send().await {
                tracing::error!("❌ Failed to create bucket '{}': {}", config.bucket, e);
            } else {
                info!("✅ Bucket '{}' created successfully", config.bucket);
            }
        }
    }

    Arc::new(S3ObjectStore::new(
        s3_client,
        config.bucket.clone(),
        config.public_base_url.clone(),
    ))
}
