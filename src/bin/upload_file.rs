//! Uploads one local file straight to the configured bucket, bypassing the HTTP service.

use bytes::Bytes;
use chrono::Utc;
use clap::Parser;
use cloud_demo_services::config::StorageConfig;
use cloud_demo_services::infrastructure::storage;
use cloud_demo_services::services::storage::ObjectStore;
use cloud_demo_services::utils::keys::stamped_file_key;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to upload
    #[arg(default_value = "test-image.jpeg")]
    path: PathBuf,
}

fn content_type_for(path: &std::path::Path) -> mime::Mime {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloud_demo_services=info,upload_file=info".into()),
        )
        .init();

    let args = Args::parse();
    let filename = args
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid file path: {}", args.path.display()))?;

    let data = tokio::fs::read(&args.path).await?;
    info!("📂 Read {} ({} bytes)", args.path.display(), data.len());

    let store = storage::setup_storage(&StorageConfig::from_env()).await;
    let key = stamped_file_key(Utc::now(), filename);

    match store
        .upload(&key, Bytes::from(data), content_type_for(&args.path).as_ref())
        .await
    {
        Ok(receipt) => {
            info!("✅ Uploaded to {}", receipt.location);
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
        Err(e) => {
            error!("❌ Upload failed: {}", e);
            println!("{}", serde_json::to_string_pretty(&e)?);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_content_type_for_known_images() {
        assert_eq!(content_type_for(Path::new("a/test-image.JPEG")), mime::IMAGE_JPEG);
        assert_eq!(content_type_for(Path::new("b.png")), mime::IMAGE_PNG);
        assert_eq!(content_type_for(Path::new("notes")), mime::APPLICATION_OCTET_STREAM);
    }
}
