use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One object as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub size: i64,
    pub storage_class: Option<String>,
    pub owner: Option<ObjectOwner>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectOwner {
    pub display_name: Option<String>,
    pub id: Option<String>,
}

/// Success payload of an upload, shaped like an S3 managed-upload result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadReceipt {
    #[serde(rename = "ETag")]
    pub etag: Option<String>,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Bucket")]
    pub bucket: String,
}

/// Listing entry as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublicObject {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "LastModified")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(rename = "ETag")]
    pub etag: Option<String>,
    #[serde(rename = "Size")]
    pub size: i64,
    #[serde(rename = "StorageClass")]
    pub storage_class: Option<String>,
    #[serde(rename = "Owner")]
    pub owner: PublicOwner,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublicOwner {
    #[serde(rename = "DisplayName")]
    pub display_name: Option<String>,
    #[serde(rename = "ID")]
    pub id: Option<String>,
}

impl PublicObject {
    /// Reshape a stored object, pointing `Source` at `<public_base>/<encoded key>`.
    pub fn from_stored(object: StoredObject, public_base: &str) -> Self {
        let owner = object
            .owner
            .map(|o| PublicOwner {
                display_name: o.display_name,
                id: o.id,
            })
            .unwrap_or_default();

        Self {
            source: crate::utils::keys::source_url(public_base, &object.key),
            key: object.key,
            last_modified: object.last_modified,
            etag: object.etag,
            size: object.size,
            storage_class: object.storage_class,
            owner,
        }
    }
}
