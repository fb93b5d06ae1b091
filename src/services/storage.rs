use crate::models::{ObjectOwner, StoredObject, UploadReceipt};
use crate::utils::keys::source_url;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// Failure of a single store call.
///
/// Serializes to the error object handed back to HTTP callers:
/// `{"name": "StoreUnavailable" | "StoreRejected", "code": .., "message": ..}`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name")]
pub enum StoreError {
    /// The store could not be reached (connection refused, DNS, timeout).
    #[error("Object store unavailable: {message}")]
    #[serde(rename = "StoreUnavailable")]
    Unavailable { code: Option<String>, message: String },

    /// The store answered with an error (unknown bucket, access denied, bad request).
    #[error("Object store rejected request: {message}")]
    #[serde(rename = "StoreRejected")]
    Rejected { code: Option<String>, message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            code: None,
            message: message.into(),
        }
    }

    pub fn rejected(code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl<E, R> From<SdkError<E, R>> for StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    fn from(err: SdkError<E, R>) -> Self {
        match &err {
            SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
                StoreError::unavailable(DisplayErrorContext(&err).to_string())
            }
            SdkError::ServiceError(ctx) => {
                let service_err = ctx.err();
                let message = service_err
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
                StoreError::rejected(service_err.code(), message)
            }
            _ => StoreError::rejected(None, DisplayErrorContext(&err).to_string()),
        }
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`.
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<UploadReceipt, StoreError>;

    /// All objects in the bucket, from a single listing call.
    async fn list_objects(&self) -> Result<Vec<StoredObject>, StoreError>;

    async fn health_check(&self) -> bool;

    /// Base URL that public object links are built from.
    fn public_base_url(&self) -> &str;
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<UploadReceipt, StoreError> {
        let res = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                let err = StoreError::from(e);
                tracing::error!(
                    "S3 put_object failed: bucket={}, key={}, error={}",
                    self.bucket,
                    key,
                    err
                );
                err
            })?;

        Ok(UploadReceipt {
            etag: res.e_tag().map(str::to_string),
            location: source_url(&self.public_base_url, key),
            key: key.to_string(),
            bucket: self.bucket.clone(),
        })
    }

    async fn list_objects(&self) -> Result<Vec<StoredObject>, StoreError> {
        let res = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .fetch_owner(true)
            .send()
            .await
            .map_err(|e| {
                let err = StoreError::from(e);
                tracing::error!(
                    "S3 list_objects_v2 failed: bucket={}, error={}",
                    self.bucket,
                    err
                );
                err
            })?;

        if res.is_truncated.unwrap_or(false) {
            tracing::warn!(
                "Listing of bucket '{}' is truncated; only the first page is returned",
                self.bucket
            );
        }

        let objects = res
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|object| {
                let key = object.key?;
                Some(StoredObject {
                    key,
                    last_modified: object.last_modified.and_then(|d| {
                        chrono::DateTime::from_timestamp(d.secs(), d.subsec_nanos())
                    }),
                    etag: object.e_tag,
                    size: object.size.unwrap_or(0),
                    storage_class: object.storage_class.map(|c| c.as_str().to_string()),
                    owner: object.owner.map(|o| ObjectOwner {
                        display_name: o.display_name,
                        id: o.id,
                    }),
                })
            })
            .collect();

        Ok(objects)
    }

    async fn health_check(&self) -> bool {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::put_object::PutObjectError;
    use serde_json::json;

    #[test]
    fn test_service_error_keeps_code_and_message() {
        let service_err = PutObjectError::generic(
            ErrorMetadata::builder()
                .code("NoSuchBucket")
                .message("The specified bucket does not exist")
                .build(),
        );
        let err = StoreError::from(SdkError::<PutObjectError, ()>::service_error(service_err, ()));
        assert_eq!(
            err,
            StoreError::rejected(Some("NoSuchBucket"), "The specified bucket does not exist")
        );
    }

    #[test]
    fn test_timeout_is_unavailable_and_construction_failure_is_rejected() {
        let err = StoreError::from(SdkError::<PutObjectError, ()>::timeout_error("timed out"));
        assert!(err.is_unavailable());

        let err = StoreError::from(SdkError::<PutObjectError, ()>::construction_failure(
            "missing bucket",
        ));
        assert!(matches!(err, StoreError::Rejected { code: None, .. }));
    }

    #[test]
    fn test_store_error_serializes_with_name_tag() {
        let err = StoreError::rejected(Some("NoSuchBucket"), "The specified bucket does not exist");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "name": "StoreRejected",
                "code": "NoSuchBucket",
                "message": "The specified bucket does not exist"
            })
        );

        let err = StoreError::unavailable("connection refused");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["name"], "StoreUnavailable");
        assert_eq!(value["code"], serde_json::Value::Null);
        assert!(err.is_unavailable());
    }
}
