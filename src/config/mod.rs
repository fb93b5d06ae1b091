use std::env;

/// Object store connection settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3-compatible endpoint (default: "http://localhost:4566")
    pub endpoint_url: String,

    /// Static access key (default: "test")
    pub access_key: String,

    /// Static secret key (default: "test")
    pub secret_key: String,

    /// Bucket that receives uploads (default: "uploads")
    pub bucket: String,

    /// Signing region (default: "us-east-1")
    pub region: String,

    /// Base URL used to build public object links.
    /// Defaults to `<endpoint_url>/<bucket>` (path-style).
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let endpoint_url = "http://localhost:4566".to_string();
        let bucket = "uploads".to_string();
        Self {
            public_base_url: path_style_base(&endpoint_url, &bucket),
            endpoint_url,
            access_key: "test".to_string(),
            secret_key: "test".to_string(),
            bucket,
            region: "us-east-1".to_string(),
        }
    }
}

impl StorageConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        let endpoint_url = env::var("S3_ENDPOINT").unwrap_or(default.endpoint_url);
        let bucket = env::var("S3_BUCKET").unwrap_or(default.bucket);

        Self {
            public_base_url: env::var("S3_PUBLIC_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| path_style_base(&endpoint_url, &bucket)),
            access_key: env::var("S3_ACCESS_KEY").unwrap_or(default.access_key),
            secret_key: env::var("S3_SECRET_KEY").unwrap_or(default.secret_key),
            region: env::var("S3_REGION").unwrap_or(default.region),
            endpoint_url,
            bucket,
        }
    }
}

fn path_style_base(endpoint_url: &str, bucket: &str) -> String {
    format!("{}/{}", endpoint_url.trim_end_matches('/'), bucket)
}

/// HTTP-facing settings shared by both services
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum upload size in bytes (default: 50 MB)
    pub max_file_size: usize,

    /// Answer store failures with 200 and the error object as body,
    /// instead of 502/503 (default: false)
    pub store_errors_as_ok: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50 MB
            store_errors_as_ok: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            store_errors_as_ok: env::var("STORE_ERRORS_AS_OK")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.store_errors_as_ok),
        }
    }

    /// Body limit for multipart requests: the file limit plus 10MB of framing overhead
    pub fn body_limit(&self) -> usize {
        self.max_file_size.saturating_add(10 * 1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_storage_config() {
        let config = StorageConfig::default();
        assert_eq!(config.endpoint_url, "http://localhost:4566");
        assert_eq!(config.bucket, "uploads");
        assert_eq!(config.public_base_url, "http://localhost:4566/uploads");
    }

    #[test]
    fn test_path_style_base_trims_slash() {
        assert_eq!(
            path_style_base("http://minio:9000/", "images"),
            "http://minio:9000/images"
        );
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
        assert!(!config.store_errors_as_ok);
        assert_eq!(config.body_limit(), 60 * 1024 * 1024);
    }

    #[test]
    fn test_body_limit_saturates() {
        let config = ServerConfig {
            max_file_size: usize::MAX - 1,
            ..ServerConfig::default()
        };
        assert_eq!(config.body_limit(), usize::MAX);
    }

    #[test]
    fn test_storage_from_env_public_base_fallback() {
        unsafe {
            env::set_var("S3_ENDPOINT", "http://127.0.0.1:9000");
            env::set_var("S3_BUCKET", "pictures");
            env::remove_var("S3_PUBLIC_BASE_URL");
        }
        let config = StorageConfig::from_env();
        unsafe {
            env::remove_var("S3_ENDPOINT");
            env::remove_var("S3_BUCKET");
        }
        assert_eq!(config.public_base_url, "http://127.0.0.1:9000/pictures");
    }
}
