//! Storage locations backed by object stores (local, S3, R2, GCS, Azure, memory)

use super::glob::GlobPattern;
use crate::config::Credentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::debug;

/// A root location in object storage, parsed from a URL
///
/// All paths passed to and returned from a location are relative to its root.
#[derive(Debug, Clone)]
pub struct StorageLocation {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// URL scheme for logging
    scheme: String,
}

impl StorageLocation {
    /// Parse a location URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` or `s3a://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/`, `./path/` or `file:///path` - Local filesystem
    ///
    /// With `create_local` set, a missing local directory is created
    /// (output roots); otherwise it must already exist (input roots).
    pub fn parse(url: &str, credentials: &Credentials, create_local: bool) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("s3://") {
            Self::parse_s3(rest, "s3", credentials)
        } else if let Some(rest) = url.strip_prefix("s3a://") {
            Self::parse_s3(rest, "s3", credentials)
        } else if let Some(rest) = url.strip_prefix("r2://") {
            Self::parse_s3(rest, "r2", credentials)
        } else if let Some(rest) = url.strip_prefix("gs://") {
            Self::parse_gcs(rest)
        } else if let Some(rest) = url.strip_prefix("az://") {
            Self::parse_azure(rest)
        } else {
            Self::parse_local(url, create_local)
        }
    }

    /// Create a location over an existing object store
    pub fn from_store(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into().trim_matches('/').to_string(),
            scheme: "memory".to_string(),
        }
    }

    /// Create an empty in-memory location
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemory::new()), "")
    }

    /// Split `bucket/some/prefix/` into bucket and prefix
    fn split_bucket(without_scheme: &str) -> (String, String) {
        match without_scheme.find('/') {
            Some(idx) => (
                without_scheme[..idx].to_string(),
                without_scheme[idx + 1..].trim_matches('/').to_string(),
            ),
            None => (without_scheme.to_string(), String::new()),
        }
    }

    /// Parse S3 or R2 location
    fn parse_s3(without_scheme: &str, scheme: &str, credentials: &Credentials) -> Result<Self> {
        let (bucket, prefix) = Self::split_bucket(without_scheme);
        if bucket.is_empty() {
            return Err(Error::config(format!("Missing bucket in {scheme} URL")));
        }

        // from_env() picks up AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_ENDPOINT, ...
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&bucket);

        if let (Some(key_id), Some(secret)) = (
            credentials.access_key_id.as_deref(),
            credentials.secret_access_key.as_deref(),
        ) {
            builder = builder
                .with_access_key_id(key_id)
                .with_secret_access_key(secret);
        }
        if let Some(region) = credentials.region.as_deref() {
            builder = builder.with_region(region);
        }

        let endpoint = credentials.endpoint.clone().or_else(|| {
            if scheme == "r2" {
                std::env::var("R2_ENDPOINT_URL").ok()
            } else {
                None
            }
        });
        if let Some(endpoint) = endpoint {
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
            builder = builder.with_endpoint(endpoint);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: scheme.to_string(),
        })
    }

    /// Parse GCS location
    fn parse_gcs(without_scheme: &str) -> Result<Self> {
        let (bucket, prefix) = Self::split_bucket(without_scheme);

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
        })
    }

    /// Parse Azure Blob location
    fn parse_azure(without_scheme: &str) -> Result<Self> {
        let (container, prefix) = Self::split_bucket(without_scheme);

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str, create: bool) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);
        if path.is_empty() {
            return Err(Error::config("Empty storage path"));
        }

        if create {
            std::fs::create_dir_all(path)
                .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;
        } else if !std::path::Path::new(path).is_dir() {
            return Err(Error::config(format!("Input directory not found: {path}")));
        }

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
        })
    }

    /// Check if this is a cloud location (not local or memory)
    pub fn is_cloud(&self) -> bool {
        !matches!(self.scheme.as_str(), "file" | "memory")
    }

    /// Get the scheme (s3, r2, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Resolve a relative path against the root
    ///
    /// Segments are taken as-is, so paths returned by [`Self::list`] resolve
    /// back to the same objects.
    fn full_path(&self, relative: &str) -> Result<ObjectPath> {
        let joined = self.joined(relative);
        ObjectPath::parse(joined).map_err(|e| Error::Storage(e.into()))
    }

    fn joined(&self, relative: &str) -> String {
        let relative = relative.trim_matches('/');
        if self.prefix.is_empty() {
            relative.to_string()
        } else if relative.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}/{relative}", self.prefix)
        }
    }

    /// Strip the root prefix from a store path
    fn relative_path(&self, path: &ObjectPath) -> String {
        let raw = path.as_ref();
        if self.prefix.is_empty() {
            return raw.to_string();
        }
        raw.strip_prefix(self.prefix.as_str())
            .unwrap_or(raw)
            .trim_start_matches('/')
            .to_string()
    }

    /// Display form of a relative path, for logs
    pub fn display_path(&self, relative: &str) -> String {
        format!("{}://{}", self.scheme, self.joined(relative))
    }

    /// List every object under a relative prefix, sorted by path
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let root = self.full_path(prefix)?;
        let root = if root.as_ref().is_empty() {
            None
        } else {
            Some(root)
        };

        let metas: Vec<_> = self.store.list(root.as_ref()).try_collect().await?;
        let mut paths: Vec<String> = metas
            .iter()
            .map(|meta| self.relative_path(&meta.location))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// List objects matching a glob, sorted by path
    pub async fn list_matching(&self, glob: &GlobPattern) -> Result<Vec<String>> {
        let candidates = self.list(&glob.literal_prefix()).await?;
        let matched: Vec<String> = candidates
            .into_iter()
            .filter(|path| glob.matches(path))
            .collect();
        debug!(
            pattern = glob.as_str(),
            files = matched.len(),
            "Listed input files"
        );
        Ok(matched)
    }

    /// Read a whole object
    pub async fn get(&self, relative: &str) -> Result<Bytes> {
        let path = self.full_path(relative)?;
        let bytes = self.store.get(&path).await?.bytes().await?;
        Ok(bytes)
    }

    /// Write a whole object, returning its display path
    pub async fn put(&self, relative: &str, data: Bytes) -> Result<String> {
        let path = self.full_path(relative)?;
        self.store.put(&path, data.into()).await?;
        Ok(format!("{}://{path}", self.scheme))
    }

    /// Delete every object under a relative prefix, returning the count
    pub async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let existing = self.list(prefix).await?;
        for relative in &existing {
            self.store.delete(&self.full_path(relative)?).await?;
        }
        Ok(existing.len())
    }
}
