//! The parts of an S3 request that decide which grant it needs.

use accessgrants_cache::prefix::common_prefix;
use accessgrants_core::{AccessGrantsError, AccessGrantsResult};

const LIST_OPERATIONS: [&str; 4] = [
    "ListObjects",
    "ListObjectsV2",
    "ListObjectVersions",
    "ListMultipartUploads",
];

/// An S3 request as seen before signing.
///
/// Only the parameters that decide the Access Grants target are carried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3Request {
    /// S3 operation name, e.g. `GetObject`.
    pub operation: String,
    /// Target bucket.
    pub bucket: String,
    /// Object key, for object operations.
    pub key: Option<String>,
    /// Key prefix, for list operations.
    pub prefix: Option<String>,
    /// Keys of a `DeleteObjects` batch.
    pub delete_keys: Vec<String>,
    /// `CopyObject` source as `bucket/key`.
    pub copy_source: Option<String>,
}

impl S3Request {
    /// Request for `operation` on `bucket`.
    pub fn new(operation: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Set the object key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the list prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the keys of a batch delete.
    pub fn with_delete_keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.delete_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set the copy source (`bucket/key`).
    pub fn with_copy_source(mut self, source: impl Into<String>) -> Self {
        self.copy_source = Some(source.into());
        self
    }

    /// The `s3://` target Access Grants is asked about.
    ///
    /// ```
    /// use accessgrants::S3Request;
    ///
    /// let request = S3Request::new("GetObject", "bucket").with_key("a/b.txt");
    /// assert_eq!(request.s3_prefix().unwrap(), "s3://bucket/a/b.txt");
    ///
    /// let request = S3Request::new("DeleteObjects", "bucket")
    ///     .with_delete_keys(["logs/2024/a", "logs/2025/b"]);
    /// assert_eq!(request.s3_prefix().unwrap(), "s3://bucket/logs/202");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the bucket is missing, or a `CopyObject`
    /// request lacks its source or key or copies across buckets.
    pub fn s3_prefix(&self) -> AccessGrantsResult<String> {
        if self.bucket.is_empty() {
            return Err(AccessGrantsError::invalid_request("bucket must be provided"));
        }

        let bucket = self.bucket.as_str();
        let operation = self.operation.as_str();

        let prefix = if operation.eq_ignore_ascii_case("DeleteObjects") {
            format!("{bucket}{}", common_prefix(self.delete_keys.as_slice()))
        } else if operation.eq_ignore_ascii_case("CopyObject") {
            let (source_bucket, source_key) = self.copy_source_parts()?;
            if source_bucket != bucket {
                return Err(AccessGrantsError::invalid_request(
                    "source bucket and destination bucket must be the same",
                ));
            }
            let key = self.key.as_deref().ok_or_else(|| {
                AccessGrantsError::invalid_request("CopyObject requires a destination key")
            })?;
            format!("{bucket}{}", common_prefix(&[source_key, key]))
        } else if LIST_OPERATIONS
            .iter()
            .any(|list| operation.eq_ignore_ascii_case(list))
        {
            Self::join(bucket, self.prefix.as_deref())
        } else {
            Self::join(bucket, self.key.as_deref())
        };

        Ok(format!("s3://{prefix}"))
    }

    fn copy_source_parts(&self) -> AccessGrantsResult<(&str, &str)> {
        let source = self.copy_source.as_deref().ok_or_else(|| {
            AccessGrantsError::invalid_request("CopyObject requires a copy source")
        })?;
        // Both `bucket/key` and `/bucket/key` are valid copy sources.
        source
            .strip_prefix('/')
            .unwrap_or(source)
            .split_once('/')
            .ok_or_else(|| {
                AccessGrantsError::invalid_request(format!(
                    "copy source must be bucket/key, got {source}"
                ))
            })
    }

    fn join(bucket: &str, path: Option<&str>) -> String {
        match path {
            Some(path) => format!("{bucket}/{path}"),
            None => bucket.to_string(),
        }
    }
}
