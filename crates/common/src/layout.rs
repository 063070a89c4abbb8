//! On-disk backup layout: `<root>/<bucket_type>/<bucket>/<key>`.
//!
//! Every segment is percent-encoded, so a name containing `/` (or any other
//! byte a file system might object to) still maps to exactly one path
//! component. `.` and `..` get their dots escaped as well. Restoring reads the
//! identity back from the last three components alone.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use crate::error::BackupError;

#[derive(Debug, Clone)]
pub struct BackupLayout {
    root: PathBuf,
}

impl BackupLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn bucket_type_dir(&self, bucket_type: &str) -> PathBuf {
        self.root.join(&*encode_segment(bucket_type))
    }

    pub fn bucket_dir(&self, bucket_type: &str, bucket: &str) -> PathBuf {
        self.bucket_type_dir(bucket_type).join(&*encode_segment(bucket))
    }

    pub fn record_path(&self, bucket_type: &str, bucket: &str, key: &str) -> PathBuf {
        self.bucket_dir(bucket_type, bucket).join(&*encode_segment(key))
    }

    /// Rebuild `(bucket_type, bucket, key)` from a record file path.
    pub fn identity_of(&self, path: &Path) -> Result<(String, String, String), BackupError> {
        let invalid = || BackupError::InvalidName {
            path: path.to_path_buf(),
        };

        let relative = path.strip_prefix(&self.root).map_err(|_| invalid())?;
        let segments = relative
            .components()
            .map(|component| match component {
                Component::Normal(name) => name.to_str().and_then(decode_segment),
                _ => None,
            })
            .collect::<Option<Vec<String>>>()
            .ok_or_else(invalid)?;

        match <[String; 3]>::try_from(segments) {
            Ok([bucket_type, bucket, key]) => Ok((bucket_type, bucket, key)),
            Err(_) => Err(invalid()),
        }
    }
}

pub fn encode_segment(name: &str) -> Cow<'_, str> {
    match name {
        "." => Cow::Borrowed("%2E"),
        ".." => Cow::Borrowed("%2E%2E"),
        _ => urlencoding::encode(name),
    }
}

pub fn decode_segment(name: &str) -> Option<String> {
    urlencoding::decode(name).ok().map(Cow::into_owned)
}
