use url::Url;

use super::StoreError;

/// An addressable resource on the store's HTTP interface.
///
/// Segments are appended with [`Url::path_segments_mut`], which percent-encodes
/// each one, so names containing `/`, `?` or `%` stay a single segment.
/// URL parsing always collapses `.` and `..` segments, so names equal to
/// either cannot be addressed at all and are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location<'a> {
    /// `/types/{bucket_type}/buckets?buckets=true`
    Buckets { bucket_type: &'a str },
    /// `/types/{bucket_type}/buckets/{bucket}/keys?keys=true`
    Keys { bucket_type: &'a str, bucket: &'a str },
    /// `/types/{bucket_type}/buckets/{bucket}/props`
    Props { bucket_type: &'a str, bucket: &'a str },
    /// `/types/{bucket_type}/buckets/{bucket}/keys/{key}`
    Value {
        bucket_type: &'a str,
        bucket: &'a str,
        key: &'a str,
    },
}

impl<'a> Location<'a> {
    pub fn url(&self, base_url: &Url) -> Result<Url, StoreError> {
        if let Some(name) = self.names().into_iter().flatten().find(|n| is_dot_segment(n)) {
            return Err(StoreError::UnaddressableName(name.to_string()));
        }

        let mut url = base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidBaseUrl(base_url.clone()))?;
            segments.pop_if_empty();
            match *self {
                Location::Buckets { bucket_type } => {
                    segments.extend(["types", bucket_type, "buckets"]);
                }
                Location::Keys {
                    bucket_type,
                    bucket,
                } => {
                    segments.extend(["types", bucket_type, "buckets", bucket, "keys"]);
                }
                Location::Props {
                    bucket_type,
                    bucket,
                } => {
                    segments.extend(["types", bucket_type, "buckets", bucket, "props"]);
                }
                Location::Value {
                    bucket_type,
                    bucket,
                    key,
                } => {
                    segments.extend(["types", bucket_type, "buckets", bucket, "keys", key]);
                }
            }
        }

        match self {
            Location::Buckets { .. } => url.set_query(Some("buckets=true")),
            Location::Keys { .. } => url.set_query(Some("keys=true")),
            _ => url.set_query(None),
        }

        Ok(url)
    }

    fn names(&self) -> [Option<&'a str>; 3] {
        match *self {
            Location::Buckets { bucket_type } => [Some(bucket_type), None, None],
            Location::Keys {
                bucket_type,
                bucket,
            }
            | Location::Props {
                bucket_type,
                bucket,
            } => [Some(bucket_type), Some(bucket), None],
            Location::Value {
                bucket_type,
                bucket,
                key,
            } => [Some(bucket_type), Some(bucket), Some(key)],
        }
    }
}

fn is_dot_segment(name: &str) -> bool {
    name == "." || name == ".."
}
