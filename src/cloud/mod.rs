//! Cloud export adapter.
//!
//! The [`ObjectStore`] trait abstracts the blob-storage boundary so the
//! pipeline can upload its artifacts without knowing the transport; the
//! shipped implementation is [`S3Client`]. Failures are terminal and
//! surfaced verbatim; downloads already produced locally are unaffected.

mod s3;

pub use s3::{S3Client, S3Config};

use crate::error::Result;
use crate::reporting::cleaned_data_file_name;
use tracing::info;

/// A destination that stores byte blobs under string keys.
///
/// Implementations must be `Send + Sync` and return the locator of the
/// stored object (e.g. `s3://bucket/key`).
pub trait ObjectStore: Send + Sync {
    /// Store a blob under `key`, returning the resulting object locator.
    fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String>;

    /// Store name for logging.
    fn name(&self) -> &str;
}

/// Upload the cleaned dataset and the report under the given key prefix.
///
/// Returns the two object locators in (dataset, report) order.
pub fn export_artifacts(
    store: &dyn ObjectStore,
    prefix: &str,
    stem: &str,
    timestamp: &str,
    dataset: &[u8],
    report: &[u8],
) -> Result<(String, String)> {
    let dataset_key = prefixed_key(prefix, &cleaned_data_file_name(stem));
    let report_key = prefixed_key(prefix, &format!("report_{}.md", timestamp));

    info!("Uploading dataset to {} as '{}'", store.name(), dataset_key);
    let dataset_uri = store.put_object(&dataset_key, dataset, "text/csv")?;

    info!("Uploading report to {} as '{}'", store.name(), report_key);
    let report_uri = store.put_object(&report_key, report, "text/markdown")?;

    Ok((dataset_uri, report_uri))
}

fn prefixed_key(prefix: &str, file_name: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", trimmed, file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records uploads instead of performing them.
    struct RecordingStore {
        calls: Mutex<Vec<(String, usize, String)>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ObjectStore for RecordingStore {
        fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
            self.calls.lock().unwrap().push((
                key.to_string(),
                bytes.len(),
                content_type.to_string(),
            ));
            Ok(format!("s3://test-bucket/{}", key))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[test]
    fn test_export_artifacts_keys_and_locators() {
        let store = RecordingStore::new();
        let (dataset_uri, report_uri) = export_artifacts(
            &store,
            "analysis-outputs/",
            "sales",
            "20240601_101500",
            b"a,b\n1,2\n",
            b"# report",
        )
        .unwrap();

        assert_eq!(
            dataset_uri,
            "s3://test-bucket/analysis-outputs/cleaned_sales.csv"
        );
        assert_eq!(
            report_uri,
            "s3://test-bucket/analysis-outputs/report_20240601_101500.md"
        );

        let calls = store.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].2, "text/csv");
        assert_eq!(calls[1].2, "text/markdown");
    }

    #[test]
    fn test_prefixed_key_handles_empty_prefix() {
        assert_eq!(prefixed_key("", "cleaned_x.csv"), "cleaned_x.csv");
        assert_eq!(prefixed_key("p/", "f.md"), "p/f.md");
        assert_eq!(prefixed_key("p", "f.md"), "p/f.md");
    }
}
