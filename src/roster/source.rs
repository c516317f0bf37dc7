//! Where roster payloads come from.
//!
//! Sources only fetch and parse. Falling back between tiers and caching is
//! the roster cache's job.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{EngineError, EngineResult};
use crate::models::{CategoryIndex, RosterPayload};

pub const INDEX_FILE: &str = "index.json";

/// Category names double as file and URL path segments.
pub fn is_valid_category(category: &str) -> bool {
    !category.is_empty()
        && category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn check_category(source_name: &str, category: &str) -> EngineResult<()> {
    if is_valid_category(category) {
        Ok(())
    } else {
        Err(EngineError::SourceUnavailable {
            source_name: source_name.to_string(),
            reason: format!("invalid category name {category:?}"),
        })
    }
}

#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> String;

    /// The bundle for one category.
    async fn fetch_category(&self, category: &str) -> EngineResult<RosterPayload>;

    /// The unscoped default roster.
    async fn fetch_default(&self) -> EngineResult<RosterPayload>;

    async fn fetch_index(&self) -> EngineResult<CategoryIndex>;
}

/// Bundle files on disk, laid out the way `partition_roster` writes them.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
    default_file: PathBuf,
}

impl FileSource {
    /// `default_file` is resolved against `dir` when relative.
    pub fn new(dir: impl Into<PathBuf>, default_file: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let default_file = default_file.into();
        let default_file = if default_file.is_absolute() {
            default_file
        } else {
            dir.join(default_file)
        };
        Self { dir, default_file }
    }

    async fn read_json<T: DeserializeOwned>(&self, path: PathBuf) -> EngineResult<T> {
        let unavailable = |reason: String| EngineError::SourceUnavailable {
            source_name: self.name(),
            reason,
        };
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| unavailable(format!("failed to read {}: {err}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|err| unavailable(format!("malformed {}: {err}", path.display())))
    }
}

#[async_trait]
impl RosterSource for FileSource {
    fn name(&self) -> String {
        format!("files:{}", self.dir.display())
    }

    async fn fetch_category(&self, category: &str) -> EngineResult<RosterPayload> {
        check_category(&self.name(), category)?;
        self.read_json(self.dir.join(format!("{category}.json"))).await
    }

    async fn fetch_default(&self) -> EngineResult<RosterPayload> {
        self.read_json(self.default_file.clone()).await
    }

    async fn fetch_index(&self) -> EngineResult<CategoryIndex> {
        self.read_json(self.dir.join(INDEX_FILE)).await
    }
}

/// Bundles served over HTTP: `{base}/employees/{category}.json`,
/// `{base}/employees/index.json` and `{base}/{default_path}`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    default_path: String,
}

impl HttpSource {
    pub fn new(base_url: &str, default_path: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| anyhow::anyhow!("HTTP client error: {err}"))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_path: default_path.trim_start_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> EngineResult<T> {
        let unavailable = |reason: String| EngineError::SourceUnavailable {
            source_name: self.name(),
            reason,
        };
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| unavailable(format!("GET {url} failed: {err}")))?;
        response
            .json::<T>()
            .await
            .map_err(|err| unavailable(format!("malformed body from {url}: {err}")))
    }
}

#[async_trait]
impl RosterSource for HttpSource {
    fn name(&self) -> String {
        format!("http:{}", self.base_url)
    }

    async fn fetch_category(&self, category: &str) -> EngineResult<RosterPayload> {
        check_category(&self.name(), category)?;
        self.get_json(format!("{}/employees/{category}.json", self.base_url))
            .await
    }

    async fn fetch_default(&self) -> EngineResult<RosterPayload> {
        self.get_json(format!("{}/{}", self.base_url, self.default_path))
            .await
    }

    async fn fetch_index(&self) -> EngineResult<CategoryIndex> {
        self.get_json(format!("{}/employees/{INDEX_FILE}", self.base_url))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_are_restricted() {
        assert!(is_valid_category("sde"));
        assert!(is_valid_category("l7_extra-2"));
        assert!(!is_valid_category(""));
        assert!(!is_valid_category("../secrets"));
        assert!(!is_valid_category("a/b"));
    }

    #[tokio::test]
    async fn file_source_reads_bundles_and_default_roster() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("vp.json"),
            r#"{"category":"vp","total_count":1,"generated_at":"x","employees":[{"username":"ann"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("roster.json"), r#"[{"username":"bob"}]"#).unwrap();

        let source = FileSource::new(dir.path(), "roster.json");
        let (vp, _) = source.fetch_category("vp").await.unwrap().into_records();
        let (default, _) = source.fetch_default().await.unwrap().into_records();
        assert_eq!(vp[0].username, "ann");
        assert_eq!(default[0].username, "bob");
    }

    #[tokio::test]
    async fn file_source_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        let source = FileSource::new(dir.path(), "roster.json");

        for category in ["missing", "broken", "../etc"] {
            assert!(matches!(
                source.fetch_category(category).await,
                Err(EngineError::SourceUnavailable { .. })
            ));
        }
        assert!(source.fetch_index().await.is_err());
    }

    #[test]
    fn http_source_normalizes_urls() {
        let source = HttpSource::new("https://example.test/", "/amazonians.json", Duration::from_secs(5)).unwrap();
        assert_eq!(source.base_url, "https://example.test");
        assert_eq!(source.default_path, "amazonians.json");
        assert_eq!(source.name(), "http:https://example.test");
    }
}
