// 📡 Image Sources - Where category image lists come from
//
// The registry only ever sees the successful result of a fetch, through
// `set_images`. Retries, backoff and failure policy belong to the caller.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use crate::config::GalleryConfig;

// ============================================================================
// IMAGE SOURCE
// ============================================================================

/// Anything that can produce the image URLs of a category
pub trait ImageSource: Send + Sync + 'static {
    fn fetch_images(&self, category: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}

// ============================================================================
// HTTP IMAGE SOURCE
// ============================================================================

/// Image list endpoint speaking the `subreddit=<name>` form protocol
///
/// The endpoint answers with a JSON object keyed by category name:
/// `{"aww": ["https://i.redd.it/...", ...]}`
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpImageSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpImageSource {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &GalleryConfig) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ImageSource for HttpImageSource {
    async fn fetch_images(&self, category: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("subreddit", category)])
            .send()
            .await
            .with_context(|| format!("Failed to request images for {category}"))?
            .error_for_status()
            .with_context(|| format!("Image list request for {category} was rejected"))?;

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read image list for {category}"))?;

        parse_image_lists(&body, category)
    }
}

/// Extract one category's URLs from an image-list response body
///
/// A missing key or a `null` list means the category has no images.
pub fn parse_image_lists(body: &str, category: &str) -> Result<Vec<String>> {
    let mut lists: HashMap<String, Option<Vec<String>>> =
        serde_json::from_str(body).context("Failed to parse image list JSON")?;

    Ok(lists.remove(category).flatten().unwrap_or_default())
}

// ============================================================================
// STATIC IMAGE SOURCE
// ============================================================================

/// Fixed in-memory image lists (offline mode and tests)
#[derive(Debug, Clone, Default)]
pub struct StaticImageSource {
    lists: HashMap<String, Vec<String>>,
}

impl StaticImageSource {
    pub fn new() -> Self {
        StaticImageSource {
            lists: HashMap::new(),
        }
    }

    /// Add (or replace) the images served for a category
    pub fn with_category<I, S>(mut self, name: impl Into<String>, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lists
            .insert(name.into(), urls.into_iter().map(Into::into).collect());
        self
    }
}

impl ImageSource for StaticImageSource {
    async fn fetch_images(&self, category: &str) -> Result<Vec<String>> {
        match self.lists.get(category) {
            Some(urls) => Ok(urls.clone()),
            None => bail!("No images known for category {category}"),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
