// 🖼️ Gallery - One registry, one image source, one random source
//
// Fetches run as spawned tasks and land in the registry through
// `set_images` whenever they complete, in whatever order. Draws read the
// registry as it is at that moment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;

use crate::config::GalleryConfig;
use crate::fetch::ImageSource;
use crate::registry::CategoryRegistry;
use crate::selector::{choose_category, choose_image, RandomSource, StdRandom};

type SharedRandom = Arc<Mutex<Box<dyn RandomSource + Send>>>;

// ============================================================================
// VIEW TYPES
// ============================================================================

/// A drawn image and the category it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub category: String,
    pub url: String,
}

/// Read-only view of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub weight: f64,
    pub image_count: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// GALLERY
// ============================================================================

pub struct Gallery<S> {
    registry: Arc<RwLock<CategoryRegistry>>,
    source: Arc<S>,
    rng: SharedRandom,
    config: GalleryConfig,
}

impl<S> Clone for Gallery<S> {
    fn clone(&self) -> Self {
        Gallery {
            registry: Arc::clone(&self.registry),
            source: Arc::clone(&self.source),
            rng: Arc::clone(&self.rng),
            config: self.config.clone(),
        }
    }
}

impl<S: ImageSource> Gallery<S> {
    /// Create an empty gallery drawing from OS entropy
    pub fn new(config: GalleryConfig, source: S) -> Self {
        Self::with_random(config, source, StdRandom::from_entropy())
    }

    /// Create an empty gallery with an explicit random source
    pub fn with_random<R>(config: GalleryConfig, source: S, rng: R) -> Self
    where
        R: RandomSource + Send + 'static,
    {
        let rng: Box<dyn RandomSource + Send> = Box::new(rng);
        Gallery {
            registry: Arc::new(RwLock::new(CategoryRegistry::new())),
            source: Arc::new(source),
            rng: Arc::new(Mutex::new(rng)),
            config,
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Add every configured default category and start fetching its images
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bootstrap(&self) -> Vec<JoinHandle<()>> {
        let defaults = self.config.default_categories.clone();
        tracing::info!(categories = defaults.len(), "bootstrapping gallery");

        defaults
            .iter()
            .filter_map(|name| self.add_category(name))
            .collect()
    }

    /// Add (or re-weight) a category and start fetching its images
    ///
    /// Blank names are ignored. Must be called from within a Tokio runtime.
    pub fn add_category(&self, name: &str) -> Option<JoinHandle<()>> {
        if name.trim().is_empty() {
            return None;
        }

        self.write().add_category(name);
        Some(self.refresh(name))
    }

    pub fn remove_category(&self, name: &str) {
        self.write().remove_category(name);
    }

    /// Pin a category's weight, rescaling the others
    pub fn set_weight(&self, name: &str, weight: f64) {
        self.write().normalize_weight_around(name, weight);
    }

    /// Fetch a category's images in the background
    ///
    /// On success the category's image list is replaced (if it still
    /// exists). On failure the existing list is kept and a warning logged.
    pub fn refresh(&self, name: &str) -> JoinHandle<()> {
        let registry = Arc::clone(&self.registry);
        let source = Arc::clone(&self.source);
        let name = name.to_string();

        tokio::spawn(async move {
            match source.fetch_images(&name).await {
                Ok(images) => {
                    let count = images.len();
                    write_registry(&registry).set_images(&name, images);
                    tracing::info!(category = %name, images = count, "image list refreshed");
                }
                Err(e) => {
                    let error = format!("{e:#}");
                    tracing::warn!(category = %name, %error, "image list fetch failed");
                }
            }
        })
    }

    /// Draw a category by weight, then an image inside it
    ///
    /// Misses are retried up to `max_draw_attempts` times.
    pub fn next_image(&self) -> Option<Pick> {
        let registry = self.read();
        let mut rng = lock_random(&self.rng);

        for _ in 0..self.config.max_draw_attempts {
            let Some(category) = choose_category(&registry, &mut **rng) else {
                continue;
            };
            if let Some(url) = choose_image(&registry, category, &mut **rng) {
                return Some(Pick {
                    category: category.to_string(),
                    url: url.to_string(),
                });
            }
        }

        tracing::debug!(categories = registry.count(), "no image available");
        None
    }

    /// Draw an image uniformly from one category
    pub fn image_from(&self, name: &str) -> Option<String> {
        let registry = self.read();
        let mut rng = lock_random(&self.rng);
        choose_image(&registry, name, &mut **rng).map(str::to_string)
    }

    pub fn summaries(&self) -> Vec<CategorySummary> {
        self.read()
            .iter()
            .map(|c| CategorySummary {
                name: c.name.clone(),
                weight: c.weight,
                image_count: c.image_count(),
                refreshed_at: c.refreshed_at,
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains(name)
    }

    pub fn count(&self) -> usize {
        self.read().count()
    }

    /// Copy of the registry as it is right now
    pub fn snapshot(&self) -> CategoryRegistry {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, CategoryRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CategoryRegistry> {
        write_registry(&self.registry)
    }
}

fn write_registry(registry: &RwLock<CategoryRegistry>) -> RwLockWriteGuard<'_, CategoryRegistry> {
    registry.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock_random(rng: &SharedRandom) -> MutexGuard<'_, Box<dyn RandomSource + Send>> {
    rng.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticImageSource;
    use crate::selector::ReplaySource;

    fn source() -> StaticImageSource {
        StaticImageSource::new()
            .with_category("aww", ["https://i.redd.it/cat.jpg", "https://i.redd.it/dog.jpg"])
            .with_category("earthporn", ["https://i.redd.it/mountain.jpg"])
            .with_category("HumanPorn", Vec::<String>::new())
    }

    async fn settle(handles: Vec<JoinHandle<()>>) {
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_bootstrap_adds_defaults_and_fetches() {
        let gallery = Gallery::new(GalleryConfig::default(), source());
        settle(gallery.bootstrap()).await;

        let summaries = gallery.summaries();
        let names: Vec<_> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["aww", "earthporn", "HumanPorn"]);

        for summary in &summaries {
            assert!((summary.weight - 1.0 / 3.0).abs() < 1e-9);
            assert!(summary.refreshed_at.is_some());
        }
        assert_eq!(summaries[0].image_count, 2);
        assert_eq!(summaries[1].image_count, 1);
        assert_eq!(summaries[2].image_count, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_category() {
        let gallery = Gallery::new(GalleryConfig::default(), source());
        gallery.add_category("pics").unwrap().await.unwrap();

        assert!(gallery.contains("pics"));
        let summary = &gallery.summaries()[0];
        assert_eq!(summary.image_count, 0);
        assert!(summary.refreshed_at.is_none());
    }

    #[tokio::test]
    async fn test_fetch_completing_after_removal_is_noop() {
        let gallery = Gallery::new(GalleryConfig::default(), source());
        let handle = gallery.add_category("aww").unwrap();
        gallery.remove_category("aww");

        handle.await.unwrap();

        assert_eq!(gallery.count(), 0);
        assert!(gallery.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_ignored() {
        let gallery = Gallery::new(GalleryConfig::default(), source());

        assert!(gallery.add_category("   ").is_none());
        assert_eq!(gallery.count(), 0);
    }

    #[tokio::test]
    async fn test_next_image_follows_draws() {
        // aww covers [0, 0.5], earthporn (0.5, 1.0]
        let draws = ReplaySource::new(vec![0.9, 0.0, 0.1, 0.99]);
        let config = GalleryConfig {
            default_categories: vec!["aww".into(), "earthporn".into()],
            ..GalleryConfig::default()
        };
        let gallery = Gallery::with_random(config, source(), draws);
        settle(gallery.bootstrap()).await;

        let first = gallery.next_image().unwrap();
        assert_eq!(first.category, "earthporn");
        assert_eq!(first.url, "https://i.redd.it/mountain.jpg");

        let second = gallery.next_image().unwrap();
        assert_eq!(second.category, "aww");
        assert_eq!(second.url, "https://i.redd.it/dog.jpg");
    }

    #[tokio::test]
    async fn test_next_image_retries_past_empty_category() {
        // first draw lands on HumanPorn (no images), second on aww
        let draws = ReplaySource::new(vec![0.9, 0.1, 0.0]);
        let config = GalleryConfig {
            default_categories: vec!["aww".into(), "HumanPorn".into()],
            ..GalleryConfig::default()
        };
        let gallery = Gallery::with_random(config, source(), draws);
        settle(gallery.bootstrap()).await;

        let pick = gallery.next_image().unwrap();
        assert_eq!(pick.category, "aww");
        assert_eq!(pick.url, "https://i.redd.it/cat.jpg");
    }

    #[tokio::test]
    async fn test_next_image_gives_up() {
        let config = GalleryConfig {
            default_categories: vec!["HumanPorn".into()],
            max_draw_attempts: 3,
            ..GalleryConfig::default()
        };
        let gallery = Gallery::new(config, source());
        settle(gallery.bootstrap()).await;

        assert_eq!(gallery.next_image(), None);
    }

    #[tokio::test]
    async fn test_empty_gallery_has_nothing_to_show() {
        let gallery = Gallery::new(GalleryConfig::default(), source());

        assert_eq!(gallery.next_image(), None);
        assert_eq!(gallery.image_from("aww"), None);
    }

    #[tokio::test]
    async fn test_set_weight_and_image_from() {
        let config = GalleryConfig {
            default_categories: vec!["aww".into(), "earthporn".into()],
            ..GalleryConfig::default()
        };
        let gallery = Gallery::new(config, source());
        settle(gallery.bootstrap()).await;

        gallery.set_weight("aww", 0.75);
        let snapshot = gallery.snapshot();
        assert_eq!(snapshot.weight("aww"), Some(0.75));
        assert!((snapshot.weight("earthporn").unwrap() - 0.25).abs() < 1e-9);

        assert_eq!(
            gallery.image_from("earthporn").as_deref(),
            Some("https://i.redd.it/mountain.jpg")
        );
    }
}
