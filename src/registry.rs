// 🗂️ Category Registry - Weighted categories with their image lists
//
// Every category carries a weight in [0,1] and the weights of all
// categories sum to 1. Adding or removing a category rescales the others
// proportionally so each keeps its relative share of what is left.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smallest weight a rescaled category can be left with
pub const WEIGHT_FLOOR: f64 = 1e-5;

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique key (e.g., "aww", "earthporn")
    pub name: String,

    /// Selection probability in [0,1]
    pub weight: f64,

    /// Image URLs, replaced wholesale by `set_images`
    pub images: Vec<String>,

    /// When the image list was last replaced
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Category {
    fn new(name: String) -> Self {
        Category {
            name,
            weight: 0.0,
            images: Vec::new(),
            refreshed_at: None,
        }
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

// ============================================================================
// CATEGORY REGISTRY
// ============================================================================

/// Insertion-ordered mapping from category name to [`Category`]
///
/// The iteration order is the order categories were first added, and it is
/// the order the selector walks when partitioning [0,1) by weight.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        CategoryRegistry {
            categories: Vec::new(),
        }
    }

    /// Create registry with the given categories added in order
    pub fn with_categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = CategoryRegistry::new();
        for name in names {
            registry.add_category(name);
        }
        registry
    }

    /// Add a category with weight 1/N, shrinking the others to make room
    ///
    /// Re-adding an existing name resets its weight to 1/N and leaves its
    /// images alone.
    pub fn add_category(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.position(&name).is_none() {
            self.categories.push(Category::new(name.clone()));
        }

        let share = 1.0 / self.categories.len() as f64;
        self.normalize_weight_around(&name, share);
        tracing::debug!(category = %name, weight = share, "category added");
    }

    /// Remove a category and hand its weight back to the rest
    pub fn remove_category(&mut self, name: &str) {
        let Some(index) = self.position(name) else {
            return;
        };

        self.normalize_weight_around(name, 0.0);
        self.categories.remove(index);
        tracing::debug!(category = %name, remaining = self.categories.len(), "category removed");
    }

    /// Replace the image list of a category
    pub fn set_images(&mut self, name: &str, images: Vec<String>) {
        let Some(category) = self.get_mut(name) else {
            return;
        };

        category.images = images;
        category.refreshed_at = Some(Utc::now());
        tracing::debug!(category = %name, images = category.images.len(), "images replaced");
    }

    /// Pin one category's weight and rescale every other category
    /// proportionally into the remaining `1 - weight`.
    ///
    /// Rescaled weights never drop below [`WEIGHT_FLOOR`], so after many
    /// operations the total is only approximately 1. If the other
    /// categories carry no weight at all they are left untouched.
    ///
    /// Unknown names and non-finite weights are ignored; finite weights are
    /// clamped to [0,1].
    pub fn normalize_weight_around(&mut self, name: &str, weight: f64) {
        if !weight.is_finite() {
            return;
        }
        let Some(target) = self.position(name) else {
            return;
        };

        let weight = weight.clamp(0.0, 1.0);
        self.categories[target].weight = weight;
        let remaining = 1.0 - weight;

        let total: f64 = self
            .categories
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target)
            .map(|(_, c)| c.weight)
            .sum();

        if total == 0.0 {
            return;
        }

        for (i, category) in self.categories.iter_mut().enumerate() {
            if i != target {
                let percent = category.weight / total;
                category.weight = (percent * remaining).max(WEIGHT_FLOOR);
            }
        }
    }

    /// Get a category by name
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Current weight of a category
    pub fn weight(&self, name: &str) -> Option<f64> {
        self.get(name).map(|c| c.weight)
    }

    /// Current images of a category
    pub fn images(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|c| c.images.as_slice())
    }

    /// Iterate categories in registry order
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Category names in registry order
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Sum of all weights (1 within tolerance unless empty)
    pub fn total_weight(&self) -> f64 {
        self.categories.iter().map(|c| c.weight).sum()
    }

    /// Get total count of categories
    pub fn count(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
