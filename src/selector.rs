// 🎲 Weighted Selector - Pick a category by weight, then an image uniformly
//
// Selection never mutates the registry. Every miss (empty registry,
// rounding past the last boundary, unknown or empty category) is `None`.

use crate::registry::CategoryRegistry;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// RANDOM SOURCE
// ============================================================================

/// Source of uniform draws, injectable for deterministic tests
pub trait RandomSource {
    /// Uniform draw in [0, 1)
    fn next_f64(&mut self) -> f64;

    /// Uniform index in [0, len); `len` must be non-zero
    fn next_index(&mut self, len: usize) -> usize {
        let index = (self.next_f64() * len as f64).floor() as usize;
        index.min(len - 1)
    }
}

impl<F> RandomSource for F
where
    F: FnMut() -> f64,
{
    fn next_f64(&mut self) -> f64 {
        self()
    }
}

/// `rand`-backed source used outside of tests
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Seed from operating system entropy
    pub fn from_entropy() -> Self {
        StdRandom {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        StdRandom {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ReplaySource {
    draws: Vec<f64>,
    index: usize,
}

impl ReplaySource {
    pub fn new(draws: Vec<f64>) -> Self {
        ReplaySource { draws, index: 0 }
    }
}

impl RandomSource for ReplaySource {
    fn next_f64(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let draw = self.draws[self.index % self.draws.len()];
        self.index += 1;
        draw
    }
}

// ============================================================================
// SELECTION
// ============================================================================

/// Draw a category name according to the registry weights
///
/// Walks the categories in registry order, accumulating a lower bound, and
/// returns the first non-zero-weight category whose upper bound covers the
/// draw.
pub fn choose_category<'a, R>(registry: &'a CategoryRegistry, rng: &mut R) -> Option<&'a str>
where
    R: RandomSource + ?Sized,
{
    let number = rng.next_f64();
    let mut lower_bound = 0.0;

    for category in registry.iter() {
        let weight = category.weight;
        if weight != 0.0 && number <= lower_bound + weight {
            return Some(category.name.as_str());
        }
        lower_bound += weight;
    }

    None
}

/// Draw an image URL uniformly from one category
pub fn choose_image<'a, R>(registry: &'a CategoryRegistry, name: &str, rng: &mut R) -> Option<&'a str>
where
    R: RandomSource + ?Sized,
{
    let urls = registry.images(name)?;
    if urls.is_empty() {
        return None;
    }

    let index = rng.next_index(urls.len());
    urls.get(index).map(String::as_str)
}

// ============================================================================
// TESTS
// ============================================================================
