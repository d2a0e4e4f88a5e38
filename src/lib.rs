// Subreddit Gallery - Core Library
// Weighted category registry, selector, image sources and the gallery service

pub mod config;
pub mod fetch;
pub mod gallery;
pub mod registry;
pub mod selector;

// Only compile the HTTP API when the server feature is enabled
#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use config::GalleryConfig;
pub use fetch::{parse_image_lists, HttpImageSource, ImageSource, StaticImageSource};
pub use gallery::{CategorySummary, Gallery, Pick};
pub use registry::{Category, CategoryRegistry, WEIGHT_FLOOR};
pub use selector::{choose_category, choose_image, RandomSource, ReplaySource, StdRandom};

#[cfg(feature = "server")]
pub use server::{router, ApiResponse};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
