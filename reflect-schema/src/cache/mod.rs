//! Memoization of generated schemas
//!
//! Disabled by default. When enabled on a [`Reflector`](crate::Reflector),
//! every top-level call first looks up `(root type, configuration
//! fingerprint)`; a hit returns a deep clone, a miss generates and stores a
//! clone.
//!
//! ```rust
//! use reflect_schema::Reflector;
//!
//! let reflector = Reflector::new().with_cache(true).with_max_cache_entries(256);
//! let first = reflector.reflect::<Vec<String>>().unwrap();
//! let second = reflector.reflect::<Vec<String>>().unwrap();
//! assert_eq!(first, second);
//! assert_eq!(reflector.cache_stats().map(|stats| stats.hits), Some(1));
//! ```
//!
//! # Tracing
//!
//! - **Debug level**: cache hits, misses and evictions
//! - **Trace level**: stores and rejected duplicate stores

mod fingerprint;
mod store;

pub(crate) use fingerprint::fingerprint;
pub use store::{CacheKey, CacheStats, SchemaCache};

/// Default for `Reflector::max_cache_entries`; zero means unbounded
pub const DEFAULT_MAX_ENTRIES: usize = 0;
