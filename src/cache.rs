//! In-memory caching using moka
//!
//! Caches catalog entries by title. Only the movie record is cached;
//! available inventory is always computed from live rentals.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::db::queries;
use crate::models::Movie;

/// Application cache holding catalog entries
#[derive(Clone)]
pub struct AppCache {
    /// Movies (title -> Movie)
    pub movies: Cache<String, Arc<Movie>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Movies: 1000 entries, 30 min TTL, 10 min idle
            movies: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(Duration::from_secs(30 * 60))
                .time_to_idle(Duration::from_secs(10 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            movies_size: self.movies.entry_count(),
        }
    }

    /// Invalidate a specific movie by title
    pub async fn invalidate_movie(&self, title: &str) {
        self.movies.invalidate(title).await;
        info!("Cache invalidated for movie: {}", title);
    }

    /// Store a movie under its title
    pub async fn insert_movie(&self, movie: Movie) {
        self.movies.insert(movie.title.clone(), Arc::new(movie)).await;
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub movies_size: u64,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every `period`.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool, period: Duration) {
    let mut interval = interval(period);
    loop {
        // First tick completes immediately, which doubles as the initial warm-up
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Warm the cache with the full catalog
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    match queries::get_movies(db).await {
        Ok(movies) => {
            for movie in movies {
                cache.insert_movie(movie).await;
            }
        }
        Err(e) => warn!("Failed to warm movie cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}
