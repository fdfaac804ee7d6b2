//! Time-bounded, per-category cache of loaded listing tables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::domain::{ListingTable, VehicleCategory};
use crate::reader::ListingReader;
use crate::IoError;

/// How long a loaded table is served before it is re-read.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Anything that can produce a fresh listing table for a category.
pub trait TableSource {
    /// Load the full table for `category`.
    ///
    /// # Errors
    ///
    /// Implementations return whatever [`IoError`] their backing store raises.
    fn load(&self, category: VehicleCategory) -> Result<ListingTable, IoError>;
}

/// A [`TableSource`] backed by one CSV file per category.
#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    paths: HashMap<VehicleCategory, PathBuf>,
    current_year: Option<i32>,
}

impl CsvSource {
    /// Create a source with no files registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the CSV file for `category`.
    #[must_use]
    pub fn with_path(mut self, category: VehicleCategory, path: &Path) -> Self {
        self.paths.insert(category, path.to_path_buf());
        self
    }

    /// Pin the calendar year passed to each [`ListingReader`].
    #[must_use]
    pub fn with_current_year(mut self, current_year: i32) -> Self {
        self.current_year = Some(current_year);
        self
    }
}

impl TableSource for CsvSource {
    fn load(&self, category: VehicleCategory) -> Result<ListingTable, IoError> {
        let path = self
            .paths
            .get(&category)
            .ok_or(IoError::NoSource { category })?;
        let reader = ListingReader::new(path, category);
        match self.current_year {
            Some(year) => reader.with_current_year(year).read(),
            None => reader.read(),
        }
    }
}

struct CacheEntry {
    table: Arc<ListingTable>,
    loaded_at: Instant,
}

/// Serves listing tables from memory, reloading a category once its entry
/// is older than the TTL.
///
/// The lock is held across a load, so concurrent callers for a cold
/// category trigger exactly one read of the source.
pub struct TableCache<S> {
    source: S,
    ttl: Duration,
    entries: Mutex<HashMap<VehicleCategory, CacheEntry>>,
}

impl<S: TableSource> TableCache<S> {
    /// Create a cache over `source` with [`DEFAULT_TTL`].
    pub fn new(source: S) -> Self {
        Self {
            source,
            ttl: DEFAULT_TTL,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Set the time-to-live for cached tables.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Return the table for `category`, loading it if absent or expired.
    ///
    /// # Errors
    ///
    /// Propagates the source's error; a failed load leaves any stale entry
    /// for the category removed.
    pub fn get_or_load(&self, category: VehicleCategory) -> Result<Arc<ListingTable>, IoError> {
        let mut entries = self.lock();
        if let Some(entry) = entries.get(&category)
            && entry.loaded_at.elapsed() < self.ttl
        {
            debug!(%category, "listing table served from cache");
            return Ok(Arc::clone(&entry.table));
        }
        entries.remove(&category);

        let table = Arc::new(self.source.load(category)?);
        info!(%category, n_listings = table.len(), "listing table cached");
        entries.insert(
            category,
            CacheEntry {
                table: Arc::clone(&table),
                loaded_at: Instant::now(),
            },
        );
        Ok(table)
    }

    /// Drop every cached table.
    pub fn invalidate(&self) {
        self.lock().clear();
        debug!("listing cache invalidated");
    }

    /// Return the number of categories currently cached, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Return `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Entries are replaced whole, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<VehicleCategory, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
