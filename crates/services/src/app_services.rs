use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog::{BuiltinCatalog, HttpCatalog, RoadmapCatalog};
use crate::error::AppServicesError;
use crate::journey::JourneyService;
use crate::progress_store::ProgressStore;

/// Assembles app-facing services around one storage backend.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<ProgressStore>,
    catalog: Arc<dyn RoadmapCatalog>,
    journey: Arc<JourneyService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// With `catalog_url` set, roadmaps are fetched from that API with the
    /// builtin roadmaps as fallback; otherwise only builtin roadmaps are used.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// catalog URL is unusable.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog_url: Option<&str>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let catalog: Arc<dyn RoadmapCatalog> = match catalog_url {
            Some(url) => Arc::new(HttpCatalog::new(url)?),
            None => Arc::new(BuiltinCatalog::new()),
        };
        Ok(Self::from_parts(clock, &storage, catalog))
    }

    /// Services over volatile storage and the builtin catalog.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_parts(clock, &Storage::in_memory(), Arc::new(BuiltinCatalog::new()))
    }

    #[must_use]
    pub fn from_parts(clock: Clock, storage: &Storage, catalog: Arc<dyn RoadmapCatalog>) -> Self {
        let store = Arc::new(ProgressStore::new(clock, Arc::clone(&storage.kv)));
        let journey = Arc::new(JourneyService::new(
            Arc::clone(&catalog),
            Arc::clone(&store),
        ));
        Self {
            store,
            catalog,
            journey,
        }
    }

    #[must_use]
    pub fn store(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<dyn RoadmapCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn journey(&self) -> Arc<JourneyService> {
        Arc::clone(&self.journey)
    }
}
