#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod events;
pub mod journey;
pub mod progress_store;
mod records;

pub use trail_core::Clock;

pub use app_services::AppServices;
pub use catalog::{BuiltinCatalog, HttpCatalog, RoadmapCatalog};
pub use error::{AppServicesError, CatalogError, ProgressStoreError};
pub use events::{ProgressEvents, StoreChanged};
pub use journey::{JourneyService, RoadmapSummary};
pub use progress_store::{ProgressStore, SaveStatus};
