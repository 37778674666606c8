//! Models module - the upstream model catalog.

mod catalog;

pub use catalog::{ModelCatalogService, DEFAULT_CATALOG_TTL_SECS};
