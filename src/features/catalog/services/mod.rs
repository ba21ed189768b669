mod catalog_service;

pub use catalog_service::{default_catalog, service_duration_minutes, CatalogService, ResolvedService};
