//! Service catalog feature.
//!
//! The category/service tree every booking resolves against, plus the admin
//! CRUD surface.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | List categories with services |
//! | POST | `/api/categories` | Create category (admin) |
//! | PUT | `/api/categories/{id}` | Rename category (admin) |
//! | DELETE | `/api/categories/{id}` | Delete empty category (admin) |
//! | GET | `/api/categories/{id}/services` | List services |
//! | GET | `/api/categories/{id}/services/search` | Search services by name |
//! | POST | `/api/categories/{id}/services` | Add service (admin) |
//! | PUT | `/api/categories/{id}/services/{serviceId}` | Update service (admin) |
//! | DELETE | `/api/categories/{id}/services/{serviceId}` | Remove service (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CatalogService;
