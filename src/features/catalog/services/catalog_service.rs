use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use rust_decimal::Decimal;

use crate::core::error::{AppError, Result};
use crate::features::catalog::dtos::{
    CreateServiceRequest, UpdateCategoryRequest, UpdateServiceRequest,
};
use crate::features::catalog::models::{Category, Service};
use crate::shared::constants::DEFAULT_SERVICE_DURATION_MINUTES;

/// Resolved (category, service) pair handed to the scheduler.
///
/// Owned copies, so callers never hold the catalog lock across awaits.
#[derive(Debug, Clone)]
pub struct ResolvedService {
    pub category_id: i64,
    pub category_name: String,
    pub service: Service,
}

/// Effective duration of a service in minutes.
///
/// Three-tier fallback kept for compatibility with both data-shape
/// generations: `duration_minutes`, then the legacy `duration`, then 60.
pub fn service_duration_minutes(service: &Service) -> i32 {
    service
        .duration_minutes
        .or(service.duration)
        .unwrap_or(DEFAULT_SERVICE_DURATION_MINUTES)
}

/// In-memory category/service tree with admin mutations.
///
/// Reads vastly outnumber writes; a plain RwLock arena is enough, and the
/// scheduler only ever sees owned snapshots.
pub struct CatalogService {
    categories: RwLock<Vec<Category>>,
    next_category_id: AtomicI64,
    next_service_id: AtomicI64,
}

impl CatalogService {
    pub fn new(seed: Vec<Category>) -> Self {
        let next_category_id = seed.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let next_service_id = seed
            .iter()
            .flat_map(|c| c.services.iter().map(|s| s.id))
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            categories: RwLock::new(seed),
            next_category_id: AtomicI64::new(next_category_id),
            next_service_id: AtomicI64::new(next_service_id),
        }
    }

    pub fn list(&self) -> Vec<Category> {
        self.categories.read().unwrap().clone()
    }

    pub fn services_of(&self, category_id: i64) -> Result<Vec<Service>> {
        let categories = self.categories.read().unwrap();
        let category = categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;
        Ok(category.services.clone())
    }

    pub fn search_services(&self, category_id: i64, query: &str) -> Result<Vec<Service>> {
        let needle = query.to_lowercase();
        let services = self.services_of(category_id)?;
        Ok(services
            .into_iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Exact match on both ids; either id absent means not found.
    pub fn resolve_by_ids(&self, category_id: i64, service_id: i64) -> Option<ResolvedService> {
        let categories = self.categories.read().unwrap();
        let category = categories.iter().find(|c| c.id == category_id)?;
        let service = category.services.iter().find(|s| s.id == service_id)?;
        Some(ResolvedService {
            category_id: category.id,
            category_name: category.name.clone(),
            service: service.clone(),
        })
    }

    /// Scan all categories for the first service with this id.
    ///
    /// Service ids are only unique per category, so when the same id appears
    /// in several categories the first match in iteration order wins.
    pub fn resolve_by_service_id(&self, service_id: i64) -> Option<ResolvedService> {
        let categories = self.categories.read().unwrap();
        for category in categories.iter() {
            if let Some(service) = category.services.iter().find(|s| s.id == service_id) {
                return Some(ResolvedService {
                    category_id: category.id,
                    category_name: category.name.clone(),
                    service: service.clone(),
                });
            }
        }
        None
    }

    pub fn create_category(&self, name: &str) -> Category {
        let category = Category {
            id: self.next_category_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            services: Vec::new(),
        };
        self.categories.write().unwrap().push(category.clone());
        category
    }

    pub fn update_category(&self, category_id: i64, patch: UpdateCategoryRequest) -> Result<Category> {
        let mut categories = self.categories.write().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;
        category.name = patch.name;
        Ok(category.clone())
    }

    /// Deletion is blocked while the category still owns services.
    pub fn delete_category(&self, category_id: i64) -> Result<()> {
        let mut categories = self.categories.write().unwrap();
        let index = categories
            .iter()
            .position(|c| c.id == category_id)
            .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;
        if !categories[index].services.is_empty() {
            return Err(AppError::CategoryInUse);
        }
        categories.remove(index);
        Ok(())
    }

    pub fn create_service(&self, category_id: i64, request: CreateServiceRequest) -> Result<Service> {
        if request.price < Decimal::ZERO {
            return Err(AppError::Validation("price must not be negative".to_string()));
        }

        let service = Service {
            id: self.next_service_id.fetch_add(1, Ordering::SeqCst),
            name: request.name,
            duration_minutes: Some(request.duration_minutes),
            duration: None,
            price: request.price,
        };

        let mut categories = self.categories.write().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;
        category.services.push(service.clone());
        Ok(service)
    }

    pub fn update_service(
        &self,
        category_id: i64,
        service_id: i64,
        patch: UpdateServiceRequest,
    ) -> Result<Service> {
        if matches!(patch.price, Some(price) if price < Decimal::ZERO) {
            return Err(AppError::Validation("price must not be negative".to_string()));
        }

        let mut categories = self.categories.write().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;
        let service = category
            .services
            .iter_mut()
            .find(|s| s.id == service_id)
            .ok_or_else(|| AppError::NotFound("service not found".to_string()))?;

        if let Some(name) = patch.name {
            service.name = name;
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            service.duration_minutes = Some(duration_minutes);
        }
        if let Some(price) = patch.price {
            service.price = price;
        }
        Ok(service.clone())
    }

    pub fn delete_service(&self, category_id: i64, service_id: i64) -> Result<()> {
        let mut categories = self.categories.write().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;
        let index = category
            .services
            .iter()
            .position(|s| s.id == service_id)
            .ok_or_else(|| AppError::NotFound("service not found".to_string()))?;
        category.services.remove(index);
        Ok(())
    }
}

/// Seed catalog matching the production defaults.
pub fn default_catalog() -> Vec<Category> {
    fn service(id: i64, name: &str, duration_minutes: i32, price: i64) -> Service {
        Service {
            id,
            name: name.to_string(),
            duration_minutes: Some(duration_minutes),
            duration: None,
            price: Decimal::from(price),
        }
    }

    vec![
        Category {
            id: 1,
            name: "Hair".to_string(),
            services: vec![
                service(1, "Men's haircut", 30, 50),
                service(2, "Women's haircut", 60, 120),
            ],
        },
        Category {
            id: 2,
            name: "Nails".to_string(),
            services: vec![
                service(1, "Classic manicure", 45, 80),
                service(2, "Gel manicure", 60, 110),
            ],
        },
        Category {
            id: 3,
            name: "Massage".to_string(),
            services: vec![service(3, "Classic massage", 60, 150)],
        },
        Category {
            id: 4,
            name: "Skin care".to_string(),
            services: vec![service(4, "Facial treatment", 50, 130)],
        },
        Category {
            id: 5,
            name: "Brows and lashes".to_string(),
            services: vec![service(5, "Brow lamination", 40, 90)],
        },
        Category {
            id: 6,
            name: "Waxing".to_string(),
            services: vec![service(6, "Wax hair removal", 30, 70)],
        },
        Category {
            id: 7,
            name: "Makeup".to_string(),
            services: vec![service(7, "Day makeup", 45, 120)],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogService {
        CatalogService::new(default_catalog())
    }

    #[test]
    fn test_resolve_by_ids_requires_both_ids_to_match() {
        let catalog = catalog();
        let resolved = catalog.resolve_by_ids(1, 2).unwrap();
        assert_eq!(resolved.category_id, 1);
        assert_eq!(resolved.service.name, "Women's haircut");

        // service 3 exists, but in category 3
        assert!(catalog.resolve_by_ids(1, 3).is_none());
        assert!(catalog.resolve_by_ids(99, 1).is_none());
    }

    #[test]
    fn test_resolve_by_service_id_first_match_wins() {
        let catalog = catalog();
        // id 1 exists in both Hair and Nails; Hair comes first
        let resolved = catalog.resolve_by_service_id(1).unwrap();
        assert_eq!(resolved.category_id, 1);
        assert_eq!(resolved.service.name, "Men's haircut");
        assert!(catalog.resolve_by_service_id(99).is_none());
    }

    #[test]
    fn test_duration_fallback_three_tiers() {
        let mut service = Service {
            id: 1,
            name: "any".to_string(),
            duration_minutes: Some(45),
            duration: Some(30),
            price: Decimal::ZERO,
        };
        assert_eq!(service_duration_minutes(&service), 45);

        service.duration_minutes = None;
        assert_eq!(service_duration_minutes(&service), 30);

        service.duration = None;
        assert_eq!(service_duration_minutes(&service), 60);
    }

    #[test]
    fn test_delete_category_blocked_while_it_owns_services() {
        let catalog = catalog();
        assert!(matches!(
            catalog.delete_category(1),
            Err(AppError::CategoryInUse)
        ));

        catalog.delete_service(3, 3).unwrap();
        catalog.delete_category(3).unwrap();
        assert!(catalog.resolve_by_ids(3, 3).is_none());
    }

    #[test]
    fn test_create_service_rejects_negative_price() {
        let catalog = catalog();
        let result = catalog.create_service(
            1,
            CreateServiceRequest {
                name: "Broken".to_string(),
                duration_minutes: 30,
                price: Decimal::from(-5),
            },
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_new_ids_are_monotonic_over_the_seed() {
        let catalog = catalog();
        let category = catalog.create_category("Barber");
        assert_eq!(category.id, 8);
        let service = catalog
            .create_service(
                category.id,
                CreateServiceRequest {
                    name: "Beard trim".to_string(),
                    duration_minutes: 20,
                    price: Decimal::from(40),
                },
            )
            .unwrap();
        assert_eq!(service.id, 8);
    }
}
