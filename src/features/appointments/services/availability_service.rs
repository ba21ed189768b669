use std::sync::Arc;

use chrono::NaiveDate;

use crate::core::error::Result;
use crate::features::appointments::models::AppointmentStatus;
use crate::features::appointments::store::AppointmentStore;
use crate::features::catalog::services::service_duration_minutes;
use crate::features::catalog::CatalogService;
use crate::shared::constants::{CLOSE_MINUTES, DEFAULT_SERVICE_DURATION_MINUTES, OPEN_MINUTES};
use crate::shared::time::{minutes_to_time, time_to_minutes};

/// Conflict detection and slot enumeration.
///
/// Conflicts are scoped per (category, service) pair: different services are
/// delivered by different staff or resources and may run concurrently.
pub struct AvailabilityService {
    store: Arc<dyn AppointmentStore>,
    catalog: Arc<CatalogService>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn AppointmentStore>, catalog: Arc<CatalogService>) -> Self {
        Self { store, catalog }
    }

    /// Does `[start, start + duration)` clash with any non-cancelled
    /// appointment for the same (date, category, service)?
    ///
    /// Each existing appointment's end is derived from its *own* service
    /// duration, not the candidate's. Half-open intervals: touching
    /// endpoints do not conflict.
    pub async fn has_overlap(
        &self,
        date: NaiveDate,
        start_minutes: i32,
        duration_minutes: i32,
        category_id: i64,
        service_id: i64,
        exclude_appointment_id: Option<i64>,
    ) -> Result<bool> {
        let end_minutes = start_minutes + duration_minutes;

        for existing in self.store.find_by_date(date).await? {
            if existing.status == AppointmentStatus::Cancelled {
                continue;
            }
            if existing.category_id != category_id || existing.service_id != service_id {
                continue;
            }
            if exclude_appointment_id == Some(existing.id) {
                continue;
            }
            let Some(existing_start) = time_to_minutes(&existing.time) else {
                continue;
            };

            let existing_duration = self
                .catalog
                .resolve_by_ids(existing.category_id, existing.service_id)
                .map(|resolved| service_duration_minutes(&resolved.service))
                .unwrap_or(DEFAULT_SERVICE_DURATION_MINUTES);
            let existing_end = existing_start + existing_duration;

            if start_minutes < existing_end && existing_start < end_minutes {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Bookable start times for one service on one date, ascending `HH:MM`.
    ///
    /// Walks the service's own grid from opening time while the slot still
    /// fits before close. Recomputed fresh on every call so concurrent
    /// bookings are reflected immediately.
    pub async fn available_slots(
        &self,
        category_id: i64,
        service_id: i64,
        duration_minutes: i32,
        date: NaiveDate,
    ) -> Result<Vec<String>> {
        let mut slots = Vec::new();
        let mut start = OPEN_MINUTES;

        while start + duration_minutes <= CLOSE_MINUTES {
            if !self
                .has_overlap(date, start, duration_minutes, category_id, service_id, None)
                .await?
            {
                slots.push(minutes_to_time(start));
            }
            start += duration_minutes;
        }

        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::appointments::models::NewAppointment;
    use crate::features::appointments::store::MemoryAppointmentStore;
    use crate::features::catalog::services::default_catalog;

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn setup() -> (Arc<MemoryAppointmentStore>, AvailabilityService) {
        let store = Arc::new(MemoryAppointmentStore::new());
        let catalog = Arc::new(CatalogService::new(default_catalog()));
        let availability = AvailabilityService::new(store.clone(), catalog);
        (store, availability)
    }

    async fn book(store: &MemoryAppointmentStore, category_id: i64, service_id: i64, time: &str) {
        store
            .insert(NewAppointment {
                user_id: 2,
                category_id,
                service_id,
                date: june_first(),
                time: time.to_string(),
                status: AppointmentStatus::Scheduled,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_day_has_full_grid() {
        let (_, availability) = setup();
        // category 1 / service 1 is the 30-minute men's haircut
        let slots = availability
            .available_slots(1, 1, 30, june_first())
            .await
            .unwrap();

        assert_eq!(slots.len(), 16);
        assert_eq!(slots.first().unwrap(), "08:00");
        assert_eq!(slots.last().unwrap(), "15:30");
        let mut sorted = slots.clone();
        sorted.sort();
        assert_eq!(slots, sorted);
    }

    #[tokio::test]
    async fn test_booked_slot_disappears() {
        let (store, availability) = setup();
        book(&store, 1, 1, "08:00").await;

        let slots = availability
            .available_slots(1, 1, 30, june_first())
            .await
            .unwrap();
        assert_eq!(slots.len(), 15);
        assert!(!slots.contains(&"08:00".to_string()));
        assert!(slots.contains(&"08:30".to_string()));
    }

    #[tokio::test]
    async fn test_touching_endpoints_do_not_conflict() {
        let (store, availability) = setup();
        book(&store, 1, 1, "08:00").await; // occupies [480, 510)

        assert!(availability
            .has_overlap(june_first(), 495, 30, 1, 1, None)
            .await
            .unwrap());
        // starts exactly where the other ends
        assert!(!availability
            .has_overlap(june_first(), 510, 30, 1, 1, None)
            .await
            .unwrap());
        // ends exactly where the other starts
        assert!(!availability
            .has_overlap(june_first(), 450, 30, 1, 1, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_conflicts_scoped_per_category_service_pair() {
        let (store, availability) = setup();
        book(&store, 1, 1, "08:00").await;

        // same service id, different category: no conflict
        assert!(!availability
            .has_overlap(june_first(), 480, 45, 2, 1, None)
            .await
            .unwrap());
        // different service in the same category: no conflict
        assert!(!availability
            .has_overlap(june_first(), 480, 60, 1, 2, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_existing_appointment_uses_its_own_duration() {
        let (store, availability) = setup();
        // category 3 / service 3 is the 60-minute massage
        book(&store, 3, 3, "08:00").await; // occupies [480, 540)

        assert!(availability
            .has_overlap(june_first(), 510, 30, 3, 3, None)
            .await
            .unwrap());
        assert!(!availability
            .has_overlap(june_first(), 540, 30, 3, 3, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_excluded_appointment_does_not_conflict_with_itself() {
        let (store, availability) = setup();
        book(&store, 1, 1, "08:00").await;

        assert!(availability
            .has_overlap(june_first(), 480, 30, 1, 1, None)
            .await
            .unwrap());
        assert!(!availability
            .has_overlap(june_first(), 480, 30, 1, 1, Some(1))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_available_slots_idempotent_without_mutations() {
        let (store, availability) = setup();
        book(&store, 1, 1, "10:00").await;

        let first = availability
            .available_slots(1, 1, 30, june_first())
            .await
            .unwrap();
        let second = availability
            .available_slots(1, 1, 30, june_first())
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
