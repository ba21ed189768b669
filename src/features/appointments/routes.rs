use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::appointments::handlers;
use crate::features::appointments::services::SchedulingService;

/// Create routes for the appointments feature
///
/// All routes require an authenticated identity; the admin-only ones are
/// guarded in the handlers.
pub fn routes(scheduler: Arc<SchedulingService>) -> Router {
    Router::new()
        .route(
            "/api/appointments",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route("/api/appointments/my", get(handlers::my_appointments))
        .route("/api/appointments/available", get(handlers::available_slots))
        .route(
            "/api/appointments/{id}",
            put(handlers::update_appointment).delete(handlers::delete_appointment),
        )
        .route(
            "/api/appointments/{id}/approve-edit",
            put(handlers::approve_edit),
        )
        .route(
            "/api/appointments/{id}/reject-edit",
            put(handlers::reject_edit),
        )
        .with_state(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::services::default_catalog;
    use crate::features::appointments::store::MemoryAppointmentStore;
    use crate::features::appointments::workers::ReminderSweep;
    use crate::features::catalog::CatalogService;
    use crate::modules::notifications::LogNotificationSink;
    use crate::modules::realtime::RealtimeHub;
    use crate::shared::clock::{Clock, FixedClock};
    use crate::shared::test_helpers::{admin_user, client_user, with_identity};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn scheduler() -> Arc<SchedulingService> {
        let store = Arc::new(MemoryAppointmentStore::new());
        let hub = Arc::new(RealtimeHub::new());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2026, 5, 31)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        ));
        let reminders = Arc::new(ReminderSweep::new(
            store.clone(),
            hub.clone(),
            clock.clone(),
            Duration::from_secs(300),
        ));
        Arc::new(SchedulingService::new(
            store,
            Arc::new(CatalogService::new(default_catalog())),
            hub,
            Arc::new(LogNotificationSink),
            reminders,
            clock,
        ))
    }

    #[tokio::test]
    async fn test_booking_flow_over_http() {
        let scheduler = scheduler();
        let client = TestServer::new(with_identity(routes(scheduler.clone()), client_user(2))).unwrap();

        let response = client
            .post("/api/appointments")
            .json(&json!({
                "categoryId": 1,
                "serviceId": 1,
                "date": "2026-06-01",
                "time": "10:00",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["time"], "10:00");
        assert_eq!(body["data"]["status"], "scheduled");

        // the booked slot drops out of availability
        let response = client
            .get("/api/appointments/available")
            .add_query_param("serviceId", 1)
            .add_query_param("categoryId", 1)
            .add_query_param("date", "2026-06-01")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        let slots = body["data"]["availableSlots"].as_array().unwrap();
        assert!(!slots.contains(&json!("10:00")));
        assert!(slots.contains(&json!("10:30")));

        // double-booking the same slot conflicts
        let response = client
            .post("/api/appointments")
            .json(&json!({
                "categoryId": 1,
                "serviceId": 1,
                "date": "2026-06-01",
                "time": "10:00",
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let response = client.get("/api/appointments/my").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_list_is_guarded() {
        let scheduler = scheduler();

        let client = TestServer::new(with_identity(routes(scheduler.clone()), client_user(2))).unwrap();
        client
            .get("/api/appointments")
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let admin = TestServer::new(with_identity(routes(scheduler), admin_user())).unwrap();
        let response = admin.get("/api/appointments").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 0);
    }

    #[tokio::test]
    async fn test_available_requires_service_and_date() {
        let client =
            TestServer::new(with_identity(routes(scheduler()), client_user(2))).unwrap();
        client
            .get("/api/appointments/available")
            .add_query_param("serviceId", 1)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
