use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration as ChronoDuration, NaiveDate};
use serde_json::{json, Value};
use tokio::sync::Mutex as AsyncMutex;

use crate::core::error::{AppError, Result};
use crate::features::appointments::dtos::{
    AppointmentResponseDto, CreateAppointmentRequest, UpdateAppointmentRequest,
};
use crate::features::appointments::models::{
    Appointment, AppointmentStatus, EditRequest, EditRequestStatus, NewAppointment,
};
use crate::features::appointments::services::AvailabilityService;
use crate::features::appointments::store::AppointmentStore;
use crate::features::appointments::workers::ReminderSweep;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::catalog::services::{service_duration_minutes, ResolvedService};
use crate::features::catalog::CatalogService;
use crate::modules::notifications::{
    Notification, NotificationKind, NotificationSink, TOPIC_EDIT_REQUEST, TOPIC_NOTIFICATIONS,
};
use crate::modules::realtime::RealtimeHub;
use crate::shared::clock::Clock;
use crate::shared::constants::{CANCELLATION_LEAD_TIME_HOURS, CLOSE_MINUTES, OPEN_MINUTES};
use crate::shared::time::{
    appointment_date_time, is_slot_aligned, normalize_time_text, time_to_minutes,
};

/// One async mutex per (date, category, service) resource.
///
/// The overlap check and the following store write happen under this lock,
/// so two bookings racing for the same slot serialize and exactly one of
/// them observes the conflict. The map only ever grows; slot keys are few
/// enough that this is not worth a reaper.
struct SlotLocks {
    locks: Mutex<HashMap<(NaiveDate, i64, i64), Arc<AsyncMutex<()>>>>,
}

impl SlotLocks {
    fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn for_slot(&self, date: NaiveDate, category_id: i64, service_id: i64) -> Arc<AsyncMutex<()>> {
        self.locks
            .lock()
            .unwrap()
            .entry((date, category_id, service_id))
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

/// A slot proposal that passed every check except the overlap test.
struct ValidatedSlot {
    time: String,
    start_minutes: i32,
    duration_minutes: i32,
}

/// Orchestrates the appointment lifecycle: booking, direct admin edits, the
/// owner edit-request workflow, and cancellation.
///
/// Every successful mutation broadcasts an `appointments:update` event;
/// notifications are fire-and-forget.
pub struct SchedulingService {
    store: Arc<dyn AppointmentStore>,
    catalog: Arc<CatalogService>,
    availability: AvailabilityService,
    hub: Arc<RealtimeHub>,
    notifications: Arc<dyn NotificationSink>,
    reminders: Arc<ReminderSweep>,
    clock: Arc<dyn Clock>,
    slot_locks: SlotLocks,
}

impl SchedulingService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        catalog: Arc<CatalogService>,
        hub: Arc<RealtimeHub>,
        notifications: Arc<dyn NotificationSink>,
        reminders: Arc<ReminderSweep>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let availability = AvailabilityService::new(store.clone(), catalog.clone());
        Self {
            store,
            catalog,
            availability,
            hub,
            notifications,
            reminders,
            clock,
            slot_locks: SlotLocks::new(),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>> {
        self.store.find_all().await
    }

    pub async fn list_mine(&self, user_id: i64) -> Result<Vec<Appointment>> {
        self.store.find_by_user(user_id).await
    }

    /// Free start times for one service on one date.
    ///
    /// With a category id the pair is resolved exactly; without one the
    /// first category carrying the service id wins.
    pub async fn available_slots(
        &self,
        service_id: i64,
        category_id: Option<i64>,
        date: NaiveDate,
    ) -> Result<Vec<String>> {
        let resolved = match category_id {
            Some(category_id) => self.catalog.resolve_by_ids(category_id, service_id),
            None => self.catalog.resolve_by_service_id(service_id),
        }
        .ok_or_else(|| AppError::NotFound("service not found".to_string()))?;

        let duration = service_duration_minutes(&resolved.service);
        self.availability
            .available_slots(resolved.category_id, resolved.service.id, duration, date)
            .await
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment> {
        let (resolved, slot) =
            self.validate_slot(request.category_id, request.service_id, request.date, &request.time)?;

        let lock = self
            .slot_locks
            .for_slot(request.date, request.category_id, request.service_id);
        let _guard = lock.lock().await;

        if self
            .availability
            .has_overlap(
                request.date,
                slot.start_minutes,
                slot.duration_minutes,
                request.category_id,
                request.service_id,
                None,
            )
            .await?
        {
            return Err(AppError::SlotTaken);
        }

        let appointment = self
            .store
            .insert(NewAppointment {
                user_id: actor.id,
                category_id: request.category_id,
                service_id: request.service_id,
                date: request.date,
                time: slot.time,
                status: AppointmentStatus::Scheduled,
            })
            .await?;
        drop(_guard);

        self.notifications
            .send(Notification {
                user_id: actor.id,
                email: actor.email.clone(),
                kind: NotificationKind::Email,
                topic: TOPIC_NOTIFICATIONS.to_string(),
                subject: "Appointment confirmed".to_string(),
                message: format!(
                    "Your appointment for {} on {} at {} has been booked.",
                    resolved.service.name, appointment.date, appointment.time
                ),
            })
            .await;
        self.hub
            .send_appointment_update("created", appointment_payload(&appointment));

        Ok(appointment)
    }

    pub async fn update(
        &self,
        id: i64,
        actor: &AuthenticatedUser,
        patch: UpdateAppointmentRequest,
    ) -> Result<Appointment> {
        let appointment = self.load(id).await?;
        self.ensure_not_past(&appointment)?;
        if appointment.user_id != actor.id && !actor.is_admin() {
            return Err(AppError::Forbidden(
                "you do not have access to this appointment".to_string(),
            ));
        }

        if actor.is_admin() {
            self.admin_update(appointment, patch).await
        } else {
            self.owner_request_edit(appointment, patch).await
        }
    }

    /// Direct edit: omitted fields keep their previous values, the slot is
    /// re-validated as if booked fresh, and any pending edit request is
    /// discarded.
    async fn admin_update(
        &self,
        appointment: Appointment,
        patch: UpdateAppointmentRequest,
    ) -> Result<Appointment> {
        let category_id = patch.category_id.unwrap_or(appointment.category_id);
        let service_id = patch.service_id.unwrap_or(appointment.service_id);
        let date = patch.date.unwrap_or(appointment.date);
        let time = patch.time.unwrap_or_else(|| appointment.time.clone());

        let (_, slot) = self.validate_slot(category_id, service_id, date, &time)?;

        let lock = self.slot_locks.for_slot(date, category_id, service_id);
        let _guard = lock.lock().await;

        if self
            .availability
            .has_overlap(
                date,
                slot.start_minutes,
                slot.duration_minutes,
                category_id,
                service_id,
                Some(appointment.id),
            )
            .await?
        {
            return Err(AppError::SlotTaken);
        }

        let updated = self
            .store
            .update(&Appointment {
                category_id,
                service_id,
                date,
                time: slot.time,
                edit_request: None,
                ..appointment
            })
            .await?;
        drop(_guard);

        self.reminders.reset(updated.id);
        self.notifications
            .send(Notification {
                user_id: updated.user_id,
                email: None,
                kind: NotificationKind::Email,
                topic: TOPIC_NOTIFICATIONS.to_string(),
                subject: "Appointment updated".to_string(),
                message: format!(
                    "Your appointment has been moved to {} at {}.",
                    updated.date, updated.time
                ),
            })
            .await;
        self.hub
            .send_appointment_update("updated", appointment_payload(&updated));

        Ok(updated)
    }

    /// Owner edit: the change lands as a pending request, the live slot is
    /// untouched until an admin approves it.
    async fn owner_request_edit(
        &self,
        appointment: Appointment,
        patch: UpdateAppointmentRequest,
    ) -> Result<Appointment> {
        if patch.category_id.is_some() || patch.service_id.is_some() {
            return Err(AppError::Forbidden(
                "only date and time can be changed".to_string(),
            ));
        }
        if appointment.has_pending_edit() {
            return Err(AppError::EditPending);
        }
        let (Some(date), Some(time)) = (patch.date, patch.time) else {
            return Err(AppError::MissingFields(
                "date and time are required".to_string(),
            ));
        };

        let (_, slot) =
            self.validate_slot(appointment.category_id, appointment.service_id, date, &time)?;

        let lock =
            self.slot_locks
                .for_slot(date, appointment.category_id, appointment.service_id);
        let _guard = lock.lock().await;

        if self
            .availability
            .has_overlap(
                date,
                slot.start_minutes,
                slot.duration_minutes,
                appointment.category_id,
                appointment.service_id,
                Some(appointment.id),
            )
            .await?
        {
            return Err(AppError::SlotTaken);
        }

        let updated = self
            .store
            .update(&Appointment {
                edit_request: Some(EditRequest {
                    category_id: appointment.category_id,
                    service_id: appointment.service_id,
                    date: Some(date),
                    time: Some(slot.time),
                    status: EditRequestStatus::Pending,
                }),
                ..appointment
            })
            .await?;
        drop(_guard);

        self.hub
            .send_appointment_update("updated", appointment_payload(&updated));

        Ok(updated)
    }

    /// Admin approval: the pending proposal is re-validated against the
    /// current calendar before the live fields move. A conflict that arose
    /// since the request was filed surfaces as `SlotTaken` and the request
    /// stays pending.
    pub async fn approve_edit(&self, id: i64) -> Result<Appointment> {
        let appointment = self.load(id).await?;
        self.ensure_not_past(&appointment)?;
        if !appointment.has_pending_edit() {
            return Err(AppError::NoPendingRequest);
        }

        let edit = appointment.edit_request.clone().ok_or(AppError::NoPendingRequest)?;
        let (Some(date), Some(time)) = (edit.date, edit.time.clone()) else {
            return Err(AppError::MissingFields(
                "requested date and time are required".to_string(),
            ));
        };

        let (_, slot) = self.validate_slot(edit.category_id, edit.service_id, date, &time)?;

        let lock = self
            .slot_locks
            .for_slot(date, edit.category_id, edit.service_id);
        let _guard = lock.lock().await;

        if self
            .availability
            .has_overlap(
                date,
                slot.start_minutes,
                slot.duration_minutes,
                edit.category_id,
                edit.service_id,
                Some(appointment.id),
            )
            .await?
        {
            return Err(AppError::SlotTaken);
        }

        let updated = self
            .store
            .update(&Appointment {
                category_id: edit.category_id,
                service_id: edit.service_id,
                date,
                time: slot.time,
                edit_request: Some(EditRequest {
                    status: EditRequestStatus::Approved,
                    ..edit
                }),
                ..appointment
            })
            .await?;
        drop(_guard);

        self.reminders.reset(updated.id);
        self.notifications
            .send(Notification {
                user_id: updated.user_id,
                email: None,
                kind: NotificationKind::EditRequestApproved,
                topic: TOPIC_EDIT_REQUEST.to_string(),
                subject: "Appointment change approved".to_string(),
                message: format!(
                    "Your requested change has been approved: {} at {}.",
                    updated.date, updated.time
                ),
            })
            .await;
        self.hub
            .send_appointment_update("updated", appointment_payload(&updated));

        Ok(updated)
    }

    /// Admin rejection: the live slot stays as booked, the request is
    /// finalized as rejected.
    pub async fn reject_edit(&self, id: i64) -> Result<Appointment> {
        let appointment = self.load(id).await?;
        self.ensure_not_past(&appointment)?;
        let edit = match appointment.edit_request.clone() {
            Some(edit) if edit.status == EditRequestStatus::Pending => edit,
            _ => return Err(AppError::NoPendingRequest),
        };

        let updated = self
            .store
            .update(&Appointment {
                edit_request: Some(EditRequest {
                    status: EditRequestStatus::Rejected,
                    ..edit
                }),
                ..appointment
            })
            .await?;

        self.notifications
            .send(Notification {
                user_id: updated.user_id,
                email: None,
                kind: NotificationKind::EditRequestRejected,
                topic: TOPIC_EDIT_REQUEST.to_string(),
                subject: "Appointment change rejected".to_string(),
                message: "Your requested change has been rejected.".to_string(),
            })
            .await;
        self.hub
            .send_appointment_update("updated", appointment_payload(&updated));

        Ok(updated)
    }

    pub async fn delete(&self, id: i64, actor: &AuthenticatedUser) -> Result<()> {
        let appointment = self.load(id).await?;
        self.ensure_not_past(&appointment)?;

        if let Some(start) = appointment.start_date_time() {
            let remaining = start - self.clock.now();
            if remaining < ChronoDuration::hours(CANCELLATION_LEAD_TIME_HOURS) {
                return Err(AppError::TooSoon);
            }
        }
        if appointment.user_id != actor.id && !actor.is_admin() {
            return Err(AppError::Forbidden(
                "you do not have access to this appointment".to_string(),
            ));
        }

        self.store.delete(id).await?;

        self.reminders.reset(id);
        self.notifications
            .send(Notification {
                user_id: appointment.user_id,
                email: None,
                kind: NotificationKind::Email,
                topic: TOPIC_NOTIFICATIONS.to_string(),
                subject: "Appointment cancelled".to_string(),
                message: format!(
                    "Your appointment on {} at {} has been cancelled.",
                    appointment.date, appointment.time
                ),
            })
            .await;
        self.hub
            .send_appointment_update("deleted", json!({ "appointmentId": id }));

        Ok(())
    }

    async fn load(&self, id: i64) -> Result<Appointment> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))
    }

    /// Appointments already started are immutable. A stored time that no
    /// longer parses cannot be located in time and is left editable.
    fn ensure_not_past(&self, appointment: &Appointment) -> Result<()> {
        if let Some(start) = appointment.start_date_time() {
            if start <= self.clock.now() {
                return Err(AppError::PastLocked);
            }
        }
        Ok(())
    }

    /// Everything about a proposed slot except the overlap test, which the
    /// caller runs under the slot lock: normalization, future-ness, catalog
    /// resolution, business hours, grid alignment.
    fn validate_slot(
        &self,
        category_id: i64,
        service_id: i64,
        date: NaiveDate,
        time: &str,
    ) -> Result<(ResolvedService, ValidatedSlot)> {
        let time = normalize_time_text(time).ok_or(AppError::InvalidTime)?;
        let start_minutes = time_to_minutes(&time).ok_or(AppError::InvalidTime)?;

        let start = appointment_date_time(date, &time).ok_or(AppError::InvalidTime)?;
        if start <= self.clock.now() {
            return Err(AppError::InThePast);
        }

        let resolved = self
            .catalog
            .resolve_by_ids(category_id, service_id)
            .ok_or_else(|| AppError::NotFound("service not found".to_string()))?;
        let duration_minutes = service_duration_minutes(&resolved.service);

        if start_minutes < OPEN_MINUTES || start_minutes + duration_minutes > CLOSE_MINUTES {
            return Err(AppError::OutOfHours);
        }
        if !is_slot_aligned(start_minutes, duration_minutes) {
            return Err(AppError::MisalignedSlot);
        }

        Ok((
            resolved,
            ValidatedSlot {
                time,
                start_minutes,
                duration_minutes,
            },
        ))
    }
}

fn appointment_payload(appointment: &Appointment) -> Value {
    let dto = AppointmentResponseDto::from(appointment.clone());
    json!({ "appointment": dto })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::appointments::store::MemoryAppointmentStore;
    use crate::features::catalog::services::default_catalog;
    use crate::modules::notifications::LogNotificationSink;
    use crate::modules::realtime::Target;
    use crate::shared::clock::FixedClock;
    use crate::shared::test_helpers::{admin_user, client_user};
    use std::time::Duration;

    // Every test runs at 2026-05-31 12:00.
    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    struct Fixture {
        store: Arc<MemoryAppointmentStore>,
        hub: Arc<RealtimeHub>,
        scheduler: SchedulingService,
    }

    fn setup() -> Fixture {
        let store = Arc::new(MemoryAppointmentStore::new());
        let catalog = Arc::new(CatalogService::new(default_catalog()));
        let hub = Arc::new(RealtimeHub::new());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now()));
        let reminders = Arc::new(ReminderSweep::new(
            store.clone(),
            hub.clone(),
            clock.clone(),
            Duration::from_secs(300),
        ));
        let scheduler = SchedulingService::new(
            store.clone(),
            catalog,
            hub.clone(),
            Arc::new(LogNotificationSink),
            reminders,
            clock,
        );
        Fixture {
            store,
            hub,
            scheduler,
        }
    }

    fn booking(category_id: i64, service_id: i64, date: NaiveDate, time: &str) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            category_id,
            service_id,
            date,
            time: time.to_string(),
        }
    }

    fn reschedule(date: NaiveDate, time: &str) -> UpdateAppointmentRequest {
        UpdateAppointmentRequest {
            date: Some(date),
            time: Some(time.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_time_and_broadcasts() {
        let f = setup();
        let mut rx = f.hub.subscribe();

        let created = f
            .scheduler
            .create(&client_user(2), booking(1, 1, june_first(), "8"))
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.user_id, 2);
        assert_eq!(created.time, "08:00");
        assert_eq!(created.status, AppointmentStatus::Scheduled);
        assert!(created.edit_request.is_none());

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.target, Target::All);
        assert_eq!(envelope.message["event"], "created");
        assert_eq!(envelope.message["payload"]["appointment"]["id"], 1);
        assert_eq!(envelope.message["payload"]["appointment"]["time"], "08:00");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_and_past_times() {
        let f = setup();
        let actor = client_user(2);

        let err = f
            .scheduler
            .create(&actor, booking(1, 1, june_first(), "nonsense"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTime));

        // yesterday
        let err = f
            .scheduler
            .create(
                &actor,
                booking(1, 1, NaiveDate::from_ymd_opt(2026, 5, 30).unwrap(), "10:00"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InThePast));

        // exactly now is already past
        let err = f
            .scheduler
            .create(
                &actor,
                booking(1, 1, NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(), "12:00"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InThePast));
    }

    #[tokio::test]
    async fn test_create_enforces_hours_and_alignment() {
        let f = setup();
        let actor = client_user(2);

        let err = f
            .scheduler
            .create(&actor, booking(1, 1, june_first(), "07:30"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OutOfHours));

        // 60-minute service starting 15:30 would run past close
        let err = f
            .scheduler
            .create(&actor, booking(1, 2, june_first(), "15:30"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OutOfHours));

        // but a 30-minute service fits exactly against close
        f.scheduler
            .create(&actor, booking(1, 1, june_first(), "15:30"))
            .await
            .unwrap();
        // and a 60-minute one fits at 15:00
        f.scheduler
            .create(&actor, booking(1, 2, june_first(), "15:00"))
            .await
            .unwrap();

        let err = f
            .scheduler
            .create(&actor, booking(1, 1, june_first(), "08:15"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MisalignedSlot));

        let err = f
            .scheduler
            .create(&actor, booking(1, 99, june_first(), "08:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_booking_is_slot_taken() {
        let f = setup();
        f.scheduler
            .create(&client_user(2), booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap();

        let err = f
            .scheduler
            .create(&client_user(3), booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SlotTaken));

        // and the slot is gone from the calculator
        let slots = f
            .scheduler
            .available_slots(1, Some(1), june_first())
            .await
            .unwrap();
        assert!(!slots.contains(&"10:00".to_string()));
    }

    #[tokio::test]
    async fn test_racing_bookings_resolve_to_one_winner() {
        let f = setup();
        let user_a = client_user(2);
        let user_b = client_user(3);
        let first = f
            .scheduler
            .create(&user_a, booking(1, 1, june_first(), "09:00"));
        let second = f
            .scheduler
            .create(&user_b, booking(1, 1, june_first(), "09:00"));

        let (a, b) = tokio::join!(first, second);
        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser.unwrap_err(), AppError::SlotTaken));

        assert_eq!(f.store.find_by_date(june_first()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_owner_update_files_pending_request() {
        let f = setup();
        let owner = client_user(2);
        let created = f
            .scheduler
            .create(&owner, booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap();

        let updated = f
            .scheduler
            .update(created.id, &owner, reschedule(june_first(), "11:00"))
            .await
            .unwrap();

        // live slot untouched, proposal parked as pending
        assert_eq!(updated.time, "10:00");
        let edit = updated.edit_request.clone().unwrap();
        assert_eq!(edit.status, EditRequestStatus::Pending);
        assert_eq!(edit.time.as_deref(), Some("11:00"));
        assert_eq!(edit.date, Some(june_first()));

        // only one request may be in flight
        let err = f
            .scheduler
            .update(created.id, &owner, reschedule(june_first(), "12:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EditPending));
    }

    #[tokio::test]
    async fn test_owner_cannot_change_service_or_omit_fields() {
        let f = setup();
        let owner = client_user(2);
        let created = f
            .scheduler
            .create(&owner, booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap();

        let err = f
            .scheduler
            .update(
                created.id,
                &owner,
                UpdateAppointmentRequest {
                    service_id: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = f
            .scheduler
            .update(
                created.id,
                &owner,
                UpdateAppointmentRequest {
                    date: Some(june_first()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingFields(_)));

        // a stranger cannot touch it at all
        let err = f
            .scheduler
            .update(created.id, &client_user(9), reschedule(june_first(), "11:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_update_applies_directly_and_clears_request() {
        let f = setup();
        let owner = client_user(2);
        let created = f
            .scheduler
            .create(&owner, booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap();
        f.scheduler
            .update(created.id, &owner, reschedule(june_first(), "11:00"))
            .await
            .unwrap();

        let updated = f
            .scheduler
            .update(
                created.id,
                &admin_user(),
                UpdateAppointmentRequest {
                    time: Some("13:00".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // omitted fields keep their previous values
        assert_eq!(updated.category_id, 1);
        assert_eq!(updated.service_id, 1);
        assert_eq!(updated.date, june_first());
        assert_eq!(updated.time, "13:00");
        assert!(updated.edit_request.is_none());
    }

    #[tokio::test]
    async fn test_admin_update_cannot_land_on_taken_slot() {
        let f = setup();
        let admin = admin_user();
        f.scheduler
            .create(&client_user(2), booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap();
        let second = f
            .scheduler
            .create(&client_user(3), booking(1, 1, june_first(), "11:00"))
            .await
            .unwrap();

        let err = f
            .scheduler
            .update(second.id, &admin, reschedule(june_first(), "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SlotTaken));

        // keeping its own slot is not a conflict with itself
        f.scheduler
            .update(second.id, &admin, reschedule(june_first(), "11:00"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_approve_edit_moves_live_fields() {
        let f = setup();
        let owner = client_user(2);
        let created = f
            .scheduler
            .create(&owner, booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap();
        f.scheduler
            .update(created.id, &owner, reschedule(june_first(), "11:00"))
            .await
            .unwrap();

        let approved = f.scheduler.approve_edit(created.id).await.unwrap();
        assert_eq!(approved.time, "11:00");
        assert_eq!(
            approved.edit_request.unwrap().status,
            EditRequestStatus::Approved
        );

        // decided requests cannot be decided again
        let err = f.scheduler.approve_edit(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NoPendingRequest));
    }

    #[tokio::test]
    async fn test_approve_edit_fails_when_slot_was_taken_meanwhile() {
        let f = setup();
        let owner = client_user(2);
        let created = f
            .scheduler
            .create(&owner, booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap();
        f.scheduler
            .update(created.id, &owner, reschedule(june_first(), "11:00"))
            .await
            .unwrap();

        // someone books 11:00 before the admin gets to it
        f.scheduler
            .create(&client_user(3), booking(1, 1, june_first(), "11:00"))
            .await
            .unwrap();

        let err = f.scheduler.approve_edit(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::SlotTaken));

        // request survives, still pending
        let reloaded = f.store.find_by_id(created.id).await.unwrap().unwrap();
        assert!(reloaded.has_pending_edit());
        assert_eq!(reloaded.time, "10:00");
    }

    #[tokio::test]
    async fn test_reject_edit_leaves_live_fields() {
        let f = setup();
        let owner = client_user(2);
        let created = f
            .scheduler
            .create(&owner, booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap();
        f.scheduler
            .update(created.id, &owner, reschedule(june_first(), "11:00"))
            .await
            .unwrap();

        let rejected = f.scheduler.reject_edit(created.id).await.unwrap();
        assert_eq!(rejected.time, "10:00");
        assert_eq!(
            rejected.edit_request.unwrap().status,
            EditRequestStatus::Rejected
        );

        let err = f.scheduler.reject_edit(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NoPendingRequest));

        // a rejected request does not block a new one
        f.scheduler
            .update(created.id, &owner, reschedule(june_first(), "12:00"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_enforces_lead_time() {
        let f = setup();
        let owner = client_user(2);

        // 23 hours ahead of 2026-05-31 12:00
        let soon = f
            .scheduler
            .create(&owner, booking(1, 1, june_first(), "11:00"))
            .await
            .unwrap();
        let err = f.scheduler.delete(soon.id, &owner).await.unwrap_err();
        assert!(matches!(err, AppError::TooSoon));

        // 25 hours ahead
        let later = f
            .scheduler
            .create(&owner, booking(1, 1, june_first(), "13:00"))
            .await
            .unwrap();

        // but not by a stranger
        let err = f
            .scheduler
            .delete(later.id, &client_user(9))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        f.scheduler.delete(later.id, &owner).await.unwrap();
        assert!(f.store.find_by_id(later.id).await.unwrap().is_none());

        let err = f.scheduler.delete(later.id, &owner).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_past_appointments_are_immutable() {
        let f = setup();
        let owner = client_user(2);
        // inserted behind the scheduler's back, already in the past
        let past = f
            .store
            .insert(NewAppointment {
                user_id: owner.id,
                category_id: 1,
                service_id: 1,
                date: NaiveDate::from_ymd_opt(2026, 5, 30).unwrap(),
                time: "10:00".to_string(),
                status: AppointmentStatus::Scheduled,
            })
            .await
            .unwrap();

        let err = f
            .scheduler
            .update(past.id, &owner, reschedule(june_first(), "11:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PastLocked));

        let err = f.scheduler.delete(past.id, &admin_user()).await.unwrap_err();
        assert!(matches!(err, AppError::PastLocked));
    }

    #[tokio::test]
    async fn test_available_slots_resolves_without_category() {
        let f = setup();
        // service id 3 only exists in Massage (60 min)
        let slots = f
            .scheduler
            .available_slots(3, None, june_first())
            .await
            .unwrap();
        assert_eq!(slots.len(), 8);
        assert_eq!(slots.first().unwrap(), "08:00");
        assert_eq!(slots.last().unwrap(), "15:00");

        let err = f
            .scheduler
            .available_slots(99, None, june_first())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancelled_rows_do_not_block_slots() {
        let f = setup();
        let owner = client_user(2);
        let created = f
            .scheduler
            .create(&owner, booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap();

        f.store
            .update(&Appointment {
                status: AppointmentStatus::Cancelled,
                ..created
            })
            .await
            .unwrap();

        f.scheduler
            .create(&client_user(3), booking(1, 1, june_first(), "10:00"))
            .await
            .unwrap();
    }
}
