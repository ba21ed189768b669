use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use serde_json::json;
use tokio::time::interval;

use crate::core::error::Result;
use crate::features::appointments::models::{Appointment, AppointmentStatus};
use crate::features::appointments::store::AppointmentStore;
use crate::modules::realtime::RealtimeHub;
use crate::shared::clock::Clock;
use crate::shared::constants::REMINDER_WINDOW_HOURS;

/// Periodic "appointment soon" reminder worker.
///
/// Idempotent per appointment id: an id is marked once its reminder actually
/// reached a connected client, and the marker is cleared when the
/// appointment is rescheduled, deleted, or falls past due. Markers are
/// volatile; a restart may re-send reminders.
pub struct ReminderSweep {
    store: Arc<dyn AppointmentStore>,
    hub: Arc<RealtimeHub>,
    clock: Arc<dyn Clock>,
    notified: Mutex<HashSet<i64>>,
    check_interval: Duration,
}

impl ReminderSweep {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        hub: Arc<RealtimeHub>,
        clock: Arc<dyn Clock>,
        check_interval: Duration,
    ) -> Self {
        Self {
            store,
            hub,
            clock,
            notified: Mutex::new(HashSet::new()),
            check_interval,
        }
    }

    /// Run the sweep in a background loop.
    pub async fn run(&self) {
        tracing::info!(
            interval_secs = self.check_interval.as_secs(),
            "Starting reminder sweep worker"
        );

        let mut interval = interval(self.check_interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.sweep().await {
                tracing::error!("Error sweeping appointment reminders: {:?}", e);
            }
        }
    }

    /// One pass over all appointments.
    pub async fn sweep(&self) -> Result<()> {
        for appointment in self.store.find_all().await? {
            self.consider(&appointment);
        }
        Ok(())
    }

    /// Catch one user up, used when their realtime client connects.
    pub async fn sweep_user(&self, user_id: i64) {
        match self.store.find_by_user(user_id).await {
            Ok(appointments) => {
                for appointment in &appointments {
                    self.consider(appointment);
                }
            }
            Err(e) => {
                tracing::error!(user_id, "Error sweeping reminders for user: {:?}", e);
            }
        }
    }

    /// Allow a fresh reminder after the appointment's time changed.
    pub fn reset(&self, appointment_id: i64) {
        self.notified.lock().unwrap().remove(&appointment_id);
    }

    fn consider(&self, appointment: &Appointment) {
        if appointment.status == AppointmentStatus::Cancelled {
            return;
        }
        let Some(start) = appointment.start_date_time() else {
            return;
        };

        let now = self.clock.now();
        if start <= now {
            self.notified.lock().unwrap().remove(&appointment.id);
            return;
        }

        if start - now > ChronoDuration::hours(REMINDER_WINDOW_HOURS) {
            return;
        }
        if self.notified.lock().unwrap().contains(&appointment.id) {
            return;
        }

        let sent = self.hub.send_user_notification(
            appointment.user_id,
            json!({
                "title": "Appointment soon",
                "message": "Your appointment is within the next 24 hours.",
                "appointmentId": appointment.id,
                "date": appointment.date,
                "time": appointment.time,
            }),
        );

        if sent {
            self.notified.lock().unwrap().insert(appointment.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::appointments::models::NewAppointment;
    use crate::features::appointments::store::MemoryAppointmentStore;
    use crate::shared::clock::FixedClock;
    use chrono::NaiveDate;

    fn fixed_clock() -> Arc<FixedClock> {
        // 2026-05-31 12:00
        Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2026, 5, 31)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        ))
    }

    async fn setup_with_appointment(
        date: NaiveDate,
        time: &str,
    ) -> (Arc<RealtimeHub>, ReminderSweep) {
        let store = Arc::new(MemoryAppointmentStore::new());
        store
            .insert(NewAppointment {
                user_id: 2,
                category_id: 1,
                service_id: 1,
                date,
                time: time.to_string(),
                status: AppointmentStatus::Scheduled,
            })
            .await
            .unwrap();

        let hub = Arc::new(RealtimeHub::new());
        let sweep = ReminderSweep::new(
            store,
            hub.clone(),
            fixed_clock(),
            Duration::from_secs(300),
        );
        (hub, sweep)
    }

    #[tokio::test]
    async fn test_reminder_fires_once_inside_window() {
        // within 24h of 2026-05-31 12:00
        let (hub, sweep) = setup_with_appointment(
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            "08:00",
        )
        .await;

        let mut rx = hub.subscribe();
        hub.register_user(2);

        sweep.sweep().await.unwrap();
        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.message["type"], "user:notification");
        assert_eq!(envelope.message["notification"]["appointmentId"], 1);

        // second pass is a no-op
        sweep.sweep().await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reminder_skipped_outside_window() {
        let (hub, sweep) = setup_with_appointment(
            NaiveDate::from_ymd_opt(2026, 6, 3).unwrap(),
            "08:00",
        )
        .await;

        let mut rx = hub.subscribe();
        hub.register_user(2);

        sweep.sweep().await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_not_marked_while_user_disconnected() {
        let (hub, sweep) = setup_with_appointment(
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            "08:00",
        )
        .await;

        let mut rx = hub.subscribe();

        // nobody connected: nothing sent, nothing marked
        sweep.sweep().await.unwrap();
        assert!(rx.try_recv().is_err());

        // once the user connects the reminder still fires
        hub.register_user(2);
        sweep.sweep().await.unwrap();
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_reset_allows_resend() {
        let (hub, sweep) = setup_with_appointment(
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            "08:00",
        )
        .await;

        let mut rx = hub.subscribe();
        hub.register_user(2);

        sweep.sweep().await.unwrap();
        assert!(rx.try_recv().is_ok());

        sweep.reset(1);
        sweep.sweep().await.unwrap();
        assert!(rx.try_recv().is_ok());
    }
}
