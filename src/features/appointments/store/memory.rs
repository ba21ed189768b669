use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::error::{AppError, Result};
use crate::features::appointments::models::{Appointment, NewAppointment};
use crate::features::appointments::store::AppointmentStore;

/// Arena-with-id-lookup store used when no database is configured, and by
/// the test suite. Ids are monotonic for the process lifetime.
#[derive(Default)]
pub struct MemoryAppointmentStore {
    appointments: RwLock<BTreeMap<i64, Appointment>>,
    next_id: AtomicI64,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        Self {
            appointments: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

fn by_date_time(a: &Appointment, b: &Appointment) -> std::cmp::Ordering {
    (a.date, &a.time, a.id).cmp(&(b.date, &b.time, b.id))
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>> {
        Ok(self.appointments.read().unwrap().get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Appointment>> {
        let mut all: Vec<Appointment> = self
            .appointments
            .read()
            .unwrap()
            .values()
            .cloned()
            .collect();
        all.sort_by(by_date_time);
        Ok(all)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Appointment>> {
        let mut mine: Vec<Appointment> = self
            .appointments
            .read()
            .unwrap()
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(by_date_time);
        Ok(mine)
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        Ok(self
            .appointments
            .read()
            .unwrap()
            .values()
            .filter(|a| a.date == date)
            .cloned()
            .collect())
    }

    async fn insert(&self, new: NewAppointment) -> Result<Appointment> {
        let appointment = Appointment {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: new.user_id,
            category_id: new.category_id,
            service_id: new.service_id,
            date: new.date,
            time: new.time,
            status: new.status,
            edit_request: None,
        };
        self.appointments
            .write()
            .unwrap()
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment> {
        let mut appointments = self.appointments.write().unwrap();
        if !appointments.contains_key(&appointment.id) {
            return Err(AppError::NotFound("appointment not found".to_string()));
        }
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.appointments
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))
    }
}
