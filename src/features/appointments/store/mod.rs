//! Appointment persistence contract.
//!
//! The scheduler never touches rows directly; it validates against reads
//! from a store and writes through it, holding a per-slot lock across the
//! pair so racing bookings resolve deterministically.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::error::Result;
use crate::features::appointments::models::{Appointment, NewAppointment};

mod memory;
mod postgres;

pub use memory::MemoryAppointmentStore;
pub use postgres::PgAppointmentStore;

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>>;

    /// All appointments ordered by (date, time) ascending.
    async fn find_all(&self) -> Result<Vec<Appointment>>;

    /// One user's appointments ordered by (date, time) ascending.
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Appointment>>;

    /// Appointments on one calendar day, the overlap detector's working set.
    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>>;

    async fn insert(&self, new: NewAppointment) -> Result<Appointment>;

    async fn update(&self, appointment: &Appointment) -> Result<Appointment>;

    async fn delete(&self, id: i64) -> Result<()>;
}
