//! Appointment booking feature.
//!
//! Slot-scheduling core: validated bookings, conflict detection per
//! (date, category, service), the owner edit-request workflow, and the
//! reminder sweep worker.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/appointments` | List all appointments (admin) |
//! | GET | `/api/appointments/my` | List caller's appointments |
//! | GET | `/api/appointments/available` | Free start times for a service on a date |
//! | POST | `/api/appointments` | Book an appointment |
//! | PUT | `/api/appointments/{id}` | Admin edit, or owner edit request |
//! | PUT | `/api/appointments/{id}/approve-edit` | Approve pending request (admin) |
//! | PUT | `/api/appointments/{id}/reject-edit` | Reject pending request (admin) |
//! | DELETE | `/api/appointments/{id}` | Cancel an appointment |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod workers;

pub use services::SchedulingService;
