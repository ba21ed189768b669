//! Realtime fan-out over WebSockets.
//!
//! Appointment mutations broadcast to every connected client; personal
//! alerts (confirmations, reminders, edit decisions) address one user id.

mod hub;
pub mod ws;

pub use hub::{Envelope, RealtimeHub, Target};
