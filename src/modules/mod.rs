//! Modules layer - infrastructure components shared across features.

pub mod notifications;
pub mod realtime;
