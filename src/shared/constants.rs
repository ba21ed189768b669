/// Opening time of the business day, in minutes since midnight (08:00)
pub const OPEN_MINUTES: i32 = 8 * 60;

/// Closing time of the business day, in minutes since midnight (16:00)
pub const CLOSE_MINUTES: i32 = 16 * 60;

/// Duration assumed for services that carry no duration field at all
pub const DEFAULT_SERVICE_DURATION_MINUTES: i32 = 60;

/// Appointments cannot be cancelled closer to their start than this
pub const CANCELLATION_LEAD_TIME_HOURS: i64 = 24;

/// "Appointment soon" reminders fire once the start is within this window
pub const REMINDER_WINDOW_HOURS: i64 = 24;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - manages the catalog and all appointments, decides edit requests
pub const ROLE_ADMIN: &str = "admin";

/// Client role - books appointments and requests changes to their own
pub const ROLE_CLIENT: &str = "client";
