mod reminder_sweep;

pub use reminder_sweep::ReminderSweep;
