pub mod clock;
pub mod constants;
pub mod test_helpers;
pub mod time;
pub mod types;
