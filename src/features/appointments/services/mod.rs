mod availability_service;
mod scheduling_service;

pub use availability_service::AvailabilityService;
pub use scheduling_service::SchedulingService;
