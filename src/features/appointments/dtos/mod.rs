mod appointment_dto;

pub use appointment_dto::{
    AppointmentResponseDto, AvailableSlotsDto, AvailableSlotsQuery, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};
