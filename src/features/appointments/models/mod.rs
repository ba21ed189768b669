mod appointment;

pub use appointment::{
    Appointment, AppointmentStatus, EditRequest, EditRequestStatus, NewAppointment,
};
