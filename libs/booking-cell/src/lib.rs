pub mod flow;
pub mod models;
pub mod service;

pub use flow::{BookingFlow, BookingStep};
pub use models::{AppointmentDraft, FlowError, PatientDetails};
pub use service::BookingService;
