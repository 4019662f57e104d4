pub mod envelope;
pub mod error;
pub mod medical;
pub mod user;

pub use envelope::{ApiEnvelope, ListQuery};
pub use error::ClientError;
pub use medical::{
    Appointment, AppointmentStatus, BookAppointmentRequest, Department, Doctor, PaymentInfo,
    SpecialtyUpsert, TimeSlot, UpdateAppointmentRequest,
};
pub use user::{
    AdminUserUpsert, ChangePasswordRequest, LoginResponse, PatientProfileUpdate, ProfileUpdate,
    RefreshResponse, RegisterData, User, UserRole, WhoAmI,
};
