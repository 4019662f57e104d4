use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::medical::hhmm;
use shared_models::{BookAppointmentRequest, ClientError};

use crate::flow::BookingStep;

/// Patient fields captured by the booking form. Name, phone and email are
/// required; symptoms are free text and may stay empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientDetails {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub symptoms: String,
}

/// The in-memory, not-yet-persisted appointment accumulated through the
/// wizard. The consultation fee is snapshotted from the doctor at submission
/// time and never tracks later fee changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: String,
    pub doctor_id: String,
    pub department_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub symptoms: String,
    pub consultation_fee: i64,
}

impl AppointmentDraft {
    pub fn to_booking_request(&self) -> BookAppointmentRequest {
        BookAppointmentRequest {
            doctor_id: self.doctor_id.clone(),
            date: self.date,
            time: self.time,
            symptoms: self.symptoms.clone(),
            notes: None,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum FlowError {
    #[error("{action} is not valid from the {from} step")]
    InvalidTransition {
        from: BookingStep,
        action: &'static str,
    },

    #[error("No time slot selected")]
    MissingSlot,

    #[error("That time slot is no longer available")]
    SlotUnavailable,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

impl From<FlowError> for ClientError {
    fn from(err: FlowError) -> Self {
        ClientError::Validation(err.to_string())
    }
}
