use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Serde adapter for "HH:MM" times as the backend exchanges them.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M").map_err(serde::de::Error::custom)
    }
}

/// A medical specialty grouping under which doctors are organized.
/// Reference data only; the client never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub title: String,
    pub specialization: String,
    pub department_id: String,
    pub experience: i32,
    pub education: Vec<String>,
    pub rating: f32,
    pub review_count: i32,
    pub consultation_fee: i64,
    pub languages: Vec<String>,
    /// Owned wholesale: regenerated or replaced from the backend, never patched.
    #[serde(default)]
    pub available_slots: Vec<TimeSlot>,
}

/// A bookable 30-minute window for a specific doctor on a specific date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub available: bool,
}

impl TimeSlot {
    /// The (doctor, date, time) triple composes the id, which keeps slot
    /// identities unique without backend coordination.
    pub fn new(doctor_id: &str, date: NaiveDate, time: NaiveTime, available: bool) -> Self {
        Self {
            id: format!("{}-{}-{}", doctor_id, date.format("%Y-%m-%d"), time.format("%H:%M")),
            date,
            time,
            available,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: String,
    pub doctor_id: String,
    pub department_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub symptoms: String,
    /// Snapshot taken at booking time; later doctor fee changes do not apply.
    pub consultation_fee: i64,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Legal status transitions. Pending appointments get confirmed or
    /// cancelled; confirmed ones complete or get cancelled; completed and
    /// cancelled are terminal. A completed appointment cannot be cancelled.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Per-attempt payment details. Transient: built for one payment attempt and
/// dropped once the flow settles, never persisted client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentInfo {
    CreditCard {
        card_number: String,
        card_holder_name: String,
        expiry_date: String,
        cvv: String,
    },
    BankTransfer,
    Cash,
}

impl PaymentInfo {
    /// Wire name of the payment method, safe to log.
    pub fn method(&self) -> &'static str {
        match self {
            PaymentInfo::CreditCard { .. } => "credit_card",
            PaymentInfo::BankTransfer => "bank_transfer",
            PaymentInfo::Cash => "cash",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub symptoms: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyUpsert {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}
