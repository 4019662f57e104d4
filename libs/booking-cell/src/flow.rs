use std::fmt;

use tracing::debug;

use shared_models::{Doctor, TimeSlot};

use crate::models::{AppointmentDraft, FlowError, PatientDetails};

/// Discriminant of the wizard position, for step indicators and guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    Department,
    Doctor,
    Booking,
    Payment,
    Success,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStep::Department => write!(f, "department"),
            BookingStep::Doctor => write!(f, "doctor"),
            BookingStep::Booking => write!(f, "booking"),
            BookingStep::Payment => write!(f, "payment"),
            BookingStep::Success => write!(f, "success"),
        }
    }
}

/// The booking wizard as a sum type: each state carries exactly the data that
/// is valid at that step, so a payment state without a draft appointment or a
/// booking state without a resolved doctor cannot be constructed at all.
#[derive(Debug, Clone)]
pub enum BookingFlow {
    Department,
    Doctor {
        department_id: String,
    },
    Booking {
        department_id: String,
        doctor: Doctor,
        slot: Option<TimeSlot>,
    },
    Payment {
        department_id: String,
        doctor: Doctor,
        slot: TimeSlot,
        draft: AppointmentDraft,
    },
    Success {
        draft: AppointmentDraft,
    },
}

impl Default for BookingFlow {
    fn default() -> Self {
        BookingFlow::Department
    }
}

impl BookingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> BookingStep {
        match self {
            BookingFlow::Department => BookingStep::Department,
            BookingFlow::Doctor { .. } => BookingStep::Doctor,
            BookingFlow::Booking { .. } => BookingStep::Booking,
            BookingFlow::Payment { .. } => BookingStep::Payment,
            BookingFlow::Success { .. } => BookingStep::Success,
        }
    }

    pub fn department_id(&self) -> Option<&str> {
        match self {
            BookingFlow::Department | BookingFlow::Success { .. } => None,
            BookingFlow::Doctor { department_id }
            | BookingFlow::Booking { department_id, .. }
            | BookingFlow::Payment { department_id, .. } => Some(department_id),
        }
    }

    pub fn doctor(&self) -> Option<&Doctor> {
        match self {
            BookingFlow::Booking { doctor, .. } | BookingFlow::Payment { doctor, .. } => Some(doctor),
            _ => None,
        }
    }

    pub fn slot(&self) -> Option<&TimeSlot> {
        match self {
            BookingFlow::Booking { slot, .. } => slot.as_ref(),
            BookingFlow::Payment { slot, .. } => Some(slot),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&AppointmentDraft> {
        match self {
            BookingFlow::Payment { draft, .. } | BookingFlow::Success { draft } => Some(draft),
            _ => None,
        }
    }

    /// Choose a department and move to doctor selection. Valid from any step;
    /// any previously selected doctor and slot are dropped, so calling this
    /// repeatedly with different departments never leaves stale selections.
    pub fn select_department(&mut self, department_id: &str) {
        debug!("Department selected: {}", department_id);
        *self = BookingFlow::Doctor {
            department_id: department_id.to_string(),
        };
    }

    /// Choose a doctor and move to the booking step, dropping any previously
    /// selected slot. Requires a department to already be chosen.
    pub fn select_doctor(&mut self, doctor: &Doctor) -> Result<(), FlowError> {
        match self {
            BookingFlow::Doctor { department_id } | BookingFlow::Booking { department_id, .. } => {
                debug!("Doctor selected: {}", doctor.id);
                *self = BookingFlow::Booking {
                    department_id: std::mem::take(department_id),
                    doctor: doctor.clone(),
                    slot: None,
                };
                Ok(())
            }
            _ => Err(FlowError::InvalidTransition {
                from: self.step(),
                action: "select_doctor",
            }),
        }
    }

    /// Pick a time slot within the booking step. Does not advance the wizard:
    /// slot choice happens alongside the patient form.
    pub fn select_slot(&mut self, chosen: TimeSlot) -> Result<(), FlowError> {
        match self {
            BookingFlow::Booking { slot, .. } => {
                if !chosen.available {
                    return Err(FlowError::SlotUnavailable);
                }
                debug!("Slot selected: {}", chosen.id);
                *slot = Some(chosen);
                Ok(())
            }
            _ => Err(FlowError::InvalidTransition {
                from: self.step(),
                action: "select_slot",
            }),
        }
    }

    /// Validate the form against the current selections and build the draft
    /// appointment without changing state. Name, phone and email must be
    /// non-empty and a slot must be selected.
    pub fn draft_from(&self, details: &PatientDetails) -> Result<AppointmentDraft, FlowError> {
        let (department_id, doctor, slot) = match self {
            BookingFlow::Booking {
                department_id,
                doctor,
                slot,
            } => (department_id, doctor, slot),
            _ => {
                return Err(FlowError::InvalidTransition {
                    from: self.step(),
                    action: "submit_form",
                })
            }
        };

        let slot = slot.as_ref().ok_or(FlowError::MissingSlot)?;
        if details.name.trim().is_empty() {
            return Err(FlowError::MissingField("name"));
        }
        if details.phone.trim().is_empty() {
            return Err(FlowError::MissingField("phone"));
        }
        if details.email.trim().is_empty() {
            return Err(FlowError::MissingField("email"));
        }

        Ok(AppointmentDraft {
            patient_name: details.name.clone(),
            patient_phone: details.phone.clone(),
            patient_email: details.email.clone(),
            doctor_id: doctor.id.clone(),
            department_id: department_id.clone(),
            date: slot.date,
            time: slot.time,
            symptoms: details.symptoms.clone(),
            consultation_fee: doctor.consultation_fee,
        })
    }

    /// Submit the patient form: on success the draft is stored and the wizard
    /// advances to payment; on rejection the state is left untouched.
    pub fn submit_form(&mut self, details: &PatientDetails) -> Result<(), FlowError> {
        let draft = self.draft_from(details)?;
        self.enter_payment(draft)
    }

    /// Advance from booking to payment with an already-validated draft. The
    /// API-backed service uses this after the create call has succeeded.
    pub(crate) fn enter_payment(&mut self, draft: AppointmentDraft) -> Result<(), FlowError> {
        match self {
            BookingFlow::Booking {
                department_id,
                doctor,
                slot: Some(slot),
            } => {
                debug!("Entering payment for doctor {}", doctor.id);
                *self = BookingFlow::Payment {
                    department_id: std::mem::take(department_id),
                    doctor: doctor.clone(),
                    slot: slot.clone(),
                    draft,
                };
                Ok(())
            }
            BookingFlow::Booking { slot: None, .. } => Err(FlowError::MissingSlot),
            _ => Err(FlowError::InvalidTransition {
                from: self.step(),
                action: "enter_payment",
            }),
        }
    }

    /// Payment settled: move to the success step, keeping only the draft.
    pub fn complete_payment(&mut self) -> Result<(), FlowError> {
        match self {
            BookingFlow::Payment { draft, .. } => {
                *self = BookingFlow::Success { draft: draft.clone() };
                Ok(())
            }
            _ => Err(FlowError::InvalidTransition {
                from: self.step(),
                action: "complete_payment",
            }),
        }
    }

    /// Step backwards: payment returns to booking with the doctor and slot
    /// restored, booking to doctor selection, doctor selection to departments.
    /// A no-op at the department and success steps.
    pub fn go_back(&mut self) {
        *self = match std::mem::take(self) {
            BookingFlow::Payment {
                department_id,
                doctor,
                slot,
                ..
            } => BookingFlow::Booking {
                department_id,
                doctor,
                slot: Some(slot),
            },
            BookingFlow::Booking { department_id, .. } => BookingFlow::Doctor { department_id },
            BookingFlow::Doctor { .. } => BookingFlow::Department,
            other => other,
        };
    }

    /// Drop every selection and return to department choice.
    pub fn reset(&mut self) {
        *self = BookingFlow::Department;
    }
}
