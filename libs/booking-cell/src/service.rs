use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use gateway_cell::ApiGateway;
use shared_models::{ClientError, Doctor, PaymentInfo, TimeSlot};

use crate::flow::{BookingFlow, BookingStep};
use crate::models::{AppointmentDraft, FlowError, PatientDetails};

const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_secs(2);

/// Holds an in-progress flag for the lifetime of one operation. Clearing
/// happens in `Drop`, so the flag is released even when the owning future is
/// cancelled mid-await instead of staying set forever.
struct InProgressGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> InProgressGuard<'a> {
    fn acquire(flag: &'a mut bool) -> Option<Self> {
        if *flag {
            return None;
        }
        *flag = true;
        Some(Self { flag })
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

/// API-backed booking wizard: the same state machine as [`BookingFlow`], but
/// the form submission creates the appointment through the gateway before
/// advancing, and payment completion awaits the simulated payment provider.
pub struct BookingService {
    flow: BookingFlow,
    gateway: Arc<ApiGateway>,
    payment_delay: Duration,
    payment_in_progress: bool,
}

impl BookingService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self::with_payment_delay(gateway, DEFAULT_PAYMENT_DELAY)
    }

    pub fn with_payment_delay(gateway: Arc<ApiGateway>, payment_delay: Duration) -> Self {
        Self {
            flow: BookingFlow::new(),
            gateway,
            payment_delay,
            payment_in_progress: false,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.flow.step()
    }

    pub fn flow(&self) -> &BookingFlow {
        &self.flow
    }

    pub fn draft(&self) -> Option<&AppointmentDraft> {
        self.flow.draft()
    }

    pub fn select_department(&mut self, department_id: &str) {
        self.flow.select_department(department_id);
    }

    pub fn select_doctor(&mut self, doctor: &Doctor) -> Result<(), FlowError> {
        self.flow.select_doctor(doctor)
    }

    pub fn select_slot(&mut self, slot: TimeSlot) -> Result<(), FlowError> {
        self.flow.select_slot(slot)
    }

    pub fn go_back(&mut self) {
        self.flow.go_back();
    }

    pub fn reset(&mut self) {
        self.flow.reset();
    }

    /// Validate the form, create the appointment on the backend, then advance
    /// to payment. A client-side rejection or a failed create call leaves the
    /// wizard in the booking step with all selections intact.
    pub async fn submit_booking_form(&mut self, details: &PatientDetails) -> Result<(), ClientError> {
        let draft = self.flow.draft_from(details)?;

        let envelope = self.gateway.book_appointment(&draft.to_booking_request()).await?;
        if !envelope.success {
            warn!("Appointment create rejected: {}", envelope.message);
            return Err(ClientError::Api(envelope.message));
        }

        info!("Appointment created for doctor {}", draft.doctor_id);
        self.flow.enter_payment(draft)?;
        Ok(())
    }

    /// Simulated payment: waits out the artificial provider delay and always
    /// succeeds. Overlapping attempts are dropped by the in-progress guard so
    /// a double-click cannot settle the same payment twice; an attempt whose
    /// future is dropped mid-delay releases the guard and can be retried.
    pub async fn complete_payment(&mut self, payment: &PaymentInfo) -> Result<(), ClientError> {
        if self.flow.step() != BookingStep::Payment {
            return Err(FlowError::InvalidTransition {
                from: self.flow.step(),
                action: "complete_payment",
            }
            .into());
        }
        let _guard = InProgressGuard::acquire(&mut self.payment_in_progress)
            .ok_or_else(|| ClientError::Validation("Payment already in progress".to_string()))?;

        debug!("Processing {} payment", payment.method());
        tokio::time::sleep(self.payment_delay).await;

        self.flow.complete_payment()?;
        Ok(())
    }
}
