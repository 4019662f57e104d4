use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};

use booking_cell::{BookingFlow, BookingStep, FlowError, PatientDetails};
use shared_models::{Doctor, TimeSlot};

fn test_doctor(id: &str, fee: i64) -> Doctor {
    Doctor {
        id: id.to_string(),
        name: "Dr. Tran Minh".to_string(),
        title: "MD".to_string(),
        specialization: "Cardiology".to_string(),
        department_id: "1".to_string(),
        experience: 12,
        education: vec!["Hanoi Medical University".to_string()],
        rating: 4.7,
        review_count: 132,
        consultation_fee: fee,
        languages: vec!["vi".to_string(), "en".to_string()],
        available_slots: Vec::new(),
    }
}

fn test_slot() -> TimeSlot {
    TimeSlot::new(
        "doctor-1",
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        true,
    )
}

fn valid_details() -> PatientDetails {
    PatientDetails {
        name: "A".to_string(),
        phone: "0123".to_string(),
        email: "a@x.com".to_string(),
        symptoms: String::new(),
    }
}

fn flow_at_booking() -> BookingFlow {
    let mut flow = BookingFlow::new();
    flow.select_department("1");
    flow.select_doctor(&test_doctor("doctor-1", 500_000)).unwrap();
    flow
}

#[test]
fn happy_path_reaches_success_with_fee_snapshot() {
    let mut flow = flow_at_booking();
    flow.select_slot(test_slot()).unwrap();
    flow.submit_form(&valid_details()).unwrap();

    assert_eq!(flow.step(), BookingStep::Payment);
    let draft = flow.draft().unwrap();
    assert_eq!(draft.consultation_fee, 500_000);
    assert_eq!(draft.doctor_id, "doctor-1");
    assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());

    flow.complete_payment().unwrap();
    assert_eq!(flow.step(), BookingStep::Success);
    assert!(flow.draft().is_some());
}

#[test]
fn fee_snapshot_survives_later_doctor_fee_change() {
    let mut doctor = test_doctor("doctor-1", 500_000);
    let mut flow = BookingFlow::new();
    flow.select_department("1");
    flow.select_doctor(&doctor).unwrap();
    flow.select_slot(test_slot()).unwrap();
    flow.submit_form(&valid_details()).unwrap();

    doctor.consultation_fee = 900_000;
    assert_eq!(flow.draft().unwrap().consultation_fee, 500_000);
}

#[test]
fn select_department_clears_doctor_and_slot() {
    let mut flow = flow_at_booking();
    flow.select_slot(test_slot()).unwrap();
    assert!(flow.doctor().is_some());
    assert!(flow.slot().is_some());

    flow.select_department("2");
    assert_eq!(flow.step(), BookingStep::Doctor);
    assert_eq!(flow.department_id(), Some("2"));
    assert!(flow.doctor().is_none());
    assert!(flow.slot().is_none());

    // Repeated re-selection never leaves stale state behind.
    flow.select_department("3");
    assert_eq!(flow.department_id(), Some("3"));
    assert!(flow.doctor().is_none());
    assert!(flow.slot().is_none());
}

#[test]
fn select_doctor_clears_previous_slot() {
    let mut flow = flow_at_booking();
    flow.select_slot(test_slot()).unwrap();

    flow.select_doctor(&test_doctor("doctor-2", 300_000)).unwrap();
    assert_eq!(flow.step(), BookingStep::Booking);
    assert_eq!(flow.doctor().unwrap().id, "doctor-2");
    assert!(flow.slot().is_none());
}

#[test]
fn select_doctor_requires_a_department() {
    let mut flow = BookingFlow::new();
    let err = flow.select_doctor(&test_doctor("doctor-1", 1)).unwrap_err();
    assert_matches!(err, FlowError::InvalidTransition { .. });
    assert_eq!(flow.step(), BookingStep::Department);
}

#[test]
fn unavailable_slot_is_rejected() {
    let mut flow = flow_at_booking();
    let mut slot = test_slot();
    slot.available = false;

    assert_eq!(flow.select_slot(slot), Err(FlowError::SlotUnavailable));
    assert!(flow.slot().is_none());
}

#[test]
fn submit_without_slot_is_rejected_without_transition() {
    let mut flow = flow_at_booking();
    assert_eq!(flow.submit_form(&valid_details()), Err(FlowError::MissingSlot));
    assert_eq!(flow.step(), BookingStep::Booking);
}

#[test]
fn submit_with_missing_required_fields_is_rejected() {
    for (field, details) in [
        ("name", PatientDetails { name: "".into(), ..valid_details() }),
        ("phone", PatientDetails { phone: "  ".into(), ..valid_details() }),
        ("email", PatientDetails { email: "".into(), ..valid_details() }),
    ] {
        let mut flow = flow_at_booking();
        flow.select_slot(test_slot()).unwrap();

        let err = flow.submit_form(&details).unwrap_err();
        assert_eq!(err, FlowError::MissingField(field));
        assert_eq!(flow.step(), BookingStep::Booking, "state changed on rejected {field}");
        assert!(flow.slot().is_some(), "slot lost on rejected submit");
    }
}

#[test]
fn go_back_walks_the_wizard_and_is_a_noop_at_department() {
    let mut flow = flow_at_booking();
    flow.select_slot(test_slot()).unwrap();
    flow.submit_form(&valid_details()).unwrap();
    assert_eq!(flow.step(), BookingStep::Payment);

    flow.go_back();
    assert_eq!(flow.step(), BookingStep::Booking);
    // Doctor and slot survive the return from payment.
    assert_eq!(flow.doctor().unwrap().id, "doctor-1");
    assert!(flow.slot().is_some());

    flow.go_back();
    assert_eq!(flow.step(), BookingStep::Doctor);
    flow.go_back();
    assert_eq!(flow.step(), BookingStep::Department);
    flow.go_back();
    assert_eq!(flow.step(), BookingStep::Department);
}

#[test]
fn complete_payment_requires_the_payment_step() {
    let mut flow = flow_at_booking();
    assert_matches!(flow.complete_payment(), Err(FlowError::InvalidTransition { .. }));
    assert_eq!(flow.step(), BookingStep::Booking);
}

#[test]
fn generated_fixture_slots_drive_the_flow_end_to_end() {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let mut rng = StdRng::seed_from_u64(5);
    let today = NaiveDate::from_ymd_opt(2024, 6, 6).unwrap();
    let slots = scheduling_cell::generate_slots("doctor-1", today, &mut rng);
    let open = slots.into_iter().find(|s| s.available).expect("seeded grid has an open slot");

    let mut flow = flow_at_booking();
    flow.select_slot(open.clone()).unwrap();
    flow.submit_form(&valid_details()).unwrap();

    let draft = flow.draft().unwrap();
    assert_eq!(draft.date, open.date);
    assert_eq!(draft.time, open.time);
}

#[test]
fn reset_returns_to_department_from_anywhere() {
    let mut flow = flow_at_booking();
    flow.select_slot(test_slot()).unwrap();
    flow.submit_form(&valid_details()).unwrap();
    flow.reset();
    assert_eq!(flow.step(), BookingStep::Department);
    assert!(flow.doctor().is_none());
    assert!(flow.draft().is_none());
}
