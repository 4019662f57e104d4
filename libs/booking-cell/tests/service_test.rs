use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::{BookingService, BookingStep, PatientDetails};
use gateway_cell::{ApiGateway, MemoryTokenStore};
use shared_config::AppConfig;
use shared_models::{ClientError, Doctor, PaymentInfo, TimeSlot};

fn gateway_for(server: &MockServer) -> Arc<ApiGateway> {
    let config = AppConfig {
        api_base_url: server.uri(),
        ..AppConfig::default()
    };
    Arc::new(ApiGateway::with_store(&config, Box::new(MemoryTokenStore::with_token("tok-1"))))
}

fn test_doctor() -> Doctor {
    Doctor {
        id: "doctor-1".to_string(),
        name: "Dr. Tran Minh".to_string(),
        title: "MD".to_string(),
        specialization: "Cardiology".to_string(),
        department_id: "1".to_string(),
        experience: 12,
        education: vec![],
        rating: 4.7,
        review_count: 132,
        consultation_fee: 500_000,
        languages: vec![],
        available_slots: vec![],
    }
}

fn service_at_booking(server: &MockServer) -> BookingService {
    let mut service = BookingService::with_payment_delay(gateway_for(server), Duration::from_millis(10));
    service.select_department("1");
    service.select_doctor(&test_doctor()).unwrap();
    service
        .select_slot(TimeSlot::new(
            "doctor-1",
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            true,
        ))
        .unwrap();
    service
}

fn details() -> PatientDetails {
    PatientDetails {
        name: "A".to_string(),
        phone: "0123".to_string(),
        email: "a@x.com".to_string(),
        symptoms: "headache".to_string(),
    }
}

#[tokio::test]
async fn submit_creates_appointment_then_enters_payment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .and(body_partial_json(json!({
            "doctor_id": "doctor-1",
            "date": "2024-06-10",
            "time": "09:00",
            "symptoms": "headache"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Appointment created",
            "data": { "id": 41 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = service_at_booking(&server);
    service.submit_booking_form(&details()).await.unwrap();

    assert_eq!(service.step(), BookingStep::Payment);
    assert_eq!(service.draft().unwrap().consultation_fee, 500_000);
}

#[tokio::test]
async fn failed_create_call_keeps_the_wizard_in_booking() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "success": false,
            "message": "The selected slot is taken"
        })))
        .mount(&server)
        .await;

    let mut service = service_at_booking(&server);
    let err = service.submit_booking_form(&details()).await.unwrap_err();

    assert_matches!(err, ClientError::Validation(msg) if msg == "The selected slot is taken");
    assert_eq!(service.step(), BookingStep::Booking);
    assert!(service.flow().slot().is_some());
}

#[tokio::test]
async fn client_side_rejection_never_reaches_the_backend() {
    let server = MockServer::start().await;
    // No mock mounted: any request would 404 and the expect(0) below guards it.
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut service = service_at_booking(&server);
    let err = service
        .submit_booking_form(&PatientDetails { email: String::new(), ..details() })
        .await
        .unwrap_err();

    assert_matches!(err, ClientError::Validation(_));
    assert_eq!(service.step(), BookingStep::Booking);
}

#[tokio::test]
async fn payment_always_succeeds_after_the_delay() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {}
        })))
        .mount(&server)
        .await;

    let mut service = service_at_booking(&server);
    service.submit_booking_form(&details()).await.unwrap();

    service.complete_payment(&PaymentInfo::Cash).await.unwrap();
    assert_eq!(service.step(), BookingStep::Success);

    // Settled payments cannot be completed again.
    let err = service.complete_payment(&PaymentInfo::Cash).await.unwrap_err();
    assert_matches!(err, ClientError::Validation(_));
}

#[tokio::test]
async fn a_dropped_payment_attempt_releases_the_guard_for_a_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {}
        })))
        .mount(&server)
        .await;

    let mut service =
        BookingService::with_payment_delay(gateway_for(&server), Duration::from_millis(200));
    service.select_department("1");
    service.select_doctor(&test_doctor()).unwrap();
    service
        .select_slot(TimeSlot::new(
            "doctor-1",
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            true,
        ))
        .unwrap();
    service.submit_booking_form(&details()).await.unwrap();

    // First attempt is cancelled mid-delay by dropping its future.
    let attempt =
        tokio::time::timeout(Duration::from_millis(10), service.complete_payment(&PaymentInfo::Cash));
    assert!(attempt.await.is_err());
    assert_eq!(service.step(), BookingStep::Payment);

    // The retry must not be turned away as "already in progress".
    service.complete_payment(&PaymentInfo::Cash).await.unwrap();
    assert_eq!(service.step(), BookingStep::Success);
}

#[tokio::test]
async fn payment_outside_the_payment_step_is_rejected() {
    let server = MockServer::start().await;
    let mut service = service_at_booking(&server);

    let err = service
        .complete_payment(&PaymentInfo::BankTransfer)
        .await
        .unwrap_err();
    assert_matches!(err, ClientError::Validation(_));
    assert_eq!(service.step(), BookingStep::Booking);
}
