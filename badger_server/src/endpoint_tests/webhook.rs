use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use badger_common::Secret;
use badger_engine::{
    db_types::{FulfillmentStatus, FulfillmentUpdate},
    events::EventProducers,
    traits::SupplierError,
    FulfillmentApi,
};
use chrono::Utc;
use serde_json::json;
use stripe_tools::webhook::{signature_header, SIGNATURE_HEADER};

use super::{
    helpers::{error_code, record, send_request, WEBHOOK_SECRET},
    mocks::{MockFulfillmentDb, MockProcessor, MockSupplier},
};
use crate::{integrations::stripe::WebhookVerifier, routes::StripeWebhookRoute};

fn configure(db: MockFulfillmentDb, supplier: MockSupplier) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let processor = MockProcessor::new();
        let api = FulfillmentApi::new(db, processor, supplier, EventProducers::default());
        let verifier = WebhookVerifier::new(Secret::new(WEBHOOK_SECRET.to_string()), 300);
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(verifier))
            .service(StripeWebhookRoute::<MockFulfillmentDb, MockProcessor, MockSupplier>::new());
    }
}

fn event(event_type: &str, session_id: &str) -> Vec<u8> {
    json!({
        "id": "evt_1",
        "type": event_type,
        "created": Utc::now().timestamp(),
        "data": { "object": {
            "id": session_id,
            "object": "checkout.session",
            "amount_total": 3900,
            "currency": "gbp",
            "payment_status": "paid",
            "payment_intent": "pi_1",
            "metadata": {
                "variant_id": "4011",
                "quantity": "3",
                "name": "Honey Badger",
                "email": "honey@badger.io",
                "address": "1 Sett Lane",
                "city": "Bristol"
            }
        }}
    })
    .to_string()
    .into_bytes()
}

fn signed_request(body: Vec<u8>, timestamp: i64) -> TestRequest {
    let header = signature_header(&body, timestamp, WEBHOOK_SECRET).unwrap();
    TestRequest::post().uri("/webhook").insert_header((SIGNATURE_HEADER, header)).set_payload(body)
}

fn untouched_ledger() -> MockFulfillmentDb {
    let mut db = MockFulfillmentDb::new();
    db.expect_claim().never();
    db.expect_update().never();
    db
}

fn idle_supplier() -> MockSupplier {
    let mut supplier = MockSupplier::new();
    supplier.expect_create_order().never();
    supplier
}

#[actix_web::test]
async fn completed_session_is_fulfilled() {
    let _ = env_logger::try_init().ok();
    let mut db = MockFulfillmentDb::new();
    db.expect_claim().withf(|id| id.as_str() == "cs_test_1").times(1).returning(|_| Ok(true));
    db.expect_update()
        .withf(|_, update| {
            matches!(update, FulfillmentUpdate::Placed { supplier_order_id } if supplier_order_id == "90001")
        })
        .times(1)
        .returning(|_, _| Ok(Some(record("cs_test_1", FulfillmentStatus::Placed, Some("90001")))));
    let mut supplier = MockSupplier::new();
    supplier
        .expect_create_order()
        .withf(|order| order.external_id.as_str() == "cs_test_1" && order.items[0].quantity == 3)
        .times(1)
        .returning(|_| Ok("90001".into()));
    let req = signed_request(event("checkout.session.completed", "cs_test_1"), Utc::now().timestamp());
    let (status, body) = send_request(req, configure(db, supplier)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("90001"), "{body}");
}

#[actix_web::test]
async fn redelivery_does_not_call_supplier() {
    let _ = env_logger::try_init().ok();
    let mut db = MockFulfillmentDb::new();
    db.expect_claim().times(1).returning(|_| Ok(false));
    db.expect_fetch().times(1).returning(|_| Ok(Some(record("cs_test_1", FulfillmentStatus::Placed, Some("90001")))));
    db.expect_update().never();
    let req = signed_request(event("checkout.session.completed", "cs_test_1"), Utc::now().timestamp());
    let (status, body) = send_request(req, configure(db, idle_supplier())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("already recorded as Placed"), "{body}");
}

#[actix_web::test]
async fn supplier_failure_is_recorded() {
    let _ = env_logger::try_init().ok();
    let mut db = MockFulfillmentDb::new();
    db.expect_claim().times(1).returning(|_| Ok(true));
    db.expect_update()
        .withf(|_, update| matches!(update, FulfillmentUpdate::Failed { .. }))
        .times(1)
        .returning(|_, _| Ok(Some(record("cs_test_2", FulfillmentStatus::Failed, None))));
    let mut supplier = MockSupplier::new();
    supplier.expect_create_order().times(1).returning(|_| Err(SupplierError::Timeout("5s elapsed".into())));
    let req = signed_request(event("checkout.session.completed", "cs_test_2"), Utc::now().timestamp());
    let (status, body) = send_request(req, configure(db, supplier)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(&body), "fulfillment_failed");
}

#[actix_web::test]
async fn tampered_body_is_rejected() {
    let _ = env_logger::try_init().ok();
    let original = event("checkout.session.completed", "cs_test_1");
    let header = signature_header(&original, Utc::now().timestamp(), WEBHOOK_SECRET).unwrap();
    let tampered = event("checkout.session.completed", "cs_test_666");
    let req = TestRequest::post().uri("/webhook").insert_header((SIGNATURE_HEADER, header)).set_payload(tampered);
    let (status, body) = send_request(req, configure(untouched_ledger(), idle_supplier())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_signature");
}

#[actix_web::test]
async fn stale_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = signed_request(event("checkout.session.completed", "cs_test_1"), Utc::now().timestamp() - 600);
    let (status, body) = send_request(req, configure(untouched_ledger(), idle_supplier())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_signature");
}

#[actix_web::test]
async fn missing_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/webhook").set_payload(event("checkout.session.completed", "cs_test_1"));
    let (status, body) = send_request(req, configure(untouched_ledger(), idle_supplier())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_signature");
}

#[actix_web::test]
async fn other_events_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    for event_type in ["checkout.session.expired", "charge.refunded"] {
        let req = signed_request(event(event_type, "cs_test_3"), Utc::now().timestamp());
        let (status, _) = send_request(req, configure(untouched_ledger(), idle_supplier())).await;
        assert_eq!(status, StatusCode::OK, "{event_type} should be acknowledged");
    }
}
