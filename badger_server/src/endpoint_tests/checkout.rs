use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use badger_engine::{
    db_types::{MinorUnits, Reservation, SessionId},
    traits::{LedgerError, NewSessionInfo, ProcessorError},
    CheckoutApi,
    CheckoutConfig,
    SpendLimit,
};
use serde_json::json;

use super::{
    helpers::{error_code, send_request},
    mocks::{MockProcessor, MockSpendDb},
};
use crate::{routes::CheckoutRoute, server::json_config};

fn configure(db: MockSpendDb, processor: MockProcessor) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let limit = SpendLimit::new(MinorUnits::from(10_000));
        let api = CheckoutApi::new(db, processor, limit, CheckoutConfig::default());
        cfg.app_data(json_config())
            .app_data(web::Data::new(api))
            .service(CheckoutRoute::<MockSpendDb, MockProcessor>::new());
    }
}

fn order_json(quantity: i64) -> serde_json::Value {
    json!({
        "variant_id": "4011",
        "product_name": "Badger Tee",
        "quantity": quantity,
        "unit_price": "12.995",
        "size": "M",
        "recipient": {
            "name": "Honey Badger",
            "email": "honey@badger.io",
            "address": "1 Sett Lane",
            "city": "Bristol"
        }
    })
}

#[actix_web::test]
async fn checkout_creates_session() {
    let _ = env_logger::try_init().ok();
    let mut db = MockSpendDb::new();
    db.expect_reserve()
        .withf(|_, delta, cap| *delta == MinorUnits::from(3900) && *cap == MinorUnits::from(10_000))
        .times(1)
        .returning(|_, _, _| Ok(Reservation { new_total: MinorUnits::from(3900), ok: true }));
    db.expect_release().never();
    let mut processor = MockProcessor::new();
    processor
        .expect_create_checkout_session()
        .withf(|req| {
            req.unit_amount == MinorUnits::from(1300) &&
                req.quantity == 3 &&
                req.metadata.get("variant_id").map(String::as_str) == Some("4011") &&
                req.description.as_deref() == Some("Size: M")
        })
        .times(1)
        .returning(|_| {
            Ok(NewSessionInfo {
                session_id: SessionId::from("cs_test_1"),
                url: "https://checkout.stripe.com/c/pay/cs_test_1".into(),
            })
        });
    let req = TestRequest::post().uri("/checkout").set_json(order_json(3));
    let (status, body) = send_request(req, configure(db, processor)).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["checkout_url"], "https://checkout.stripe.com/c/pay/cs_test_1");
    assert_eq!(body["session_id"], "cs_test_1");
    assert_eq!(body["amount"], 3900);
}

#[actix_web::test]
async fn checkout_over_limit_is_refused() {
    let _ = env_logger::try_init().ok();
    let mut db = MockSpendDb::new();
    db.expect_reserve().times(1).returning(|_, _, _| Ok(Reservation { new_total: MinorUnits::from(7000), ok: false }));
    db.expect_release().never();
    let mut processor = MockProcessor::new();
    processor.expect_create_checkout_session().never();
    let req = TestRequest::post().uri("/checkout").set_json(order_json(3));
    let (status, body) = send_request(req, configure(db, processor)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_code(&body), "limit_reached");
}

#[actix_web::test]
async fn processor_failure_releases_reservation() {
    let _ = env_logger::try_init().ok();
    let mut db = MockSpendDb::new();
    db.expect_reserve().times(1).returning(|_, _, _| Ok(Reservation { new_total: MinorUnits::from(3900), ok: true }));
    db.expect_release()
        .withf(|_, delta| *delta == MinorUnits::from(3900))
        .times(1)
        .returning(|_, _| Ok(MinorUnits::ZERO));
    let mut processor = MockProcessor::new();
    processor
        .expect_create_checkout_session()
        .times(1)
        .returning(|_| Err(ProcessorError::Timeout("no response after 5s".into())));
    let req = TestRequest::post().uri("/checkout").set_json(order_json(3));
    let (status, body) = send_request(req, configure(db, processor)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "processor_error");
}

#[actix_web::test]
async fn failed_release_still_reports_processor_error() {
    let _ = env_logger::try_init().ok();
    let mut db = MockSpendDb::new();
    db.expect_reserve().times(1).returning(|_, _, _| Ok(Reservation { new_total: MinorUnits::from(3900), ok: true }));
    db.expect_release().times(1).returning(|_, _| Err(LedgerError::DatabaseError("database is locked".into())));
    let mut processor = MockProcessor::new();
    processor
        .expect_create_checkout_session()
        .times(1)
        .returning(|_| Err(ProcessorError::Timeout("no response after 5s".into())));
    let req = TestRequest::post().uri("/checkout").set_json(order_json(3));
    let (status, body) = send_request(req, configure(db, processor)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "processor_error");
}

#[actix_web::test]
async fn invalid_orders_have_no_side_effects() {
    let _ = env_logger::try_init().ok();
    for body in [order_json(0), json!({"variant_id": "4011"}), json!({"quantity": 1})] {
        let mut db = MockSpendDb::new();
        db.expect_reserve().never();
        let mut processor = MockProcessor::new();
        processor.expect_create_checkout_session().never();
        let req = TestRequest::post().uri("/checkout").set_json(body);
        let (status, body) = send_request(req, configure(db, processor)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "validation_error");
    }
}
