use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use badger_engine::{
    db_types::{FulfillmentStatus, MinorUnits},
    events::EventProducers,
    FulfillmentApi,
    SpendApi,
    SpendLimit,
};
use serde_json::json;

use super::{
    helpers::{error_code, record, send_request, ADMIN_TOKEN},
    mocks::{MockFulfillmentDb, MockProcessor, MockSpendDb, MockSupplier},
};
use crate::{
    middleware::{AdminToken, ADMIN_TOKEN_HEADER},
    routes::{FulfillmentsRoute, ResetSpendRoute, SetSpendLimitRoute, SpendStatusRoute},
    server::{json_config, query_config},
};

fn configure_spend(db: MockSpendDb, token: AdminToken, limit: SpendLimit) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(json_config())
            .app_data(web::Data::new(SpendApi::new(db, limit)))
            .app_data(web::Data::new(token))
            .service(SpendStatusRoute::<MockSpendDb>::new())
            .service(ResetSpendRoute::<MockSpendDb>::new())
            .service(SetSpendLimitRoute::<MockSpendDb>::new());
    }
}

fn configure_fulfillments(db: MockFulfillmentDb) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = FulfillmentApi::new(db, MockProcessor::new(), MockSupplier::new(), EventProducers::default());
        cfg.app_data(query_config())
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(AdminToken::new(ADMIN_TOKEN)))
            .service(FulfillmentsRoute::<MockFulfillmentDb, MockProcessor, MockSupplier>::new());
    }
}

fn committed(amount: i64) -> MockSpendDb {
    let mut db = MockSpendDb::new();
    db.expect_fetch_committed().returning(move |_| Ok(MinorUnits::from(amount)));
    db
}

fn limit() -> SpendLimit {
    SpendLimit::new(MinorUnits::from(10_000))
}

#[actix_web::test]
async fn admin_routes_need_a_token() {
    let _ = env_logger::try_init().ok();
    let mut db = MockSpendDb::new();
    db.expect_fetch_committed().never();
    db.expect_reset().never();
    let req = TestRequest::post().uri("/admin/spend/reset");
    let (status, body) = send_request(req, configure_spend(db, AdminToken::new(ADMIN_TOKEN), limit())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "unauthorized");
}

#[actix_web::test]
async fn wrong_token_is_refused() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/admin/spend").insert_header((ADMIN_TOKEN_HEADER, "badger-admin-tokeN"));
    let configure = configure_spend(MockSpendDb::new(), AdminToken::new(ADMIN_TOKEN), limit());
    let (status, _) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unset_token_refuses_everything() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/admin/spend?token=").insert_header((ADMIN_TOKEN_HEADER, ""));
    let (status, _) = send_request(req, configure_spend(MockSpendDb::new(), AdminToken::default(), limit())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn spend_status_with_header_token() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/admin/spend").insert_header((ADMIN_TOKEN_HEADER, ADMIN_TOKEN));
    let configure = configure_spend(committed(7_000), AdminToken::new(ADMIN_TOKEN), limit());
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["committed"], 7_000);
    assert_eq!(body["limit"], 10_000);
    assert_eq!(body["remaining"], 3_000);
}

#[actix_web::test]
async fn reset_with_query_token() {
    let _ = env_logger::try_init().ok();
    let mut db = MockSpendDb::new();
    let mut seq = mockall::Sequence::new();
    db.expect_fetch_committed().times(1).in_sequence(&mut seq).returning(|_| Ok(MinorUnits::from(9_900)));
    db.expect_reset().times(1).in_sequence(&mut seq).returning(|_| Ok(()));
    db.expect_fetch_committed().times(1).in_sequence(&mut seq).returning(|_| Ok(MinorUnits::ZERO));
    let req = TestRequest::post().uri(&format!("/admin/spend/reset?token={ADMIN_TOKEN}"));
    let (status, body) = send_request(req, configure_spend(db, AdminToken::new(ADMIN_TOKEN), limit())).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["committed"], 0);
    assert_eq!(body["remaining"], 10_000);
}

#[actix_web::test]
async fn change_spend_limit() {
    let _ = env_logger::try_init().ok();
    let shared = limit();
    let req = TestRequest::post()
        .uri("/admin/spend/limit")
        .insert_header((ADMIN_TOKEN_HEADER, ADMIN_TOKEN))
        .set_json(json!({"limit": "150.00"}));
    let (status, body) =
        send_request(req, configure_spend(committed(2_000), AdminToken::new(ADMIN_TOKEN), shared.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared.get(), MinorUnits::from(15_000));
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["limit"], 15_000);
    assert_eq!(body["remaining"], 13_000);
}

#[actix_web::test]
async fn negative_spend_limit_is_rejected() {
    let _ = env_logger::try_init().ok();
    let shared = limit();
    let req = TestRequest::post()
        .uri("/admin/spend/limit")
        .insert_header((ADMIN_TOKEN_HEADER, ADMIN_TOKEN))
        .set_json(json!({"limit": "-1"}));
    let (status, body) =
        send_request(req, configure_spend(MockSpendDb::new(), AdminToken::new(ADMIN_TOKEN), shared.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
    assert_eq!(shared.get(), MinorUnits::from(10_000));
}

#[actix_web::test]
async fn list_failed_fulfillments() {
    let _ = env_logger::try_init().ok();
    let mut db = MockFulfillmentDb::new();
    db.expect_search()
        .withf(|status| *status == Some(FulfillmentStatus::Failed))
        .times(1)
        .returning(|_| Ok(vec![record("cs_test_9", FulfillmentStatus::Failed, None)]));
    let req = TestRequest::get().uri(&format!("/admin/fulfillments?status=failed&token={ADMIN_TOKEN}"));
    let (status, body) = send_request(req, configure_fulfillments(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body[0]["session_id"], "cs_test_9");
    assert_eq!(body[0]["status"], "Failed");
}

#[actix_web::test]
async fn unknown_fulfillment_status_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut db = MockFulfillmentDb::new();
    db.expect_search().never();
    let req = TestRequest::get().uri(&format!("/admin/fulfillments?status=shipped&token={ADMIN_TOKEN}"));
    let (status, body) = send_request(req, configure_fulfillments(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
}
