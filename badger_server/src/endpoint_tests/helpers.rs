use actix_web::{http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use badger_engine::db_types::{FulfillmentRecord, FulfillmentStatus, SessionId};
use chrono::Utc;
use log::debug;

pub const ADMIN_TOKEN: &str = "badger-admin-token";
pub const WEBHOOK_SECRET: &str = "whsec_endpoint_tests";

/// Sends a single request to an app built by `configure`, returning the status and body.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

pub fn record(session_id: &str, status: FulfillmentStatus, supplier_order_id: Option<&str>) -> FulfillmentRecord {
    FulfillmentRecord {
        session_id: SessionId::from(session_id),
        status,
        supplier_order_id: supplier_order_id.map(String::from),
        detail: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn error_code(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or_default()
}
