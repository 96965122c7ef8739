use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use badger_engine::{events::EventProducers, CheckoutApi, FulfillmentApi, SpendApi, SpendLimit, SqliteDatabase};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{
        notifications::create_notification_event_handlers,
        printful::PrintfulSupplier,
        stripe::{StripeGateway, WebhookVerifier},
    },
    middleware::AdminToken,
    routes::{
        health,
        CheckoutRoute,
        FulfillmentsRoute,
        ResetSpendRoute,
        SetSpendLimitRoute,
        SpendStatusRoute,
        StripeWebhookRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not migrate the database. {e}")))?;
    info!("🗃️ Database at {} is ready", config.database_url);
    let handlers = create_notification_event_handlers(config.mail_relay.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let stripe = StripeGateway::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let printful =
        PrintfulSupplier::new(config.printful.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let verifier = WebhookVerifier::from_config(&config.stripe);
    let admin_token = AdminToken(config.admin_token.clone());
    let limit = SpendLimit::new(config.daily_spend_limit);
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), stripe.clone(), limit.clone(), config.checkout.clone());
        let fulfillment_api = FulfillmentApi::new(db.clone(), stripe.clone(), printful.clone(), producers.clone())
            .with_transfer_destination(config.stripe.transfer_destination.clone());
        let spend_api = SpendApi::new(db.clone(), limit.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bm::access_log"))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(fulfillment_api))
            .app_data(web::Data::new(spend_api))
            .app_data(web::Data::new(verifier.clone()))
            .app_data(web::Data::new(admin_token.clone()))
            .service(health)
            .service(CheckoutRoute::<SqliteDatabase, StripeGateway>::new())
            .service(StripeWebhookRoute::<SqliteDatabase, StripeGateway, PrintfulSupplier>::new())
            .service(SpendStatusRoute::<SqliteDatabase>::new())
            .service(ResetSpendRoute::<SqliteDatabase>::new())
            .service(SetSpendLimitRoute::<SqliteDatabase>::new())
            .service(FulfillmentsRoute::<SqliteDatabase, StripeGateway, PrintfulSupplier>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies get the same error envelope as every other validation failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::ValidationError(format!("Could not read request body. {err}")).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ServerError::ValidationError(format!("Invalid query string. {err}")).into())
}
