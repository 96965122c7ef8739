//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Every handler awaits its I/O (database, Stripe, Printful), so a slow provider never blocks an actix worker.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use badger_common::MinorUnits;
use badger_engine::{
    db_types::FulfillmentStatus,
    order_objects::{FulfillmentOutcome, OrderRequest},
    traits::{FulfillmentLedger, FulfillmentSupplier, PaymentProcessor, SpendLedger},
    CheckoutApi,
    FulfillmentApi,
    SpendApi,
};
use log::*;
use stripe_tools::{webhook::SIGNATURE_HEADER, WebhookEvent};

use crate::{
    data_objects::{FulfillmentSearchParams, JsonResponse, SpendLimitParams},
    errors::ServerError,
    integrations::stripe::{paid_session_from_checkout, WebhookVerifier},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires admin)  => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AdminTokenMiddlewareFactory::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl SpendLedger, PaymentProcessor);
/// Route handler for the checkout endpoint
///
/// Takes an [`OrderRequest`] and returns `{checkout_url, session_id, amount}`. The customer should be redirected to
/// `checkout_url` to pay. The order total is reserved against today's spend limit before the session is created.
///
/// * 400 if the order is invalid
/// * 429 if the order would take today's committed spend over the limit
/// * 502 if Stripe could not create the session (the reservation is released again)
pub async fn checkout<B, P>(
    body: web::Json<OrderRequest>,
    api: web::Data<CheckoutApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: SpendLedger,
    P: PaymentProcessor,
{
    let order = body.into_inner();
    trace!("🛒️ Received checkout request for {} x {}", order.quantity, order.variant_id);
    let result = api.create_checkout(order).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(stripe_webhook => Post "/webhook" impl FulfillmentLedger, PaymentProcessor, FulfillmentSupplier);
/// Route handler for Stripe webhook deliveries
///
/// The raw body is authenticated against the `Stripe-Signature` header before it is parsed. Only
/// `checkout.session.completed` triggers fulfillment; every other event type is acknowledged and ignored.
///
/// A fulfillment failure returns a 500. Stripe will redeliver the event, but the redelivery is answered from the
/// fulfillment ledger and the supplier is not called again.
pub async fn stripe_webhook<B, P, S>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<FulfillmentApi<B, P, S>>,
    verifier: web::Data<WebhookVerifier>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentLedger,
    P: PaymentProcessor,
    S: FulfillmentSupplier,
{
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::InvalidSignature(format!("No {SIGNATURE_HEADER} header was provided")))?;
    let event = verifier.verify(body.as_ref(), signature).map_err(|e| {
        warn!("🪝️ Rejected webhook delivery. {e}");
        ServerError::from(e)
    })?;
    match event {
        WebhookEvent::CheckoutSessionCompleted(session) => {
            let unpaid = session.payment_status.as_deref().is_some_and(|s| s != "paid" && s != "no_payment_required");
            if unpaid {
                warn!(
                    "🪝️ Session {} completed with payment status {:?}. It will not be fulfilled.",
                    session.id, session.payment_status
                );
                return Ok(HttpResponse::Ok().json(JsonResponse::success("Session is not paid. Ignored.")));
            }
            let outcome = api.handle_completed_session(paid_session_from_checkout(session)).await?;
            let message = match &outcome {
                FulfillmentOutcome::Placed(r) => {
                    format!("Order placed. Supplier order {}", r.supplier_order_id.as_deref().unwrap_or_default())
                },
                FulfillmentOutcome::AlreadyRecorded(r) => format!("Session already recorded as {}", r.status),
            };
            Ok(HttpResponse::Ok().json(JsonResponse::success(message)))
        },
        WebhookEvent::CheckoutSessionExpired(session) => {
            info!("🪝️ Checkout session {} expired without payment", session.id);
            Ok(HttpResponse::Ok().json(JsonResponse::success("Expired session acknowledged")))
        },
        WebhookEvent::Other(event_type) => {
            debug!("🪝️ Ignoring {event_type} event");
            Ok(HttpResponse::Ok().json(JsonResponse::success(format!("{event_type} ignored"))))
        },
    }
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(spend_status => Get "/admin/spend" impl SpendLedger where requires admin);
/// Today's committed spend, the current limit, and what remains.
pub async fn spend_status<B: SpendLedger>(api: web::Data<SpendApi<B>>) -> Result<HttpResponse, ServerError> {
    let status = api.status().await?;
    Ok(HttpResponse::Ok().json(status))
}

route!(reset_spend => Post "/admin/spend/reset" impl SpendLedger where requires admin);
/// Sets today's committed spend back to zero. Sessions that are still open are forgotten by the budget.
pub async fn reset_spend<B: SpendLedger>(api: web::Data<SpendApi<B>>) -> Result<HttpResponse, ServerError> {
    let status = api.reset().await?;
    Ok(HttpResponse::Ok().json(status))
}

route!(set_spend_limit => Post "/admin/spend/limit" impl SpendLedger where requires admin);
/// Changes the daily limit. The body is `{"limit": <amount in major units>}`. The new limit applies to every
/// reservation from now on, including the rest of today.
pub async fn set_spend_limit<B: SpendLedger>(
    body: web::Json<SpendLimitParams>,
    api: web::Data<SpendApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let limit = MinorUnits::from_major(body.limit).map_err(|e| ServerError::ValidationError(e.to_string()))?;
    api.set_limit(limit)?;
    let status = api.status().await?;
    Ok(HttpResponse::Ok().json(status))
}

route!(fulfillments => Get "/admin/fulfillments" impl FulfillmentLedger, PaymentProcessor, FulfillmentSupplier where requires admin);
/// Lists fulfillment records, newest first. Use `?status=Failed` to find paid sessions that need attention.
pub async fn fulfillments<B, P, S>(
    query: web::Query<FulfillmentSearchParams>,
    api: web::Data<FulfillmentApi<B, P, S>>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentLedger,
    P: PaymentProcessor,
    S: FulfillmentSupplier,
{
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<FulfillmentStatus>().map_err(|e| ServerError::ValidationError(e.to_string())))
        .transpose()?;
    let records = api.search_fulfillments(status).await?;
    Ok(HttpResponse::Ok().json(records))
}
