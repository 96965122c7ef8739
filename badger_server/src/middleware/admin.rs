//! Shared-secret middleware for the `/admin` routes.
//!
//! The caller presents the token in a `bm_admin_token` header, or a `token` query parameter. The expected value is
//! read from the [`AdminToken`] registered as app data. If no token has been configured, every request is refused.
//!
//! Refusals are rendered as `401 {"error": "unauthorized", ...}` responses rather than returned as errors, so that
//! the wrapped handler never runs.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    ResponseError,
};
use badger_common::Secret;
use futures::future::LocalBoxFuture;
use log::*;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::errors::ServerError;

pub const ADMIN_TOKEN_HEADER: &str = "bm_admin_token";

/// The configured admin token, registered with `App::app_data`.
#[derive(Debug, Clone, Default)]
pub struct AdminToken(pub Secret<String>);

impl AdminToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(Secret::new(token.into()))
    }

    /// Compares in constant time (for a given length) so that response timing does not leak the token.
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = self.0.reveal().as_bytes();
        let candidate = candidate.as_bytes();
        if !self.0.is_set() || expected.len() != candidate.len() {
            return false;
        }
        expected.ct_eq(candidate).into()
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn presented_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req.headers().get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok()).map(String::from);
    from_header.or_else(|| {
        web::Query::<TokenQuery>::from_query(req.query_string()).ok().and_then(|q| q.into_inner().token)
    })
}

#[derive(Default)]
pub struct AdminTokenMiddlewareFactory;

impl AdminTokenMiddlewareFactory {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminTokenMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B>>;
    type Transform = AdminTokenMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminTokenMiddlewareService { service: Rc::new(service) }))
    }
}

pub struct AdminTokenMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminTokenMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let expected = req.app_data::<web::Data<AdminToken>>().map(|t| t.get_ref().clone()).unwrap_or_default();
            let refusal = match presented_token(&req) {
                _ if !expected.0.is_set() => Some("Admin access is disabled on this server"),
                None => Some("No admin token was provided"),
                Some(token) if !expected.matches(&token) => Some("Invalid admin token"),
                Some(_) => None,
            };
            match refusal {
                None => {
                    trace!("🔐️ Admin token accepted for {}", req.path());
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                },
                Some(reason) => {
                    warn!("🔐️ Refused admin request to {}. {reason}", req.path());
                    let response = ServerError::Unauthorized(reason.to_string()).error_response();
                    Ok(req.into_response(response).map_into_right_body())
                },
            }
        })
    }
}
