mod admin;

pub use admin::{AdminToken, AdminTokenMiddlewareFactory, AdminTokenMiddlewareService, ADMIN_TOKEN_HEADER};
