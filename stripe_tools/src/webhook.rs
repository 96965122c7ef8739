//! Webhook signature verification and event typing.
//!
//! Stripe signs every delivery with a `Stripe-Signature` header of the form `t=<unix time>,v1=<hex>[,v1=<hex>...]`.
//! Each `v1` value is the HMAC-SHA256 of `"{t}.{raw body}"`, keyed with the endpoint's signing secret. More than one
//! `v1` entry is present while a secret is being rolled.
//!
//! The timestamp must be within the configured tolerance of the local clock in either direction, which bounds the
//! window in which a captured delivery can be replayed.
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;
use thiserror::Error;

use crate::{CheckoutSession, StripeEvent};

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_SESSION_EXPIRED: &str = "checkout.session.expired";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Invalid webhook signature. {0}")]
    InvalidSignature(String),
    #[error("Invalid webhook payload. {0}")]
    InvalidPayload(String),
}

/// The closed set of events the back end reacts to. Anything else is acknowledged and ignored.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    CheckoutSessionCompleted(CheckoutSession),
    CheckoutSessionExpired(CheckoutSession),
    Other(String),
}

impl TryFrom<StripeEvent> for WebhookEvent {
    type Error = WebhookError;

    fn try_from(event: StripeEvent) -> Result<Self, Self::Error> {
        let session = |event: StripeEvent| {
            serde_json::from_value::<CheckoutSession>(event.data.object)
                .map_err(|e| WebhookError::InvalidPayload(format!("Event {} is not a checkout session. {e}", event.id)))
        };
        match event.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => Ok(Self::CheckoutSessionCompleted(session(event)?)),
            CHECKOUT_SESSION_EXPIRED => Ok(Self::CheckoutSessionExpired(session(event)?)),
            _ => Ok(Self::Other(event.event_type)),
        }
    }
}

struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_signature_header(header: &str) -> Result<SignatureHeader<'_>, WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or_else(|| WebhookError::InvalidSignature("Malformed signature header".to_string()))?;
        match key {
            "t" => {
                let t = value
                    .parse::<i64>()
                    .map_err(|e| WebhookError::InvalidSignature(format!("Invalid timestamp in header. {e}")))?;
                timestamp = Some(t);
            },
            "v1" => signatures.push(value),
            _ => {},
        }
    }
    let timestamp = timestamp.ok_or_else(|| WebhookError::InvalidSignature("No timestamp in header".to_string()))?;
    if signatures.is_empty() {
        return Err(WebhookError::InvalidSignature("No v1 signature in header".to_string()));
    }
    Ok(SignatureHeader { timestamp, signatures })
}

fn signed_payload_mac(payload: &[u8], timestamp: i64, secret: &str) -> Result<HmacSha256, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| WebhookError::InvalidSignature(format!("Invalid signing secret. {e}")))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Calculates the hex-encoded `v1` signature for a payload.
pub fn compute_signature(payload: &[u8], timestamp: i64, secret: &str) -> Result<String, WebhookError> {
    let mac = signed_payload_mac(payload, timestamp, secret)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Builds a complete `Stripe-Signature` header value for a payload.
pub fn signature_header(payload: &[u8], timestamp: i64, secret: &str) -> Result<String, WebhookError> {
    let sig = compute_signature(payload, timestamp, secret)?;
    Ok(format!("t={timestamp},v1={sig}"))
}

/// Checks the signature header against the raw payload, with `now` as the current unix time.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), WebhookError> {
    if secret.is_empty() {
        return Err(WebhookError::InvalidSignature("No signing secret has been configured".to_string()));
    }
    let header = parse_signature_header(header)?;
    let age = now
        .checked_sub(header.timestamp)
        .ok_or_else(|| WebhookError::InvalidSignature("Timestamp is out of range".to_string()))?;
    if age.unsigned_abs() > tolerance_secs.unsigned_abs() {
        return Err(WebhookError::InvalidSignature(format!(
            "Timestamp is outside the tolerance window ({age}s old, {tolerance_secs}s allowed)"
        )));
    }
    let matched = header.signatures.iter().filter_map(|s| hex::decode(s).ok()).any(|expected| {
        signed_payload_mac(payload, header.timestamp, secret).map(|mac| mac.verify_slice(&expected).is_ok()).unwrap_or(false)
    });
    if matched {
        trace!("🪝️ Webhook signature verified");
        Ok(())
    } else {
        Err(WebhookError::InvalidSignature("No signature matches the payload".to_string()))
    }
}

/// Verifies the signature and deserializes the payload into a [`StripeEvent`].
///
/// The payload is only parsed once the signature has been verified, so an unauthenticated body is never trusted.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
) -> Result<StripeEvent, WebhookError> {
    verify_signature(payload, header, secret, tolerance_secs, chrono::Utc::now().timestamp())?;
    serde_json::from_slice::<StripeEvent>(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}
