//! Web Push delivery
//!
//! Signs every request with a VAPID token (RFC 8292) and encrypts the payload
//! with `aes128gcm` (RFC 8291) before posting it to the subscription endpoint.

use std::{future::Future, pin::Pin};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use url::Url;

use crate::{
    configuration::Config,
    error::Error,
    provider::HTTP,
    types::{Claims, PushHeader, Subscription},
};

/// VAPID tokens must not be valid for longer than 24 hours.
const VAPID_EXPIRATION: i64 = 12 * 60 * 60;

pub type DeliveryFuture<'a> =
    Pin<Box<dyn Future<Output = Result<u16, Error>> + Send + 'a>>;

/// Delivers an already serialized message to one subscription and resolves to
/// the HTTP status returned by the push service.
pub trait PushDelivery: Send + Sync {
    fn deliver<'a>(
        &'a self,
        subscription: &'a Value,
        push_header: &'a PushHeader,
        payload: &'a [u8],
    ) -> DeliveryFuture<'a>;
}

pub struct WebPush {
    http: HTTP,
    key: EncodingKey,
    public_key: String,
    mail_to: String,
}

impl WebPush {
    pub fn new(config: &Config, http: HTTP) -> Result<WebPush, Error> {
        let key = EncodingKey::from_ec_pem(&config.vapid_private_key)?;

        Ok(WebPush {
            http,
            key,
            public_key: config.vapid_public_key.to_owned(),
            mail_to: config.mail_to.to_owned(),
        })
    }

    pub async fn send_push(
        &self,
        subscription: &Value,
        push_header: &PushHeader,
        payload: &[u8],
    ) -> Result<u16, Error> {
        let subscription = Subscription::try_from(subscription)?;
        let url = Url::parse(&subscription.endpoint)?;
        let token = self.vapid_token(&url)?;

        let p256dh = decode_key(&subscription.keys.p256dh)?;
        let auth = decode_key(&subscription.keys.auth)?;
        let data = ece::encrypt(&p256dh, &auth, payload)?;

        let authorization = format!("vapid t={}, k={}", token, self.public_key);

        self.http
            .post_push(&subscription.endpoint, authorization, push_header, data)
            .await
    }

    pub fn vapid_token(&self, url: &Url) -> Result<String, Error> {
        let host = url.host_str().ok_or_else(|| Error::InvalidOption {
            option: String::from("host"),
        })?;
        let aud = match url.port() {
            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
            None => format!("{}://{}", url.scheme(), host),
        };
        let sub = format!("mailto:{}", &self.mail_to);
        let exp = Utc::now().timestamp() + VAPID_EXPIRATION;

        let claims = Claims { aud, sub, exp };
        let token = encode(&Header::new(Algorithm::ES256), &claims, &self.key)?;

        Ok(token)
    }
}

impl PushDelivery for WebPush {
    fn deliver<'a>(
        &'a self,
        subscription: &'a Value,
        push_header: &'a PushHeader,
        payload: &'a [u8],
    ) -> DeliveryFuture<'a> {
        Box::pin(self.send_push(subscription, push_header, payload))
    }
}

/// Browsers hand out unpadded base64url keys, some clients pad them.
fn decode_key(value: &str) -> Result<Vec<u8>, Error> {
    let key = BASE64_URL.decode(value.trim_end_matches('='))?;
    Ok(key)
}
