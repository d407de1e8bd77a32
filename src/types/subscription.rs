use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;

/// Fields of a stored subscription document needed to deliver a push.
#[derive(Debug, Deserialize)]
pub struct Subscription {
    pub endpoint: String,
    pub keys: Keys,
}

#[derive(Debug, Deserialize)]
pub struct Keys {
    pub p256dh: String,
    pub auth: String,
}

impl TryFrom<&Value> for Subscription {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let subscription = Subscription::deserialize(value)?;
        Ok(subscription)
    }
}
