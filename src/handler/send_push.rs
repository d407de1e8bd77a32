use std::fmt;

use futures::future::join_all;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{error, info};

use crate::{
    configuration::{AppState, State},
    error::Error,
    types::{CallMessage, PushHeader},
};

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryResult {
    Sent,
    Failed(String),
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeliveryResult::Sent => write!(f, "sent"),
            DeliveryResult::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Sends `message` to every stored subscription. Results follow the order of
/// the stored set; subscriptions the push service reports as gone are evicted.
/// A failing eviction write aborts the broadcast with the store error.
pub async fn broadcast(
    state: &AppState<State>,
    message: &CallMessage,
) -> Result<Vec<DeliveryResult>, Error> {
    let items = state.store.load().await?;
    info!("Sending push to {} subscribers...", items.len());

    if items.is_empty() {
        return Ok(vec![]);
    }

    let payload = serde_json::to_vec(message)?;
    let push_header = PushHeader {
        ttl: state.config.push_ttl,
        urgency: state.config.push_urgency.to_owned(),
    };

    let tasks = items
        .iter()
        .map(|subscription| send(state, subscription, &push_header, &payload));

    join_all(tasks).await.into_iter().collect()
}

async fn send(
    state: &AppState<State>,
    subscription: &Value,
    push_header: &PushHeader,
    payload: &[u8],
) -> Result<DeliveryResult, Error> {
    let status = {
        let _permit = match state.push_permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return Ok(DeliveryResult::Failed(Error::from(e).to_string()))
            },
        };
        state.push.deliver(subscription, push_header, payload).await
    };

    let status = match status {
        Ok(status) => status,
        Err(e) => {
            error!("Push failed: {}", e);
            return Ok(DeliveryResult::Failed(e.to_string()));
        },
    };

    if (200..300).contains(&status) {
        return Ok(DeliveryResult::Sent);
    }

    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
        .to_owned();
    let failure = Error::PushFailed { status, reason };
    error!("{}", failure);

    if state.config.status_code_to_delete.contains(&status)
        && state.store.remove(subscription).await?
    {
        info!("Removed expired subscription");
    }

    Ok(DeliveryResult::Failed(failure.to_string()))
}
