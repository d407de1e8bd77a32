//! Push notification types
//!
//! Types for push delivery headers, the call payload, and VAPID claims.

use serde::{Deserialize, Serialize};
use std::{fmt, io, str::FromStr};

// =============================================================================
// Push Message Types
// =============================================================================

#[derive(Debug, Clone)]
pub struct PushHeader {
    pub ttl: i64,
    pub urgency: Urgency,
}

/// Payload shown by the service worker as a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallMessage {
    pub title: String,
    pub body: String,
    pub actions: Vec<PushAction>,
    #[serde(
        rename = "audioUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushAction {
    pub action: String,
    pub title: String,
}

impl PushAction {
    pub fn minutes(value: u32) -> PushAction {
        PushAction {
            action: value.to_string(),
            title: format!("{} min", value),
        }
    }
}

impl CallMessage {
    pub fn new(title: String, body: String, audio_url: Option<String>) -> Self {
        CallMessage {
            title,
            body,
            actions: vec![
                PushAction::minutes(1),
                PushAction::minutes(5),
                PushAction::minutes(10),
            ],
            audio_url,
        }
    }
}

// =============================================================================
// Urgency Enum
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Urgency::VeryLow => write!(f, "very-low"),
            Urgency::Low => write!(f, "low"),
            Urgency::Normal => write!(f, "normal"),
            Urgency::High => write!(f, "high"),
        }
    }
}

impl FromStr for Urgency {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<Urgency, Self::Err> {
        match value {
            "very-low" => Ok(Urgency::VeryLow),
            "low" => Ok(Urgency::Low),
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            _ => Err(io::Error::other("Urgency not supported")),
        }
    }
}

// =============================================================================
// JWT Claims
// =============================================================================

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub aud: String,
    pub sub: String,
    pub exp: i64,
}
