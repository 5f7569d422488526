//! Self-contained report link tokens.
//!
//! A token is the URL-safe, unpadded base64 of `{"payload": ..., "createdAt": <ms>}`.
//! It carries everything needed to regenerate a report and expires after a day.

use crate::natal::NatalRequest;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const ENVELOPE_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEnvelope {
    pub payload: NatalRequest,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl ReportEnvelope {
    /// `created_at` is truncated to whole milliseconds so a decoded token
    /// compares equal to the envelope that produced it.
    pub fn new(payload: NatalRequest, created_at: DateTime<Utc>) -> Self {
        let millis = created_at.timestamp_millis();
        let created_at = Utc
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or(created_at);
        Self {
            payload,
            created_at,
        }
    }

    pub fn encode(&self) -> String {
        // Serializing plain data with string keys cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// `None` for anything that is not a well-formed envelope with a valid
    /// payload. Never panics on hostile input.
    pub fn decode(token: &str) -> Option<Self> {
        let cleaned: String = token
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .trim_end_matches('=')
            .to_string();
        if cleaned.is_empty() {
            return None;
        }
        let bytes = match URL_SAFE_NO_PAD.decode(cleaned.as_bytes()) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("report token is not base64: {}", e);
                return None;
            }
        };
        let envelope: ReportEnvelope = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::debug!("report token is not an envelope: {}", e);
                return None;
            }
        };
        if let Err(issues) = envelope.payload.validate() {
            log::debug!("report token payload invalid: {} issue(s)", issues.len());
            return None;
        }
        Some(envelope)
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    /// Older than the TTL. Envelopes stamped in the future are not expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.age(now) > Duration::hours(ENVELOPE_TTL_HOURS)
    }
}
