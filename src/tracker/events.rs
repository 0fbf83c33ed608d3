//! Outbound signals.

use std::time::Duration;

use serde::{Serialize, Serializer};

/// A signal emitted by the tracker to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// A debounce delay elapsed while the group still had requests open.
    Busy { group: String },

    /// A group that announced `Busy` has no requests left.
    Idle { group: String },

    /// A request exceeded the group timeout and was evicted.
    RequestTimedOut {
        group: String,
        url: String,
        #[serde(rename = "timeout_ms", serialize_with = "as_millis")]
        timeout: Duration,
    },

    /// A finish arrived for a request the group no longer tracks.
    LateResponse {
        group: String,
        url: String,
        #[serde(rename = "timeout_ms", serialize_with = "opt_as_millis")]
        timeout: Option<Duration>,
        #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
        elapsed: Duration,
    },
}

impl TrackerEvent {
    /// Name of the group that emitted this signal.
    pub fn group(&self) -> &str {
        match self {
            Self::Busy { group }
            | Self::Idle { group }
            | Self::RequestTimedOut { group, .. }
            | Self::LateResponse { group, .. } => group,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Busy { .. } => "busy",
            Self::Idle { .. } => "idle",
            Self::RequestTimedOut { .. } => "request_timed_out",
            Self::LateResponse { .. } => "late_response",
        }
    }
}

fn as_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

fn opt_as_millis<S: Serializer>(
    value: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_shape() {
        let event = TrackerEvent::LateResponse {
            group: "api".into(),
            url: "/api/slow".into(),
            timeout: Some(Duration::from_millis(500)),
            elapsed: Duration::from_millis(730),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "late_response",
                "group": "api",
                "url": "/api/slow",
                "timeout_ms": 500,
                "elapsed_ms": 730
            })
        );

        let event = TrackerEvent::LateResponse {
            group: "default".into(),
            url: "/a".into(),
            timeout: None,
            elapsed: Duration::ZERO,
        };
        assert_eq!(serde_json::to_value(&event).unwrap()["timeout_ms"], json!(null));

        let busy = TrackerEvent::Busy { group: "default".into() };
        assert_eq!(
            serde_json::to_value(&busy).unwrap(),
            json!({ "event": "busy", "group": "default" })
        );
        assert_eq!(busy.group(), "default");
        assert_eq!(busy.kind(), "busy");
    }
}
