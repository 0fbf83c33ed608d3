//! Line protocol for driving a tracker from a script or stdin.
//!
//! ```text
//! # comment
//! start 0 /api/users
//! wait 250
//! finish 0 /api/users
//! status
//! ```
//!
//! Timestamps are milliseconds on the tracker clock, so a script started
//! together with the tracker can use small literal values.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::tracker::{GroupStatus, RequestTracker, TrackerError};

/// Error for a malformed script line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{command}' is missing its {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{0}' is not a valid millisecond value")]
    InvalidNumber(String),

    #[error("unexpected trailing input '{0}'")]
    TrailingInput(String),
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayCommand {
    Start { started_at: u64, url: String },
    Finish { started_at: u64, url: String },
    Wait(Duration),
    Status,
}

impl ReplayCommand {
    /// Parse a line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Self>, ReplayError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        line.parse().map(Some)
    }

    /// Apply the command. `Status` returns a snapshot.
    pub async fn execute(
        self,
        tracker: &RequestTracker,
    ) -> Result<Option<Vec<GroupStatus>>, TrackerError> {
        match self {
            Self::Start { started_at, url } => tracker.on_start(started_at, url),
            Self::Finish { started_at, url } => tracker.on_finish(started_at, url),
            Self::Wait(duration) => tokio::time::sleep(duration).await,
            Self::Status => return tracker.snapshot().await.map(Some),
        }
        Ok(None)
    }
}

impl FromStr for ReplayCommand {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let command = parts.next().unwrap_or_default();

        let parsed = match command {
            "start" | "finish" => {
                let name = if command == "start" { "start" } else { "finish" };
                let started_at = parse_ms(parts.next(), name, "timestamp")?;
                let url = parts
                    .next()
                    .ok_or(ReplayError::MissingArgument {
                        command: name,
                        argument: "url",
                    })?
                    .to_string();
                if command == "start" {
                    Self::Start { started_at, url }
                } else {
                    Self::Finish { started_at, url }
                }
            }
            "wait" => Self::Wait(Duration::from_millis(parse_ms(
                parts.next(),
                "wait",
                "duration",
            )?)),
            "status" => Self::Status,
            other => return Err(ReplayError::UnknownCommand(other.to_string())),
        };

        let rest: Vec<&str> = parts.collect();
        if !rest.is_empty() {
            return Err(ReplayError::TrailingInput(rest.join(" ")));
        }
        Ok(parsed)
    }
}

fn parse_ms(
    value: Option<&str>,
    command: &'static str,
    argument: &'static str,
) -> Result<u64, ReplayError> {
    let value = value.ok_or(ReplayError::MissingArgument { command, argument })?;
    value
        .parse()
        .map_err(|_| ReplayError::InvalidNumber(value.to_string()))
}
