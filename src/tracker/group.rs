//! Request group state machine.
//!
//! # States
//! - Idle: no request in flight, busy not announced
//! - Accumulating: requests in flight, busy not announced yet
//! - Busy: requests in flight, busy announced
//!
//! # State Transitions
//! ```text
//! Idle → Accumulating:  relevant request started (debounce armed)
//! Accumulating → Busy:  any debounce fired while non-empty
//! Accumulating → Idle:  drained before debounce fired (silent)
//! Busy → Idle:          drained by finish or timeout (idle emitted)
//! ```
//!
//! # Design Decisions
//! - Every admission arms a debounce; a firing checks the group as a whole,
//!   so any request open at fire time counts, even one admitted later
//! - Timeout timers belong to their request; removal cancels them
//! - A finish for an unknown identity is a late response, never an error

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde::Serialize;

use crate::config::GroupSettings;
use crate::observability::metrics;
use crate::routing::RouteFilter;
use crate::tracker::events::TrackerEvent;
use crate::tracker::request::{RequestKey, TrackedRequest};
use crate::tracker::timers::{Scheduler, TimerFired, TimerHandle, TimerKind};

/// Observable state of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupState {
    Idle,
    Accumulating,
    Busy,
}

/// Point-in-time view of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStatus {
    pub name: String,
    pub state: GroupState,
    pub in_flight: usize,
    pub delay_ms: u64,
    pub timeout_ms: Option<u64>,
}

/// A named bucket of in-flight requests sharing filters, debounce and timeout.
#[derive(Debug)]
pub struct RequestGroup {
    /// Position in tracker order, echoed back by this group's timers.
    id: usize,
    name: String,
    filter: RouteFilter,
    delay: Duration,
    timeout: Option<Duration>,

    /// Requests sharing an identity queue up; finishes resolve the oldest.
    in_flight: HashMap<RequestKey, VecDeque<TrackedRequest>>,
    in_flight_count: usize,

    pending_signal_sent: bool,
    /// Debounce timers survive drains; finished ones are pruned on admission.
    debounces: Vec<TimerHandle>,
    next_seq: u64,
}

impl RequestGroup {
    pub fn new(id: usize, settings: GroupSettings) -> Self {
        Self {
            id,
            name: settings.name,
            filter: settings.filter,
            delay: settings.delay,
            timeout: settings.timeout,
            in_flight: HashMap::new(),
            in_flight_count: 0,
            pending_signal_sent: false,
            debounces: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_relevant(&self, url: &str) -> bool {
        self.filter.is_relevant(url)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight_count
    }

    pub fn state(&self) -> GroupState {
        match (self.in_flight_count, self.pending_signal_sent) {
            (0, _) => GroupState::Idle,
            (_, false) => GroupState::Accumulating,
            (_, true) => GroupState::Busy,
        }
    }

    pub fn status(&self) -> GroupStatus {
        GroupStatus {
            name: self.name.clone(),
            state: self.state(),
            in_flight: self.in_flight_count,
            delay_ms: self.delay.as_millis() as u64,
            timeout_ms: self.timeout.map(|t| t.as_millis() as u64),
        }
    }

    /// Admit a request. The caller has already checked relevance.
    pub fn on_start(&mut self, key: RequestKey, scheduler: &Scheduler) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let timeout = self.timeout.map(|timeout| {
            scheduler.schedule(
                timeout,
                TimerFired {
                    group: self.id,
                    kind: TimerKind::Timeout {
                        seq,
                        key: key.clone(),
                    },
                },
            )
        });

        tracing::debug!(group = %self.name, url = %key.url, started_at = key.started_at, "Request admitted");

        self.in_flight
            .entry(key.clone())
            .or_default()
            .push_back(TrackedRequest::new(key, seq, timeout));
        self.in_flight_count += 1;

        self.debounces.retain(|timer| !timer.is_finished());
        self.debounces.push(scheduler.schedule(
            self.delay,
            TimerFired {
                group: self.id,
                kind: TimerKind::Debounce,
            },
        ));

        metrics::record_request_started(&self.name);
        metrics::record_in_flight(&self.name, self.in_flight_count);
    }

    /// Debounce expired. Emits busy if any request is open and busy was not
    /// announced yet.
    pub fn on_debounce(&mut self) -> Option<TrackerEvent> {
        if self.in_flight_count == 0 || self.pending_signal_sent {
            return None;
        }

        self.pending_signal_sent = true;
        tracing::info!(group = %self.name, in_flight = self.in_flight_count, "Group busy");
        metrics::record_busy(&self.name, true);
        Some(TrackerEvent::Busy {
            group: self.name.clone(),
        })
    }

    /// Resolve a finish against the oldest request with the same identity.
    pub fn on_finish(&mut self, key: &RequestKey, now_ms: u64) -> Vec<TrackerEvent> {
        let elapsed = Duration::from_millis(key.elapsed_ms(now_ms));

        let Some(request) = self.take(key, |_| true) else {
            tracing::warn!(
                group = %self.name,
                url = %key.url,
                elapsed_ms = elapsed.as_millis() as u64,
                "Late response for untracked request"
            );
            metrics::record_late_response(&self.name);
            return vec![TrackerEvent::LateResponse {
                group: self.name.clone(),
                url: key.url.clone(),
                timeout: self.timeout,
                elapsed,
            }];
        };

        tracing::debug!(group = %self.name, url = %request.url(), elapsed_ms = elapsed.as_millis() as u64, "Request finished");
        metrics::record_request_finished(&self.name, elapsed);
        drop(request);

        self.settle().into_iter().collect()
    }

    /// Per-request timeout expired. No-op if the request already left.
    pub fn on_timeout(&mut self, seq: u64, key: &RequestKey) -> Vec<TrackerEvent> {
        let Some(request) = self.take(key, |r| r.seq() == seq) else {
            return Vec::new();
        };
        let timeout = self.timeout.unwrap_or_default();

        tracing::warn!(
            group = %self.name,
            url = %request.url(),
            timeout_ms = timeout.as_millis() as u64,
            "Request timed out"
        );
        metrics::record_timeout(&self.name);

        let mut events = vec![TrackerEvent::RequestTimedOut {
            group: self.name.clone(),
            url: request.url().to_string(),
            timeout,
        }];
        events.extend(self.settle());
        events
    }

    /// Dispatch a timer firing addressed to this group.
    pub fn on_timer(&mut self, kind: &TimerKind) -> Vec<TrackerEvent> {
        match kind {
            TimerKind::Debounce => self.on_debounce().into_iter().collect(),
            TimerKind::Timeout { seq, key } => self.on_timeout(*seq, key),
        }
    }

    fn take(
        &mut self,
        key: &RequestKey,
        pred: impl Fn(&TrackedRequest) -> bool,
    ) -> Option<TrackedRequest> {
        let queue = self.in_flight.get_mut(key)?;
        let pos = queue.iter().position(pred)?;
        let request = queue.remove(pos)?;
        if queue.is_empty() {
            self.in_flight.remove(key);
        }
        self.in_flight_count -= 1;
        metrics::record_in_flight(&self.name, self.in_flight_count);
        Some(request)
    }

    /// Called after every removal: a drained group goes idle if busy was
    /// announced.
    fn settle(&mut self) -> Option<TrackerEvent> {
        if self.in_flight_count > 0 || !self.pending_signal_sent {
            return None;
        }
        self.pending_signal_sent = false;
        tracing::info!(group = %self.name, "Group idle");
        metrics::record_busy(&self.name, false);
        Some(TrackerEvent::Idle {
            group: self.name.clone(),
        })
    }
}
