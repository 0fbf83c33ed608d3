//! Request tracker: the public handle and the actor behind it.
//!
//! # Responsibilities
//! - Accept start/finish notifications from the transport without blocking
//! - Fan each notification out to every relevant group
//! - Deliver timer firings to the owning group
//! - Publish resulting signals to subscribers
//!
//! # Design Decisions
//! - One actor task owns all group state; commands and timers are
//!   processed strictly one at a time
//! - Signals go out on a broadcast channel, so subscriber code never runs
//!   inside the actor and cannot re-enter it
//! - Stopping the actor drops every group, which aborts pending timers

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::config::{resolve_groups, ConfigError, TrackerConfig};
use crate::lifecycle::Shutdown;
use crate::tracker::clock::Clock;
use crate::tracker::events::TrackerEvent;
use crate::tracker::group::{GroupStatus, RequestGroup};
use crate::tracker::request::RequestKey;
use crate::tracker::timers::{Scheduler, TimerFired};

/// Errors returned by tracker queries.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("request tracker is no longer running")]
    Stopped,
}

enum Command {
    Start(RequestKey),
    Finish { key: RequestKey, now_ms: u64 },
    Snapshot(oneshot::Sender<Vec<GroupStatus>>),
}

/// Cheap, cloneable handle to a running tracker.
#[derive(Clone)]
pub struct RequestTracker {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<TrackerEvent>,
    clock: Clock,
    shutdown: Arc<Shutdown>,
}

impl RequestTracker {
    /// Build the groups from `config` and spawn the actor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &TrackerConfig) -> Result<Self, ConfigError> {
        let settings = resolve_groups(config)?;
        let groups: Vec<RequestGroup> = settings
            .into_iter()
            .enumerate()
            .map(|(id, s)| RequestGroup::new(id, s))
            .collect();

        let (commands, command_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(config.event_capacity);
        let clock = Clock::new();
        let shutdown = Arc::new(Shutdown::new());

        let names: Vec<&str> = groups.iter().map(RequestGroup::name).collect();
        tracing::info!(groups = ?names, "Request tracker starting");

        let actor = TrackerActor {
            groups,
            scheduler: Scheduler::new(timer_tx),
            events: events.clone(),
        };
        tokio::spawn(actor.run(command_rx, timer_rx, shutdown.subscribe()));

        Ok(Self {
            commands,
            events,
            clock,
            shutdown,
        })
    }

    /// Current time on the tracker clock, in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// A request was dispatched.
    pub fn on_start(&self, started_at: u64, url: impl Into<String>) {
        self.send(Command::Start(RequestKey::new(started_at, url)));
    }

    /// A request completed; `started_at` and `url` must match `on_start`.
    pub fn on_finish(&self, started_at: u64, url: impl Into<String>) {
        let now_ms = self.now_ms();
        self.send(Command::Finish {
            key: RequestKey::new(started_at, url),
            now_ms,
        });
    }

    /// Stamp and start a request; the guard finishes it exactly once.
    pub fn track(&self, url: impl Into<String>) -> RequestGuard {
        let key = RequestKey::new(self.now_ms(), url);
        self.on_start(key.started_at, key.url.clone());
        RequestGuard {
            tracker: self.clone(),
            key: Some(key),
        }
    }

    /// Receive every signal emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    /// Current status of every group, in group order.
    pub async fn snapshot(&self) -> Result<Vec<GroupStatus>, TrackerError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(tx))
            .map_err(|_| TrackerError::Stopped)?;
        rx.await.map_err(|_| TrackerError::Stopped)
    }

    /// Stop the actor. Pending timers are cancelled; later calls are ignored.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("Request tracker stopped, dropping notification");
        }
    }
}

/// Finishes its request when dropped, unless finished explicitly first.
pub struct RequestGuard {
    tracker: RequestTracker,
    key: Option<RequestKey>,
}

impl RequestGuard {
    pub fn key(&self) -> Option<&RequestKey> {
        self.key.as_ref()
    }

    pub fn finish(mut self) {
        self.complete();
    }

    fn complete(&mut self) {
        if let Some(key) = self.key.take() {
            self.tracker.on_finish(key.started_at, key.url);
        }
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.complete();
    }
}

struct TrackerActor {
    groups: Vec<RequestGroup>,
    scheduler: Scheduler,
    events: broadcast::Sender<TrackerEvent>,
}

impl TrackerActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut timers: mpsc::UnboundedReceiver<TimerFired>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            // Due timers go first so a timeout is never overtaken by a finish
            // queued after it expired.
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Request tracker received shutdown signal");
                    break;
                }
                Some(fired) = timers.recv() => self.handle_timer(fired),
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
            }
        }

        let in_flight: usize = self.groups.iter().map(|g| g.in_flight()).sum();
        tracing::info!(in_flight, "Request tracker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start(key) => {
                for group in self.groups.iter_mut().filter(|g| g.is_relevant(&key.url)) {
                    group.on_start(key.clone(), &self.scheduler);
                }
            }
            Command::Finish { key, now_ms } => {
                let mut emitted = Vec::new();
                for group in self.groups.iter_mut().filter(|g| g.is_relevant(&key.url)) {
                    emitted.extend(group.on_finish(&key, now_ms));
                }
                self.publish(emitted);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.groups.iter().map(RequestGroup::status).collect());
            }
        }
    }

    fn handle_timer(&mut self, fired: TimerFired) {
        let Some(group) = self.groups.get_mut(fired.group) else {
            return;
        };
        let emitted = group.on_timer(&fired.kind);
        self.publish(emitted);
    }

    fn publish(&self, emitted: Vec<TrackerEvent>) {
        for event in emitted {
            // No subscribers is fine; signals are fire-and-forget.
            let _ = self.events.send(event);
        }
    }
}
