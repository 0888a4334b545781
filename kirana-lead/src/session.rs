use std::sync::Arc;
use std::time::Duration;

use kirana_core::DispatchGateway;
use kirana_shared::{Lead, LeadStatus, MaskedPhone, OrderStatus};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::CountdownClock;

/// Session lifecycle. `Closed` is terminal per lead; watching for the next
/// lead takes a fresh session.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Idle,
    Loading,
    Live,
    Resolving,
    Closed,
}

/// Final fate of one session.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionOutcome {
    /// Order marked done and lead acknowledged.
    Accepted,
    /// Backend confirmed the decline (manual or automatic).
    Declined,
    /// A resolution attempt was made but failed or went unconfirmed.
    Error,
    /// No pending lead to show.
    Empty,
    /// Torn down before any resolution attempt.
    Cancelled,
}

/// User intents accepted by a running session.
#[derive(Debug)]
enum SessionCommand {
    Accept,
    Decline,
    Close,
}

/// How a decline came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclineTrigger {
    Manual,
    Expiry,
}

/// Render state published after every transition and countdown tick.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub lead: Option<Lead>,
    pub remaining_seconds: u32,
}

impl SessionSnapshot {
    fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            lead: None,
            remaining_seconds: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Full countdown window granted to a freshly loaded lead.
    pub offer_window_seconds: u32,
    /// Wall-clock length of one countdown tick.
    pub tick: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            offer_window_seconds: 60,
            tick: Duration::from_secs(1),
        }
    }
}

/// Owns the lifecycle of at most one pending lead: fetch, countdown,
/// resolve, close.
///
/// The session runs as a single task. User intents, countdown ticks and
/// remote-call completions are all serialized through that task's select
/// loop, so transitions are totally ordered and exactly one of
/// accept / decline / auto-decline can ever reach the backend for a lead.
pub struct OfferSession {
    id: Uuid,
    gateway: Arc<dyn DispatchGateway>,
    vendor: String,
    config: SessionConfig,
}

impl OfferSession {
    pub fn new(
        gateway: Arc<dyn DispatchGateway>,
        vendor: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            gateway,
            vendor: vendor.into(),
            config,
        }
    }

    /// Start the session task and hand back its control handle.
    pub fn spawn(self) -> SessionHandle {
        let (commands, command_rx) = mpsc::channel(8);
        let (snapshot_tx, snapshots) = watch::channel(SessionSnapshot::idle());
        let task = tokio::spawn(self.run(command_rx, snapshot_tx));
        SessionHandle {
            commands,
            snapshots,
            task,
        }
    }

    async fn run(
        self,
        mut commands: mpsc::Receiver<SessionCommand>,
        snapshots: watch::Sender<SessionSnapshot>,
    ) -> SessionOutcome {
        info!(
            "session {} watching for {}",
            self.id,
            MaskedPhone(&self.vendor)
        );
        publish(&snapshots, SessionState::Loading, None, 0);

        // Race the fetch against teardown so an in-flight call is dropped,
        // not applied, when the owner goes away. Other intents cannot act
        // on a lead that is not live yet.
        let fetched = {
            let fetch = self
                .gateway
                .fetch_pending_lead(&self.vendor, LeadStatus::Pending);
            tokio::pin!(fetch);
            loop {
                tokio::select! {
                    fetched = &mut fetch => break fetched,
                    command = commands.recv() => match command {
                        Some(SessionCommand::Close) | None => {
                            publish(&snapshots, SessionState::Closed, None, 0);
                            return SessionOutcome::Cancelled;
                        }
                        Some(_) => {}
                    }
                }
            }
        };

        let lead = match fetched {
            Ok(Some(lead)) => lead,
            Ok(None) => {
                info!("no pending lead for {}", MaskedPhone(&self.vendor));
                publish(&snapshots, SessionState::Closed, None, 0);
                return SessionOutcome::Empty;
            }
            Err(e) => {
                warn!("lead fetch failed: {}", e);
                publish(&snapshots, SessionState::Closed, None, 0);
                return SessionOutcome::Empty;
            }
        };

        info!("lead {} loaded, countdown started", lead.id);
        let mut clock = CountdownClock::idle();
        clock.reset(self.config.offer_window_seconds);
        publish(
            &snapshots,
            SessionState::Live,
            Some(&lead),
            clock.remaining_seconds(),
        );

        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.config.tick,
            self.config.tick,
        );

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SessionCommand::Accept) => {
                        // Stop the clock before any remote call goes out so
                        // no second resolution path can fire for this lead.
                        clock.stop();
                        publish(&snapshots, SessionState::Resolving, Some(&lead), clock.remaining_seconds());
                        let outcome = self.resolve_accept(&lead).await;
                        publish(&snapshots, SessionState::Closed, Some(&lead), clock.remaining_seconds());
                        return outcome;
                    }
                    Some(SessionCommand::Decline) => {
                        clock.stop();
                        publish(&snapshots, SessionState::Resolving, Some(&lead), clock.remaining_seconds());
                        let outcome = self.resolve_decline(&lead, DeclineTrigger::Manual).await;
                        publish(&snapshots, SessionState::Closed, Some(&lead), clock.remaining_seconds());
                        return outcome;
                    }
                    Some(SessionCommand::Close) | None => {
                        clock.stop();
                        info!("session {} closed by its owner", self.id);
                        publish(&snapshots, SessionState::Closed, None, clock.remaining_seconds());
                        return SessionOutcome::Cancelled;
                    }
                },
                _ = ticker.tick() => {
                    if clock.tick() {
                        info!("lead {} window expired, auto-declining", lead.id);
                        publish(&snapshots, SessionState::Resolving, Some(&lead), 0);
                        let outcome = self.resolve_decline(&lead, DeclineTrigger::Expiry).await;
                        publish(&snapshots, SessionState::Closed, Some(&lead), 0);
                        return outcome;
                    }
                    publish(&snapshots, SessionState::Live, Some(&lead), clock.remaining_seconds());
                }
            }
        }
    }

    /// Accept path: mark the order done, then acknowledge the lead. Any
    /// failure surfaces as an error outcome and is never retried - a write
    /// of unknown prior effect could duplicate a side effect.
    async fn resolve_accept(&self, lead: &Lead) -> SessionOutcome {
        if let Err(e) = self
            .gateway
            .update_order_status(&lead.id, OrderStatus::Done, &self.vendor)
            .await
        {
            warn!("order status update for lead {} failed: {}", lead.id, e);
            return SessionOutcome::Error;
        }

        match self.gateway.accept_lead(&lead.id, &self.vendor).await {
            Ok(()) => {
                info!("lead {} accepted", lead.id);
                SessionOutcome::Accepted
            }
            Err(e) => {
                warn!("accept of lead {} failed: {}", lead.id, e);
                SessionOutcome::Error
            }
        }
    }

    /// Decline path, manual or expiry-triggered. Only the backend's exact
    /// confirmation message counts as a confirmed decline.
    async fn resolve_decline(&self, lead: &Lead, trigger: DeclineTrigger) -> SessionOutcome {
        match self.gateway.decline_lead(&lead.id, &self.vendor).await {
            Ok(receipt) if receipt.confirms() => {
                info!("lead {} declined ({:?})", lead.id, trigger);
                SessionOutcome::Declined
            }
            Ok(receipt) => {
                warn!(
                    "decline of lead {} not confirmed: {:?}",
                    lead.id, receipt.message
                );
                SessionOutcome::Error
            }
            Err(e) => {
                warn!("decline of lead {} failed: {}", lead.id, e);
                SessionOutcome::Error
            }
        }
    }
}

fn publish(
    snapshots: &watch::Sender<SessionSnapshot>,
    state: SessionState,
    lead: Option<&Lead>,
    remaining_seconds: u32,
) {
    let _ = snapshots.send(SessionSnapshot {
        state,
        lead: lead.cloned(),
        remaining_seconds,
    });
}

/// Control surface handed to the presentation layer.
///
/// Every method is a no-op once the session has closed; duplicate intents
/// and late closes never raise and never reach the backend.
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    pub async fn accept(&self) {
        let _ = self.commands.send(SessionCommand::Accept).await;
    }

    pub async fn decline(&self) {
        let _ = self.commands.send(SessionCommand::Decline).await;
    }

    /// Tear the session down without resolving. Safe to call repeatedly.
    pub async fn close(&self) {
        let _ = self.commands.send(SessionCommand::Close).await;
    }

    /// Latest render state; updated on every transition and tick.
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait for the session to finish and yield its outcome.
    pub async fn join(self) -> SessionOutcome {
        self.task.await.unwrap_or(SessionOutcome::Cancelled)
    }
}
