//! The fixed-rate simulation loop.
//!
//! One task owns the world and runs forever: drain the queues, run the
//! tick, fan the personalized payloads out through the outbound sink,
//! persist, clear the tick buffers, and wait for the next interval. The
//! tick result is fully constructed before persistence runs, and both
//! finish before the next tick begins.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use veldt_types::{ActorId, ServerMessage};
use veldt_world::WorldState;
use veldt_world::constants::{SLOW_TICK_WARN_MS, SNAPSHOT_CADENCE_TICKS};

use crate::broadcast;
use crate::queue::{ActionQueue, ControlQueue};
use crate::tick::{self, TickResult};

/// Outbound delivery: the gateway implements this over its per-connection
/// senders, each of which serializes writes for one client.
pub trait OutboundSink: Send + Sync {
    /// Queue a message for one actor's connection. Dropping messages for
    /// unknown or disconnected actors is fine.
    fn send(&self, actor: ActorId, message: ServerMessage);
}

/// Persistence hooks the runner calls at the end of every tick.
///
/// Failures are logged and swallowed: the in-memory world remains the
/// source of truth, and the next successful snapshot re-syncs. A no-op
/// implementation is enough for tests.
pub trait TickPersister: Send {
    /// The persistence error type.
    type Error: core::fmt::Display;

    /// Write the tick's incremental rows (events, state deltas).
    fn persist_tick(
        &mut self,
        world: &WorldState,
        result: &TickResult,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Serialize all entity tables atomically.
    fn snapshot_world(
        &mut self,
        world: &WorldState,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A persister that does nothing, for tests and dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersister;

impl TickPersister for NoopPersister {
    type Error = core::convert::Infallible;

    async fn persist_tick(
        &mut self,
        _world: &WorldState,
        _result: &TickResult,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn snapshot_world(&mut self, _world: &WorldState) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Shared handles between the runner and the gateway.
#[derive(Debug, Default)]
pub struct EngineShared {
    /// The per-actor action slots.
    pub actions: ActionQueue,
    /// Join/resume/disconnect requests.
    pub controls: ControlQueue,
    /// The last completed tick, read by the gateway for pongs.
    pub current_tick: AtomicU64,
}

impl EngineShared {
    /// Create empty shared state.
    pub const fn new() -> Self {
        Self {
            actions: ActionQueue::new(),
            controls: ControlQueue::new(),
            current_tick: AtomicU64::new(0),
        }
    }

    /// The last completed tick number.
    pub fn tick(&self) -> u64 {
        self.current_tick.load(Ordering::Relaxed)
    }
}

/// Run one complete tick cycle: drain, simulate, broadcast, persist.
///
/// Split out of [`run_loop`] so tests can drive the cycle without a
/// timer.
pub async fn run_cycle<P: TickPersister>(
    world: &mut WorldState,
    shared: &EngineShared,
    sink: &dyn OutboundSink,
    persister: &mut P,
) -> TickResult {
    let started = Instant::now();

    let controls = shared.controls.drain();
    let actions = shared.actions.drain();
    let result = tick::run_tick(world, controls, actions);

    // Broadcast: one personalized payload per connected actor, plus the
    // rejection envelopes routed to their originators.
    let updates = broadcast::build_all(world);
    for (actor_id, update) in updates {
        sink.send(actor_id, ServerMessage::TickUpdate {
            data: Box::new(update),
        });
    }
    for rejection in &result.rejected {
        sink.send(rejection.actor, ServerMessage::ActionRejected {
            action: rejection.action.clone(),
            reason: rejection.reason.clone(),
        });
    }

    // Persist after the result is fully constructed, before the next tick.
    if let Err(error) = persister.persist_tick(world, &result).await {
        tracing::error!(tick = result.tick, %error, "Tick persistence failed");
    }
    if result.tick.checked_rem(SNAPSHOT_CADENCE_TICKS) == Some(0)
        && let Err(error) = persister.snapshot_world(world).await
    {
        tracing::error!(tick = result.tick, %error, "Snapshot failed");
    }

    world.clear_tick_buffers();
    shared.current_tick.store(result.tick, Ordering::Relaxed);

    let elapsed = started.elapsed();
    if elapsed > Duration::from_millis(SLOW_TICK_WARN_MS) {
        tracing::warn!(
            tick = result.tick,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Slow tick"
        );
    }
    result
}

/// Run the fixed-rate loop until the shutdown signal fires.
pub async fn run_loop<P: TickPersister>(
    world: &mut WorldState,
    shared: Arc<EngineShared>,
    sink: Arc<dyn OutboundSink>,
    persister: &mut P,
    tick_interval_ms: u64,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(Duration::from_millis(tick_interval_ms.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    tracing::info!(tick_interval_ms, "Tick loop started");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let _ = run_cycle(world, &shared, sink.as_ref(), persister).await;
            }
            changed = shutdown.changed() => {
                let stop = changed.is_err() || *shutdown.borrow();
                if stop {
                    tracing::info!(tick = world.tick, "Tick loop stopping");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::Mutex;

    use veldt_types::{Action, QueuedAction, Role};

    use crate::queue::ControlRequest;

    use super::*;

    /// Sink that records everything sent, per actor.
    #[derive(Debug, Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(ActorId, ServerMessage)>>,
    }

    impl OutboundSink for RecordingSink {
        fn send(&self, actor: ActorId, message: ServerMessage) {
            self.sent.lock().unwrap().push((actor, message));
        }
    }

    /// Reserve and join "Wren" as a merchant over two cycles.
    async fn join_wren(
        world: &mut WorldState,
        shared: &EngineShared,
        sink: &RecordingSink,
        persister: &mut NoopPersister,
    ) -> ActorId {
        let (reserve_tx, mut reserve_rx) = tokio::sync::oneshot::channel();
        shared.controls.push(ControlRequest::Reserve {
            name: "Wren".to_owned(),
            reply: reserve_tx,
        });
        let _ = run_cycle(world, shared, sink, persister).await;
        let actor_id = match reserve_rx.try_recv().unwrap() {
            crate::queue::ControlReply::Reserved { actor_id } => actor_id,
            other => panic!("unexpected reply: {other:?}"),
        };

        let (join_tx, _join_rx) = tokio::sync::oneshot::channel();
        shared.controls.push(ControlRequest::Join {
            actor_id,
            name: "Wren".to_owned(),
            role: Role::Merchant,
            reply: join_tx,
        });
        let _ = run_cycle(world, shared, sink, persister).await;
        actor_id
    }

    #[tokio::test]
    async fn cycle_broadcasts_to_connected_actors() {
        let mut world = WorldState::new(42);
        let shared = EngineShared::new();
        let sink = RecordingSink::default();
        let mut persister = NoopPersister;

        let _ = join_wren(&mut world, &shared, &sink, &mut persister).await;

        let sent = sink.sent.lock().unwrap();
        assert!(
            sent.iter()
                .any(|(_, message)| matches!(message, ServerMessage::TickUpdate { .. }))
        );
        assert_eq!(shared.tick(), 2);
    }

    #[tokio::test]
    async fn rejections_are_routed_to_their_actor() {
        let mut world = WorldState::new(42);
        let shared = EngineShared::new();
        let sink = RecordingSink::default();
        let mut persister = NoopPersister;

        let actor_id = join_wren(&mut world, &shared, &sink, &mut persister).await;

        shared.actions.enqueue(QueuedAction {
            actor: actor_id,
            action: Action::Move { x: -1.0, y: 0.0 },
            client_tick: 1,
        });
        let _ = run_cycle(&mut world, &shared, &sink, &mut persister).await;

        let sent = sink.sent.lock().unwrap();
        assert!(sent.iter().any(|(actor, message)| {
            *actor == actor_id
                && matches!(
                    message,
                    ServerMessage::ActionRejected { reason, .. }
                        if reason == "Destination out of bounds"
                )
        }));
    }

    #[tokio::test]
    async fn buffers_clear_between_cycles() {
        let mut world = WorldState::new(42);
        let shared = EngineShared::new();
        let sink = RecordingSink::default();
        let mut persister = NoopPersister;
        let _ = run_cycle(&mut world, &shared, &sink, &mut persister).await;
        assert!(world.tick_events.is_empty());
        assert!(world.tick_messages.is_empty());
    }
}
