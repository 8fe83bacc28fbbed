//! SyncScheduler - drives polling ticks for the active account.
//!
//! The lifecycle decisions live in the pure [`SchedulerState`] machine from
//! sync-core; this module interprets its actions with tokio:
//!
//! ```text
//! select_account ──► StartPolling ──► runner task (interval)
//!                                          │ TickDue
//!                                          ▼
//!                                     BeginTick ──► tick task ──► TickCompleted
//!                                                                   │
//!                                                    Publish / Discard
//! ```
//!
//! Publication happens while holding the scheduler lock, and account
//! switches take the same lock, so a tick that completes after a switch is
//! always discarded.

use std::sync::{Arc, Weak};
use std::time::Duration;

use dungeon_sync_core::{Action, Event, SchedulerState};
use dungeon_sync_types::{AccountId, WorldSnapshot};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::engine::WorldSyncEngine;
use crate::transport::StateTransport;

/// Latest published snapshot, `None` until the first tick of a session lands.
pub type SnapshotReceiver = watch::Receiver<Option<Arc<WorldSnapshot>>>;

/// Owns the polling lifecycle.
///
/// Dropping the scheduler stops polling.
pub struct SyncScheduler<T: StateTransport + 'static> {
    shared: Arc<Shared<T>>,
}

struct Shared<T: StateTransport + 'static> {
    engine: WorldSyncEngine<T>,
    poll_interval: Duration,
    inner: Mutex<Inner>,
    snapshots: watch::Sender<Option<Arc<WorldSnapshot>>>,
}

struct Inner {
    state: SchedulerState,
    runner: Option<Runner>,
}

/// Interval task of one session. Dropping `stop` ends the task.
struct Runner {
    generation: u64,
    _stop: watch::Sender<()>,
    handle: JoinHandle<()>,
}

impl<T: StateTransport + 'static> SyncScheduler<T> {
    /// Create a stopped scheduler ticking every `poll_interval`.
    pub fn new(engine: WorldSyncEngine<T>, poll_interval: Duration) -> Self {
        let (snapshots, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                engine,
                poll_interval,
                inner: Mutex::new(Inner {
                    state: SchedulerState::new(),
                    runner: None,
                }),
                snapshots,
            }),
        }
    }

    /// Make `account` the active account, starting or restarting polling.
    ///
    /// Selecting the account that is already active does nothing.
    pub async fn select_account(&self, account: AccountId) {
        Shared::apply(&self.shared, Event::AccountSelected { account }).await;
    }

    /// Stop polling. The last snapshot stays available.
    pub async fn stop(&self) {
        Shared::apply(&self.shared, Event::Teardown).await;
    }

    /// Stop polling and wait for the runner task to exit.
    pub async fn shutdown(&self) {
        let handle = {
            let mut inner = self.shared.inner.lock().await;
            let (state, _) = inner.state.clone().on_event(Event::Teardown);
            inner.state = state;
            inner.runner.take().map(|runner| runner.handle)
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        info!("sync scheduler shut down");
    }

    /// Subscribe to published snapshots.
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.shared.snapshots.subscribe()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Option<Arc<WorldSnapshot>> {
        self.shared.snapshots.borrow().clone()
    }

    /// Check if a session is active.
    pub async fn is_running(&self) -> bool {
        self.shared.inner.lock().await.state.is_running()
    }

    /// The account being polled for, if any.
    pub async fn active_account(&self) -> Option<AccountId> {
        self.shared.inner.lock().await.state.account().cloned()
    }
}

impl<T: StateTransport + 'static> Shared<T> {
    /// Feed an event to the state machine and carry out lifecycle actions.
    async fn apply(shared: &Arc<Self>, event: Event) -> Vec<Action> {
        let mut inner = shared.inner.lock().await;
        let (state, actions) = inner.state.clone().on_event(event);
        inner.state = state;

        let mut rest = Vec::new();
        for action in actions {
            match action {
                Action::StartPolling {
                    account,
                    generation,
                } => {
                    // A snapshot held for another account must not outlive
                    // the switch, even after an intermediate stop.
                    shared.snapshots.send_if_modified(|held| {
                        let stale = held
                            .as_ref()
                            .is_some_and(|snapshot| snapshot.account != account);
                        if stale {
                            *held = None;
                        }
                        stale
                    });
                    info!(%account, generation, "polling started");
                    inner.runner = Some(Self::spawn_runner(shared, generation));
                }
                Action::StopPolling { generation } => {
                    if let Some(runner) = inner.runner.take() {
                        debug_assert_eq!(runner.generation, generation);
                        // The tick in flight, if any, finishes and is discarded.
                        drop(runner);
                    }
                    info!(generation, "polling stopped");
                }
                other => rest.push(other),
            }
        }
        rest
    }

    fn spawn_runner(shared: &Arc<Self>, generation: u64) -> Runner {
        let (stop, stopped) = watch::channel(());
        let handle = tokio::spawn(Self::run(
            Arc::downgrade(shared),
            shared.poll_interval,
            generation,
            stopped,
        ));
        Runner {
            generation,
            _stop: stop,
            handle,
        }
    }

    async fn run(
        shared: Weak<Self>,
        poll_interval: Duration,
        generation: u64,
        mut stopped: watch::Receiver<()>,
    ) {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sequence = 0u64;

        loop {
            tokio::select! {
                _ = stopped.changed() => break,
                _ = interval.tick() => {}
            }
            let Some(shared) = shared.upgrade() else {
                break;
            };

            let mut retired = false;
            for action in Self::apply(&shared, Event::TickDue { generation }).await {
                match action {
                    Action::BeginTick {
                        account,
                        generation,
                    } => {
                        sequence += 1;
                        tokio::spawn(Self::tick(
                            Arc::clone(&shared),
                            account,
                            generation,
                            sequence,
                        ));
                    }
                    Action::SkipTick => debug!(generation, "previous tick still in flight"),
                    Action::RetireRunner { .. } => retired = true,
                    _ => {}
                }
            }
            if retired {
                break;
            }
        }
        debug!(generation, "runner exited");
    }

    async fn tick(shared: Arc<Self>, account: AccountId, generation: u64, sequence: u64) {
        let previous = shared.snapshots.borrow().clone();
        let snapshot = shared
            .engine
            .tick(&account, previous.as_deref(), generation, sequence)
            .await;

        let mut inner = shared.inner.lock().await;
        let (state, actions) = inner
            .state
            .clone()
            .on_event(Event::TickCompleted { generation });
        inner.state = state;

        let mut snapshot = Some(snapshot);
        for action in actions {
            match action {
                Action::Publish { .. } => {
                    if let Some(snapshot) = snapshot.take() {
                        shared.snapshots.send_replace(Some(Arc::new(snapshot)));
                    }
                }
                Action::Discard { .. } => {
                    debug!(%account, generation, sequence, "discarding stale snapshot")
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateClient;
    use crate::transport::MockTransport;
    use dungeon_sync_types::paths;

    fn account(id: &str) -> AccountId {
        AccountId::parse(id).unwrap()
    }

    fn world() -> MockTransport {
        let transport = MockTransport::new();
        for (id, x) in [("tz1alice", "01"), ("tz1bob", "02")] {
            transport.set_value(&format!("/players/{}/x_pos", id), x);
            transport.set_value(&format!("/players/{}/y_pos", id), "05");
            transport.set_value(&format!("/players/{}/gold", id), x);
        }
        transport
    }

    fn scheduler(transport: MockTransport) -> SyncScheduler<MockTransport> {
        let engine = WorldSyncEngine::new(StateClient::new(transport, Duration::from_secs(5)));
        SyncScheduler::new(engine, Duration::from_millis(500))
    }

    /// Wait for the next published (non-empty) snapshot.
    async fn next_snapshot(rx: &mut SnapshotReceiver) -> Arc<WorldSnapshot> {
        loop {
            rx.changed().await.unwrap();
            if let Some(snapshot) = rx.borrow_and_update().clone() {
                return snapshot;
            }
        }
    }

    // ===========================================
    // Lifecycle Tests
    // ===========================================

    #[tokio::test(start_paused = true)]
    async fn selecting_account_publishes_snapshots() {
        let scheduler = scheduler(world());
        let mut rx = scheduler.subscribe();
        assert!(!scheduler.is_running().await);

        scheduler.select_account(account("tz1alice")).await;

        let first = next_snapshot(&mut rx).await;
        assert_eq!(first.account, account("tz1alice"));
        assert_eq!(first.local_player.gold, 1);
        assert_eq!(first.sequence, 1);

        let second = next_snapshot(&mut rx).await;
        assert_eq!(second.sequence, 2);
        assert!(scheduler.is_running().await);
        assert_eq!(scheduler.active_account().await, Some(account("tz1alice")));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_polling_and_keeps_last_snapshot() {
        let transport = world();
        let scheduler = scheduler(transport.clone());
        let mut rx = scheduler.subscribe();

        scheduler.select_account(account("tz1alice")).await;
        next_snapshot(&mut rx).await;
        scheduler.stop().await;

        let reads = transport.read_count(paths::MAP);
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(transport.read_count(paths::MAP), reads);
        assert!(!scheduler.is_running().await);
        assert!(scheduler.latest().is_some());
        assert_eq!(scheduler.active_account().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn reselecting_same_account_keeps_session() {
        let scheduler = scheduler(world());
        let mut rx = scheduler.subscribe();

        scheduler.select_account(account("tz1alice")).await;
        next_snapshot(&mut rx).await;
        scheduler.select_account(account("tz1alice")).await;

        let snapshot = next_snapshot(&mut rx).await;
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.sequence, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_runner() {
        let scheduler = scheduler(world());
        scheduler.select_account(account("tz1alice")).await;

        scheduler.shutdown().await;

        assert!(!scheduler.is_running().await);
    }

    // ===========================================
    // Account Switch Tests
    // ===========================================

    #[tokio::test(start_paused = true)]
    async fn switch_mid_tick_discards_outgoing_result() {
        let transport = world();
        transport.set_latency(Duration::from_millis(300));
        let scheduler = scheduler(transport);
        let mut rx = scheduler.subscribe();

        scheduler.select_account(account("tz1alice")).await;
        // Alice's first tick is now waiting on its reads.
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.select_account(account("tz1bob")).await;

        let first = next_snapshot(&mut rx).await;
        assert_eq!(first.account, account("tz1bob"));
        assert_eq!(first.generation, 2);
        assert_eq!(first.local_player.gold, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn switch_clears_outgoing_snapshot() {
        let scheduler = scheduler(world());
        let mut rx = scheduler.subscribe();

        scheduler.select_account(account("tz1alice")).await;
        next_snapshot(&mut rx).await;
        scheduler.select_account(account("tz1bob")).await;

        assert!(scheduler.latest().is_none());
        let snapshot = next_snapshot(&mut rx).await;
        assert_eq!(snapshot.account, account("tz1bob"));
        assert_eq!(snapshot.sequence, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_then_select_other_account_starts_fresh() {
        let scheduler = scheduler(world());
        let mut rx = scheduler.subscribe();

        scheduler.select_account(account("tz1alice")).await;
        next_snapshot(&mut rx).await;
        scheduler.stop().await;
        assert!(scheduler.latest().is_some());

        scheduler.select_account(account("tz1bob")).await;

        assert_eq!(scheduler.active_account().await, Some(account("tz1bob")));
        assert!(scheduler.latest().is_none());
        let snapshot = next_snapshot(&mut rx).await;
        assert_eq!(snapshot.account, account("tz1bob"));
        assert_eq!(snapshot.local_player.gold, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_then_reselect_same_account_keeps_snapshot() {
        let scheduler = scheduler(world());
        let mut rx = scheduler.subscribe();

        scheduler.select_account(account("tz1alice")).await;
        next_snapshot(&mut rx).await;
        scheduler.stop().await;
        scheduler.select_account(account("tz1alice")).await;

        let held = scheduler.latest().unwrap();
        assert_eq!(held.account, account("tz1alice"));
    }

    // ===========================================
    // Overlap Tests
    // ===========================================

    #[tokio::test(start_paused = true)]
    async fn slow_ticks_are_not_reentrant() {
        let transport = world();
        // Market enumeration is three reads deep: each tick takes ~1.2s.
        transport.set_value("/market-place/tz1bob/01/value", "05");
        transport.set_latency(Duration::from_millis(400));
        let scheduler = scheduler(transport.clone());

        scheduler.select_account(account("tz1alice")).await;
        tokio::time::sleep(Duration::from_millis(2900)).await;

        // Ticks due every 500ms, but at most one runs at a time.
        let map_reads = transport.read_count(paths::MAP);
        assert!(map_reads >= 2, "expected at least 2 ticks, got {}", map_reads);
        assert!(map_reads <= 3, "ticks overlapped: {} map reads", map_reads);
    }
}
