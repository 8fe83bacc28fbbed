//! Polling lifecycle state machine.
//!
//! Pure and side-effect-free like the rest of this crate: the runtime in
//! the client feeds it events and executes the returned actions (spawning
//! and retiring the interval task, publishing or discarding snapshots).
//!
//! Every polling session carries a `generation` that increases on each
//! account selection. A tick result is only published when it was started
//! in the generation that is still running; anything that completes after
//! a switch or teardown is discarded.

use dungeon_sync_types::AccountId;

/// Scheduler state - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    /// No account selected, nothing polling.
    Stopped {
        /// Generation of the last session (0 before the first one).
        generation: u64,
    },
    /// Polling for one account.
    Running {
        /// Account being synchronized.
        account: AccountId,
        /// Current session.
        generation: u64,
        /// A tick has started and not completed yet.
        tick_in_flight: bool,
    },
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An account became active (first selection or a switch).
    AccountSelected {
        /// The new active account.
        account: AccountId,
    },
    /// The consumer went away.
    Teardown,
    /// The interval of a session fired.
    TickDue {
        /// Session whose interval fired.
        generation: u64,
    },
    /// A tick finished its reads and assembled a snapshot.
    TickCompleted {
        /// Session the tick was started in.
        generation: u64,
    },
}

/// Side effects for the runtime to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Spawn the interval task for a new session.
    StartPolling {
        /// Account to poll for.
        account: AccountId,
        /// Session identifier.
        generation: u64,
    },
    /// Stop the interval task of a session. Its in-flight tick may still finish.
    StopPolling {
        /// Session to stop.
        generation: u64,
    },
    /// Run one tick.
    BeginTick {
        /// Account to read for.
        account: AccountId,
        /// Session the tick belongs to.
        generation: u64,
    },
    /// The previous tick is still outstanding; let this one pass.
    SkipTick,
    /// An interval task outlived its session and should exit.
    RetireRunner {
        /// The stale session.
        generation: u64,
    },
    /// Publish the completed snapshot.
    Publish {
        /// Session that produced it.
        generation: u64,
    },
    /// Drop the completed snapshot unpublished.
    Discard {
        /// Session that produced it.
        generation: u64,
    },
}

impl SchedulerState {
    /// Create a stopped scheduler.
    pub fn new() -> Self {
        Self::Stopped { generation: 0 }
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function. The caller is responsible for executing
    /// the returned actions in order.
    pub fn on_event(self, event: Event) -> (Self, Vec<Action>) {
        match (self, event) {
            // From Stopped
            (Self::Stopped { generation }, Event::AccountSelected { account }) => {
                let generation = generation + 1;
                (
                    Self::Running {
                        account: account.clone(),
                        generation,
                        tick_in_flight: false,
                    },
                    vec![Action::StartPolling {
                        account,
                        generation,
                    }],
                )
            }
            (state @ Self::Stopped { .. }, Event::Teardown) => (state, vec![]),

            // From Running
            (
                Self::Running {
                    account: current,
                    generation,
                    tick_in_flight,
                },
                Event::AccountSelected { account },
            ) => {
                if current == account {
                    return (
                        Self::Running {
                            account: current,
                            generation,
                            tick_in_flight,
                        },
                        vec![],
                    );
                }
                let next = generation + 1;
                (
                    Self::Running {
                        account: account.clone(),
                        generation: next,
                        tick_in_flight: false,
                    },
                    vec![
                        Action::StopPolling { generation },
                        Action::StartPolling {
                            account,
                            generation: next,
                        },
                    ],
                )
            }
            (Self::Running { generation, .. }, Event::Teardown) => (
                Self::Stopped { generation },
                vec![Action::StopPolling { generation }],
            ),

            // Ticks
            (
                Self::Running {
                    account,
                    generation,
                    tick_in_flight,
                },
                Event::TickDue { generation: due },
            ) => {
                if due != generation {
                    let state = Self::Running {
                        account,
                        generation,
                        tick_in_flight,
                    };
                    return (state, vec![Action::RetireRunner { generation: due }]);
                }
                if tick_in_flight {
                    let state = Self::Running {
                        account,
                        generation,
                        tick_in_flight,
                    };
                    return (state, vec![Action::SkipTick]);
                }
                (
                    Self::Running {
                        account: account.clone(),
                        generation,
                        tick_in_flight: true,
                    },
                    vec![Action::BeginTick {
                        account,
                        generation,
                    }],
                )
            }
            (state @ Self::Stopped { .. }, Event::TickDue { generation }) => {
                (state, vec![Action::RetireRunner { generation }])
            }
            (
                Self::Running {
                    account,
                    generation,
                    tick_in_flight,
                },
                Event::TickCompleted { generation: done },
            ) => {
                if done == generation {
                    (
                        Self::Running {
                            account,
                            generation,
                            tick_in_flight: false,
                        },
                        vec![Action::Publish { generation }],
                    )
                } else {
                    (
                        Self::Running {
                            account,
                            generation,
                            tick_in_flight,
                        },
                        vec![Action::Discard { generation: done }],
                    )
                }
            }
            (state @ Self::Stopped { .. }, Event::TickCompleted { generation }) => {
                (state, vec![Action::Discard { generation }])
            }
        }
    }

    /// Check if a session is active.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// The account being polled for, if any.
    pub fn account(&self) -> Option<&AccountId> {
        match self {
            Self::Running { account, .. } => Some(account),
            Self::Stopped { .. } => None,
        }
    }

    /// Current (or last) session.
    pub fn generation(&self) -> u64 {
        match self {
            Self::Stopped { generation } | Self::Running { generation, .. } => *generation,
        }
    }
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::new()
    }
}
