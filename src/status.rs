//! Submission lifecycle tracking.
//!
//! Each submission mechanism keeps its own status. The externally observed [`PayoutStatus`] is
//! never stored: it is derived from both mechanism statuses on every read. Phase and mechanism
//! statuses share one channel so a transition becomes visible all at once.
use crate::wallet::BatchId;
use tokio::sync::watch::{self, error::RecvError};

/// The two ways a batch can be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mechanism {
    /// Direct value-transfer calls.
    SendCalls,
    /// Contract-write batch.
    WriteContracts,
}

/// Status of one submission mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MechanismStatus {
    #[default]
    Idle,
    Pending,
    Success(BatchId),
    Failed,
}

impl MechanismStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn identifier(&self) -> Option<&BatchId> {
        match self {
            Self::Success(id) => Some(id),
            _ => None,
        }
    }
}

/// Where the current payout invocation is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayoutPhase {
    #[default]
    Idle,
    Building,
    AwaitingCapability,
    Submitting,
    Resolved,
    Failed,
}

/// Merged view over both mechanisms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayoutStatus {
    pub phase: PayoutPhase,
    pub is_pending: bool,
    pub is_success: bool,
    pub identifier: Option<BatchId>,
}

/// Everything one transition may touch.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    invocation: u64,
    phase: PayoutPhase,
    send_calls: MechanismStatus,
    write_contracts: MechanismStatus,
}

impl Snapshot {
    fn mechanism_mut(&mut self, mechanism: Mechanism) -> &mut MechanismStatus {
        match mechanism {
            Mechanism::SendCalls => &mut self.send_calls,
            Mechanism::WriteContracts => &mut self.write_contracts,
        }
    }

    fn merged(&self) -> PayoutStatus {
        PayoutStatus {
            phase: self.phase,
            is_pending: self.send_calls.is_pending() || self.write_contracts.is_pending(),
            is_success: self.send_calls.is_success() || self.write_contracts.is_success(),
            identifier: self.send_calls.identifier().or(self.write_contracts.identifier()).cloned(),
        }
    }
}

/// Token of one payout invocation. Transitions carrying a superseded token are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation(u64);

/// Owns the status channel of a payout orchestrator.
#[derive(Debug)]
pub struct StatusTracker {
    snapshot: watch::Sender<Snapshot>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub fn new() -> Self {
        Self { snapshot: watch::Sender::new(Snapshot::default()) }
    }

    /// Starts a fresh invocation, superseding any in flight.
    pub fn begin(&self) -> Invocation {
        let mut invocation = 0;
        self.snapshot.send_modify(|snapshot| {
            invocation = snapshot.invocation + 1;
            *snapshot = Snapshot { invocation, phase: PayoutPhase::Building, ..Default::default() };
        });
        Invocation(invocation)
    }

    /// Applies `f` if `invocation` is still the latest one.
    fn transition(&self, invocation: Invocation, f: impl FnOnce(&mut Snapshot)) -> bool {
        self.snapshot.send_if_modified(|snapshot| {
            if snapshot.invocation != invocation.0 {
                return false;
            }
            f(snapshot);
            true
        })
    }

    pub fn set_phase(&self, invocation: Invocation, phase: PayoutPhase) -> bool {
        self.transition(invocation, |snapshot| snapshot.phase = phase)
    }

    /// Marks `mechanism` as pending.
    pub fn start(&self, invocation: Invocation, mechanism: Mechanism) -> bool {
        self.transition(invocation, |snapshot| {
            *snapshot.mechanism_mut(mechanism) = MechanismStatus::Pending;
            snapshot.phase = PayoutPhase::Submitting;
        })
    }

    /// Records the identifier returned by `mechanism`.
    pub fn resolve(&self, invocation: Invocation, mechanism: Mechanism, id: BatchId) -> bool {
        self.transition(invocation, |snapshot| {
            *snapshot.mechanism_mut(mechanism) = MechanismStatus::Success(id);
            snapshot.phase = PayoutPhase::Resolved;
        })
    }

    /// Records a rejected submission.
    pub fn fail(&self, invocation: Invocation, mechanism: Mechanism) -> bool {
        self.transition(invocation, |snapshot| {
            *snapshot.mechanism_mut(mechanism) = MechanismStatus::Failed;
            snapshot.phase = PayoutPhase::Failed;
        })
    }

    /// Current merged status.
    pub fn status(&self) -> PayoutStatus {
        self.snapshot.borrow().merged()
    }

    pub fn subscribe(&self) -> StatusWatcher {
        StatusWatcher { snapshot: self.snapshot.subscribe() }
    }
}

/// Observer handle recomputing the merged status whenever either mechanism changes.
#[derive(Debug, Clone)]
pub struct StatusWatcher {
    snapshot: watch::Receiver<Snapshot>,
}

impl StatusWatcher {
    /// Merged status as of now, marking it as seen.
    pub fn current(&mut self) -> PayoutStatus {
        self.snapshot.borrow_and_update().merged()
    }

    /// Waits for the next transition.
    pub async fn changed(&mut self) -> Result<PayoutStatus, RecvError> {
        self.snapshot.changed().await?;
        Ok(self.current())
    }
}
