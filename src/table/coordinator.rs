// ABOUTME: Admission control for ring-adjacent agents sharing resources.
// ABOUTME: Serializes phase changes under one mutex and parks denied agents outside it.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use super::phase::{AgentId, Phase, PhaseTable};
use super::signal::WakeSignal;
use crate::error::DinnerError;
use crate::event::{TracingSink, TransitionEvent, TransitionSink};

/// Coordinator for N agents seated around a ring.
///
/// An agent calls [`request`](Coordinator::request) before using its two
/// adjacent resources and [`release`](Coordinator::release) afterwards. The
/// coordinator guarantees that no two adjacent agents are ever `Holding` at
/// the same time.
///
/// # Locking
///
/// - The phase table is guarded by a single mutex. Every read and write of any
///   agent's phase happens while it is held.
/// - The mutex is never held across an `.await`. A denied agent parks on its
///   own wake signal after the mutex is released, so the neighbor that will
///   eventually admit it can always take the mutex.
/// - Transition events are delivered to the sink while the mutex is held, in
///   the order the table was mutated.
pub struct Coordinator {
    phases: Mutex<PhaseTable>,
    signals: Box<[WakeSignal]>,
    sink: Arc<dyn TransitionSink>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("phases", &*self.phases.lock())
            .finish()
    }
}

impl Coordinator {
    /// Create a coordinator for `agents` seats that logs transitions via tracing.
    ///
    /// Returns `Err(DinnerError::Config)` if fewer than two agents are requested.
    pub fn new(agents: usize) -> Result<Self, DinnerError> {
        Self::with_sink(agents, Arc::new(TracingSink))
    }

    /// Create a coordinator that delivers transition events to `sink`.
    pub fn with_sink(agents: usize, sink: Arc<dyn TransitionSink>) -> Result<Self, DinnerError> {
        if agents < 2 {
            return Err(DinnerError::Config(format!(
                "a table needs at least 2 agents, got {}",
                agents
            )));
        }

        Ok(Self {
            phases: Mutex::new(PhaseTable::new(agents)),
            signals: (0..agents).map(|_| WakeSignal::new()).collect(),
            sink,
        })
    }

    /// Number of seats at the table.
    pub fn agents(&self) -> usize {
        self.signals.len()
    }

    /// Current phase of `id`.
    pub fn phase(&self, id: AgentId) -> Result<Phase, DinnerError> {
        self.check(id)?;
        Ok(self.phases.lock().get(id))
    }

    /// Copy of the whole phase table, taken atomically.
    pub fn snapshot(&self) -> PhaseTable {
        self.phases.lock().clone()
    }

    /// Returns true if `id` has been admitted but has not yet consumed its permit.
    ///
    /// Permits are produced and consumed only by the coordinator; the wake
    /// signals themselves are not reachable from outside the crate.
    ///
    /// ```compile_fail
    /// use dinner::table::WakeSignal;
    /// ```
    ///
    /// ```compile_fail
    /// let coordinator = dinner::table::Coordinator::new(5).unwrap();
    /// coordinator.signal(1).unwrap().grant();
    /// ```
    pub fn is_granted(&self, id: AgentId) -> Result<bool, DinnerError> {
        self.check(id)?;
        Ok(self.signals[id].is_granted())
    }

    /// Request both resources adjacent to `id`, waiting until admitted.
    ///
    /// When this returns `Ok`, `id` is `Holding`.
    pub async fn request(&self, id: AgentId) -> Result<(), DinnerError> {
        self.request_with_cancel(id, std::future::pending::<()>())
            .await
    }

    /// Request resources with cancellation support.
    ///
    /// Returns `Ok(())` once `id` is `Holding`.
    /// Returns `Err(DinnerError::Cancelled)` if the cancel future completes first;
    /// the request is withdrawn and `id` is back to `Idle`.
    /// Returns `Err(DinnerError::ProtocolViolation)` if `id` is not `Idle`.
    ///
    /// Dropping the returned future before it completes also withdraws the
    /// request.
    pub async fn request_with_cancel<F>(&self, id: AgentId, cancel: F) -> Result<(), DinnerError>
    where
        F: Future<Output = ()>,
    {
        self.check(id)?;

        {
            let mut phases = self.phases.lock();
            let current = phases.get(id);
            if current != Phase::Idle {
                return Err(DinnerError::ProtocolViolation {
                    agent: id,
                    operation: "request",
                    phase: current,
                });
            }
            self.transition(&mut phases, id, Phase::Hungry);
            self.try_admit(&mut phases, id);
        }

        let mut pending = PendingRequest {
            coordinator: self,
            id,
            armed: true,
        };

        tokio::pin!(cancel);

        tokio::select! {
            biased;
            () = &mut cancel => {
                tracing::debug!(agent = id, "request cancelled");
                // The guard withdraws the request on drop.
                drop(pending);
                Err(DinnerError::Cancelled)
            }
            () = self.signals[id].wait() => {
                pending.armed = false;
                Ok(())
            }
        }
    }

    /// Release the resources held by `id` and admit waiting neighbors.
    ///
    /// Never waits beyond taking the mutex.
    /// Returns `Err(DinnerError::ProtocolViolation)` if `id` is not `Holding`;
    /// the table is left unchanged.
    pub fn release(&self, id: AgentId) -> Result<(), DinnerError> {
        self.check(id)?;

        let mut phases = self.phases.lock();
        let current = phases.get(id);
        if current != Phase::Holding {
            return Err(DinnerError::ProtocolViolation {
                agent: id,
                operation: "release",
                phase: current,
            });
        }

        self.transition(&mut phases, id, Phase::Idle);
        let (left, right) = (phases.left(id), phases.right(id));
        self.try_admit(&mut phases, left);
        self.try_admit(&mut phases, right);
        Ok(())
    }

    /// Admit `id` into `Holding` if it is hungry and neither neighbor holds.
    ///
    /// Only neighbors' `Holding` state is checked; a hungry neighbor does not
    /// block admission. Must be called with the mutex held.
    fn try_admit(&self, phases: &mut PhaseTable, id: AgentId) {
        if phases.get(id) != Phase::Hungry || phases.neighbor_holding(id) {
            return;
        }

        self.transition(phases, id, Phase::Holding);
        let fresh = self.signals[id].grant();
        debug_assert!(fresh, "agent {} already had an outstanding permit", id);
    }

    /// Undo an unfinished request. Called when a request is cancelled or dropped.
    fn withdraw(&self, id: AgentId) {
        let mut phases = self.phases.lock();
        match phases.get(id) {
            Phase::Hungry => {
                self.transition(&mut phases, id, Phase::Idle);
            }
            Phase::Holding => {
                // Admission raced with cancellation; give the resources back.
                self.signals[id].try_consume();
                self.transition(&mut phases, id, Phase::Idle);
                let (left, right) = (phases.left(id), phases.right(id));
                self.try_admit(&mut phases, left);
                self.try_admit(&mut phases, right);
            }
            Phase::Idle => {}
        }
    }

    fn transition(&self, phases: &mut PhaseTable, id: AgentId, to: Phase) {
        let from = phases.set(id, to);
        self.sink.record(&TransitionEvent::now(id, from, to));
    }

    fn check(&self, id: AgentId) -> Result<(), DinnerError> {
        if id >= self.agents() {
            return Err(DinnerError::InvalidAgentId {
                agent: id,
                agents: self.agents(),
            });
        }
        Ok(())
    }
}

/// Withdraws a request on drop unless it was admitted.
struct PendingRequest<'a> {
    coordinator: &'a Coordinator,
    id: AgentId,
    armed: bool,
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.coordinator.withdraw(self.id);
        }
    }
}
