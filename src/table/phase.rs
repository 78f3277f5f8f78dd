// ABOUTME: Agent phases and the phase table indexed by seat around the ring.
// ABOUTME: Provides ring adjacency and the no-adjacent-holders check.

use serde::{Deserialize, Serialize};

/// Seat index of an agent, in `[0, N)`.
pub type AgentId = usize;

/// What an agent is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Not competing for resources.
    Idle,
    /// Requested resources, awaiting admission.
    Hungry,
    /// Using both adjacent resources.
    Holding,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Hungry => write!(f, "hungry"),
            Phase::Holding => write!(f, "holding"),
        }
    }
}

/// Fixed-size table of phases, one per seat.
///
/// The table never changes size after construction. All agents start `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTable {
    phases: Box<[Phase]>,
}

impl PhaseTable {
    /// Create a table of `agents` seats, all idle.
    pub fn new(agents: usize) -> Self {
        Self {
            phases: vec![Phase::Idle; agents].into_boxed_slice(),
        }
    }

    /// Number of seats.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Seat to the left of `id`.
    pub fn left(&self, id: AgentId) -> AgentId {
        (id + self.len() - 1) % self.len()
    }

    /// Seat to the right of `id`.
    pub fn right(&self, id: AgentId) -> AgentId {
        (id + 1) % self.len()
    }

    /// Phase of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a seat at this table. Use [`PhaseTable::try_get`]
    /// for ids that have not been checked.
    pub fn get(&self, id: AgentId) -> Phase {
        self.phases[id]
    }

    /// Phase of `id`, or `None` if `id` is not a seat at this table.
    pub fn try_get(&self, id: AgentId) -> Option<Phase> {
        self.phases.get(id).copied()
    }

    /// Overwrite the phase of `id`, returning the previous one.
    pub(crate) fn set(&mut self, id: AgentId, phase: Phase) -> Phase {
        std::mem::replace(&mut self.phases[id], phase)
    }

    /// True if either neighbor of `id` is holding.
    pub fn neighbor_holding(&self, id: AgentId) -> bool {
        self.get(self.left(id)) == Phase::Holding || self.get(self.right(id)) == Phase::Holding
    }

    /// True if no two adjacent seats are both holding.
    pub fn is_consistent(&self) -> bool {
        (0..self.len()).all(|id| self.get(id) != Phase::Holding || !self.neighbor_holding(id))
    }

    pub fn as_slice(&self) -> &[Phase] {
        &self.phases
    }
}
