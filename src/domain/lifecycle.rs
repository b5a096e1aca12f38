//! Static status transition tables shared by every workflow entity.
//!
//! A status type lists its permitted successors once; the default methods
//! answer every other question (identity moves, terminal states, validation
//! errors) the same way for visits, offers, deals and spare-part requests.

use std::fmt::Display;

use thiserror::Error;

/// Raised when a workflow entity is asked to move along an edge that its
/// transition table does not contain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid state transition for {entity}: {from} -> {to}")]
pub struct InvalidStateTransition {
    pub entity: &'static str,
    pub from: String,
    pub to: String,
}

pub trait Lifecycle: Copy + Eq + Display + 'static {
    /// Entity name reported in transition errors.
    const ENTITY: &'static str;

    /// Every status of the lifecycle, in declaration order.
    const ALL: &'static [Self];

    /// Statuses directly reachable from `self`.
    fn next_states(self) -> &'static [Self];

    /// Identity moves are always permitted and are treated as no-ops.
    fn can_transition(self, to: Self) -> bool {
        self == to || self.next_states().contains(&to)
    }

    fn validate_transition(self, to: Self) -> Result<(), InvalidStateTransition> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(InvalidStateTransition {
                entity: Self::ENTITY,
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }

    fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }
}
