//! Runtime transition guard for persisted status enums (`Tenant.status`,
//! `Invitation.status`). The teacher's `state_machine` module encodes
//! transitions in the type system for values that live only within one
//! request; here status is loaded from a row and compared against a
//! stored value, so the guard table is checked at runtime instead.

use std::fmt::Debug;

use crate::error::Error;

/// A status enum whose legal transitions form a fixed graph.
pub trait StatusMachine: Copy + PartialEq + Debug {
    /// Statuses directly reachable from `self`. An empty slice means `self`
    /// is terminal (absorbing).
    fn allowed_transitions(self) -> &'static [Self];
}

/// Fails with [`Error::Conflict`] unless `next` is directly reachable from
/// `current`. A no-op transition (`current == next`) is always allowed.
pub fn guard_transition<S: StatusMachine>(current: S, next: S) -> Result<(), Error> {
    if current == next {
        return Ok(());
    }
    if current.allowed_transitions().contains(&next) {
        Ok(())
    } else {
        Err(Error::Conflict(format!(
            "illegal transition from {current:?} to {next:?}"
        )))
    }
}
