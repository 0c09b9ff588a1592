//! Connection session lifecycle.
//!
//! ```text
//! Unbound ──register──▶ Bound(identity) ──disconnect──▶ Closed
//!    │                    ▲        │
//!    │                    └register┘
//!    └──────────────disconnect──────────────────────────▶ Closed
//! ```

use crate::domain::foundation::{Identity, StateMachine, ValidationError};

/// Status part of a [`ConnectionState`], without the bound identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Unbound,
    Bound,
    Closed,
}

impl StateMachine for SessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Unbound, Bound) | (Unbound, Closed) | (Bound, Bound) | (Bound, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            Unbound => vec![Bound, Closed],
            Bound => vec![Bound, Closed],
            Closed => vec![],
        }
    }
}

/// State of one connection: which identity, if any, it speaks for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Unbound,
    Bound(Identity),
    Closed,
}

impl ConnectionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            ConnectionState::Unbound => SessionStatus::Unbound,
            ConnectionState::Bound(_) => SessionStatus::Bound,
            ConnectionState::Closed => SessionStatus::Closed,
        }
    }

    /// The bound identity, if registered and not closed.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            ConnectionState::Bound(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }

    /// Binds the connection to `identity`.
    ///
    /// Returns the previously bound identity when it differs from the new
    /// one, so the caller can release its presence.
    pub fn bind(&mut self, identity: Identity) -> Result<Option<Identity>, ValidationError> {
        self.status().transition_to(SessionStatus::Bound)?;
        let previous = std::mem::replace(self, ConnectionState::Bound(identity));
        Ok(match (previous, self.identity()) {
            (ConnectionState::Bound(old), Some(new)) if &old != new => Some(old),
            _ => None,
        })
    }

    /// Moves to `Closed`, returning the identity that was bound.
    ///
    /// Closing an already closed state is a no-op.
    pub fn close(&mut self) -> Option<Identity> {
        if self.status().transition_to(SessionStatus::Closed).is_err() {
            return None;
        }
        match std::mem::replace(self, ConnectionState::Closed) {
            ConnectionState::Bound(identity) => Some(identity),
            _ => None,
        }
    }
}
