//! Poll lifecycle state machine.

use serde::{Deserialize, Serialize};

use super::ids::PollId;
use crate::error::PollError;

/// Lifecycle of a stored poll.
///
/// State transitions:
/// - (uninitialized) -> Open   (create, one-shot)
/// - Open -> Closed            (close, irreversible)
///
/// Votes are only accepted in `Open`. The stored payload keeps this as the
/// `isOpen` flag; `PollState` is the typed view of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    Open,
    Closed,
}

impl PollState {
    pub fn from_open_flag(is_open: bool) -> Self {
        if is_open {
            PollState::Open
        } else {
            PollState::Closed
        }
    }

    pub fn accepts_votes(self) -> bool {
        matches!(self, PollState::Open)
    }

    /// Open -> Closed. Closing a closed poll is an error, not a no-op.
    pub fn close(self, poll: &PollId) -> Result<PollState, PollError> {
        match self {
            PollState::Open => Ok(PollState::Closed),
            PollState::Closed => Err(PollError::PollClosed(poll.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_flag_maps_to_state() {
        assert_eq!(PollState::from_open_flag(true), PollState::Open);
        assert_eq!(PollState::from_open_flag(false), PollState::Closed);
    }

    #[test]
    fn closed_is_terminal() {
        let id = PollId::parse("p1").unwrap();
        let closed = PollState::Open.close(&id).unwrap();

        assert_eq!(closed, PollState::Closed);
        assert!(!closed.accepts_votes());
        assert!(closed.close(&id).is_err());
    }
}
