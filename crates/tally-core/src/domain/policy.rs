//! Vote policy: deployment-level rules layered on top of the core vote checks.
//!
//! The core only requires an open poll and a known option. Whether `maxVotes`
//! is a hard cap and whether one identity may vote twice are deployment
//! decisions, so they live here as configuration instead of in `Poll::cast`.
//!
//! `VotePolicy::check` is a pure function of the current poll and the voter.

use serde::{Deserialize, Serialize};

use super::ids::UserId;
use super::poll::Poll;
use crate::error::PollError;

/// What `maxVotes` means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxVotesPolicy {
    /// Stored and reported, never enforced.
    #[default]
    Informational,
    /// Reject votes once `votes.len() >= maxVotes`.
    HardCap,
}

/// Whether the same identity may vote more than once on a poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateVotePolicy {
    #[default]
    Allow,
    /// At most one vote per `(poll id, user)` pair.
    RejectRepeatVoter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotePolicy {
    pub max_votes: MaxVotesPolicy,
    pub duplicate_votes: DuplicateVotePolicy,
}

impl VotePolicy {
    /// Decide whether `user` may add one more vote to `poll`.
    pub fn check(&self, poll: &Poll, user: &UserId) -> Result<(), PollError> {
        if self.max_votes == MaxVotesPolicy::HardCap
            && poll.votes().len() as u64 >= u64::from(poll.max_votes())
        {
            return Err(PollError::MaxVotesReached {
                poll: poll.id().clone(),
                max_votes: poll.max_votes(),
            });
        }
        if self.duplicate_votes == DuplicateVotePolicy::RejectRepeatVoter && poll.has_voted(user) {
            return Err(PollError::AlreadyVoted {
                poll: poll.id().clone(),
                user: user.clone(),
            });
        }
        Ok(())
    }
}
