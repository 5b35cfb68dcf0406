//! Poll aggregate: the only piece of state the engine mutates.
//!
//! Invariants (checked on every constructor and transition):
//! - `maxVotes` is positive
//! - `options` is non-empty and has no duplicates
//! - every vote's option is one of `options`
//! - votes are appended only while the poll is open
//! - once closed, a poll never reopens

use serde::{Deserialize, Serialize};
use super::ids::{PollId, UserId};
use super::policy::VotePolicy;
use super::state::PollState;
use super::tally::Tally;
use super::validation::{PollDraft, first_duplicate};
use crate::error::PollError;

/// One accepted ballot.
///
/// Field names on the wire follow the original ledger payload
/// (`selectedOption` / `voteBy`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "selectedOption")]
    pub option: String,
    #[serde(rename = "voteBy")]
    pub user: UserId,
}

impl Vote {
    pub fn new(option: impl Into<String>, user: UserId) -> Self {
        Self {
            option: option.into(),
            user,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    id: PollId,
    title: String,
    question: String,
    is_open: bool,
    max_votes: u32,
    options: Vec<String>,
    votes: Vec<Vote>,
    owner: UserId,
}

impl Poll {
    /// Open a new poll from a validated draft.
    pub fn open(draft: PollDraft, owner: UserId) -> Self {
        Self {
            id: draft.id,
            title: draft.title,
            question: draft.question,
            is_open: true,
            max_votes: draft.max_votes,
            options: draft.options,
            votes: Vec::new(),
            owner,
        }
    }

    /// Rebuild a poll from stored fields, rejecting anything that breaks
    /// the aggregate invariants.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: String,
        title: String,
        question: String,
        is_open: bool,
        max_votes: u32,
        options: Vec<String>,
        votes: Vec<Vote>,
        owner: UserId,
    ) -> Result<Self, String> {
        let id = PollId::parse(id).map_err(|_| "poll id is empty".to_string())?;
        if max_votes == 0 {
            return Err(format!("poll {id} has maxVotes 0"));
        }
        if options.is_empty() {
            return Err(format!("poll {id} has no options"));
        }
        if let Some(dup) = first_duplicate(&options) {
            return Err(format!("poll {id} has duplicate option {dup:?}"));
        }
        if let Some(stray) = votes.iter().find(|v| !options.contains(&v.option)) {
            return Err(format!(
                "poll {id} has a vote for unknown option {:?}",
                stray.option
            ));
        }
        Ok(Self {
            id,
            title,
            question,
            is_open,
            max_votes,
            options,
            votes,
            owner,
        })
    }

    pub fn id(&self) -> &PollId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn max_votes(&self) -> u32 {
        self.max_votes
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn state(&self) -> PollState {
        PollState::from_open_flag(self.is_open)
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    pub fn has_voted(&self, user: &UserId) -> bool {
        self.votes.iter().any(|v| &v.user == user)
    }

    /// Derived per-option counts, in `options` order.
    pub fn tally(&self) -> Tally {
        Tally::count(&self.options, &self.votes)
    }

    /// Check that `option` could be voted for right now, without touching state.
    ///
    /// Closed polls are rejected before the option is looked at.
    pub fn ensure_accepts(&self, option: &str) -> Result<(), PollError> {
        if !self.state().accepts_votes() {
            return Err(PollError::PollClosed(self.id.clone()));
        }
        if !self.has_option(option) {
            return Err(PollError::InvalidOption {
                poll: self.id.clone(),
                option: option.to_string(),
            });
        }
        Ok(())
    }

    /// Append a vote for `user`. On error the poll is left unchanged.
    pub fn cast(&mut self, option: &str, user: UserId, policy: &VotePolicy) -> Result<(), PollError> {
        self.ensure_accepts(option)?;
        policy.check(self, &user)?;
        self.votes.push(Vote::new(option, user));
        Ok(())
    }

    /// Close the poll. Only the owner may close, and only once.
    pub fn close(&mut self, by: &UserId) -> Result<(), PollError> {
        if by != &self.owner {
            return Err(PollError::Forbidden {
                poll: self.id.clone(),
                user: by.clone(),
                action: "close",
            });
        }
        let next = self.state().close(&self.id)?;
        self.is_open = next.accepts_votes();
        Ok(())
    }
}
