use thiserror::Error;

use crate::codec::CodecError;
use crate::domain::{PollId, UserId};
use crate::ports::{IdentityError, LedgerError};

/// ErrorKind は PollError の分類
///
/// transport 層は kind だけを見てレスポンスを決められる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// リクエストの形が不正（id 空、options 不足・重複、maxVotes 非数値）
    InvalidArgument,
    AlreadyExists,
    NotFound,
    PollClosed,
    InvalidOption,
    /// 保存済み payload が読めない（データ破損）
    Decode,
    /// Ledger の I/O 失敗（core はリトライしない）
    Storage,
    Identity,
    Forbidden,
    /// VotePolicy による拒否（重複投票・上限到達）
    PolicyViolation,
    Internal,
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("poll already exists: id={0}")]
    AlreadyExists(PollId),

    #[error("poll not found: id={0}")]
    NotFound(PollId),

    #[error("poll is closed: id={0}")]
    PollClosed(PollId),

    #[error("not a valid option for poll {poll}: {option:?}")]
    InvalidOption { poll: PollId, option: String },

    #[error("stored payload for poll {poll} is unreadable")]
    Decode {
        poll: PollId,
        #[source]
        source: CodecError,
    },

    #[error("failed to encode poll payload")]
    Encode(#[source] CodecError),

    #[error(transparent)]
    Storage(#[from] LedgerError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("user {user} may not {action} poll {poll}")]
    Forbidden {
        poll: PollId,
        user: UserId,
        action: &'static str,
    },

    #[error("user {user} already voted on poll {poll}")]
    AlreadyVoted { poll: PollId, user: UserId },

    #[error("poll {poll} reached its vote limit of {max_votes}")]
    MaxVotesReached { poll: PollId, max_votes: u32 },

    #[error("lock for key={0} is already held by this operation")]
    ReentrantLock(String),

    #[error("critical section aborted: {0}")]
    Aborted(String),
}

impl PollError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PollError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PollError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            PollError::NotFound(_) => ErrorKind::NotFound,
            PollError::PollClosed(_) => ErrorKind::PollClosed,
            PollError::InvalidOption { .. } => ErrorKind::InvalidOption,
            PollError::Decode { .. } => ErrorKind::Decode,
            PollError::Storage(_) => ErrorKind::Storage,
            PollError::Identity(_) => ErrorKind::Identity,
            PollError::Forbidden { .. } => ErrorKind::Forbidden,
            PollError::AlreadyVoted { .. } | PollError::MaxVotesReached { .. } => {
                ErrorKind::PolicyViolation
            }
            PollError::Encode(_) | PollError::ReentrantLock(_) | PollError::Aborted(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PollError::InvalidArgument(message.into())
    }
}
