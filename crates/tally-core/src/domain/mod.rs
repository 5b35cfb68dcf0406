//! Domain model (ids, poll aggregate, lifecycle, tally, policy, validation).
//!
//! ここには I/O を含めない。Ledger / Identity へのアクセスは app 層が行い、
//! domain は「この遷移は正しいか」だけを判断する。

pub mod ids;
pub mod policy;
pub mod poll;
pub mod state;
pub mod tally;
pub mod validation;

pub use ids::{PollId, UserId};
pub use policy::{DuplicateVotePolicy, MaxVotesPolicy, VotePolicy};
pub use poll::{Poll, Vote};
pub use state::PollState;
pub use tally::{Tally, VoteCount};
pub use validation::{CreatePollRequest, DEFAULT_MIN_OPTIONS, PollDraft};
