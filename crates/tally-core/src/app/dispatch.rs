//! Dispatch - 関数名 + 文字列引数の呼び出しを PollEngine にマッピング
//!
//! ledger 上の chaincode と同じ形の入口:
//!
//! | 種類 | function | args |
//! |---|---|---|
//! | invoke | `createPoll` | id, title, question, maxVotes, option1, option2, ... |
//! | invoke | `vote` | id, option |
//! | invoke | `closePoll` | id |
//! | query | `getPoll` | id |
//! | query | `getVotes` | id |
//! | query | `getVoteCount` | id |
//!
//! createPoll の選択肢数の下限は `EngineConfig::min_options`（既定 2）に従う。
//! invoke は成功時に payload を返さない。query は JSON bytes を返す。

use std::fmt;
use tracing::debug;

use super::engine::PollEngine;
use crate::codec::CodecError;
use crate::domain::CreatePollRequest;
use crate::error::PollError;

/// createPoll の選択肢より前の引数（id, title, question, maxVotes）
const CREATE_POLL_HEADER_ARGS: usize = 4;

/// 状態を変える呼び出し
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    CreatePoll(CreatePollRequest),
    Vote { id: String, option: String },
    ClosePoll { id: String },
}

/// 読み取りだけの呼び出し
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Poll { id: String },
    Votes { id: String },
    VoteCount { id: String },
}

impl Invocation {
    /// `min_options` は createPoll が要求する選択肢の数
    pub fn parse(function: &str, args: &[String], min_options: usize) -> Result<Self, PollError> {
        match function {
            "createPoll" => {
                let min_args = CREATE_POLL_HEADER_ARGS + min_options;
                if args.len() < min_args {
                    return Err(PollError::invalid(format!(
                        "createPoll needs at least {min_args} arguments: \
                         id, title, question, maxVotes, option1, option2, ... (got {})",
                        args.len()
                    )));
                }
                Ok(Invocation::CreatePoll(CreatePollRequest::new(
                    args[0].clone(),
                    args[1].clone(),
                    args[2].clone(),
                    args[3].clone(),
                    args[CREATE_POLL_HEADER_ARGS..].iter().cloned(),
                )))
            }
            "vote" => match args {
                [id, option] => Ok(Invocation::Vote {
                    id: id.clone(),
                    option: option.clone(),
                }),
                _ => Err(arity("vote", "id, option", args.len())),
            },
            "closePoll" => match args {
                [id] => Ok(Invocation::ClosePoll { id: id.clone() }),
                _ => Err(arity("closePoll", "id", args.len())),
            },
            other => Err(unknown("invoke", other)),
        }
    }
}

impl Query {
    pub fn parse(function: &str, args: &[String]) -> Result<Self, PollError> {
        let id = |name: &str| match args {
            [id] => Ok(id.clone()),
            _ => Err(arity(name, "id", args.len())),
        };
        match function {
            "getPoll" => Ok(Query::Poll { id: id(function)? }),
            "getVotes" => Ok(Query::Votes { id: id(function)? }),
            "getVoteCount" => Ok(Query::VoteCount { id: id(function)? }),
            other => Err(unknown("query", other)),
        }
    }
}

fn arity(function: &str, expected: &str, got: usize) -> PollError {
    PollError::invalid(format!(
        "{function} expects arguments: {expected} (got {got})"
    ))
}

fn unknown(kind: impl fmt::Display, function: &str) -> PollError {
    PollError::invalid(format!("unknown {kind} function: {function:?}"))
}

impl PollEngine {
    /// 状態を変える呼び出しを実行
    pub async fn invoke(&self, function: &str, args: &[String]) -> Result<(), PollError> {
        debug!(function, args = args.len(), "invoke");
        match Invocation::parse(function, args, self.config().min_options)? {
            Invocation::CreatePoll(request) => self.create_poll(request).await,
            Invocation::Vote { id, option } => self.cast_vote(&id, &option).await,
            Invocation::ClosePoll { id } => self.close_poll(&id).await,
        }
    }

    /// 読み取り呼び出しを実行して JSON bytes を返す
    pub async fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>, PollError> {
        debug!(function, args = args.len(), "query");
        let encoded = match Query::parse(function, args)? {
            Query::Poll { id } => serde_json::to_vec(&self.get_poll(&id).await?),
            Query::Votes { id } => serde_json::to_vec(&self.get_votes(&id).await?),
            Query::VoteCount { id } => serde_json::to_vec(&self.get_vote_counts(&id).await?),
        };
        encoded.map_err(|e| PollError::Encode(CodecError::from(e)))
    }
}
