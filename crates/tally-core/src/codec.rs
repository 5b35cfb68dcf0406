//! PollCodec - Poll と Ledger payload（bytes）の相互変換
//!
//! # デシリアライズフロー
//! 1. Ledger から bytes を取得（キーが無ければ codec は呼ばれない）
//! 2. serde_json で PollDocument にデシリアライズ
//! 3. Poll::restore で不変条件を検証
//!
//! 2 か 3 で失敗したら CodecError。中途半端な Poll は返さない。
//!
//! # フォーマット
//! 既存 ledger の JSON と互換:
//! `{"id","title","question","isOpen","maxVotes","options","votes":[{"selectedOption","voteBy"}],"owner"}`

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Poll, UserId, Vote};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("payload is empty")]
    Empty,

    #[error("payload is not a poll document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("payload violates poll invariants: {0}")]
    Invariant(String),
}

/// PollCodec は Poll を ledger 用の bytes に変換
///
/// `decode(encode(p)) == p` がすべての有効な Poll で成り立つこと。
pub trait PollCodec: Send + Sync {
    fn encode(&self, poll: &Poll) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<Poll, CodecError>;
}

/// 保存形式そのままの受け皿
///
/// `votes` は旧データで `null` になっていることがあるので Option で受ける。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PollDocument {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    question: String,
    is_open: bool,
    max_votes: u32,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    votes: Option<Vec<Vote>>,
    owner: UserId,
}

/// JSON 実装（デフォルト）
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPollCodec;

impl JsonPollCodec {
    pub fn new() -> Self {
        Self
    }
}

impl PollCodec for JsonPollCodec {
    fn encode(&self, poll: &Poll) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(poll)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Poll, CodecError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(CodecError::Empty);
        }
        let doc: PollDocument = serde_json::from_slice(bytes)?;
        Poll::restore(
            doc.id,
            doc.title,
            doc.question,
            doc.is_open,
            doc.max_votes,
            doc.options.unwrap_or_default(),
            doc.votes.unwrap_or_default(),
            doc.owner,
        )
        .map_err(CodecError::Invariant)
    }
}
