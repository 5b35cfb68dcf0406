//! Domain identifiers (strongly-typed IDs).
//!
//! `PollId` は Ledger のキーそのもの。呼び出し側が任意の文字列を指定できるが、
//! 空文字列（空白のみを含む）は受け付けない。
//!
//! `UserId` は IdentityResolver が返す投票者・作成者の識別子。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

use crate::error::PollError;

/// PollId を生成するときのプレフィックス
const GENERATED_PREFIX: &str = "poll-";

/// Identifier of a Poll (also its ledger key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollId(String);

impl PollId {
    /// 文字列から PollId を作成（空・空白のみは InvalidArgument）
    pub fn parse(raw: impl Into<String>) -> Result<Self, PollError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(PollError::invalid("poll id must not be empty"));
        }
        Ok(Self(raw))
    }

    /// ULID ベースの新しい PollId を生成
    ///
    /// 時刻でソート可能なので、CLI などで id を省略したときに使う。
    pub fn generate() -> Self {
        Self(format!("{GENERATED_PREFIX}{}", Ulid::new().to_string().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PollId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity of a voter or poll owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for UserId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
