//! Ledger port - poll の永続化先（key-value）
//!
//! キーは poll id、値は PollCodec が作る bytes。
//!
//! # 制約
//! - 複数キーにまたがるトランザクションは無い
//! - compare-and-swap も無い（排他は app::key_lock が担う）
//! - `get` で「キーが無い」は `Ok(None)`。エラーではない

use async_trait::async_trait;
use thiserror::Error;

/// LedgerError は Ledger 実装の I/O エラー
///
/// engine はこれをそのまま呼び出し側に返す（リトライしない）。
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger read failed for key={key}: {message}")]
    Read { key: String, message: String },

    #[error("ledger write failed for key={key}: {message}")]
    Write { key: String, message: String },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Ledger は単一キーの get/put を提供
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから共有される）
#[async_trait]
pub trait Ledger: Send + Sync {
    /// キーの現在値を取得（無ければ None）
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// キーに値を書き込む（上書き）
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;
}
