//! InMemoryLedger - 開発用の Ledger
//!
//! # 学習ポイント
//! - tokio::sync::Mutex による単一キー操作の原子性
//! - latency を入れて read-modify-write の競合窓を広げる（並行テスト用）

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::ports::{Ledger, LedgerError};

/// InMemoryLedger は開発用の Ledger
///
/// # 実装詳細
/// - HashMap<String, Vec<u8>> を Mutex で保護
/// - get/put はそれぞれ 1 回のロックで完結する（キー単位で linearizable）
/// - get と put の間に排他は無い。それは呼び出し側（KeyedLock）の責務
///
/// # 使用例
/// ```ignore
/// let ledger = InMemoryLedger::new();
/// ledger.put("p1", bytes).await?;
/// let bytes = ledger.get("p1").await?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    /// get/put ごとに挟む待ち時間
    latency: Option<Duration>,
}

impl InMemoryLedger {
    /// 新しい InMemoryLedger を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// get/put のたびに `latency` だけ待つ Ledger を作成
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.pause().await;
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.pause().await;
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.get("nope").await.unwrap(), None);
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let ledger = InMemoryLedger::new();
        ledger.put("p1", b"hello".to_vec()).await.unwrap();

        assert_eq!(ledger.get("p1").await.unwrap(), Some(b"hello".to_vec()));
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let ledger = InMemoryLedger::new();
        ledger.put("p1", b"v1".to_vec()).await.unwrap();
        ledger.put("p1", b"v2".to_vec()).await.unwrap();

        assert_eq!(ledger.get("p1").await.unwrap(), Some(b"v2".to_vec()));
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let ledger = InMemoryLedger::new();
        ledger.put("p1", b"one".to_vec()).await.unwrap();
        ledger.put("p2", b"two".to_vec()).await.unwrap();

        assert_eq!(ledger.get("p1").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(ledger.get("p2").await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_latency_is_applied() {
        let ledger = InMemoryLedger::with_latency(Duration::from_millis(50));
        let start = Instant::now();
        ledger.put("p1", b"x".to_vec()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let ledger = InMemoryLedger::new();
        let other = ledger.clone();
        other.put("p1", b"shared".to_vec()).await.unwrap();

        assert_eq!(ledger.get("p1").await.unwrap(), Some(b"shared".to_vec()));
    }
}
