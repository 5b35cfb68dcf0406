//! KeyedLock - poll id ごとの排他（Per-Key Serializer）
//!
//! Ledger には CAS もトランザクションも無いので、read-modify-write の
//! 原子性はここで作る。
//!
//! # 保証
//! - 同じキーの `with_lock` は同時に 1 つしか走らない
//! - 異なるキーは互いをブロックしない
//! - 待ち手は tokio::sync::Mutex の FIFO 順で入る（= 投票のコミット順）
//!
//! # 再入
//! 再入は**禁止**。同じタスク内で同じキーを二重に取ろうとすると
//! デッドロックせずに `PollError::ReentrantLock` を返す。
//! 保持中のキーは task-local に載せている。`tokio::spawn` した別タスクには
//! 引き継がれないので、保持中の区間から spawn する側は `inherit_held` で
//! 包んでから渡す（PollEngine はすべての区間をそうしている）。
//!
//! # 学習ポイント
//! - Weak 参照でエントリを持ち、保持者・待ち手がいなくなったら掃除する
//! - std::sync::Mutex はマップ操作の間だけ握り、await をまたがない

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};
use tokio::sync::Mutex;

use crate::error::PollError;

tokio::task_local! {
    /// 現在のタスクが保持しているキー
    static HELD_KEYS: HashSet<String>;
}

#[derive(Debug, Default)]
pub struct KeyedLock {
    slots: StdMutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// `key` の Mutex を取得（無ければ作る）
    fn slot(&self, key: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get(key).and_then(Weak::upgrade) {
            return slot;
        }
        // 誰も使っていないエントリを掃除してから登録
        slots.retain(|_, weak| weak.strong_count() > 0);
        let slot = Arc::new(Mutex::new(()));
        slots.insert(key.to_string(), Arc::downgrade(&slot));
        slot
    }

    /// `key` を排他して `section` を実行
    pub async fn with_lock<F, T>(&self, key: &str, section: F) -> Result<T, PollError>
    where
        F: Future<Output = Result<T, PollError>>,
    {
        let mut held = HELD_KEYS.try_with(|keys| keys.clone()).unwrap_or_default();
        if held.contains(key) {
            return Err(PollError::ReentrantLock(key.to_string()));
        }

        let slot = self.slot(key);
        let _guard = slot.lock().await;
        held.insert(key.to_string());
        HELD_KEYS.scope(held, section).await
    }

    /// 現在のタスクが保持しているキーを `future` に引き継ぐ
    ///
    /// 呼び出した時点の保持キーを写し取る。`tokio::spawn` する前に使う。
    pub fn inherit_held<F: Future>(future: F) -> impl Future<Output = F::Output> {
        let held = HELD_KEYS.try_with(|keys| keys.clone()).unwrap_or_default();
        HELD_KEYS.scope(held, future)
    }

    /// 保持者か待ち手がいるキーの数
    #[cfg(test)]
    fn active_keys(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|weak| weak.strong_count() > 0).count()
    }
}
