//! FileLedger - ディレクトリに 1 キー 1 ファイルで保存する Ledger
//!
//! CLI はプロセスごとに終了するので、状態はファイルに残す。
//!
//! # 実装詳細
//! - ファイル名はキーの hex（任意の poll id を安全にファイル名にする）
//! - put は一意な一時ファイルに書いてから rename（読み手に書きかけを見せない）
//!
//! # 複数プロセス
//! engine の KeyedLock はプロセス内でしか効かない。そのため `open` は
//! `<root>/.lock` の排他ロックを取り、FileLedger が drop されるまで保持する。
//! 同じディレクトリを開く 2 つ目のプロセス（または 2 つ目の FileLedger）は
//! 先の FileLedger が閉じるまで `open` で待つ。書き手は常に 1 つ。

use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use ulid::Ulid;

use tally_core::ports::{Ledger, LedgerError};

const LOCK_FILE: &str = ".lock";

pub struct FileLedger {
    root: PathBuf,
    /// 保持している間ディレクトリを排他（drop で解放）
    _dir_lock: File,
}

impl FileLedger {
    /// `root` を作成し、ディレクトリの排他ロックを取ってから FileLedger を返す
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let root = root.as_ref().to_path_buf();
        let lock_root = root.clone();
        let dir_lock = tokio::task::spawn_blocking(move || lock_dir(&lock_root))
            .await
            .map_err(|e| LedgerError::Unavailable(format!("lock task failed: {e}")))??;
        Ok(Self {
            root,
            _dir_lock: dir_lock,
        })
    }

    fn file_stem(key: &str) -> String {
        key.bytes().map(|b| format!("{b:02x}")).collect()
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", Self::file_stem(key)))
    }

    /// put ごとに別名（pid + ULID）。同時の put が互いの一時ファイルを壊さない
    fn tmp_path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!(
            "{}.json.{}-{}.tmp",
            Self::file_stem(key),
            std::process::id(),
            Ulid::new()
        ))
    }
}

/// ディレクトリを作って `.lock` を排他ロック（取れるまでブロック）
fn lock_dir(root: &Path) -> Result<File, LedgerError> {
    let unavailable = |what: &str, e: std::io::Error| {
        LedgerError::Unavailable(format!("cannot {what} {}: {e}", root.display()))
    };
    std::fs::create_dir_all(root).map_err(|e| unavailable("create", e))?;
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(root.join(LOCK_FILE))
        .map_err(|e| unavailable("open lock file in", e))?;
    file.lock().map_err(|e| unavailable("lock", e))?;
    Ok(file)
}

#[async_trait]
impl Ledger for FileLedger {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LedgerError::Read {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        let path = self.path_for(key);
        let tmp = self.tmp_path_for(key);
        let write_err = |e: std::io::Error| LedgerError::Write {
            key: key.to_string(),
            message: e.to_string(),
        };
        if let Err(e) = tokio::fs::write(&tmp, &value).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tally_core::domain::CreatePollRequest;
    use tally_core::{EngineBuilder, EngineConfig, PollEngine};

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tally-cli-{name}-{}-{}", std::process::id(), Ulid::new()))
    }

    fn engine_over(ledger: FileLedger) -> PollEngine {
        EngineBuilder::new(EngineConfig::default())
            .ledger(ledger)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let dir = scratch_dir("missing");
        let ledger = FileLedger::open(&dir).await.unwrap();
        assert_eq!(ledger.get("nope").await.unwrap(), None);
        drop(ledger);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn put_then_get() {
        let dir = scratch_dir("roundtrip");
        let ledger = FileLedger::open(&dir).await.unwrap();
        ledger.put("p1", b"{}".to_vec()).await.unwrap();
        ledger.put("p1", b"{\"v\":2}".to_vec()).await.unwrap();
        assert_eq!(ledger.get("p1").await.unwrap(), Some(b"{\"v\":2}".to_vec()));
        drop(ledger);

        // 閉じた後は別インスタンスからも見える
        let reopened = FileLedger::open(&dir).await.unwrap();
        assert_eq!(reopened.get("p1").await.unwrap(), Some(b"{\"v\":2}".to_vec()));
        drop(reopened);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn keys_with_path_characters_stay_inside_root() {
        let dir = scratch_dir("escape");
        let ledger = FileLedger::open(&dir).await.unwrap();
        ledger.put("../outside", b"x".to_vec()).await.unwrap();

        assert!(ledger.path_for("../outside").starts_with(&dir));
        assert_eq!(ledger.get("../outside").await.unwrap(), Some(b"x".to_vec()));
        drop(ledger);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_never_share_a_temp_file() {
        let dir = scratch_dir("tmp-race");
        let ledger = Arc::new(FileLedger::open(&dir).await.unwrap());

        let mut tasks = Vec::new();
        for i in 0..32 {
            let ledger = ledger.clone();
            tasks.push(tokio::spawn(async move {
                let value = format!("{{\"writer\":{i},\"pad\":\"{}\"}}", "x".repeat(4096));
                ledger.put("p1", value.into_bytes()).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // 最後に残るのはどれか 1 つの書き込みの全体
        let stored = ledger.get("p1").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&stored).unwrap();
        assert!(value["writer"].as_u64().unwrap() < 32);
        assert_eq!(value["pad"].as_str().unwrap().len(), 4096);

        // 一時ファイルは残らない
        let leftovers = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
        drop(ledger);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn second_engine_on_same_dir_waits_and_loses_no_votes() {
        let dir = scratch_dir("two-engines");
        let first = engine_over(FileLedger::open(&dir).await.unwrap());
        first
            .create_poll(CreatePollRequest::new("p1", "T", "Q?", "100", ["A", "B"]))
            .await
            .unwrap();

        // 2 つ目の open は first が閉じるまで進まない
        let mut second_open = tokio::spawn({
            let dir = dir.clone();
            async move { FileLedger::open(dir).await }
        });
        assert!(
            tokio::time::timeout(Duration::from_millis(200), &mut second_open)
                .await
                .is_err()
        );

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let engine = first.clone();
            tasks.push(tokio::spawn(async move { engine.cast_vote("p1", "A").await }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        drop(first);

        let second = engine_over(second_open.await.unwrap().unwrap());
        let mut tasks = Vec::new();
        for _ in 0..20 {
            let engine = second.clone();
            tasks.push(tokio::spawn(async move { engine.cast_vote("p1", "A").await }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(second.get_votes("p1").await.unwrap().len(), 40);
        drop(second);
        let _ = std::fs::remove_dir_all(dir);
    }
}
