//! PollEngine - poll の状態遷移エンジン
//!
//! # 変更系（create / vote / close）
//! 1. 引数を検証（ledger に触る前）
//! 2. poll id の KeyedLock を取得
//! 3. Ledger から読む → PollCodec で decode
//! 4. Poll に遷移を適用（失敗したら何も書かない）
//! 5. encode → Ledger に put
//! 6. ロック解放
//!
//! 2〜6 は `tokio::spawn` したタスクで走る。呼び出し側の future が
//! drop されても途中で止まらず、put まで終わるか、何も書かずに終わる。
//! 呼び出し側が保持中のキーはそのタスクに引き継ぐので、同じ poll への
//! 入れ子の変更はデッドロックせず `ReentrantLock` になる。
//!
//! # 参照系（get_poll / get_votes / get_vote_counts）
//! ロックを取らずに 1 回 get するだけ。単一キーの read は write に対して
//! 原子的なので、どこかのコミット時点のスナップショットが見える。

use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, debug, info, instrument, warn};

use super::key_lock::KeyedLock;
use crate::codec::PollCodec;
use crate::config::EngineConfig;
use crate::domain::{CreatePollRequest, Poll, PollDraft, PollId, Tally, Vote};
use crate::error::PollError;
use crate::ports::{IdentityResolver, Ledger};

/// PollEngine は Ledger / IdentityResolver / PollCodec を束ねた操作の入口
///
/// `Clone` は安価（内部は Arc）。リクエストごとに clone してタスクへ渡せる。
///
/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new(EngineConfig::default())
///     .ledger(InMemoryLedger::new())
///     .build()?;
/// engine.create_poll(CreatePollRequest::new("p1", "T", "Q?", "100", ["A", "B"])).await?;
/// engine.cast_vote("p1", "A").await?;
/// let tally = engine.get_vote_counts("p1").await?;
/// ```
#[derive(Clone)]
pub struct PollEngine {
    inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    ledger: Arc<dyn Ledger>,
    identity: Arc<dyn IdentityResolver>,
    codec: Arc<dyn PollCodec>,
    locks: KeyedLock,
    config: EngineConfig,
}

impl PollEngine {
    pub(crate) fn new(
        ledger: Arc<dyn Ledger>,
        identity: Arc<dyn IdentityResolver>,
        codec: Arc<dyn PollCodec>,
        config: EngineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                ledger,
                identity,
                codec,
                locks: KeyedLock::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// 新しい poll を作成
    ///
    /// # Errors
    /// - InvalidArgument: id / options / maxVotes が不正
    /// - AlreadyExists: 同じキーに poll がある
    /// - Decode: 既存 payload が壊れている
    /// - Storage / Identity: 外部の失敗（そのまま返す）
    #[instrument(skip(self, request), fields(poll = %request.id))]
    pub async fn create_poll(&self, request: CreatePollRequest) -> Result<(), PollError> {
        let draft = request.validate(self.inner.config.min_options)?;
        let id = draft.id.clone();
        self.exclusive(&id, move |inner| async move { inner.create(draft).await })
            .await
    }

    /// 投票を 1 件追加
    ///
    /// # Errors
    /// - NotFound / PollClosed / InvalidOption
    /// - PolicyViolation: VotePolicy による拒否
    /// - Decode / Storage / Identity
    #[instrument(skip(self))]
    pub async fn cast_vote(&self, id: &str, option: &str) -> Result<(), PollError> {
        let id = PollId::parse(id)?;
        let option = option.to_string();
        let key = id.clone();
        self.exclusive(&key, move |inner| async move { inner.vote(id, option).await })
            .await
    }

    /// poll を締め切る（owner のみ、一度だけ）
    #[instrument(skip(self))]
    pub async fn close_poll(&self, id: &str) -> Result<(), PollError> {
        let id = PollId::parse(id)?;
        let key = id.clone();
        self.exclusive(&key, move |inner| async move { inner.close(id).await })
            .await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_poll(&self, id: &str) -> Result<Poll, PollError> {
        let id = PollId::parse(id)?;
        self.inner.load_existing(&id).await
    }

    pub async fn get_votes(&self, id: &str) -> Result<Vec<Vote>, PollError> {
        Ok(self.get_poll(id).await?.votes().to_vec())
    }

    pub async fn get_vote_counts(&self, id: &str) -> Result<Tally, PollError> {
        Ok(self.get_poll(id).await?.tally())
    }

    /// `id` のロックを取って `section` を別タスクで実行
    async fn exclusive<F, Fut>(&self, id: &PollId, section: F) -> Result<(), PollError>
    where
        F: FnOnce(Arc<EngineInner>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), PollError>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let key = id.as_str().to_string();
        let task = tokio::spawn(
            KeyedLock::inherit_held(async move {
                let work = section(Arc::clone(&inner));
                inner.locks.with_lock(&key, work).await
            })
            .in_current_span(),
        );
        task.await
            .map_err(|e| PollError::Aborted(format!("poll task failed: {e}")))?
    }
}

impl EngineInner {
    async fn load(&self, id: &PollId) -> Result<Option<Poll>, PollError> {
        let Some(bytes) = self.ledger.get(id.as_str()).await? else {
            return Ok(None);
        };
        match self.codec.decode(&bytes) {
            Ok(poll) => Ok(Some(poll)),
            Err(source) => {
                warn!(poll = %id, error = %source, "stored poll payload is unreadable");
                Err(PollError::Decode {
                    poll: id.clone(),
                    source,
                })
            }
        }
    }

    /// 保存済み poll を取得。キーが無い、または保存済み id が一致しなければ NotFound
    async fn load_existing(&self, id: &PollId) -> Result<Poll, PollError> {
        match self.load(id).await? {
            Some(poll) if poll.id() == id => Ok(poll),
            _ => Err(PollError::NotFound(id.clone())),
        }
    }

    async fn store(&self, poll: &Poll) -> Result<(), PollError> {
        let bytes = self.codec.encode(poll).map_err(PollError::Encode)?;
        self.ledger.put(poll.id().as_str(), bytes).await?;
        Ok(())
    }

    async fn create(&self, draft: PollDraft) -> Result<(), PollError> {
        // キーが埋まっていれば（保存済み id が違っても）上書きしない
        if let Some(existing) = self.load(&draft.id).await? {
            debug!(stored_id = %existing.id(), "create rejected: key already in use");
            return Err(PollError::AlreadyExists(draft.id));
        }
        let owner = self.identity.current_user().await?;
        let poll = Poll::open(draft, owner);
        self.store(&poll).await?;
        info!(
            owner = %poll.owner(),
            options = poll.options().len(),
            max_votes = poll.max_votes(),
            "poll created"
        );
        Ok(())
    }

    async fn vote(&self, id: PollId, option: String) -> Result<(), PollError> {
        let mut poll = self.load_existing(&id).await?;
        poll.ensure_accepts(&option)?;
        let voter = self.identity.current_user().await?;
        poll.cast(&option, voter.clone(), &self.config.policy)?;
        self.store(&poll).await?;
        debug!(%voter, option = %option, total = poll.votes().len(), "vote recorded");
        Ok(())
    }

    async fn close(&self, id: PollId) -> Result<(), PollError> {
        let mut poll = self.load_existing(&id).await?;
        let caller = self.identity.current_user().await?;
        poll.close(&caller)?;
        self.store(&poll).await?;
        info!(by = %caller, votes = poll.votes().len(), "poll closed");
        Ok(())
    }
}
