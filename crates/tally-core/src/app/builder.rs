//! EngineBuilder - PollEngine の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - trait object（Arc<dyn Ledger>）への差し替え

use std::sync::Arc;

use super::engine::PollEngine;
use crate::codec::{JsonPollCodec, PollCodec};
use crate::config::{ConfigError, EngineConfig};
use crate::impls::FixedIdentity;
use crate::ports::{IdentityResolver, Ledger};

/// EngineBuilder は PollEngine を構築
///
/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new(config)
///     .ledger(InMemoryLedger::new())
///     .identity(FixedIdentity::new("alice"))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - Ledger は必須（既定値を持たない）
/// - IdentityResolver 省略時は `FixedIdentity(config.default_owner)`
/// - PollCodec 省略時は `JsonPollCodec`
/// - build() 時に EngineConfig を検証
pub struct EngineBuilder {
    config: EngineConfig,
    ledger: Option<Arc<dyn Ledger>>,
    identity: Option<Arc<dyn IdentityResolver>>,
    codec: Option<Arc<dyn PollCodec>>,
}

/// BuildError はエンジン構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No ledger configured. Call .ledger(..) before .build().")]
    MissingLedger,

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ledger: None,
            identity: None,
            codec: None,
        }
    }

    pub fn ledger<L: Ledger + 'static>(self, ledger: L) -> Self {
        self.ledger_arc(Arc::new(ledger))
    }

    /// 他と共有している Ledger を渡す
    pub fn ledger_arc(mut self, ledger: Arc<dyn Ledger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn identity<I: IdentityResolver + 'static>(self, identity: I) -> Self {
        self.identity_arc(Arc::new(identity))
    }

    pub fn identity_arc(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn codec<C: PollCodec + 'static>(mut self, codec: C) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    pub fn build(self) -> Result<PollEngine, BuildError> {
        self.config.validate()?;
        let ledger = self.ledger.ok_or(BuildError::MissingLedger)?;
        let identity = self.identity.unwrap_or_else(|| {
            Arc::new(FixedIdentity::new(self.config.default_owner.clone()))
        });
        let codec = self
            .codec
            .unwrap_or_else(|| Arc::new(JsonPollCodec::new()));
        Ok(PollEngine::new(ledger, identity, codec, self.config))
    }
}
