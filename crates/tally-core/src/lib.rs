//! tally-core
//!
//! Poll の状態遷移エンジン。単一キーの get/put しか持たない Ledger の上で、
//! poll の作成・投票・締切・集計を整合性を保ったまま行う。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, poll, state, tally, policy, validation）
//! - **codec**: Poll と ledger payload（JSON bytes）の相互変換
//! - **ports**: 抽象化レイヤー（Ledger, IdentityResolver）
//! - **impls**: 実装（InMemoryLedger, FixedIdentity など開発用）
//! - **app**: アプリケーションロジック（engine, key_lock, dispatch, builder）
//! - **config**: EngineConfig（既定の owner, 最小選択肢数, VotePolicy）
//! - **error**: PollError と ErrorKind

pub mod app;
pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use app::{EngineBuilder, PollEngine};
pub use config::EngineConfig;
pub use error::{ErrorKind, PollError};
