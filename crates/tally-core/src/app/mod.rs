//! App - アプリケーション層
//!
//! このモジュールは、ports と domain を組み合わせて poll の操作を実装します。
//!
//! # 主要コンポーネント
//! - **EngineBuilder**: エンジンの構築とワイヤリング
//! - **PollEngine**: create / vote / close / 参照の入口
//! - **KeyedLock**: poll id ごとの排他（read-modify-write の直列化）
//! - **Invocation / Query**: 関数名 + 文字列引数の呼び出し形式

pub mod builder;
pub mod dispatch;
pub mod engine;
pub mod key_lock;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, EngineBuilder};
pub use self::dispatch::{Invocation, Query};
pub use self::engine::PollEngine;
pub use self::key_lock::KeyedLock;
