//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryLedger**: プロセス内の Ledger（テスト・デモ用）
//! - **FixedIdentity**: 常に同じユーザーを返す IdentityResolver
//!
//! 本番用の Ledger（ファイル、KV ストア、分散台帳など）は利用側のクレートに置く。
//! 例: `tally-cli` の FileLedger

pub mod fixed_identity;
pub mod inmem_ledger;

// 主要な型を再エクスポート
pub use self::fixed_identity::{DEFAULT_OWNER, FixedIdentity};
pub use self::inmem_ledger::InMemoryLedger;
