//! Ports - 抽象化レイヤー
//!
//! engine が外部システムに触れるのはこの 2 つの trait だけ。
//!
//! # 設計原則
//! - Ledger は単一キーの get/put のみ（トランザクション・CAS なし）
//! - Ledger はキー単位で linearizable と仮定する
//! - 現在のユーザーはグローバルではなく IdentityResolver から注入する

pub mod identity;
pub mod ledger;

// 主要な trait を再エクスポート
pub use self::identity::{IdentityError, IdentityResolver};
pub use self::ledger::{Ledger, LedgerError};
