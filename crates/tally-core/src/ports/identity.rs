//! IdentityResolver port - 現在のユーザーの解決
//!
//! 認証の仕組みは core の外にある。core は「この操作をしているのは誰か」
//! だけを聞く。認証の無い環境では FixedIdentity（固定の sentinel）を使う。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::UserId;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("could not resolve current user: {0}")]
    Unresolved(String),
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn current_user(&self) -> Result<UserId, IdentityError>;
}
