//! FixedIdentity - 認証の無い環境向けの IdentityResolver

use async_trait::async_trait;

use crate::domain::UserId;
use crate::ports::{IdentityError, IdentityResolver};

/// 認証なしの構成で使う既定のユーザー
pub const DEFAULT_OWNER: &str = "admin";

/// FixedIdentity は常に同じ UserId を返す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedIdentity {
    user: UserId,
}

impl FixedIdentity {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self { user: user.into() }
    }
}

impl Default for FixedIdentity {
    fn default() -> Self {
        Self::new(UserId::new(DEFAULT_OWNER))
    }
}

#[async_trait]
impl IdentityResolver for FixedIdentity {
    async fn current_user(&self) -> Result<UserId, IdentityError> {
        Ok(self.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_is_admin() {
        let identity = FixedIdentity::default();
        assert_eq!(identity.current_user().await.unwrap(), UserId::new("admin"));
    }

    #[tokio::test]
    async fn returns_the_configured_user() {
        let identity = FixedIdentity::new("alice");
        assert_eq!(identity.current_user().await.unwrap().as_str(), "alice");
    }
}
