//! # pb-auth-env
//!
//! Environment-backed implementation of `IdentityProvider`: a stand-in for
//! the site's external identity provider, for local sessions and tooling.
//! Real deployments would swap in a plugin that talks to the IdP.

use async_trait::async_trait;

use pb_core::{Author, Error, IdentityProvider, Result};

pub struct EnvIdentityProvider {
    identity: Option<Author>,
    token: Option<String>,
}

impl EnvIdentityProvider {
    /// Reads `PHONEBOARD_USER_ID`, `PHONEBOARD_USER_NAME`,
    /// `PHONEBOARD_USER_AVATAR`, and `PHONEBOARD_TOKEN`. Sessions without a
    /// user id are anonymous: reads work, mutations are rejected.
    pub fn from_env() -> Self {
        let identity = std::env::var("PHONEBOARD_USER_ID").ok().map(|id| Author {
            id,
            name: std::env::var("PHONEBOARD_USER_NAME").unwrap_or_else(|_| "You".into()),
            avatar: std::env::var("PHONEBOARD_USER_AVATAR").unwrap_or_default(),
        });

        Self {
            identity,
            token: std::env::var("PHONEBOARD_TOKEN").ok(),
        }
    }

    pub fn signed_in(identity: Author, token: impl Into<String>) -> Self {
        Self {
            identity: Some(identity),
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            identity: None,
            token: None,
        }
    }
}

#[async_trait]
impl IdentityProvider for EnvIdentityProvider {
    fn current_identity(&self) -> Option<Author> {
        self.identity.clone()
    }

    async fn bearer_token(&self) -> Result<String> {
        self.token
            .clone()
            .ok_or_else(|| Error::Unauthorized("no bearer token for this session".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_session_has_no_token() {
        let provider = EnvIdentityProvider::anonymous();
        assert!(provider.current_identity().is_none());
        assert!(matches!(
            provider.bearer_token().await,
            Err(Error::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_signed_in_session() {
        let provider = EnvIdentityProvider::signed_in(
            Author {
                id: "u1".into(),
                name: "Pat".into(),
                avatar: String::new(),
            },
            "token-123",
        );
        assert_eq!(provider.current_identity().unwrap().id, "u1");
        assert_eq!(provider.bearer_token().await.unwrap(), "token-123");
    }
}
