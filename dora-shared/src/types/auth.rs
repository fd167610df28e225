use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated account.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(username: impl Into<String>, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: username.into(),
            iat: now,
            exp: now + duration_secs,
            jti: Uuid::now_v7(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// The authenticated caller, as extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub token_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            token_id: claims.jti,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AccessToken {
    pub fn new(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_claims_are_not_expired() {
        let claims = Claims::new("ramona", 3600);
        assert!(!claims.is_expired());
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn negative_ttl_is_expired() {
        let claims = Claims::new("ramona", -10);
        assert!(claims.is_expired());
    }

    #[test]
    fn auth_user_carries_username_and_token_id() {
        let claims = Claims::new("ramona", 60);
        let jti = claims.jti;
        let user = AuthUser::from(claims);
        assert_eq!(user.username, "ramona");
        assert_eq!(user.token_id, jti);
    }

    #[test]
    fn access_token_is_bearer() {
        let token = AccessToken::new("abc".into(), 3600);
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
    }
}
