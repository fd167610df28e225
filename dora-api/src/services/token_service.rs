use jsonwebtoken::{encode, EncodingKey, Header};

use dora_shared::errors::AppError;
use dora_shared::types::auth::Claims;

pub fn create_access_token(
    username: &str,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let claims = Claims::new(username, ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}
