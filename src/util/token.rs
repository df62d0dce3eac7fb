use crate::model::token_claims::{Identity, TokenClaims, TokenDetails};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Error generating the token : {0}")]
    Generation(jsonwebtoken::errors::Error),
    #[error("Token has expired")]
    Expired,
    #[error("Token is invalid")]
    Malformed(jsonwebtoken::errors::Error),
}

pub fn generate_jwt_token(
    identity: &Identity,
    ttl: Duration,
    secret: &str,
) -> Result<TokenDetails, TokenError> {
    generate_jwt_token_at(identity, ttl, secret, Utc::now())
}

/// Issues a token as if it were minted at `issued_at`.
pub fn generate_jwt_token_at(
    identity: &Identity,
    ttl: Duration,
    secret: &str,
    issued_at: DateTime<Utc>,
) -> Result<TokenDetails, TokenError> {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(24));
    let expires_at = (issued_at + ttl).timestamp();
    let token_uuid = Uuid::new_v4();

    let claims = TokenClaims {
        identity: identity.clone(),
        jti: token_uuid.to_string(),
        iat: issued_at.timestamp().max(0) as usize,
        exp: expires_at.max(0) as usize,
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Generation)?;

    Ok(TokenDetails {
        token,
        token_uuid,
        expires_at,
    })
}

pub fn verify_jwt_token(secret: &str, token: &str) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::Role;

    const SECRET: &str = "test-secret";

    fn identity() -> Identity {
        Identity {
            id: 42,
            username: "scorekeeper".to_string(),
            email: "scorekeeper@league.test".to_string(),
            role: Role::Superadmin,
        }
    }

    #[test]
    fn verify_reproduces_issued_identity() {
        let details = generate_jwt_token(&identity(), Duration::from_secs(3600), SECRET).unwrap();
        let claims = verify_jwt_token(SECRET, &details.token).unwrap();

        assert_eq!(claims.identity, identity());
        assert_eq!(claims.jti, details.token_uuid.to_string());
        assert_eq!(claims.exp as i64, details.expires_at);
    }

    #[test]
    fn expired_token_reports_expired_not_malformed() {
        let issued_at = Utc::now() - chrono::Duration::hours(2);
        let details =
            generate_jwt_token_at(&identity(), Duration::from_secs(3600), SECRET, issued_at)
                .unwrap();

        let err = verify_jwt_token(SECRET, &details.token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let details = generate_jwt_token(&identity(), Duration::from_secs(3600), SECRET).unwrap();
        let err = verify_jwt_token("another-secret", &details.token).unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = verify_jwt_token(SECRET, "not.a.token").unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }
}
