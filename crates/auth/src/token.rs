//! JWT encode/decode behind a codec trait.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("failed to decode token")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Token codec boundary consumed by the HTTP middleware.
///
/// Trait rather than a concrete type so tests and future key-rotation setups
/// can substitute their own implementation.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &JwtClaims) -> Result<String, TokenError>;

    /// Decode and verify a token, then deterministically validate its claims
    /// against `now`.
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// HS256 symmetric-key codec.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn encode(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        // Expiry is re-checked by validate_claims against the caller's clock,
        // so the library's wall-clock exp check is left off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(TokenError::Decode)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use chrono::Duration;
    use stockpile_core::UserId;

    fn claims_at(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            issued_at: now,
            expires_at: now + Duration::hours(24),
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let now = Utc::now();
        let claims = claims_at(now);

        let token = codec.encode(&claims).expect("encode");
        let decoded = codec.decode(&token, now).expect("decode");
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, Role::Admin);
    }

    #[test]
    fn rejects_wrong_secret() {
        let codec = Hs256TokenCodec::new(b"secret-a");
        let other = Hs256TokenCodec::new(b"secret-b");
        let now = Utc::now();

        let token = codec.encode(&claims_at(now)).expect("encode");
        assert!(matches!(
            other.decode(&token, now),
            Err(TokenError::Decode(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let issued = Utc::now() - Duration::hours(48);
        let claims = JwtClaims {
            expires_at: issued + Duration::hours(24),
            ..claims_at(issued)
        };

        let token = codec.encode(&claims).expect("encode");
        assert!(matches!(
            codec.decode(&token, Utc::now()),
            Err(TokenError::Claims(TokenValidationError::Expired))
        ));
    }
}
