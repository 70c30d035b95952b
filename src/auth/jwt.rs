use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};

use super::claims::{Claims, ISSUER, SUBJECT};

pub const TOKEN_TTL: Duration = Duration::hours(24);

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 bearer tokens with one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against the caller's clock in `verify`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[ISSUER]);
        validation.sub = Some(SUBJECT.to_string());

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, user_id: i64, now: OffsetDateTime) -> Result<String, TokenError> {
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: SUBJECT.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + TOKEN_TTL).unix_timestamp(),
            user_id,
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding).map_err(|e| {
            error!(user_id, error = %e, "jwt signing failed");
            TokenError::Signing(e)
        })?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Returns the embedded user id if the token is authentic and unexpired at `now`.
    pub fn verify(&self, token: &str, now: OffsetDateTime) -> Result<i64, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        if now.unix_timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        debug!(user_id = data.claims.user_id, "jwt verified");
        Ok(data.claims.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use time::macros::datetime;

    const T0: OffsetDateTime = datetime!(2024-05-01 12:00 UTC);

    fn codec() -> TokenCodec {
        TokenCodec::new(b"dev-secret")
    }

    #[test]
    fn signing_with_a_key_of_the_wrong_family_fails() {
        let broken = TokenCodec {
            encoding: EncodingKey::from_ed_der(&[]),
            ..codec()
        };
        assert!(matches!(broken.issue(1, T0), Err(TokenError::Signing(_))));
    }

    #[test]
    fn issue_then_verify_returns_subject() {
        let codec = codec();
        let token = codec.issue(42, T0).expect("issue");
        assert_eq!(codec.verify(&token, T0).expect("verify"), 42);
    }

    #[test]
    fn valid_just_inside_the_window() {
        let codec = codec();
        let token = codec.issue(7, T0).expect("issue");
        for delta in [Duration::minutes(1), Duration::hours(12), TOKEN_TTL - Duration::seconds(1)] {
            assert_eq!(codec.verify(&token, T0 + delta).expect("still valid"), 7);
        }
    }

    #[test]
    fn expired_at_and_after_ttl() {
        let codec = codec();
        let token = codec.issue(7, T0).expect("issue");
        for delta in [TOKEN_TTL, TOKEN_TTL + Duration::seconds(1), Duration::days(30)] {
            assert!(matches!(
                codec.verify(&token, T0 + delta),
                Err(TokenError::Expired)
            ));
        }
    }

    #[test]
    fn foreign_secret_is_invalid_signature() {
        let token = TokenCodec::new(b"other-secret").issue(1, T0).expect("issue");
        assert!(matches!(
            codec().verify(&token, T0),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn other_algorithm_is_rejected_even_with_same_secret() {
        let claims = Claims {
            iss: ISSUER.into(),
            sub: SUBJECT.into(),
            iat: T0.unix_timestamp(),
            exp: (T0 + TOKEN_TTL).unix_timestamp(),
            user_id: 1,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .expect("encode");
        assert!(matches!(
            codec().verify(&token, T0),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[derive(Serialize)]
    struct LooseClaims<U: Serialize> {
        iss: &'static str,
        sub: &'static str,
        iat: i64,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_id: Option<U>,
    }

    fn sign_loose<U: Serialize>(user_id: Option<U>) -> String {
        let claims = LooseClaims {
            iss: ISSUER,
            sub: SUBJECT,
            iat: T0.unix_timestamp(),
            exp: (T0 + TOKEN_TTL).unix_timestamp(),
            user_id,
        };
        encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .expect("encode")
    }

    #[test]
    fn missing_user_id_is_malformed() {
        let token = sign_loose::<i64>(None);
        assert!(matches!(
            codec().verify(&token, T0),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn ill_typed_user_id_is_malformed() {
        let token = sign_loose(Some("one"));
        assert!(matches!(
            codec().verify(&token, T0),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            codec().verify("definitely.not.a-jwt", T0),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(codec().verify("", T0), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        #[derive(Serialize)]
        struct Foreign {
            iss: &'static str,
            sub: &'static str,
            iat: i64,
            exp: i64,
            user_id: i64,
        }
        let token = encode(
            &Header::new(ALGORITHM),
            &Foreign {
                iss: "someone-else",
                sub: SUBJECT,
                iat: T0.unix_timestamp(),
                exp: (T0 + TOKEN_TTL).unix_timestamp(),
                user_id: 1,
            },
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .expect("encode");
        assert!(codec().verify(&token, T0).is_err());
    }
}
