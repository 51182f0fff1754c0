// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token codec.
//!
//! Access tokens are HS256-signed JWTs carrying `sub`, `iat` and `exp`.
//! They are stateless: nothing is persisted and nothing is revoked
//! server-side, a token simply stops verifying once `exp` is reached.
//! There is no clock-skew leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use super::claims::Claims;
use super::error::AuthError;

/// Signed access token as handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AccessToken> for String {
    fn from(token: AccessToken) -> Self {
        token.0
    }
}

/// Issues and verifies access tokens with a process-wide HMAC key.
///
/// The key is captured at construction and cannot be changed afterwards.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec signing with `secret` and issuing tokens valid for `ttl`.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a token for `subject`, expiring one TTL from now.
    pub fn issue(&self, subject: &str) -> Result<AccessToken, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<AccessToken, AuthError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Internal("access token expiry out of range".into()))?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<AccessToken, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map(AccessToken)
            .map_err(|e| AuthError::Internal(format!("failed to sign access token: {e}")))
    }

    /// Verify a token and return its subject.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.decode(token).map(|claims| claims.sub)
    }

    /// Verify a token and return all of its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::InvalidToken("token has expired".into()),
                    ErrorKind::InvalidSignature => {
                        AuthError::InvalidToken("signature mismatch".into())
                    }
                    ErrorKind::InvalidAlgorithm => {
                        AuthError::InvalidToken("unexpected signing algorithm".into())
                    }
                    _ => AuthError::InvalidToken("malformed token".into()),
                }
            })?;

        // The library accepts exp == now; expiry is a hard boundary here
        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::InvalidToken("token has expired".into()));
        }

        Ok(token_data.claims)
    }
}
