// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed, time-limited access tokens (HS256 JWT).
//!
//! The algorithm is pinned on both sides: tokens are always signed with
//! HS256 and verification accepts nothing else, whatever the header claims.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};
use sentinel_config::model::AuthConfig;
use sentinel_core::SentinelError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Claim names owned by the issuer. Caller-supplied values are discarded.
const EXP: &str = "exp";
const IAT: &str = "iat";

/// Random bytes in a generated signing secret.
const GENERATED_SECRET_LEN: usize = 32;

/// Generate a random signing secret (64 hex characters).
pub fn generate_secret() -> Result<String, SentinelError> {
    let mut bytes = [0u8; GENERATED_SECRET_LEN];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| SentinelError::Internal("failed to generate signing secret".to_string()))?;
    Ok(hex::encode(bytes))
}

/// Caller-supplied token claims: claim name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The `sub` claim, when it is a string.
    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// The `role` claim, when it is a string.
    pub fn role(&self) -> Option<&str> {
        self.get("role").and_then(Value::as_str)
    }

    fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }
}

/// The result of a successful [`TokenIssuer::verify`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    /// Caller claims, without `iat` and `exp`.
    pub claims: Claims,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerifiedToken {
    pub fn subject(&self) -> Option<&str> {
        self.claims.subject()
    }

    pub fn role(&self) -> Option<&str> {
        self.claims.role()
    }
}

/// Issues and verifies HS256 tokens under a single signing secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &"HS256")
            .field("secret", &"[REDACTED]")
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl TokenIssuer {
    /// Create an issuer signing with `secret`.
    ///
    /// An empty secret is [`SentinelError::MissingKey`].
    pub fn new(secret: &[u8], default_ttl: Duration) -> Result<Self, SentinelError> {
        if secret.is_empty() {
            return Err(SentinelError::MissingKey {
                name: "auth.jwt_secret",
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&[EXP, IAT]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            default_ttl,
        })
    }

    /// Create an issuer from the `[auth]` section.
    pub fn from_config(config: &AuthConfig) -> Result<Self, SentinelError> {
        let secret = config.jwt_secret.as_deref().unwrap_or_default();
        Self::new(secret.as_bytes(), config.token_ttl())
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign `claims` with the configured default lifetime.
    pub fn issue_default(&self, claims: Claims) -> Result<String, SentinelError> {
        self.issue(claims, self.default_ttl)
    }

    /// Sign `claims` into a token valid for `ttl` from now.
    ///
    /// `iat` and `exp` are always set here, replacing any caller values.
    /// Claims carry whole seconds, so a non-zero `exp` is rounded up: the
    /// token never lives shorter than `ttl`.
    pub fn issue(&self, mut claims: Claims, ttl: Duration) -> Result<String, SentinelError> {
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| SentinelError::Validation("token lifetime is too large".to_string()))?;
        let issued = Utc::now();
        let now = issued.timestamp();
        let round_up = i64::from(!ttl.is_zero() && issued.timestamp_subsec_nanos() > 0);
        let exp = now
            .checked_add(ttl_secs)
            .and_then(|exp| exp.checked_add(round_up))
            .filter(|&exp| DateTime::from_timestamp(exp, 0).is_some())
            .ok_or_else(|| SentinelError::Validation("token lifetime is too large".to_string()))?;

        claims.remove(EXP);
        claims.remove(IAT);
        claims.insert(IAT, now);
        claims.insert(EXP, exp);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SentinelError::Internal(format!("token signing failed: {e}")))?;
        debug!(subject = claims.subject(), exp, "token issued");
        Ok(token)
    }

    /// Verify structure, algorithm, signature and expiry.
    ///
    /// The token is valid while `now < exp`. Every failure is
    /// [`SentinelError::InvalidToken`]; its reason is for logs only.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, SentinelError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| SentinelError::InvalidToken(e.to_string()))?;
        let mut claims = data.claims;

        let exp = take_timestamp(&mut claims, EXP)?;
        let iat = take_timestamp(&mut claims, IAT)?;

        if Utc::now() >= exp {
            return Err(SentinelError::InvalidToken("token has expired".to_string()));
        }

        Ok(VerifiedToken {
            claims,
            issued_at: iat,
            expires_at: exp,
        })
    }
}

fn take_timestamp(claims: &mut Claims, name: &str) -> Result<DateTime<Utc>, SentinelError> {
    claims
        .remove(name)
        .as_ref()
        .and_then(Value::as_i64)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| SentinelError::InvalidToken(format!("`{name}` is not a unix timestamp")))
}
