//! Signed, expiring session tokens.
//!
//! A token is three unpadded base64url segments, `header.claims.signature`,
//! where the signature is HMAC-SHA256 over `header.claims` with the server
//! secret. The claims bind a username (`sub`) to the filesystem root the
//! session may browse (`path`).

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Default session lifetime: 8 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(480 * 60);

const TOKEN_ALG: &str = "HS256";
const TOKEN_TYP: &str = "JWT";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("session token expired")]
    Expired,
    #[error("malformed session token")]
    Malformed,
    #[error("missing session token")]
    Missing,
}

/// Identity and browsing scope recovered from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub authorized_root: PathBuf,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: TOKEN_ALG.to_string(),
            typ: TOKEN_TYP.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    path: String,
    iat: i64,
    exp: i64,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, AuthError> {
    let json = serde_json::to_vec(value).map_err(|_| AuthError::Malformed)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, AuthError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| AuthError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::Malformed)
}

/// Current time as unix seconds.
#[must_use]
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

/// Issues and validates session tokens with a process-wide key and TTL.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: SecretString,
    ttl: Duration,
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `username` scoped to `authorized_root`.
    ///
    /// # Errors
    /// Returns `AuthError::Malformed` if the root is not valid UTF-8.
    pub fn issue(&self, username: &str, authorized_root: &Path) -> Result<String, AuthError> {
        self.issue_at(username, authorized_root, now_unix())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    /// Returns `AuthError::Malformed` if the root is not valid UTF-8.
    pub fn issue_at(
        &self,
        username: &str,
        authorized_root: &Path,
        now: i64,
    ) -> Result<String, AuthError> {
        let path = authorized_root.to_str().ok_or(AuthError::Malformed)?;
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            sub: username.to_string(),
            path: path.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
        };

        let signing_input = format!(
            "{}.{}",
            b64e_json(&TokenHeader::hs256())?,
            b64e_json(&claims)?
        );
        let signature = self.sign(&signing_input)?;

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Validate a token and rebuild the session it carries.
    ///
    /// # Errors
    /// `AuthError::Malformed` if the token is not well formed, the signature
    /// does not verify or a claim is missing; `AuthError::Expired` once `exp`
    /// has passed.
    pub fn validate(&self, token: &str) -> Result<Session, AuthError> {
        self.validate_at(token, now_unix())
    }

    /// Validate a token as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    /// See [`TokenCodec::validate`].
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Session, AuthError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(AuthError::Malformed)?;
        let claims_b64 = parts.next().ok_or(AuthError::Malformed)?;
        let sig_b64 = parts.next().ok_or(AuthError::Malformed)?;
        if parts.next().is_some() {
            return Err(AuthError::Malformed);
        }

        // Nothing inside the token is trusted until the signature checks out.
        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| AuthError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::Malformed)?;

        let header: TokenHeader = b64d_json(header_b64)?;
        if header != TokenHeader::hs256() {
            return Err(AuthError::Malformed);
        }

        let claims: TokenClaims = b64d_json(claims_b64)?;
        if claims.sub.is_empty() || claims.path.is_empty() {
            return Err(AuthError::Malformed);
        }
        if claims.exp <= now {
            return Err(AuthError::Expired);
        }

        Ok(Session {
            username: claims.sub,
            authorized_root: PathBuf::from(claims.path),
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| AuthError::Malformed)
    }

    fn sign(&self, signing_input: &str) -> Result<String, AuthError> {
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        Ok(Base64UrlUnpadded::encode_string(
            &mac.finalize().into_bytes(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::new(
            SecretString::from("test-secret-key-that-is-long-enough".to_string()),
            DEFAULT_TTL,
        )
    }

    #[test]
    fn issue_then_validate_returns_session() -> Result<(), AuthError> {
        let codec = codec();
        let token = codec.issue_at("alice", Path::new("/data/photos"), NOW)?;
        let session = codec.validate_at(&token, NOW + 1)?;

        assert_eq!(session.username, "alice");
        assert_eq!(session.authorized_root, PathBuf::from("/data/photos"));
        assert_eq!(session.issued_at, NOW);
        assert_eq!(session.expires_at, NOW + 480 * 60);
        Ok(())
    }

    #[test]
    fn validate_uses_wall_clock() -> Result<(), AuthError> {
        let codec = codec();
        let token = codec.issue("alice", Path::new("/data/photos"))?;
        let session = codec.validate(&token)?;
        assert_eq!(session.username, "alice");
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> Result<(), AuthError> {
        let codec = codec();
        let token = codec.issue_at("alice", Path::new("/data/photos"), NOW)?;

        let ttl = i64::try_from(DEFAULT_TTL.as_secs()).unwrap_or(i64::MAX);
        assert_eq!(
            codec.validate_at(&token, NOW + ttl),
            Err(AuthError::Expired)
        );
        assert_eq!(codec.validate(&token), Err(AuthError::Expired));
        Ok(())
    }

    #[test]
    fn tampered_claims_are_rejected() -> Result<(), AuthError> {
        let codec = codec();
        let alice = codec.issue_at("alice", Path::new("/data/photos"), NOW)?;
        let mallory = codec.issue_at("mallory", Path::new("/"), NOW)?;

        let alice_parts: Vec<&str> = alice.split('.').collect();
        let mallory_parts: Vec<&str> = mallory.split('.').collect();
        let forged = format!(
            "{}.{}.{}",
            alice_parts[0], mallory_parts[1], alice_parts[2]
        );

        assert_eq!(codec.validate_at(&forged, NOW), Err(AuthError::Malformed));
        Ok(())
    }

    #[test]
    fn wrong_secret_is_rejected() -> Result<(), AuthError> {
        let token = codec().issue_at("alice", Path::new("/data/photos"), NOW)?;
        let other = TokenCodec::new(
            SecretString::from("another-secret-key-that-is-long".to_string()),
            DEFAULT_TTL,
        );
        assert_eq!(other.validate_at(&token, NOW), Err(AuthError::Malformed));
        Ok(())
    }

    #[test]
    fn expired_but_forged_token_reports_malformed() -> Result<(), AuthError> {
        let token = codec().issue_at("alice", Path::new("/data/photos"), NOW)?;
        let other = TokenCodec::new(SecretString::from("other".to_string()), DEFAULT_TTL);
        assert_eq!(
            other.validate_at(&token, NOW + 10 * 480 * 60),
            Err(AuthError::Malformed)
        );
        Ok(())
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        let codec = codec();
        for token in ["", "abc", "a.b", "a.b.c.d", "..."] {
            assert_eq!(
                codec.validate_at(token, NOW),
                Err(AuthError::Malformed),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn missing_claim_is_malformed() -> Result<(), AuthError> {
        #[derive(Serialize)]
        struct Partial {
            sub: String,
            exp: i64,
        }

        let codec = codec();
        let signing_input = format!(
            "{}.{}",
            b64e_json(&TokenHeader::hs256())?,
            b64e_json(&Partial {
                sub: "alice".to_string(),
                exp: NOW + 60,
            })?
        );
        let token = format!("{signing_input}.{}", codec.sign(&signing_input)?);

        assert_eq!(codec.validate_at(&token, NOW), Err(AuthError::Malformed));
        Ok(())
    }

    #[test]
    fn unexpected_algorithm_is_malformed() -> Result<(), AuthError> {
        let codec = codec();
        let header = TokenHeader {
            alg: "none".to_string(),
            typ: TOKEN_TYP.to_string(),
        };
        let claims = TokenClaims {
            sub: "alice".to_string(),
            path: "/data".to_string(),
            iat: NOW,
            exp: NOW + 60,
        };
        let signing_input = format!("{}.{}", b64e_json(&header)?, b64e_json(&claims)?);
        let token = format!("{signing_input}.{}", codec.sign(&signing_input)?);

        assert_eq!(codec.validate_at(&token, NOW), Err(AuthError::Malformed));
        Ok(())
    }
}
