//! Auth configuration, credential allow-list and shared auth state.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::{path::PathBuf, time::Duration};

use super::token::{TokenCodec, DEFAULT_TTL};

/// A configured `username:password` pair.
#[derive(Clone, Debug)]
pub struct Credential {
    username: String,
    password: SecretString,
}

impl Credential {
    #[must_use]
    pub fn new(username: String, password: SecretString) -> Self {
        Self { username, password }
    }

    /// Parse a `username:password` pair. The password may contain `:`.
    ///
    /// # Errors
    /// Returns an error message if the separator is missing or either side is empty.
    pub fn parse(pair: &str) -> Result<Self, String> {
        let (username, password) = pair
            .split_once(':')
            .ok_or_else(|| "expected username:password".to_string())?;
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err("username and password must not be empty".to_string());
        }
        Ok(Self::new(
            username.to_string(),
            SecretString::from(password.to_string()),
        ))
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Fixed allow-list of credentials.
#[derive(Clone, Debug, Default)]
pub struct CredentialStore {
    entries: Vec<Credential>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(entries: Vec<Credential>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check a username/password pair against every entry.
    ///
    /// All entries are compared in constant time and the loop never exits
    /// early, so timing does not reveal which usernames exist.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_digest = digest(username.as_bytes());
        let password_digest = digest(password.as_bytes());

        let mut matched = false;
        for entry in &self.entries {
            let user_ok = constant_time_eq(&username_digest, &digest(entry.username.as_bytes()));
            let pass_ok = constant_time_eq(
                &password_digest,
                &digest(entry.password.expose_secret().as_bytes()),
            );
            matched |= user_ok & pass_ok;
        }
        matched
    }
}

fn digest(bytes: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().to_vec()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    secret_key: SecretString,
    session_ttl: Duration,
    credentials: CredentialStore,
    cookie_secure: bool,
    default_root: Option<PathBuf>,
    root_base: Option<PathBuf>,
}

impl AuthConfig {
    #[must_use]
    pub fn new(secret_key: SecretString, credentials: CredentialStore) -> Self {
        Self {
            secret_key,
            session_ttl: DEFAULT_TTL,
            credentials,
            cookie_secure: false,
            default_root: None,
            root_base: None,
        }
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_default_root(mut self, root: Option<PathBuf>) -> Self {
        self.default_root = root;
        self
    }

    #[must_use]
    pub fn with_root_base(mut self, base: Option<PathBuf>) -> Self {
        self.root_base = base;
        self
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    #[must_use]
    pub fn default_root(&self) -> Option<&PathBuf> {
        self.default_root.as_ref()
    }

    #[must_use]
    pub fn root_base(&self) -> Option<&PathBuf> {
        self.root_base.as_ref()
    }
}

/// Immutable auth state shared by every request.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    codec: TokenCodec,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let codec = TokenCodec::new(config.secret_key.clone(), config.session_ttl);
        Self { config, codec }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}
