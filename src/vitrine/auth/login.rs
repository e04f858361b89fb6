//! Credential check and root selection for the login entry point.

use std::{fs, path::PathBuf};
use thiserror::Error;
use tracing::debug;

use super::state::AuthConfig;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    #[error("invalid username or password")]
    BadCredentials,
    #[error("requested root is not an accessible directory")]
    RootNotFound,
}

/// Check credentials and resolve the root the new session will be bound to.
///
/// Credentials are checked first so an anonymous caller cannot probe which
/// directories exist. A blank `requested_root` falls back to the configured
/// default root. The returned path is canonical.
///
/// # Errors
/// `LoginError::BadCredentials` if the pair is not in the allow-list;
/// `LoginError::RootNotFound` if the root does not exist, is not a
/// directory, is not valid UTF-8 or lies outside the configured root base.
pub fn authenticate(
    config: &AuthConfig,
    username: &str,
    password: &str,
    requested_root: &str,
) -> Result<PathBuf, LoginError> {
    if !config.credentials().verify(username, password) {
        return Err(LoginError::BadCredentials);
    }

    resolve_root(config, requested_root)
}

fn resolve_root(config: &AuthConfig, requested_root: &str) -> Result<PathBuf, LoginError> {
    let requested = requested_root.trim();
    let candidate = if requested.is_empty() {
        config.default_root().cloned().ok_or(LoginError::RootNotFound)?
    } else {
        PathBuf::from(requested)
    };

    let root = fs::canonicalize(&candidate).map_err(|e| {
        debug!("Cannot resolve requested root {}: {e}", candidate.display());
        LoginError::RootNotFound
    })?;

    if !root.is_dir() || root.to_str().is_none() {
        return Err(LoginError::RootNotFound);
    }

    if let Some(base) = config.root_base() {
        let base = fs::canonicalize(base).map_err(|e| {
            debug!("Cannot resolve root base {}: {e}", base.display());
            LoginError::RootNotFound
        })?;
        if !root.starts_with(&base) {
            debug!("Requested root {} is outside the root base", root.display());
            return Err(LoginError::RootNotFound);
        }
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitrine::auth::state::{Credential, CredentialStore};
    use secrecy::SecretString;
    use std::io;
    use tempfile::TempDir;

    fn config() -> AuthConfig {
        AuthConfig::new(
            SecretString::from("secret".to_string()),
            CredentialStore::new(vec![Credential::new(
                "alice".to_string(),
                SecretString::from("wonderland".to_string()),
            )]),
        )
    }

    fn path_str(dir: &TempDir) -> io::Result<String> {
        dir.path()
            .to_str()
            .map(ToString::to_string)
            .ok_or_else(|| io::Error::other("non utf-8 temp dir"))
    }

    #[test]
    fn accepts_valid_credentials_and_directory() -> io::Result<()> {
        let dir = TempDir::new()?;
        let root = authenticate(&config(), "alice", "wonderland", &path_str(&dir)?);
        assert_eq!(root, Ok(fs::canonicalize(dir.path())?));
        Ok(())
    }

    #[test]
    fn rejects_bad_credentials_before_touching_root() {
        let result = authenticate(&config(), "alice", "nope", "/definitely/not/here");
        assert_eq!(result, Err(LoginError::BadCredentials));
    }

    #[test]
    fn rejects_missing_root() {
        let result = authenticate(&config(), "alice", "wonderland", "/definitely/not/here");
        assert_eq!(result, Err(LoginError::RootNotFound));
    }

    #[test]
    fn rejects_file_as_root() -> io::Result<()> {
        let dir = TempDir::new()?;
        let file = dir.path().join("a.png");
        fs::write(&file, b"png")?;
        let file = file
            .to_str()
            .map(ToString::to_string)
            .ok_or_else(|| io::Error::other("non utf-8 path"))?;

        let result = authenticate(&config(), "alice", "wonderland", &file);
        assert_eq!(result, Err(LoginError::RootNotFound));
        Ok(())
    }

    #[test]
    fn blank_root_uses_default() -> io::Result<()> {
        let dir = TempDir::new()?;
        let config = config().with_default_root(Some(dir.path().to_path_buf()));
        let result = authenticate(&config, "alice", "wonderland", "  ");
        assert_eq!(result, Ok(fs::canonicalize(dir.path())?));
        Ok(())
    }

    #[test]
    fn blank_root_without_default_is_rejected() {
        let result = authenticate(&config(), "alice", "wonderland", "");
        assert_eq!(result, Err(LoginError::RootNotFound));
    }

    #[test]
    fn root_base_confines_requested_root() -> io::Result<()> {
        let base = TempDir::new()?;
        let inside = base.path().join("albums");
        fs::create_dir(&inside)?;
        let outside = TempDir::new()?;
        let config = config().with_root_base(Some(base.path().to_path_buf()));

        let inside_str = inside
            .to_str()
            .map(ToString::to_string)
            .ok_or_else(|| io::Error::other("non utf-8 path"))?;
        assert_eq!(
            authenticate(&config, "alice", "wonderland", &inside_str),
            Ok(fs::canonicalize(&inside)?)
        );
        assert_eq!(
            authenticate(&config, "alice", "wonderland", &path_str(&outside)?),
            Err(LoginError::RootNotFound)
        );
        Ok(())
    }
}
