use crate::{
    cli::telemetry,
    vitrine::{
        self,
        auth::{AuthConfig, Credential, CredentialStore},
        files::ExtensionCase,
        handlers::GalleryState,
        render::MaudRenderer,
    },
};
use anyhow::Result;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::RngCore;
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub secret_key: Option<SecretString>,
    pub session_ttl: Duration,
    pub users: Vec<Credential>,
    pub cookie_secure: bool,
    pub default_root: Option<PathBuf>,
    pub root_base: Option<PathBuf>,
    pub assets_dir: PathBuf,
    pub extension_case: ExtensionCase,
}

/// 32 random bytes, base64url encoded.
fn random_secret() -> SecretString {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    SecretString::from(Base64UrlUnpadded::encode_string(&bytes))
}

fn auth_config(args: &Args) -> AuthConfig {
    let secret_key = args.secret_key.clone().unwrap_or_else(|| {
        warn!("No secret key configured, using a random one; sessions end on restart");
        random_secret()
    });

    AuthConfig::new(secret_key, CredentialStore::new(args.users.clone()))
        .with_session_ttl(args.session_ttl)
        .with_cookie_secure(args.cookie_secure)
        .with_default_root(args.default_root.clone())
        .with_root_base(args.root_base.clone())
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    if !args.assets_dir.is_dir() {
        warn!(
            "Assets directory {} not found, /static will be empty",
            args.assets_dir.display()
        );
    }

    let config = auth_config(&args);
    debug!(
        users = config.credentials().len(),
        ttl_secs = config.session_ttl().as_secs(),
        extension_case = args.extension_case.as_str(),
        "Starting server"
    );

    let gallery = GalleryState::new(Arc::new(MaudRenderer), args.extension_case);

    let result = vitrine::new(args.port, config, gallery, &args.assets_dir).await;

    telemetry::shutdown_tracer();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn args(secret_key: Option<&str>) -> Args {
        Args {
            port: 8080,
            secret_key: secret_key.map(|key| SecretString::from(key.to_string())),
            session_ttl: Duration::from_secs(60),
            users: vec![Credential::new(
                "alice".to_string(),
                SecretString::from("secret".to_string()),
            )],
            cookie_secure: true,
            default_root: Some(PathBuf::from("/srv/pictures")),
            root_base: None,
            assets_dir: PathBuf::from("static"),
            extension_case: ExtensionCase::Insensitive,
        }
    }

    #[test]
    fn random_secrets_differ() {
        let a = random_secret();
        let b = random_secret();
        assert_eq!(a.expose_secret().len(), 43);
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn auth_config_from_args() {
        let config = auth_config(&args(Some("k3y")));
        assert_eq!(config.session_ttl(), Duration::from_secs(60));
        assert!(config.session_cookie_secure());
        assert!(config.credentials().verify("alice", "secret"));
        assert_eq!(
            config.default_root(),
            Some(&PathBuf::from("/srv/pictures"))
        );
        assert!(config.root_base().is_none());
    }

    #[test]
    fn auth_config_without_secret_still_issues_tokens() {
        let config = auth_config(&args(None));
        let state = vitrine::auth::AuthState::new(config);
        let token = state
            .codec()
            .issue("alice", std::path::Path::new("/srv/pictures"));
        assert!(token.is_ok());
    }
}
