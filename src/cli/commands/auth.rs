use crate::vitrine::auth::Credential;
use anyhow::{bail, Result};
use clap::{builder::ValueParser, Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SECRET_KEY: &str = "secret-key";
pub const ARG_SESSION_TTL_MINUTES: &str = "session-ttl-minutes";
pub const ARG_USER: &str = "user";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[derive(Debug)]
pub struct Options {
    pub secret_key: Option<SecretString>,
    pub session_ttl_minutes: u64,
    pub users: Vec<Credential>,
    pub cookie_secure: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if no user is configured.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let users: Vec<Credential> = matches
            .get_many::<Credential>(ARG_USER)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        if users.is_empty() {
            bail!("missing required argument: --user");
        }

        Ok(Self {
            secret_key: matches
                .get_one::<String>(ARG_SECRET_KEY)
                .map(|key| SecretString::from(key.clone())),
            session_ttl_minutes: matches
                .get_one::<u64>(ARG_SESSION_TTL_MINUTES)
                .copied()
                .unwrap_or(480),
            users,
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
        })
    }
}

fn validator_credential() -> ValueParser {
    ValueParser::from(|pair: &str| Credential::parse(pair))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SECRET_KEY)
                .long(ARG_SECRET_KEY)
                .help("Key used to sign session tokens")
                .long_help(
                    "Key used to sign session tokens. When unset a random key is generated at startup and sessions do not survive a restart.",
                )
                .env("VITRINE_SECRET_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_MINUTES)
                .long(ARG_SESSION_TTL_MINUTES)
                .help("Session lifetime in minutes")
                .env("VITRINE_SESSION_TTL_MINUTES")
                .default_value("480")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_USER)
                .short('u')
                .long(ARG_USER)
                .help("Allowed login as username:password, repeatable")
                .env("VITRINE_USERS")
                .hide_env_values(true)
                .action(ArgAction::Append)
                .value_delimiter(',')
                .value_parser(validator_credential()),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("VITRINE_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}
