//! Command-line argument dispatch.
//!
//! Maps validated CLI arguments to the action to run, currently only the
//! gallery server with its full configuration.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{self, auth, gallery};
use anyhow::Result;
use std::time::Duration;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(8080);

    let auth_opts = auth::Options::parse(matches)?;
    let gallery_opts = gallery::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        secret_key: auth_opts.secret_key,
        session_ttl: Duration::from_secs(auth_opts.session_ttl_minutes.saturating_mul(60)),
        users: auth_opts.users,
        cookie_secure: auth_opts.cookie_secure,
        default_root: gallery_opts.default_root,
        root_base: gallery_opts.root_base,
        assets_dir: gallery_opts.assets_dir,
        extension_case: gallery_opts.extension_case,
    }))
}
