use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use std::ffi::OsString;
use tracing::Level;

/// What a command line asks for: how loudly to log and what to run.
#[derive(Debug)]
pub struct Invocation {
    pub verbosity: Option<Level>,
    pub action: Action,
}

/// Parse `args` (program name first) into an [`Invocation`].
///
/// Help, version and usage errors print and exit the process the way clap
/// does for `get_matches`.
///
/// # Errors
/// Returns an error if the arguments parse but do not form a runnable action.
pub fn parse<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = commands::new()
        .try_get_matches_from(args)
        .unwrap_or_else(|err| err.exit());

    Ok(Invocation {
        verbosity: commands::logging::level(&matches),
        action: dispatch::handler(&matches)?,
    })
}

/// Parse the process arguments, install logging and hand back the action.
///
/// # Errors
/// Returns an error if dispatch or telemetry initialization fails.
pub fn start() -> Result<Action> {
    let Invocation { verbosity, action } = parse(std::env::args_os())?;
    telemetry::init(verbosity)?;
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_env<F: FnOnce()>(f: F) {
        temp_env::with_vars(
            [
                ("VITRINE_USERS", None::<&str>),
                ("VITRINE_LOG_LEVEL", None),
                ("VITRINE_PORT", None),
            ],
            f,
        );
    }

    #[test]
    fn invocation_from_flags() {
        clean_env(|| {
            let invocation = parse(["vitrine", "--user", "alice:secret", "-vv", "--port", "9000"]);
            assert!(invocation.is_ok());
            if let Ok(Invocation { verbosity, action }) = invocation {
                assert_eq!(verbosity, Some(Level::INFO));
                let Action::Server(args) = action;
                assert_eq!(args.port, 9000);
                assert_eq!(args.users.len(), 1);
            }
        });
    }

    #[test]
    fn quiet_invocation_has_no_level() {
        clean_env(|| {
            let invocation = parse(["vitrine", "--user", "alice:secret"]);
            assert!(matches!(invocation, Ok(Invocation { verbosity: None, .. })));
        });
    }

    #[test]
    fn missing_users_is_an_error() {
        clean_env(|| {
            assert!(parse(["vitrine"]).is_err());
        });
    }
}
