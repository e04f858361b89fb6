use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("VITRINE_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

/// Tracing level requested on the command line; `None` keeps the default.
#[must_use]
pub fn level(matches: &ArgMatches) -> Option<Level> {
    match matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0) {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_for(args: &[&str]) -> Option<Level> {
        let matches = with_args(Command::new("vitrine")).get_matches_from(args);
        level(&matches)
    }

    #[test]
    fn verbosity_flags_map_to_levels() {
        temp_env::with_var_unset("VITRINE_LOG_LEVEL", || {
            assert_eq!(level_for(&["vitrine"]), None);
            assert_eq!(level_for(&["vitrine", "-v"]), Some(Level::WARN));
            assert_eq!(level_for(&["vitrine", "-vv"]), Some(Level::INFO));
            assert_eq!(level_for(&["vitrine", "-vvv"]), Some(Level::DEBUG));
            assert_eq!(level_for(&["vitrine", "-vvvvvv"]), Some(Level::TRACE));
        });
    }
}
