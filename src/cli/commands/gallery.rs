use crate::vitrine::files::ExtensionCase;
use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use std::path::PathBuf;

pub const ARG_DEFAULT_ROOT: &str = "default-root";
pub const ARG_ROOT_BASE: &str = "root-base";
pub const ARG_ASSETS_DIR: &str = "assets-dir";
pub const ARG_EXTENSION_CASE: &str = "extension-case";

#[derive(Debug)]
pub struct Options {
    pub default_root: Option<PathBuf>,
    pub root_base: Option<PathBuf>,
    pub assets_dir: PathBuf,
    pub extension_case: ExtensionCase,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            default_root: matches.get_one::<PathBuf>(ARG_DEFAULT_ROOT).cloned(),
            root_base: matches.get_one::<PathBuf>(ARG_ROOT_BASE).cloned(),
            assets_dir: matches
                .get_one::<PathBuf>(ARG_ASSETS_DIR)
                .cloned()
                .unwrap_or_else(|| PathBuf::from("static")),
            extension_case: matches
                .get_one::<ExtensionCase>(ARG_EXTENSION_CASE)
                .copied()
                .unwrap_or_default(),
        }
    }
}

fn validator_extension_case() -> ValueParser {
    ValueParser::from(|case: &str| case.parse::<ExtensionCase>())
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DEFAULT_ROOT)
                .long(ARG_DEFAULT_ROOT)
                .help("Directory browsed when the login form leaves the folder blank")
                .env("VITRINE_DEFAULT_ROOT")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_ROOT_BASE)
                .long(ARG_ROOT_BASE)
                .help("Only allow session roots inside this directory")
                .env("VITRINE_ROOT_BASE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_ASSETS_DIR)
                .long(ARG_ASSETS_DIR)
                .help("Directory served under /static")
                .env("VITRINE_ASSETS_DIR")
                .default_value("static")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_EXTENSION_CASE)
                .long(ARG_EXTENSION_CASE)
                .help("Image extension matching: sensitive or insensitive (default: platform)")
                .env("VITRINE_EXTENSION_CASE")
                .value_parser(validator_extension_case()),
        )
}
