use std::ffi::OsString;

use clap::{Arg, ArgAction, ArgMatches, Command, builder::OsStringValueParser};

use crate::PROGRAM_NAME;

/// Parsed command-line arguments.
///
/// Operands are kept raw; [`crate::WalkRequest::from_args`] validates them so
/// configuration errors carry the tool's own wording rather than clap's.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParsedArgs {
    /// `-h`/`--help` was given.
    pub show_help: bool,
    /// `-V`/`--version` was given.
    pub show_version: bool,
    /// `--list-flags` was given.
    pub list_flags: bool,
    /// `--stats` was given.
    pub stats: bool,
    /// Number of `-v` occurrences.
    pub verbosity: u8,
    /// The `ROOT` operand, if present.
    pub root: Option<OsString>,
    /// Every `FLAG` operand, in order.
    pub flags: Vec<OsString>,
}

pub(crate) fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .about("Walk a directory tree, opening every directory and symlink with openat2.")
        .override_usage(format!("{PROGRAM_NAME} [OPTIONS] ROOT [FLAG]..."))
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase diagnostic output; repeat for more.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Print directory, symlink and skipped-entry counts on success.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-flags")
                .long("list-flags")
                .help("List the accepted RESOLVE_* flag names and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("root")
                .value_name("ROOT")
                .help("Directory to walk.")
                .value_parser(OsStringValueParser::new())
                .index(1),
        )
        .arg(
            Arg::new("flags")
                .value_name("FLAG")
                .help("RESOLVE_* flags applied to every openat2 call.")
                .value_parser(OsStringValueParser::new())
                .num_args(0..)
                .index(2),
        )
}

pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();

    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;
    Ok(parsed_from(&mut matches))
}

fn parsed_from(matches: &mut ArgMatches) -> ParsedArgs {
    ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        list_flags: matches.get_flag("list-flags"),
        stats: matches.get_flag("stats"),
        verbosity: matches.get_count("verbose"),
        root: matches.remove_one::<OsString>("root"),
        flags: matches
            .remove_many::<OsString>("flags")
            .map(Iterator::collect)
            .unwrap_or_default(),
    }
}
