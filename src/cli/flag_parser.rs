// src/cli/flag_parser.rs

use crate::{
    constants::OPERATION_FLAG,
    models::{DynamicFlag, DynamicFlagValue, FlagType, Flags, Operation},
};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, crate_description, crate_name, crate_version};
use colored::Colorize;
use std::{
    collections::{HashMap, HashSet},
    ffi::OsString,
};
use thiserror::Error;

const RESERVED_LONG_NAMES: &[&str] = &[OPERATION_FLAG, "help", "version"];
const RESERVED_SHORT_NAMES: &[char] = &['o', 'h', 'V'];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlagDefinitionError {
    #[error("flag name '{0}' is reserved")]
    ReservedName(String),
    #[error("flag '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("short name '{short_name}' of flag '{name}' must be a single character")]
    InvalidShortName { name: String, short_name: String },
    #[error("short name '{short_name}' of flag '{name}' is already taken")]
    DuplicateShortName { name: String, short_name: char },
    #[error("flag name must not be empty")]
    EmptyName,
}

/// Parses the command line against the flags declared in the configuration.
///
/// A parser is built for one invocation and holds no global state.
#[derive(Debug, Clone, Copy)]
pub struct FlagParser<'a> {
    dynamic_flags: &'a [DynamicFlag],
    operations: &'a [Operation],
}

impl<'a> FlagParser<'a> {
    pub fn new(dynamic_flags: &'a [DynamicFlag], operations: &'a [Operation]) -> Self {
        Self {
            dynamic_flags,
            operations,
        }
    }

    /// Parses `args` (program name excluded) into validated [`Flags`].
    ///
    /// Every declared flag is present in the result. Unknown flags, the value
    /// following an unknown `--flag` or `-f` and positional arguments are
    /// dropped; the remaining flags are still parsed.
    /// `--help` and `--version` surface as a [`clap::Error`].
    pub fn parse<I, T>(&self, args: I) -> Result<Flags>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let command = self.command()?;

        let args = args
            .into_iter()
            .map(|arg| arg.into().to_string_lossy().into_owned());
        let (known, ignored) = KnownFlags::new(self.dynamic_flags).partition(args);
        if !ignored.is_empty() {
            log::debug!("Ignoring unknown arguments: {:?}", ignored);
        }

        let matches = command.try_get_matches_from(known)?;
        let flags = self.flags_from_matches(&matches);
        flags.validate().context("failed to validate flags")?;
        Ok(flags)
    }

    /// The `clap` command for the declared flags.
    pub fn command(&self) -> Result<Command, FlagDefinitionError> {
        self.check_definitions()?;

        let mut command = Command::new(crate_name!())
            .version(crate_version!())
            .about(crate_description!())
            .no_binary_name(true)
            .arg(
                Arg::new(OPERATION_FLAG)
                    .long(OPERATION_FLAG)
                    .short('o')
                    .value_name("OPERATION")
                    .allow_hyphen_values(true)
                    .help("Name or short name of the operation to run"),
            );

        for flag in self.dynamic_flags {
            command = command.arg(dynamic_arg(flag));
        }

        Ok(command.after_help(self.operations_help()))
    }

    fn check_definitions(&self) -> Result<(), FlagDefinitionError> {
        let mut names = HashSet::new();
        let mut short_names: HashSet<char> = RESERVED_SHORT_NAMES.iter().copied().collect();

        for flag in self.dynamic_flags {
            if flag.name.is_empty() {
                return Err(FlagDefinitionError::EmptyName);
            }
            if RESERVED_LONG_NAMES.contains(&flag.name.as_str()) {
                return Err(FlagDefinitionError::ReservedName(flag.name.clone()));
            }
            if !names.insert(flag.name.as_str()) {
                return Err(FlagDefinitionError::DuplicateName(flag.name.clone()));
            }

            if flag.short_name.is_empty() {
                continue;
            }
            let mut chars = flag.short_name.chars();
            let (Some(short_name), None) = (chars.next(), chars.next()) else {
                return Err(FlagDefinitionError::InvalidShortName {
                    name: flag.name.clone(),
                    short_name: flag.short_name.clone(),
                });
            };
            if !short_names.insert(short_name) {
                return Err(FlagDefinitionError::DuplicateShortName {
                    name: flag.name.clone(),
                    short_name,
                });
            }
        }
        Ok(())
    }

    fn flags_from_matches(&self, matches: &ArgMatches) -> Flags {
        let mut flags = Flags::new();
        flags.operation = matches
            .get_one::<String>(OPERATION_FLAG)
            .cloned()
            .unwrap_or_default();

        for flag in self.dynamic_flags {
            let value = match flag.flag_type {
                FlagType::String => DynamicFlagValue::string(
                    &flag.name,
                    matches
                        .get_one::<String>(&flag.name)
                        .cloned()
                        .unwrap_or_default(),
                ),
                FlagType::Array => DynamicFlagValue::array(
                    &flag.name,
                    matches
                        .get_many::<String>(&flag.name)
                        .into_iter()
                        .flatten()
                        .cloned(),
                ),
            };
            flags.insert(value);
        }
        flags
    }

    fn operations_help(&self) -> String {
        let mut help = format!("{}", "Operations:".yellow().bold());
        for operation in self.operations {
            let name = if operation.short_name.is_empty() {
                operation.name.clone()
            } else {
                format!("{} ({})", operation.name, operation.short_name)
            };
            help.push_str(&format!(
                "\n  {:<24} {}",
                name.cyan(),
                operation.description
            ));
        }
        help
    }
}

fn dynamic_arg(flag: &DynamicFlag) -> Arg {
    let mut arg = Arg::new(flag.name.clone())
        .long(flag.name.clone())
        .help(flag.description.clone())
        .allow_hyphen_values(true);

    if let Some(short_name) = flag.short_name.chars().next() {
        arg = arg.short(short_name);
    }

    match flag.flag_type {
        FlagType::String => {
            arg = arg.action(ArgAction::Set).value_name("VALUE");
            if !flag.default.is_empty() {
                arg = arg.default_value(flag.default.clone());
            }
            arg
        }
        FlagType::Array => arg
            .action(ArgAction::Append)
            .value_delimiter(',')
            .value_name("VALUES"),
    }
}

enum Token {
    Known { takes_value: bool },
    Unknown { may_take_value: bool },
    Positional,
}

/// Flag names the command accepts, each with whether it takes a value.
#[derive(Debug, Default)]
struct KnownFlags {
    long: HashMap<String, bool>,
    short: HashMap<char, bool>,
}

impl KnownFlags {
    fn new(dynamic_flags: &[DynamicFlag]) -> Self {
        let mut known = Self::default();
        known.long.insert(OPERATION_FLAG.to_string(), true);
        known.long.insert("help".to_string(), false);
        known.long.insert("version".to_string(), false);
        known.short.extend([('o', true), ('h', false), ('V', false)]);

        for flag in dynamic_flags {
            known.long.insert(flag.name.clone(), true);
            if let Some(short_name) = flag.short_name.chars().next() {
                known.short.insert(short_name, true);
            }
        }
        known
    }

    fn classify(&self, token: &str) -> Token {
        if let Some(long) = token.strip_prefix("--") {
            let (name, inline_value) = match long.split_once('=') {
                Some((name, _)) => (name, true),
                None => (long, false),
            };
            return match self.long.get(name) {
                Some(takes_value) => Token::Known {
                    takes_value: *takes_value && !inline_value,
                },
                None => Token::Unknown {
                    may_take_value: !inline_value,
                },
            };
        }

        let mut chars = token.strip_prefix('-').unwrap_or_default().chars();
        let Some(short_name) = chars.next() else {
            return Token::Positional;
        };
        let attached_value = chars.next().is_some();
        match self.short.get(&short_name) {
            Some(takes_value) => Token::Known {
                takes_value: *takes_value && !attached_value,
            },
            None => Token::Unknown {
                may_take_value: !attached_value,
            },
        }
    }

    /// Splits `args` into the arguments handed to `clap` and the ignored ones.
    ///
    /// A known flag keeps the following argument as its value. An unknown
    /// flag swallows the following argument unless that one looks like a flag.
    /// Everything after `--` is ignored.
    fn partition(&self, args: impl IntoIterator<Item = String>) -> (Vec<String>, Vec<String>) {
        let mut known = Vec::new();
        let mut ignored = Vec::new();
        let mut args = args.into_iter().peekable();

        while let Some(arg) = args.next() {
            if arg == "--" {
                ignored.push(arg);
                ignored.extend(args.by_ref());
                break;
            }

            match self.classify(&arg) {
                Token::Known { takes_value } => {
                    known.push(arg);
                    if takes_value {
                        known.extend(args.next());
                    }
                }
                Token::Unknown { may_take_value } => {
                    ignored.push(arg);
                    if may_take_value {
                        ignored.extend(args.next_if(|next| !next.starts_with('-')));
                    }
                }
                Token::Positional => ignored.push(arg),
            }
        }

        (known, ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(name: &str, short_name: &str, flag_type: FlagType, default: &str) -> DynamicFlag {
        DynamicFlag {
            name: name.to_string(),
            short_name: short_name.to_string(),
            description: format!("The {} flag", name),
            flag_type,
            default: default.to_string(),
        }
    }

    fn declared() -> Vec<DynamicFlag> {
        vec![
            flag("env", "e", FlagType::String, "dev"),
            flag("target", "", FlagType::String, ""),
            flag("features", "f", FlagType::Array, ""),
        ]
    }

    #[test]
    fn test_parse_defaults() {
        let flags_declared = declared();
        let parser = FlagParser::new(&flags_declared, &[]);

        let flags = parser.parse(["--operation", "build"]).unwrap();
        assert_eq!(flags.operation, "build");
        assert_eq!(flags.get_flag_string_value("env"), "dev");
        assert_eq!(
            flags.get_required_flag_string_value("target"),
            Ok(String::new())
        );
        assert!(flags.dynamic_flags.contains_key("features"));
        assert!(flags.get_flag_array_value("features").is_empty());
    }

    #[test]
    fn test_parse_values() {
        let flags_declared = declared();
        let parser = FlagParser::new(&flags_declared, &[]);

        let flags = parser
            .parse([
                "-o",
                "b",
                "-e",
                "prod",
                "--target=x86",
                "-f",
                "a,b",
                "--features",
                "c",
            ])
            .unwrap();
        assert_eq!(flags.operation, "b");
        assert_eq!(flags.get_flag_string_value("env"), "prod");
        assert_eq!(flags.get_flag_string_value("target"), "x86");
        assert_eq!(flags.get_flag_array_value("features"), ["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_args_are_ignored() {
        let flags_declared = declared();
        let parser = FlagParser::new(&flags_declared, &[]);

        let flags = parser
            .parse(["-o", "build", "--unknown", "value", "stray"])
            .unwrap();
        assert_eq!(flags.operation, "build");
        assert_eq!(flags.get_flag_string_value("env"), "dev");
    }

    #[test]
    fn test_known_flags_around_unknown_ones_are_parsed() {
        let flags_declared = declared();
        let parser = FlagParser::new(&flags_declared, &[]);

        let flags = parser
            .parse(["--verbose", "-o", "build", "-e", "prod"])
            .unwrap();
        assert_eq!(flags.operation, "build");
        assert_eq!(flags.get_flag_string_value("env"), "prod");

        let flags = parser
            .parse([
                "-o",
                "build",
                "--verbose",
                "-e",
                "prod",
                "-x",
                "--level=3",
                "-f",
                "a",
            ])
            .unwrap();
        assert_eq!(flags.operation, "build");
        assert_eq!(flags.get_flag_string_value("env"), "prod");
        assert_eq!(flags.get_flag_array_value("features"), ["a"]);
    }

    #[test]
    fn test_partition_args() {
        let flags_declared = declared();
        let known_flags = KnownFlags::new(&flags_declared);
        let args = [
            "stray",
            "--operation=build",
            "--unknown",
            "value",
            "-e",
            "-1",
            "--skip=1",
            "-zq",
            "-eprod",
            "--target",
            "x86",
            "--",
            "-o",
            "deploy",
        ];

        let (known, ignored) = known_flags.partition(args.iter().map(|a| a.to_string()));
        assert_eq!(
            known,
            ["--operation=build", "-e", "-1", "-eprod", "--target", "x86"]
        );
        assert_eq!(
            ignored,
            [
                "stray",
                "--unknown",
                "value",
                "--skip=1",
                "-zq",
                "--",
                "-o",
                "deploy"
            ]
        );
    }

    #[test]
    fn test_operation_is_required() {
        let flags_declared = declared();
        let parser = FlagParser::new(&flags_declared, &[]);

        let err = parser.parse(["-e", "prod"]).unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "failed to validate flags: operation not provided"
        );
    }

    #[test]
    fn test_help_is_a_clap_error() {
        let flags_declared = declared();
        let operations = vec![Operation {
            name: "build".to_string(),
            short_name: "b".to_string(),
            description: "Build the project".to_string(),
            ..Operation::default()
        }];
        let parser = FlagParser::new(&flags_declared, &operations);

        let err = parser.parse(["--help"]).unwrap_err();
        let clap_err = err.downcast_ref::<clap::Error>().unwrap();
        assert_eq!(clap_err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(clap_err.to_string().contains("Build the project"));
    }

    #[test]
    fn test_conflicting_definitions() {
        let cases = [
            (
                vec![flag("operation", "", FlagType::String, "")],
                FlagDefinitionError::ReservedName("operation".to_string()),
            ),
            (
                vec![
                    flag("env", "", FlagType::String, ""),
                    flag("env", "", FlagType::Array, ""),
                ],
                FlagDefinitionError::DuplicateName("env".to_string()),
            ),
            (
                vec![flag("env", "en", FlagType::String, "")],
                FlagDefinitionError::InvalidShortName {
                    name: "env".to_string(),
                    short_name: "en".to_string(),
                },
            ),
            (
                vec![flag("output", "o", FlagType::String, "")],
                FlagDefinitionError::DuplicateShortName {
                    name: "output".to_string(),
                    short_name: 'o',
                },
            ),
        ];

        for (definitions, expected) in cases {
            let parser = FlagParser::new(&definitions, &[]);
            assert_eq!(parser.command().unwrap_err(), expected);
            let err = parser.parse(["-o", "build"]).unwrap_err();
            assert_eq!(err.downcast_ref::<FlagDefinitionError>(), Some(&expected));
        }
    }

    #[test]
    fn test_parsers_do_not_share_state() {
        let first = vec![flag("env", "e", FlagType::String, "dev")];
        let second = vec![flag("env", "e", FlagType::Array, "")];

        let flags = FlagParser::new(&first, &[]).parse(["-o", "x"]).unwrap();
        assert_eq!(flags.get_flag_string_value("env"), "dev");

        let flags = FlagParser::new(&second, &[]).parse(["-o", "x", "-e", "a"]).unwrap();
        assert_eq!(flags.get_flag_array_value("env"), ["a"]);
    }
}
