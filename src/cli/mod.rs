//! Command-line surface: turns the process arguments into [`crate::models::Flags`].

pub mod flag_parser;
