//! Configuration-driven command runner.
//!
//! Operations declared in `application.toml` are looked up by name, their
//! argument templates are resolved against the command-line flags, and the
//! resulting command is executed after its `run_before` prerequisites.

pub mod cli;
pub mod constants;
pub mod core;
pub mod errors;
pub mod models;
pub mod system;
