// src/bin/project-helper.rs

use anyhow::Result;
use colored::*;
use project_helper::{
    cli::flag_parser::FlagParser,
    core::{
        arg_enhancer::Enhancer, arg_preparer::ArgPreparer, config_loader::ConfigStore,
        flag_store::FlagStore, operations::OperationService,
        predefined_args::PredefinedArgResolver, runner::Runner, tag_extractor::RegexTagExtractor,
        tag_resolver::TagResolver,
    },
    system::executor::SystemExecutor,
};

/// Loads the configuration, parses the command line and runs the selected
/// operation. Errors are printed as one chain and end the process with status 1.
fn main() {
    env_logger::init();

    if let Err(e) = run() {
        // `--help` and `--version` are reported by clap itself.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }

        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = ConfigStore::load()?;
    let application = config.application();

    let flags = FlagParser::new(&application.dynamic_flags, &application.operations)
        .parse(std::env::args_os().skip(1))?;
    log::debug!("Parsed flags: {:?}", flags);

    let flag_store = FlagStore::new(flags);
    let tag_extractor = RegexTagExtractor::new();
    let tag_resolver = TagResolver::new(&config);
    let predefined_args = PredefinedArgResolver::new(&config);
    let enhancer = Enhancer::new(&tag_extractor, &tag_resolver, &predefined_args);
    let arg_preparer = ArgPreparer::new(&flag_store, &enhancer, &predefined_args);
    let operations = OperationService::new(&config);
    let executor = SystemExecutor;

    Runner::new(&flag_store, &operations, &arg_preparer, &executor).run()
}
