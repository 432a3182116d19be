// src/core/mod.rs

pub mod arg_enhancer;
pub mod arg_preparer;
pub mod commons;
pub mod config_loader;
pub mod flag_store;
pub mod operations;
pub mod paths;
pub mod predefined_args;
pub mod runner;
pub mod tag_extractor;
pub mod tag_resolver;
