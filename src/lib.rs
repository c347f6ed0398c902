#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod base_path;
pub mod cli;
pub mod config;
pub mod configurator;
pub mod logging;
pub mod project;
pub mod rewrite;
pub mod server;

pub use base_path::BasePath;
pub use config::ProjectConfig;
pub use configurator::{Configurator, RewritePlan};
pub use project::PwaProjectLayout;
pub use server::{ServeOptions, run_server};
