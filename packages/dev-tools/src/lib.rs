//! LearnTree developer tools
//!
//! Command-line access to the tree workflow against a local database, used to exercise
//! generation, storage, and layout without a frontend.

pub mod cli;

pub use cli::{build_service, default_db_path, execute, service_with, Cli, Commands, Output};
