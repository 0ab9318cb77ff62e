//! Command line interface
//!
//! Parses subcommands and dispatches them to the storage service.

pub mod handlers;
pub mod parser;

pub use handlers::{CommandOutcome, execute};
pub use parser::{Cli, Command, ConfigAction, SessionArgs};
