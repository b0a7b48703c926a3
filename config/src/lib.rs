//! Groups configurations used by the withdrawer into a single struct, parsed
//! from the command line and an optional TOML config file

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod cli;
pub mod parsing;
mod validation;

pub use cli::{Cli, WithdrawerConfig};
pub use parsing::{config_file::parse_config_from_file, parse_command_line_args};
