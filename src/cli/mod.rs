//! CLI commands

mod common;
mod dis;
mod main;
mod scan;

pub use common::{parse_address, resolve_arch, resolve_program, Command};
pub use dis::dis;
pub use main::main;
pub use scan::scan;
