//! Common utilities for command implementations

use crate::arch::ArchName;
use crate::memory::Pointer;
use crate::project::{Error, Program, Project};
use clap::{App, Arg, SubCommand};
use std::io;
use std::str::FromStr;

/// Enumeration of all CLI commands
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Command {
    Scan,
    Disassemble,
}

impl Command {
    /// Enumerate all commands that the scanner recognizes.
    pub fn enumerate() -> Vec<Self> {
        use Command::*;

        vec![Scan, Disassemble]
    }

    /// Construct the subcommand object for this particular `Command`.
    pub fn into_clap_subcommand<'a, 'b>(self) -> App<'a, 'b> {
        match self {
            Command::Scan => SubCommand::with_name("scan")
                .about("Discover the code and data reachable from the program's entry points")
                .arg(
                    Arg::with_name("start_pc")
                        .value_name("1234")
                        .index(1)
                        .multiple(true)
                        .help("Extra entry points to start analysis from"),
                ),
            Command::Disassemble => SubCommand::with_name("dis")
                .about("Display instructions and their IR from a given address")
                .arg(
                    Arg::with_name("start_pc")
                        .value_name("1234")
                        .index(1)
                        .required(true)
                        .help("The PC value to list code for"),
                )
                .arg(
                    Arg::with_name("count")
                        .long("count")
                        .short("n")
                        .value_name("16")
                        .takes_value(true)
                        .help("How many instructions to list"),
                ),
        }
    }
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "dis" => Ok(Command::Disassemble),
            "scan" => Ok(Command::Scan),
            _ => Err(()),
        }
    }
}

/// Pick the program to work on and apply command-line overrides to it.
///
/// With no program name, the project's default program is used; an empty
/// project yields the overrides alone.
pub fn resolve_program(
    project: &Project,
    name: Option<&str>,
    overrides: Program,
) -> io::Result<Program> {
    let base = match name {
        Some(name) => Some(project.program(name)?),
        None => project.default_program(),
    };

    Ok(match base {
        Some(base) => base.apply_override(&overrides),
        None => overrides,
    })
}

/// Resolve a program's architecture.
pub fn resolve_arch(prog: &Program) -> io::Result<ArchName> {
    Ok(prog.arch().ok_or(Error::Unspecified("architecture"))?)
}

/// Parse an address given on the command line.
pub fn parse_address(text: &str) -> io::Result<Pointer> {
    Pointer::from_str(text).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a valid address: {}", text, e),
        )
    })
}
