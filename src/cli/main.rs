//! CLI support for non-command bits

use crate::cli::common::{resolve_program, Command};
use crate::{cli, project};
use backtrace::Backtrace;
use clap::{Arg, ArgSettings};
use log::LevelFilter;
use std::io;
use std::panic::set_hook;
use std::path::Path;
use std::str::FromStr;

/// Route the `log` facade to stderr.
///
/// Each `-v` raises the level of our own messages by one step; `RUST_LOG`
/// still applies on top.
fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_module("retroscan", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}

fn install_panic_hook() {
    set_hook(Box::new(|panic_info| {
        let backtrace = format!("{:?}", Backtrace::new());
        let reason = if let Some(reason) = panic_info.payload().downcast_ref::<String>() {
            reason.as_str()
        } else if let Some(reason) = panic_info.payload().downcast_ref::<&str>() {
            reason
        } else {
            "unknown error"
        };

        eprintln!("retroscan died due to an error: {}\n\n{}", reason, backtrace);
    }));
}

/// Load the project file.
///
/// An explicitly named project must exist. The default project file is
/// optional, in which case everything comes from the command line.
fn load_project(filename: Option<&str>) -> io::Result<project::Project> {
    match filename {
        Some(filename) => Ok(project::Project::read(Path::new(filename))?),
        None => match project::Project::read(Path::new("retroscan.json")) {
            Ok(project) => Ok(project),
            Err(project::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                Ok(project::Project::empty(Path::new(".")))
            }
            Err(e) => Err(e.into()),
        },
    }
}

pub fn main() -> io::Result<()> {
    let mut app = app_from_crate!();
    app = app.arg(
        Arg::with_name("program")
            .long("program")
            .value_name("myapp")
            .takes_value(true)
            .help("Which program to analyze")
            .set(ArgSettings::Global),
    );
    app = project::Program::configure_app(app);
    app = app.arg(
        Arg::with_name("project")
            .long("project")
            .value_name("retroscan.json")
            .takes_value(true)
            .help("The project file to load")
            .set(ArgSettings::Global),
    );
    app = app.arg(
        Arg::with_name("verbose")
            .long("verbose")
            .short("v")
            .multiple(true)
            .help("Log more of what the analysis is doing")
            .set(ArgSettings::Global),
    );

    for cmd in Command::enumerate().iter() {
        app = app.subcommand(cmd.into_clap_subcommand());
    }

    let matches = app.get_matches();

    init_logging(matches.occurrences_of("verbose"));
    install_panic_hook();

    let version = matches.value_of("program");
    let prog = project::Program::from_arg_matches(&matches);

    let (command, submatches) = matches.subcommand();
    let (command, submatches) = match (cli::Command::from_str(command), submatches) {
        (Ok(command), Some(submatches)) => (command, submatches),
        _ => {
            eprintln!("{}", matches.usage());
            return Ok(());
        }
    };

    let project = load_project(matches.value_of("project"))?;
    let prog = resolve_program(&project, version, prog)?;

    match command {
        cli::Command::Scan => cli::scan(&project, &prog, submatches)?,
        cli::Command::Disassemble => cli::dis(&project, &prog, submatches)?,
    };

    Ok(())
}
