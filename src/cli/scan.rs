//! CLI command: scan

use crate::analysis::LogDiagnostics;
use crate::arch::Architecture;
use crate::cli::common::{parse_address, resolve_arch};
use crate::database::{Database, Item};
use crate::memory::{Memory, Pointer};
use crate::project::{Program, Project};
use crate::queue::Scanner;
use clap::ArgMatches;
use std::io;

fn scan_for_arch<AR>(arch: AR, bus: &Memory, prog: &Program, entries: &[Pointer]) -> Database
where
    AR: Architecture,
{
    let host = LogDiagnostics;
    let mut scanner = Scanner::new(arch, bus, &host);

    for entry in entries.iter() {
        scanner.add_entry_point(*entry);
    }

    for procedure in prog.procedures() {
        scanner.enqueue_user_procedure(procedure.at, procedure.signature.clone());
    }

    for global in prog.globals() {
        scanner.enqueue_user_global(global.at, global.ty.clone());
    }

    let report = scanner.run();
    if report.failed > 0 {
        warn!("{} item(s) could not be fully analyzed", report.failed);
    }

    scanner.into_database()
}

fn print_database(db: &Database) {
    println!("; image map");
    for item in db.map().iter() {
        match item {
            Item::Code(block) => println!(
                "{}..{} code, {} instruction(s)",
                block.start(),
                block.end(),
                block.instr_offsets().count()
            ),
            Item::Data(data) => println!(
                "{}..{} data {}",
                data.start(),
                data.start() + data.length(),
                data.ty()
            ),
        }
    }

    println!("; procedures");
    for procedure in db.procedures() {
        match procedure.signature() {
            Some(sig) => println!("{} {} {}", procedure.kind(), procedure.at(), sig),
            None => println!("{} {}", procedure.kind(), procedure.at()),
        }
    }

    println!("; globals");
    for global in db.globals() {
        println!("DAT {} {}", global.at(), global.ty());
    }
}

/// Scan a given program for code and data, starting from its entry points
/// and any given on the command line.
pub fn scan(project: &Project, prog: &Program, args: &ArgMatches) -> io::Result<()> {
    let arch = resolve_arch(prog)?;
    let bus = prog.load_memory(project.root())?;

    let mut entries = prog.entry_points().to_vec();
    for text in args.values_of("start_pc").into_iter().flatten() {
        entries.push(parse_address(text)?);
    }

    if entries.is_empty() && prog.procedures().is_empty() && prog.globals().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Nothing to scan: give an entry point, procedure, or global",
        ));
    }

    info!("Starting scan from {} entry point(s)", entries.len());

    let db = with_architecture!(arch, |arch| {
        scan_for_arch(arch, &bus, prog, &entries)
    });

    print_database(&db);

    Ok(())
}
