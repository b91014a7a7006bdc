//! CLI command: dis

use crate::analysis::LogDiagnostics;
use crate::arch::{Architecture, MachineInstruction};
use crate::cli::common::{parse_address, resolve_arch};
use crate::ir::Rewriter;
use crate::memory::{Memory, Pointer};
use crate::project::{Program, Project};
use crate::reg::State;
use clap::ArgMatches;
use std::io;

/// Print the raw bytes of an instruction, padded to a fixed width.
fn format_bytes(bus: &Memory, at: Pointer, length: usize) -> String {
    let bytes: Vec<String> = (0..length)
        .map(|i| match bus.read_unit(at + i) {
            Some(b) => format!("{:02X}", b),
            None => "??".to_string(),
        })
        .collect();

    format!("{:<15}", bytes.join(" "))
}

fn dis_for_arch<AR>(arch: AR, bus: &Memory, start: Pointer, count: usize) -> io::Result<()>
where
    AR: Architecture,
{
    let rdr = bus
        .reader_at(start)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let host = LogDiagnostics;
    let mut rewriter = Rewriter::new(arch, rdr, State::new(), &host);

    for _ in 0..count {
        let cluster = match rewriter.next() {
            Some(cluster) => cluster,
            None => {
                warn!("{}: ran out of bytes", rewriter.reader().address());
                break;
            }
        };

        if let Some(instr) = rewriter.last_instruction() {
            println!(
                "{}  {} {}",
                instr.address(),
                format_bytes(bus, instr.address(), instr.length()),
                instr
            );
        }

        for stmt in cluster.statements() {
            println!("        {}", stmt);
        }
    }

    Ok(())
}

/// List instructions and their IR, starting from a given address.
pub fn dis(project: &Project, prog: &Program, args: &ArgMatches) -> io::Result<()> {
    let arch = resolve_arch(prog)?;
    let bus = prog.load_memory(project.root())?;
    let start = parse_address(args.value_of("start_pc").unwrap_or_default())?;
    let count = match args.value_of("count") {
        Some(count) => count.parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a valid count: {}", count, e),
            )
        })?,
        None => 16,
    };

    with_architecture!(arch, |arch| { dis_for_arch(arch, &bus, start, count) })
}
