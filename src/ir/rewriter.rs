//! Lowering of instruction streams into IR clusters

use crate::analysis::Diagnostics;
use crate::arch::{Architecture, Disassembler, MachineInstruction};
use crate::ir::{Class, Cluster, Emitter, Frame, Statement};
use crate::memory::ByteReader;
use crate::reg::State;
use std::iter::FusedIterator;

/// Lowers a stream of instructions into IR, one cluster per instruction.
///
/// The rewriter owns the register state it threads between instructions.
/// State only changes through the assignments in each produced cluster.
pub struct Rewriter<'a, 'h, AR>
where
    AR: Architecture,
{
    arch: AR,
    dasm: Disassembler<'a, AR>,
    state: State,
    frame: Frame,
    host: &'h dyn Diagnostics,
    last: Option<AR::Instruction>,
}

impl<'a, 'h, AR> Rewriter<'a, 'h, AR>
where
    AR: Architecture,
{
    pub fn new(arch: AR, rdr: ByteReader<'a>, state: State, host: &'h dyn Diagnostics) -> Self {
        Rewriter {
            arch,
            dasm: Disassembler::new(arch, rdr),
            state: state.with_pairs(arch.register_pairs()),
            frame: Frame::new(),
            host,
            last: None,
        }
    }

    /// The instruction that produced the most recent cluster.
    pub fn last_instruction(&self) -> Option<&AR::Instruction> {
        self.last.as_ref()
    }

    /// The reader positioned after the most recently decoded instruction.
    pub fn reader(&self) -> &ByteReader<'a> {
        self.dasm.reader()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl<'a, 'h, AR> Iterator for Rewriter<'a, 'h, AR>
where
    AR: Architecture,
{
    type Item = Cluster;

    fn next(&mut self) -> Option<Cluster> {
        let instr = self.dasm.next()?;
        let mut m = Emitter::new();
        let class = self
            .arch
            .rewrite(&instr, &mut m, &self.state, &mut self.frame, self.host);

        let statements = if class == Class::Invalid {
            vec![Statement::Invalid]
        } else {
            m.into_statements()
        };

        let cluster = Cluster::new(instr.address(), instr.length(), class, statements);

        self.state.apply(&cluster);
        self.last = Some(instr);

        Some(cluster)
    }
}

impl<'a, 'h, AR> FusedIterator for Rewriter<'a, 'h, AR> where AR: Architecture {}
