//! Queue command executors

use crate::analysis::{Block, Error, GlobalDataInterpreter, ReferenceKind};
use crate::arch::{Architecture, MachineInstruction};
use crate::database::Item;
use crate::ir::{Class, Rewriter};
use crate::memory::Pointer;
use crate::queue::context::ScanContext;
use crate::queue::{Response, WorkItem};
use crate::reg::State;
use crate::types::TypeDescriptor;

/// Process one work item against the context's database snapshot.
///
/// Nothing here mutates shared state; all findings are carried back in the
/// response.
pub fn process_item<AR>(ctx: &ScanContext<'_, AR>, item: WorkItem) -> Response
where
    AR: Architecture,
{
    if ctx.cancel.is_cancelled() {
        return Response::Cancelled(item);
    }

    match item {
        WorkItem::Procedure { at, .. } => scan_code(ctx, item, at),
        WorkItem::GlobalData { at, ref ty, .. } => {
            let ty = ty.clone();

            scan_global(ctx, item, at, &ty)
        }
    }
}

/// Run a static disassembly on a particular location in the program.
///
/// Instructions are collected into one block until control flow leaves it,
/// or the next known item starts. Running into known code links the two
/// blocks; running into data is an error. The block ends early at the first
/// instruction that cannot be decoded or lowered.
pub fn scan_code<AR>(ctx: &ScanContext<'_, AR>, item: WorkItem, at: Pointer) -> Response
where
    AR: Architecture,
{
    if ctx.db.map().item_at(at).is_some() {
        return Response::Covered(item);
    }

    let rdr = match ctx.bus.reader_at(at) {
        Ok(rdr) => rdr,
        Err(_) => {
            ctx.host.error(at, "code is not in readable memory");

            return Response::Code {
                item,
                block: None,
                discovered: Vec::new(),
                error: Some(Error::Unmapped { at }),
            };
        }
    };

    let stop = ctx.db.map().next_item_start(at);
    let mut block = Block::from_parts(at, 0);
    let mut discovered = Vec::new();
    let mut error = None;
    let mut rewriter = Rewriter::new(ctx.arch, rdr, State::new(), ctx.host);

    loop {
        let here = block.end();
        if let Some(stop) = stop.filter(|stop| here >= *stop) {
            let last = block.instructions().last().unwrap_or(at);

            match ctx.db.map().item_at(stop) {
                Some(Item::Data(_)) => {
                    ctx.host
                        .error(last, &format!("code runs into the data at {}", stop));
                    error = Some(Error::Overlap {
                        at: last,
                        existing: stop,
                    });
                }
                _ => discovered.push(WorkItem::Procedure {
                    at: stop,
                    kind: ReferenceKind::Code,
                    signature: None,
                    from: Some(last),
                }),
            }

            break;
        }

        let cluster = match rewriter.next() {
            Some(cluster) => cluster,
            None => {
                ctx.host
                    .error(here, "ran out of bytes partway through an instruction");
                error = Some(Error::Incomplete { at: here });
                break;
            }
        };

        if let Some(stop) = stop {
            if cluster.fallthrough() > stop {
                ctx.host.error(
                    here,
                    &format!("instruction runs into the item at {}", stop),
                );
                error = Some(Error::Overlap {
                    at: here,
                    existing: stop,
                });
                break;
            }
        }

        if cluster.class() == Class::Invalid {
            error = Some(match rewriter.last_instruction() {
                Some(instr) if !instr.is_invalid() => Error::NotImplemented {
                    at: here,
                    mnemonic: instr.mnemonic(),
                },
                _ => Error::InvalidInstruction { at: here },
            });
            break;
        }

        block.push_instruction(cluster.length());

        let target_kind = match cluster.class() {
            Class::Linear => continue,
            Class::Call => ReferenceKind::Subroutine,
            _ => ReferenceKind::Code,
        };

        for target in cluster.static_targets() {
            discovered.push(WorkItem::Procedure {
                at: target,
                kind: target_kind,
                signature: None,
                from: Some(here),
            });
        }

        if cluster.class() != Class::Transfer {
            discovered.push(WorkItem::Procedure {
                at: cluster.fallthrough(),
                kind: ReferenceKind::Code,
                signature: None,
                from: Some(here),
            });
        }

        break;
    }

    debug!("{}: decoded {} byte(s) of code", at, block.length());

    Response::Code {
        item,
        block: Some(block).filter(|b| !b.is_empty()),
        discovered,
        error,
    }
}

/// Interpret a global of type `ty` at `at`.
///
/// Globals in memory without initial contents, such as RAM, are recorded
/// without being interpreted.
pub fn scan_global<AR>(
    ctx: &ScanContext<'_, AR>,
    item: WorkItem,
    at: Pointer,
    ty: &TypeDescriptor,
) -> Response
where
    AR: Architecture,
{
    let size = ty.size_of(ctx.arch.pointer_width());
    let rdr = match ctx.bus.reader_at(at) {
        Ok(rdr) => rdr,
        Err(_) => {
            debug!("{}: global has no initial contents", at);

            return Response::Data {
                item,
                size,
                discovered: Vec::new(),
                error: None,
            };
        }
    };

    let mut interp = GlobalDataInterpreter::new(
        rdr,
        ctx.bus,
        ctx.host,
        ctx.arch.pointer_width(),
        ctx.arch.endianness(),
    );
    let result = interp.interpret(ty);
    let discovered = interp.into_discovered();

    match result {
        Ok(()) => Response::Data {
            item,
            size,
            discovered,
            error: None,
        },
        Err(e) => {
            if e.is_configuration() {
                ctx.host
                    .error(e.address(), &format!("bad type for global {}: {}", at, e));
            } else {
                ctx.host.error(e.address(), &e.to_string());
            }

            Response::Data {
                item,
                size: None,
                discovered,
                error: Some(e.into()),
            }
        }
    }
}
