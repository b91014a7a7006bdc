//! Queue context type

use crate::analysis::Diagnostics;
use crate::arch::Architecture;
use crate::database::Database;
use crate::memory::Memory;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag asking a scan to stop.
///
/// Clones share the same flag, so a clone can be handed to another thread
/// and set while the scan runs.
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Cancellation::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a work item needs while it is processed.
///
/// The database is a read-only snapshot: items never see each other's
/// results until the wave they ran in has been merged.
pub struct ScanContext<'a, AR>
where
    AR: Architecture,
{
    /// The architecture to disassemble with.
    pub arch: AR,

    /// An immutable reference to the current memory bus.
    pub bus: &'a Memory,

    pub db: &'a Database,

    pub host: &'a dyn Diagnostics,

    pub cancel: &'a Cancellation,
}
