//! Queue Response Type

use crate::analysis::{Block, Error};
use crate::queue::WorkItem;

/// The result of processing one work item against a snapshot of the
/// database.
///
/// Responses are merged into the database one at a time, in queue order.
pub enum Response {
    /// The cancellation token was set before the item started.
    Cancelled(WorkItem),

    /// Result of a static scan at a given address.
    Code {
        item: WorkItem,

        /// The block decoded from the item's address, if any instruction
        /// could be decoded.
        block: Option<Block>,

        /// Targets found in the block, each with the address of the
        /// instruction that referred to it.
        discovered: Vec<WorkItem>,

        /// The analysis error that ended the block, if any.
        error: Option<Error>,
    },

    /// The item's address was already covered by a block in the snapshot.
    Covered(WorkItem),

    /// Result of interpreting a global.
    Data {
        item: WorkItem,

        /// The size of the global, if its type has one.
        size: Option<usize>,
        discovered: Vec<WorkItem>,
        error: Option<Error>,
    },
}

/// Summary of a call to `Scanner::run`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// How many work items were processed.
    pub processed: usize,

    /// How many of those ended with an error.
    pub failed: usize,

    /// How many work items are still queued.
    pub remaining: usize,

    /// Whether the scan stopped because it was cancelled.
    pub cancelled: bool,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.remaining == 0
    }
}
