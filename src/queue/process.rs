//! The scan loop

use crate::analysis::{Block, Diagnostics, Reference, ReferenceKind};
use crate::arch::Architecture;
use crate::database::{DataItem, Database, Item, Landing};
use crate::memory::{AddressOracle, Memory, Pointer};
use crate::queue::actions::process_item;
use crate::queue::context::{Cancellation, ScanContext};
use crate::queue::{Response, ScanReport, Status, WorkItem, WorkKey};
use crate::types::{Signature, TypeDescriptor};
use rayon::prelude::*;
use std::collections::{HashMap, VecDeque};

/// Discovers the code and data reachable from a set of starting points.
///
/// Work is processed in waves. Each wave takes everything queued, processes
/// the items in parallel against a snapshot of the database, then merges the
/// results one at a time in the order the items were queued. An item is only
/// ever queued from the merge step, so no item is processed twice.
pub struct Scanner<'a, AR>
where
    AR: Architecture,
{
    arch: AR,
    bus: &'a Memory,
    host: &'a dyn Diagnostics,
    queue: VecDeque<WorkItem>,
    status: HashMap<WorkKey, Status>,
    db: Database,
    cancel: Cancellation,
}

impl<'a, AR> Scanner<'a, AR>
where
    AR: Architecture,
{
    pub fn new(arch: AR, bus: &'a Memory, host: &'a dyn Diagnostics) -> Self {
        Scanner {
            arch,
            bus,
            host,
            queue: VecDeque::new(),
            status: HashMap::new(),
            db: Database::new(),
            cancel: Cancellation::new(),
        }
    }

    /// Declare a location execution starts from.
    pub fn add_entry_point(&mut self, at: Pointer) {
        self.discover(WorkItem::Procedure {
            at,
            kind: ReferenceKind::Entrypoint,
            signature: None,
            from: None,
        });
    }

    /// Declare a procedure, optionally with a known signature.
    pub fn enqueue_user_procedure(&mut self, at: Pointer, signature: Option<Signature>) {
        self.discover(WorkItem::Procedure {
            at,
            kind: ReferenceKind::Subroutine,
            signature,
            from: None,
        });
    }

    /// Declare a global variable of a known type.
    pub fn enqueue_user_global(&mut self, at: Pointer, ty: TypeDescriptor) {
        self.discover(WorkItem::GlobalData { at, ty, from: None });
    }

    /// A handle that stops the scan before the next work item starts.
    pub fn cancellation(&self) -> Cancellation {
        self.cancel.clone()
    }

    pub fn status(&self, key: &WorkKey) -> Status {
        self.status
            .get(key)
            .copied()
            .unwrap_or(Status::Unvisited)
    }

    /// The number of work items waiting to be processed.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn into_database(self) -> Database {
        self.db
    }

    /// Process work until the queue is empty or the scan is cancelled.
    ///
    /// Items that had not started when the scan was cancelled stay queued,
    /// and the database holds the results of every item that did run.
    pub fn run(&mut self) -> ScanReport {
        let mut report = ScanReport::default();

        while !self.queue.is_empty() && !self.cancel.is_cancelled() {
            let wave: Vec<WorkItem> = self.queue.drain(..).collect();

            debug!("scanning a wave of {} item(s)", wave.len());

            let responses: Vec<Response> = {
                let ctx = ScanContext {
                    arch: self.arch,
                    bus: self.bus,
                    db: &self.db,
                    host: self.host,
                    cancel: &self.cancel,
                };

                wave.into_par_iter()
                    .map(|item| process_item(&ctx, item))
                    .collect()
            };

            let mut unstarted = Vec::new();
            for response in responses {
                self.merge(response, &mut report, &mut unstarted);
            }

            for item in unstarted.into_iter().rev() {
                self.queue.push_front(item);
            }
        }

        report.remaining = self.queue.len();
        report.cancelled = self.cancel.is_cancelled() && report.remaining > 0;

        info!(
            "scanned {} item(s), {} with errors, {} left",
            report.processed, report.failed, report.remaining
        );

        report
    }

    /// Offer a newly found item to the queue.
    ///
    /// References are recorded even when their target is already known.
    /// Targets outside of mapped memory are reported and dropped.
    fn discover(&mut self, item: WorkItem) {
        let at = item.at();

        if let Some(from) = item.from() {
            self.db
                .insert_crossreference(Reference::new_static_ref(from, at, item.kind()));
        }

        if !self.bus.is_mapped(at) {
            self.host.warn(
                item.from().unwrap_or(at),
                &format!("reference to {} leads outside of mapped memory", at),
            );
            return;
        }

        if let WorkItem::Procedure {
            kind,
            ref signature,
            ..
        } = item
        {
            if kind.is_procedure() {
                self.db.insert_procedure(at, kind, signature.clone());
            }
        }

        let key = item.key();
        if self.status(&key) == Status::Unvisited {
            self.status.insert(key, Status::Queued);
            self.queue.push_back(item);
        }
    }

    fn finish(&mut self, item: &WorkItem, failed: bool, report: &mut ScanReport) {
        self.status.insert(item.key(), Status::Processed);

        report.processed += 1;
        if failed {
            report.failed += 1;
        }
    }

    fn merge(&mut self, response: Response, report: &mut ScanReport, unstarted: &mut Vec<WorkItem>) {
        match response {
            Response::Cancelled(item) => unstarted.push(item),
            Response::Covered(item) => {
                let landed = self.land(item.at());

                self.finish(&item, !landed, report);
            }
            Response::Code {
                item,
                block,
                discovered,
                error,
            } => {
                let mut failed = error.is_some();
                let limit = match block {
                    Some(block) => self.merge_block(block, &mut failed),
                    None => Some(item.at()),
                };

                self.finish(&item, failed || limit.is_none(), report);

                for found in discovered {
                    let in_block = match (limit, found.from()) {
                        (Some(limit), Some(from)) => from < limit,
                        (Some(_), None) => true,
                        (None, _) => false,
                    };

                    if in_block {
                        self.discover(found);
                    }
                }
            }
            Response::Data {
                item,
                size,
                discovered,
                error,
            } => {
                if let WorkItem::GlobalData { at, ref ty, .. } = item {
                    self.db.insert_global(at, ty.clone());

                    if let Some(size) = size.filter(|size| *size > 0) {
                        self.merge_data(DataItem::new(at, size, ty.clone()));
                    }
                }

                self.finish(&item, error.is_some(), report);

                for found in discovered {
                    self.discover(found);
                }
            }
        }
    }

    /// Settle code at `at` that was already covered by a block when its item
    /// ran.
    fn land(&mut self, at: Pointer) -> bool {
        match self.db.map_mut().land_code(at) {
            Ok(_) => true,
            Err(e) => {
                self.host.error(at, &e.to_string());
                false
            }
        }
    }

    /// Add a freshly decoded block to the map.
    ///
    /// Yields the address the accepted part of the block ends at, or `None`
    /// if none of it could be accepted. A block cut short by data sets
    /// `failed`.
    fn merge_block(&mut self, mut block: Block, failed: &mut bool) -> Option<Pointer> {
        let start = block.start();

        match self.db.map_mut().land_code(start) {
            Ok(Landing::Free) => {}
            Ok(_) => return Some(block.end()),
            Err(e) => {
                self.host.error(start, &e.to_string());
                return None;
            }
        }

        let mut flows_into = None;
        if let Some(next) = self.db.map().next_item_start(start) {
            if next < block.end() {
                let boundary = block.align_to_instruction(next).unwrap_or(start);

                if boundary != next {
                    self.host.error(
                        boundary,
                        &format!("instruction overlaps the item at {}", next),
                    );
                } else if let Some(last) = next
                    .checked_offset(-1)
                    .and_then(|p| block.align_to_instruction(p))
                {
                    flows_into = Some((last, next));
                }

                block.truncate((boundary - start) as usize);
            }
        }

        let end = block.end();
        if let Err(e) = self.db.map_mut().insert_block(block) {
            self.host.error(start, &e.to_string());
            return None;
        }

        if let Some((last, next)) = flows_into {
            if !self.flow_into(last, next) {
                *failed = true;
            }
        }

        Some(end)
    }

    /// Connect code ending at `last` to the item at `next` that follows it.
    ///
    /// Code is linked with a reference; data is reported. Yields whether the
    /// flow was acceptable.
    fn flow_into(&mut self, last: Pointer, next: Pointer) -> bool {
        match self.db.map().item_at(next) {
            Some(Item::Data(_)) => {
                self.host
                    .error(last, &format!("code runs into the data at {}", next));
                false
            }
            _ => {
                self.discover(WorkItem::Procedure {
                    at: next,
                    kind: ReferenceKind::Code,
                    signature: None,
                    from: Some(last),
                });
                true
            }
        }
    }

    fn merge_data(&mut self, data: DataItem) {
        let at = data.start();
        let same = self
            .db
            .map()
            .item_at(at)
            .and_then(Item::as_data)
            .map_or(false, |d| d.start() == at && d.length() == data.length());

        if same {
            return;
        }

        if let Err(e) = self.db.map_mut().insert_data(data) {
            self.host.warn(at, &e.to_string());
        }
    }
}
