//! Queued/multithreaded analysis

mod actions;
mod command;
mod context;
mod process;
mod response;

pub use command::{Status, WorkItem, WorkKey};
pub use context::{Cancellation, ScanContext};
pub use process::Scanner;
pub use response::{Response, ScanReport};

#[cfg(test)]
mod tests;
