//! Analysis database - Allows accumulation of program facts as the scanner
//! runs over the program.

mod db;
mod map;

#[cfg(test)]
mod tests;

pub use db::{Database, Global, Procedure};
pub use map::{DataItem, ImageMap, Item, Landing};
