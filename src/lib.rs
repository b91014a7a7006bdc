//! Static control-flow and data discovery for retro machine code.

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_plain;

#[macro_use]
extern crate clap;

#[macro_use]
extern crate log;

#[macro_use]
pub mod arch;

pub mod analysis;
pub mod cli;
pub mod database;
pub mod ir;
pub mod memory;
pub mod project;
pub mod queue;
pub mod reg;
pub mod types;
