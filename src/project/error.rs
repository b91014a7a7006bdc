//! Error type for project loading

use std::{io, result};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Underlying cause of error is I/O related
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Underlying cause of error is JSON related
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Asked for a program that is not listed in the project
    #[error("program {0} is missing from the project file")]
    UnknownProgram(String),

    /// Neither the project nor the command line said what this is
    #[error("unspecified {0}, analysis cannot continue")]
    Unspecified(&'static str),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(e) => e,
            Error::Json(e) => io::Error::new(io::ErrorKind::InvalidData, e),
            _ => io::Error::new(io::ErrorKind::InvalidInput, format!("{}", err)),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
