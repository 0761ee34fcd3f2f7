//! Fatal errors that stop a lint run before any check executes.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LintError {
    #[error("Unknown check: {0}")]
    UnknownCheck(String),
}
