//! Error taxonomy for the Grid Engine adapter.

use gridq_parsers::CommandError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SgeError {
    /// The scheduler tool could not be run or exited non-zero.
    #[error(transparent)]
    ExecutionError(#[from] CommandError),
    /// The tool ran but its output did not match the expected schema.
    #[error("Failed to parse {command} output: {reason}")]
    ParseError {
        command: &'static str,
        reason: String,
    },
}

impl SgeError {
    pub(crate) fn parse(command: &'static str, reason: impl Into<String>) -> Self {
        SgeError::ParseError {
            command,
            reason: reason.into(),
        }
    }
}
