//! VM errors

use thiserror::Error;

/// VM result
pub type VMResult<T> = Result<T, VMError>;

/// VM errors
///
/// Undefined jump targets and the step ceiling are not errors: they end the
/// run with a [`crate::vm::VMStatus::Halted`] result that keeps the output
/// produced so far.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VMError {
    #[error("Malformed quadruple at {pc}: {quad} ({reason})")]
    MalformedQuadruple {
        /// Index of the offending quadruple
        pc: usize,
        /// Its textual form
        quad: String,
        /// Which field is wrong
        reason: &'static str,
    },
}
