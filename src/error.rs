//! Error kinds for the symbol-resolution and value-binding core.
//!
//! Lookup failures are collapsed to [`CoreError::NotFound`] at the public
//! surface regardless of the deeper cause (missing session, missing field
//! list, broken base-class chain, …) — the caller's next action is always
//! the same: report to the user.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
	#[error("not found")]
	NotFound,

	#[error("not implemented")]
	NotImplemented,

	#[error("invalid argument")]
	InvalidArgument,

	#[error("symbol lacks a required attribute")]
	InvalidState,

	#[error("debugger proxy I/O error: {0}")]
	Io(String),

	#[error("partial copy: requested {requested} bytes, completed {completed}")]
	PartialCopy { requested: usize, completed: usize },

	#[error("out of memory")]
	OutOfMemory,

	#[error("type graph recursion limit exceeded")]
	RecursionLimit,
}

pub type CoreResult<T> = Result<T, CoreError>;
