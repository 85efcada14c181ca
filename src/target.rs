//! Target-process collaborators the core consumes.

use std::rc::Rc;

use crate::error::CoreResult;
use crate::session::SymbolSession;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct ProcessHandle(pub u64);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct ThreadHandle(pub u64);

/// Result of a target memory read: the valid prefix, and whether the read
/// came up short.
pub struct MemoryRead {
	pub bytes: Vec<u8>,
	pub complete: bool,
}

/// The debugger's IPC/ptrace transport.
/// Every call may block while communicating with the stopped target.
pub trait DebuggerProxy {
	fn read_memory(&self, process: ProcessHandle, addr: u64, len: usize) -> CoreResult<MemoryRead>;
	fn write_memory(&self, process: ProcessHandle, addr: u64, bytes: &[u8]) -> CoreResult<usize>;
}

/// A suspended thread in the target.
pub trait CoreThread {
	fn core_process(&self) -> ProcessHandle;
	/// TEB base address, for TLS resolution.
	fn teb_base(&self) -> u64;
	fn debugger_proxy(&self) -> Rc<dyn DebuggerProxy>;
}

/// The module owning the frame's function. Its only responsibility to the core is handing back a
/// symbol session; "a failure to acquire the session from the module is an
/// immediate `NotFound`".
pub trait CoreModule {
	fn symbol_session(&self) -> Option<Rc<dyn SymbolSession>>;
}
