//! Expression Context: the single object the parser/evaluator
//! is handed, aggregating a frame (function, block, PC, registers, module,
//! thread) plus a fresh type environment and name table scoped to one
//! evaluation.

use std::rc::Rc;

use crate::declaration::Declaration;
use crate::error::{CoreError, CoreResult};
use crate::handle::SymHandle;
use crate::name_table::NameTable;
use crate::register::RegisterBank;
use crate::session::SymbolSession;
use crate::symbol_locator;
use crate::target::{CoreModule, CoreThread, ProcessHandle};
use crate::types::TypeEnv;
use crate::value::DataValue;
use crate::value_binder;

/// Per-frame evaluation state. Constructed once per
/// stopped frame; every `Declaration` the context hands out holds a `Weak`
/// back-reference to it and must not be used once the context is dropped.
pub struct ExpressionContext {
	module: Rc<dyn CoreModule>,
	thread: Rc<dyn CoreThread>,
	registers: Rc<dyn RegisterBank>,
	function: SymHandle,
	block: SymHandle,
	pc: u64,
	types: TypeEnv,
	names: NameTable,
}

impl ExpressionContext {
	/// Builds a fresh context for one frame.
	pub fn new(module: Rc<dyn CoreModule>, thread: Rc<dyn CoreThread>, registers: Rc<dyn RegisterBank>, function: SymHandle, block: SymHandle, pc: u64) -> Rc<ExpressionContext> {
		Rc::new(ExpressionContext { module, thread, registers, function, block, pc, types: TypeEnv::new(), names: NameTable::new() })
	}

	/// Acquires the module's symbol session; a module that can't produce
	/// one collapses immediately to `NotFound`.
	pub fn session(&self) -> CoreResult<Rc<dyn SymbolSession>> {
		self.module.symbol_session().ok_or(CoreError::NotFound)
	}

	pub fn types(&self) -> &TypeEnv {
		&self.types
	}

	pub fn names(&self) -> &NameTable {
		&self.names
	}

	pub fn thread(&self) -> &Rc<dyn CoreThread> {
		&self.thread
	}

	pub fn registers(&self) -> &dyn RegisterBank {
		self.registers.as_ref()
	}

	pub fn process(&self) -> ProcessHandle {
		self.thread.core_process()
	}

	pub fn function(&self) -> SymHandle {
		self.function
	}

	pub fn block(&self) -> SymHandle {
		self.block
	}

	pub fn pc(&self) -> u64 {
		self.pc
	}

	/// `FindObject`: resolve a name against the current
	/// block, then all global symbol heaps.
	#[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
	pub fn find_object(self: &Rc<Self>, name: &str) -> CoreResult<Rc<Declaration>> {
		let session = self.session()?;
		symbol_locator::find_object(self, session.as_ref(), name)
	}

	/// `GetThis`: child lookup of the literal name `this` in
	/// the current block.
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	pub fn get_this(self: &Rc<Self>) -> CoreResult<Rc<Declaration>> {
		let session = self.session()?;
		symbol_locator::get_this(self, session.as_ref())
	}

	/// `GetSuper` — unsupported at this layer.
	pub fn get_super(self: &Rc<Self>) -> CoreResult<Rc<Declaration>> {
		Err(CoreError::NotImplemented)
	}

	/// `GetReturnType` — unsupported at this layer.
	pub fn get_return_type(self: &Rc<Self>) -> CoreResult<Rc<crate::types::Type>> {
		Err(CoreError::NotImplemented)
	}

	/// `GetAddress`.
	pub fn get_address(&self, decl: &Declaration) -> CoreResult<u64> {
		value_binder::address_of(self, decl)
	}

	/// `GetValue(decl)`.
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	pub fn get_value(&self, decl: &Declaration) -> CoreResult<DataValue> {
		value_binder::get_value(self, decl)
	}

	/// `GetValue(addr, type)`.
	pub fn get_value_at(&self, addr: u64, ty: &crate::types::Type) -> CoreResult<DataValue> {
		value_binder::get_value_at(self, addr, ty)
	}

	/// `SetValue(decl, value)`.
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	pub fn set_value(&self, decl: &Declaration, value: &DataValue) -> CoreResult<()> {
		value_binder::set_value(self, decl, value)
	}

	/// `SetValue(addr, type, value)`.
	pub fn set_value_at(&self, addr: u64, ty: &crate::types::Type, value: &DataValue) -> CoreResult<()> {
		value_binder::set_value_at(self, addr, ty, value)
	}

	/// `ReadMemory`: a raw read exposed directly to the
	/// evaluator, independent of any declaration.
	pub fn read_memory(&self, addr: u64, size: usize) -> CoreResult<Vec<u8>> {
		crate::memory::read(self.thread.debugger_proxy().as_ref(), self.process(), addr, size)
	}
}
