//! Test-only mock implementations of the external collaborators this crate
//! consumes. Stands in for a real CodeView/PDB decoder and a real target
//! process so the walkthrough scenarios are directly testable.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{CoreError, CoreResult};
use crate::handle::{SymHandle, SymInfoData, TypeHandle, TypeIndex};
use crate::register::{ArchReg, RegisterBank, RegisterValue};
use crate::session::{DataKind, LocationType, SymTag, SymbolEnum, SymbolInfoView, SymbolSession, UdtKind, Variant};
use crate::target::{CoreModule, CoreThread, DebuggerProxy, MemoryRead, ProcessHandle};

/// A fully-optional symbol/type record; tests set only the fields their
/// scenario cares about.
#[derive(Clone)]
pub struct MockSymbol {
	pub name: Option<Vec<u16>>,
	pub sym_tag: SymTag,
	pub data_kind: Option<DataKind>,
	pub location: Option<LocationType>,
	pub register: Option<u32>,
	pub offset: Option<i32>,
	pub address_offset: Option<u32>,
	pub address_segment: Option<u16>,
	pub value: Option<Variant>,
	pub ty: Option<TypeIndex>,
	pub length: Option<u32>,
	pub count: Option<u32>,
	pub basic_type: Option<u32>,
	pub udt_kind: Option<UdtKind>,
	pub field_list: Option<TypeIndex>,
	pub param_list: Option<TypeIndex>,
	pub types: Option<Vec<TypeIndex>>,
	pub oem_id: Option<u32>,
	pub oem_symbol_id: Option<u32>,
}

impl MockSymbol {
	pub fn new(sym_tag: SymTag) -> Self {
		MockSymbol {
			name: None,
			sym_tag,
			data_kind: None,
			location: None,
			register: None,
			offset: None,
			address_offset: None,
			address_segment: None,
			value: None,
			ty: None,
			length: None,
			count: None,
			basic_type: None,
			udt_kind: None,
			field_list: None,
			param_list: None,
			types: None,
			oem_id: None,
			oem_symbol_id: None,
		}
	}

	pub fn with_name(mut self, name: &str) -> Self {
		self.name = Some(name.encode_utf16().collect());
		self
	}

	pub fn with_data_kind(mut self, kind: DataKind) -> Self {
		self.data_kind = Some(kind);
		self
	}

	pub fn with_location(mut self, loc: LocationType) -> Self {
		self.location = Some(loc);
		self
	}

	pub fn with_ty(mut self, ty: u32) -> Self {
		self.ty = Some(TypeIndex(ty));
		self
	}

	pub fn with_length(mut self, len: u32) -> Self {
		self.length = Some(len);
		self
	}

	pub fn with_count(mut self, count: u32) -> Self {
		self.count = Some(count);
		self
	}

	pub fn with_basic_type(mut self, basic: u32) -> Self {
		self.basic_type = Some(basic);
		self
	}

	pub fn with_value(mut self, v: Variant) -> Self {
		self.value = Some(v);
		self
	}

	pub fn with_field_list(mut self, ty: u32) -> Self {
		self.field_list = Some(TypeIndex(ty));
		self
	}

	pub fn with_udt_kind(mut self, kind: UdtKind) -> Self {
		self.udt_kind = Some(kind);
		self
	}
}

impl SymbolInfoView for MockSymbol {
	fn name(&self) -> Option<Vec<u16>> {
		self.name.clone()
	}
	fn sym_tag(&self) -> SymTag {
		self.sym_tag
	}
	fn data_kind(&self) -> Option<DataKind> {
		self.data_kind
	}
	fn location(&self) -> Option<LocationType> {
		self.location
	}
	fn register(&self) -> Option<u32> {
		self.register
	}
	fn offset(&self) -> Option<i32> {
		self.offset
	}
	fn address_offset(&self) -> Option<u32> {
		self.address_offset
	}
	fn address_segment(&self) -> Option<u16> {
		self.address_segment
	}
	fn value(&self) -> Option<Variant> {
		self.value
	}
	fn ty(&self) -> Option<TypeIndex> {
		self.ty
	}
	fn length(&self) -> Option<u32> {
		self.length
	}
	fn count(&self) -> Option<u32> {
		self.count
	}
	fn basic_type(&self) -> Option<u32> {
		self.basic_type
	}
	fn udt_kind(&self) -> Option<UdtKind> {
		self.udt_kind
	}
	fn field_list(&self) -> Option<TypeIndex> {
		self.field_list
	}
	fn param_list(&self) -> Option<TypeIndex> {
		self.param_list
	}
	fn types(&self) -> Option<Vec<TypeIndex>> {
		self.types.clone()
	}
	fn oem_id(&self) -> Option<u32> {
		self.oem_id
	}
	fn oem_symbol_id(&self) -> Option<u32> {
		self.oem_symbol_id
	}
}

/// An in-memory stand-in for the symbol session. Tests wire it
/// up by hand: insert symbols/types under chosen handle ids, map type
/// indexes to type handles, and register parent→child and heap→name edges.
#[derive(Default)]
pub struct MockSession {
	symbols: RefCell<HashMap<u64, MockSymbol>>,
	types: RefCell<HashMap<u64, MockSymbol>>,
	type_index_to_handle: RefCell<HashMap<u32, u64>>,
	children: RefCell<HashMap<u64, HashMap<Vec<u8>, u64>>>,
	field_children: RefCell<HashMap<u64, HashMap<Vec<u8>, u64>>>,
	field_scopes: RefCell<HashMap<u64, Vec<u64>>>,
	globals: RefCell<HashMap<(usize, Vec<u8>), u64>>,
	va_map: RefCell<HashMap<(u16, u32), u64>>,
}

impl MockSession {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_symbol(&self, handle: u64, sym: MockSymbol) -> SymHandle {
		self.symbols.borrow_mut().insert(handle, sym);
		SymHandle(handle)
	}

	pub fn add_type(&self, handle: u64, sym: MockSymbol) -> TypeHandle {
		self.types.borrow_mut().insert(handle, sym);
		TypeHandle(handle)
	}

	pub fn map_type_index(&self, index: u32, handle: TypeHandle) {
		self.type_index_to_handle.borrow_mut().insert(index, handle.0);
	}

	pub fn add_child_symbol(&self, block: SymHandle, name: &str, child: SymHandle) {
		self.children.borrow_mut().entry(block.0).or_default().insert(name.as_bytes().to_vec(), child.0);
	}

	pub fn add_field(&self, field_list: TypeHandle, name: &str, child: TypeHandle) {
		self.field_children.borrow_mut().entry(field_list.0).or_default().insert(name.as_bytes().to_vec(), child.0);
	}

	/// `SetChildTypeScope`/`NextType` collapsed into one call:
	/// the field list's members in declaration order, base classes first.
	pub fn set_field_scope(&self, field_list: TypeHandle, members: Vec<TypeHandle>) {
		self.field_scopes.borrow_mut().insert(field_list.0, members.into_iter().map(|h| h.0).collect());
	}

	pub fn add_global(&self, heap: usize, name: &str, handle: SymHandle) {
		self.globals.borrow_mut().insert((heap, name.as_bytes().to_vec()), handle.0);
	}

	pub fn set_va(&self, section: u16, offset: u32, va: u64) {
		self.va_map.borrow_mut().insert((section, offset), va);
	}
}

impl SymbolSession for MockSession {
	fn get_symbol_info(&self, handle: SymHandle) -> Option<(SymInfoData, Box<dyn SymbolInfoView>)> {
		let sym = self.symbols.borrow().get(&handle.0)?.clone();
		Some((SymInfoData::default(), Box::new(sym)))
	}

	fn get_type_info(&self, handle: TypeHandle) -> Option<(SymInfoData, Box<dyn SymbolInfoView>)> {
		let sym = self.types.borrow().get(&handle.0)?.clone();
		Some((SymInfoData::default(), Box::new(sym)))
	}

	fn get_type_from_type_index(&self, index: TypeIndex) -> Option<TypeHandle> {
		self.type_index_to_handle.borrow().get(&index.0).map(|&h| TypeHandle(h))
	}

	fn find_child_symbol(&self, block: SymHandle, name: &[u8]) -> Option<SymHandle> {
		self.children.borrow().get(&block.0)?.get(name).map(|&h| SymHandle(h))
	}

	fn find_child_type(&self, field_list: TypeHandle, name: &[u8]) -> Option<TypeHandle> {
		self.field_children.borrow().get(&field_list.0)?.get(name).map(|&h| TypeHandle(h))
	}

	fn set_child_type_scope(&self, field_list: TypeHandle) -> Vec<TypeHandle> {
		self.field_scopes.borrow().get(&field_list.0).cloned().unwrap_or_default().into_iter().map(TypeHandle).collect()
	}

	fn find_first_symbol(&self, heap: usize, name: &[u8]) -> Option<SymbolEnum> {
		let handle = *self.globals.borrow().get(&(heap, name.to_vec()))?;
		Some(SymbolEnum(handle))
	}

	fn get_current_symbol(&self, cursor: SymbolEnum) -> Option<SymHandle> {
		Some(SymHandle(cursor.0))
	}

	fn get_va_from_sec_offset(&self, section: u16, offset: u32) -> u64 {
		*self.va_map.borrow().get(&(section, offset)).unwrap_or(&0)
	}
}

/// A fixed register bank a test seeds by hand.
#[derive(Default)]
pub struct MockRegisterBank {
	values: RefCell<HashMap<u16, RegisterValue>>,
}

impl MockRegisterBank {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&self, reg: ArchReg, value: RegisterValue) {
		self.values.borrow_mut().insert(reg.0, value);
	}
}

impl RegisterBank for MockRegisterBank {
	fn get_value(&self, reg: ArchReg) -> CoreResult<RegisterValue> {
		self.values.borrow().get(&reg.0).copied().ok_or(CoreError::NotFound)
	}
}

/// A flat, sparse address space standing in for the target process. An
/// address with no seeded byte reads back as a short read
/// (`complete: false`), matching a real unmapped-page fault.
#[derive(Default)]
pub struct MockProxy {
	mem: RefCell<HashMap<u64, u8>>,
}

impl MockProxy {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn seed(&self, addr: u64, bytes: &[u8]) {
		let mut mem = self.mem.borrow_mut();
		for (i, b) in bytes.iter().enumerate() {
			mem.insert(addr + i as u64, *b);
		}
	}

	pub fn snapshot(&self, addr: u64, len: usize) -> Vec<u8> {
		let mem = self.mem.borrow();
		(0..len).map(|i| *mem.get(&(addr + i as u64)).unwrap_or(&0)).collect()
	}
}

impl DebuggerProxy for MockProxy {
	fn read_memory(&self, _process: ProcessHandle, addr: u64, len: usize) -> CoreResult<MemoryRead> {
		let mem = self.mem.borrow();
		let mut bytes = Vec::with_capacity(len);
		for i in 0..len as u64 {
			match mem.get(&(addr + i)) {
				Some(b) => bytes.push(*b),
				None => return Ok(MemoryRead { bytes, complete: false }),
			}
		}
		Ok(MemoryRead { bytes, complete: true })
	}

	fn write_memory(&self, _process: ProcessHandle, addr: u64, bytes: &[u8]) -> CoreResult<usize> {
		let mut mem = self.mem.borrow_mut();
		for (i, b) in bytes.iter().enumerate() {
			mem.insert(addr + i as u64, *b);
		}
		Ok(bytes.len())
	}
}

pub struct MockThread {
	pub process: ProcessHandle,
	pub teb_base: u64,
	pub proxy: Rc<dyn DebuggerProxy>,
}

impl CoreThread for MockThread {
	fn core_process(&self) -> ProcessHandle {
		self.process
	}

	fn teb_base(&self) -> u64 {
		self.teb_base
	}

	fn debugger_proxy(&self) -> Rc<dyn DebuggerProxy> {
		self.proxy.clone()
	}
}

pub struct MockModule {
	pub session: Rc<dyn SymbolSession>,
}

impl CoreModule for MockModule {
	fn symbol_session(&self) -> Option<Rc<dyn SymbolSession>> {
		Some(self.session.clone())
	}
}

/// A module whose session can never be acquired.
#[derive(Default)]
pub struct SessionlessModule;

impl CoreModule for SessionlessModule {
	fn symbol_session(&self) -> Option<Rc<dyn SymbolSession>> {
		None
	}
}
