//! Interfaces the core consumes: the symbol session and the
//! typed view it hands back for a given handle. Raw CodeView/PDB decoding
//! lives behind this trait boundary and is out of scope for this crate —
//! callers plug in a real decoder or, for tests, [`crate::testutil`]'s mock.

use crate::handle::{SymHandle, SymInfoData, TypeHandle, TypeIndex};

/// Discriminates what kind of program entity a symbol/type handle names.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SymTag {
	Null,
	Data,
	Function,
	Typedef,
	Udt,
	Enum,
	FunctionType,
	PointerType,
	ArrayType,
	BaseType,
	CustomType,
	ManagedType,
	BaseClass,
	NestedType,
}

/// The kind of storage a data symbol denotes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DataKind {
	Unknown,
	Local,
	StaticLocal,
	Param,
	ObjectPtr,
	FileStatic,
	Global,
	Member,
	StaticMember,
	Constant,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UdtKind {
	Struct,
	Union,
	Class,
}

/// A symbol's location kind. Not every variant is reachable via
/// the general value-binding path (`BitField`, `ThisRel`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LocationType {
	Null,
	RegRel { register: u32, offset: i32 },
	Static { section: u16, offset: u32 },
	Tls { offset: u32 },
	Constant,
	Enregistered { register: u32 },
	BitField,
	ThisRel,
}

/// A constant symbol's literal value, as reported by the session.
#[derive(Debug, Copy, Clone)]
pub enum Variant {
	I64(i64),
	U64(u64),
	F64(f64),
}

/// One of the session's partitioned global symbol tables.
pub const SYM_HEAP_COUNT: usize = 5;

/// An opaque cursor into a `FindFirstSymbol` enumeration, consumed by `GetCurrentSymbol`.
#[derive(Debug, Copy, Clone)]
pub struct SymbolEnum(pub u64);

/// The capability-bearing view materialized from a `SymInfoData`. A session hands one of these back alongside the copied
/// data record; the core only ever calls through this trait.
pub trait SymbolInfoView {
	fn name(&self) -> Option<Vec<u16>>;
	fn sym_tag(&self) -> SymTag;
	fn data_kind(&self) -> Option<DataKind>;
	fn location(&self) -> Option<LocationType>;
	/// Register number for `RegRel`/`Enregistered` locations.
	fn register(&self) -> Option<u32>;
	fn offset(&self) -> Option<i32>;
	fn address_offset(&self) -> Option<u32>;
	fn address_segment(&self) -> Option<u16>;
	fn value(&self) -> Option<Variant>;
	/// Type index for data/typedef/pointer/array element types.
	fn ty(&self) -> Option<TypeIndex>;
	/// Byte size, for UDTs/basic types.
	fn length(&self) -> Option<u32>;
	/// Element count, for fixed arrays and parameter lists.
	fn count(&self) -> Option<u32>;
	/// `(basic_id, size)` is read via `basic_type`+`length`.
	fn basic_type(&self) -> Option<u32>;
	fn udt_kind(&self) -> Option<UdtKind>;
	fn field_list(&self) -> Option<TypeIndex>;
	fn param_list(&self) -> Option<TypeIndex>;
	/// Parameter/OEM-referenced type indexes, in order.
	fn types(&self) -> Option<Vec<TypeIndex>>;
	fn oem_id(&self) -> Option<u32>;
	fn oem_symbol_id(&self) -> Option<u32>;
}

/// The external symbol session. Decodes raw debug
/// info on demand; the core treats it as an opaque, already-synchronized
/// collaborator.
pub trait SymbolSession {
	fn get_symbol_info(&self, handle: SymHandle) -> Option<(SymInfoData, Box<dyn SymbolInfoView>)>;
	fn get_type_info(&self, handle: TypeHandle) -> Option<(SymInfoData, Box<dyn SymbolInfoView>)>;
	fn get_type_from_type_index(&self, index: TypeIndex) -> Option<TypeHandle>;
	fn find_child_symbol(&self, block: SymHandle, name: &[u8]) -> Option<SymHandle>;
	fn find_child_type(&self, field_list: TypeHandle, name: &[u8]) -> Option<TypeHandle>;
	/// Enumerates a field list's members in declaration order, base classes
	/// first. Used to find the leading `BaseClass` entry when
	/// `find_child_type` misses.
	fn set_child_type_scope(&self, field_list: TypeHandle) -> Vec<TypeHandle>;
	fn find_first_symbol(&self, heap: usize, name: &[u8]) -> Option<SymbolEnum>;
	fn get_current_symbol(&self, cursor: SymbolEnum) -> Option<SymHandle>;
	fn get_va_from_sec_offset(&self, section: u16, offset: u32) -> u64;
}
