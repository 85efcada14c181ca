//! The semantic type tree and its interning authority.
//!
//! `RefCell`-guarded `FxHashMap` caches keyed by structural identity, one
//! cache per constructor, so two requests for "pointer to `int`" return the
//! same `Rc`. Because a `Declaration` must be independently
//! reference-counted rather than arena-allocated with a borrowed lifetime,
//! `Type` nodes are `Rc`-shared and `Udt`/`Enum` hold a
//! `Weak<Declaration>` to break the cycle (see DESIGN.md).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fxhash::FxHashMap;
use nohash_hasher::IntMap;

use crate::declaration::Declaration;

/// A reconstructed type node. Interned nodes compare equal by
/// pointer identity through `Rc::ptr_eq`; this crate never derives
/// structural `PartialEq` for `Type` so that two distinct-but-equal trees
/// (which interning should prevent from arising anyway) can't silently
/// compare equal by value.
#[derive(Debug)]
pub enum Type {
	Void,
	Int { bits: u8, signed: bool },
	Bool,
	Char8,
	Char16,
	Char32,
	Float32,
	Float64,
	Float80,
	/// Imaginary number of the given float width (32/64/80).
	Imaginary(u8),
	/// Complex number of the given per-component float width.
	Complex(u8),
	Pointer(Rc<Type>),
	/// A fixed-length array.
	SArray { element: Rc<Type>, len: u64 },
	Function { ret: Rc<Type>, params: Vec<Rc<Type>> },
	/// A user-defined type; the declaration carries its field list.
	Udt(Weak<Declaration>),
	Enum(Weak<Declaration>),
	Typedef { name: String, target: Rc<Type> },
	/// D's dynamic array: `{ length, ptr }`.
	DArray(Rc<Type>),
	/// D's associative array.
	AArray { value: Rc<Type>, key: Rc<Type> },
	/// D's delegate: `{ context, funcptr }`.
	Delegate(Rc<Type>),
}

type PtrKey = usize;

fn key_of(rc: &Rc<Type>) -> PtrKey {
	Rc::as_ptr(rc) as PtrKey
}

/// The interning authority for one expression evaluation: one cache per
/// type constructor, scoped to a single [`crate::context::ExpressionContext`].
// `pointers`/`darrays`/`delegates` key on a single already-well-distributed
// pointer value, so hashing it is pure overhead;
// `nohash_hasher::IntMap` skips straight to using the key as its own hash.
#[derive(Default)]
pub struct TypeEnv {
	basic: RefCell<FxHashMap<(u32, u32), Rc<Type>>>,
	pointers: RefCell<IntMap<PtrKey, Rc<Type>>>,
	sarrays: RefCell<FxHashMap<(PtrKey, u64), Rc<Type>>>,
	functions: RefCell<FxHashMap<(PtrKey, Vec<PtrKey>), Rc<Type>>>,
	typedefs: RefCell<FxHashMap<(String, PtrKey), Rc<Type>>>,
	darrays: RefCell<IntMap<PtrKey, Rc<Type>>>,
	aarrays: RefCell<FxHashMap<(PtrKey, PtrKey), Rc<Type>>>,
	delegates: RefCell<IntMap<PtrKey, Rc<Type>>>,
	void_ptr: RefCell<Option<Rc<Type>>>,
}

impl TypeEnv {
	pub fn new() -> Self {
		Self::default()
	}

	/// Interns a basic (non-aggregate) type by `(basic_id, size)`, the Basic
	/// Type Map key.
	pub fn get_basic_type(&self, basic_id: u32, size: u32, build: impl FnOnce() -> Type) -> Rc<Type> {
		if let Some(t) = self.basic.borrow().get(&(basic_id, size)) {
			return t.clone();
		}
		let t = Rc::new(build());
		self.basic.borrow_mut().insert((basic_id, size), t.clone());
		t
	}

	pub fn new_pointer(&self, pointee: Rc<Type>) -> Rc<Type> {
		let key = key_of(&pointee);
		if let Some(t) = self.pointers.borrow().get(&key) {
			return t.clone();
		}
		let t = Rc::new(Type::Pointer(pointee));
		self.pointers.borrow_mut().insert(key, t.clone());
		t
	}

	/// A canonical `void*`, used when the reconstructor can't resolve an
	/// element type.
	pub fn get_void_pointer_type(&self) -> Rc<Type> {
		if let Some(t) = self.void_ptr.borrow().as_ref() {
			return t.clone();
		}
		let void = Rc::new(Type::Void);
		let ptr = Rc::new(Type::Pointer(void));
		*self.void_ptr.borrow_mut() = Some(ptr.clone());
		ptr
	}

	pub fn new_sarray(&self, element: Rc<Type>, len: u64) -> Rc<Type> {
		let key = (key_of(&element), len);
		if let Some(t) = self.sarrays.borrow().get(&key) {
			return t.clone();
		}
		let t = Rc::new(Type::SArray { element, len });
		self.sarrays.borrow_mut().insert(key, t.clone());
		t
	}

	pub fn new_function(&self, ret: Rc<Type>, params: Vec<Rc<Type>>) -> Rc<Type> {
		let key = (key_of(&ret), params.iter().map(key_of).collect::<Vec<_>>());
		if let Some(t) = self.functions.borrow().get(&key) {
			return t.clone();
		}
		let t = Rc::new(Type::Function { ret, params });
		self.functions.borrow_mut().insert(key, t.clone());
		t
	}

	/// User-defined and enum types are never interned by structure: each is
	/// keyed by its owning declaration's identity, which the declaration
	/// factory already interns.
	pub fn new_udt(&self, decl: &Rc<Declaration>) -> Rc<Type> {
		Rc::new(Type::Udt(Rc::downgrade(decl)))
	}

	pub fn new_enum(&self, decl: &Rc<Declaration>) -> Rc<Type> {
		Rc::new(Type::Enum(Rc::downgrade(decl)))
	}

	pub fn new_typedef(&self, name: String, target: Rc<Type>) -> Rc<Type> {
		let key = (name.clone(), key_of(&target));
		if let Some(t) = self.typedefs.borrow().get(&key) {
			return t.clone();
		}
		let t = Rc::new(Type::Typedef { name, target });
		self.typedefs.borrow_mut().insert(key, t.clone());
		t
	}

	pub fn new_darray(&self, element: Rc<Type>) -> Rc<Type> {
		let key = key_of(&element);
		if let Some(t) = self.darrays.borrow().get(&key) {
			return t.clone();
		}
		let t = Rc::new(Type::DArray(element));
		self.darrays.borrow_mut().insert(key, t.clone());
		t
	}

	pub fn new_aarray(&self, value: Rc<Type>, key_ty: Rc<Type>) -> Rc<Type> {
		let cache_key = (key_of(&value), key_of(&key_ty));
		if let Some(t) = self.aarrays.borrow().get(&cache_key) {
			return t.clone();
		}
		let t = Rc::new(Type::AArray { value, key: key_ty });
		self.aarrays.borrow_mut().insert(cache_key, t.clone());
		t
	}

	pub fn new_delegate(&self, func: Rc<Type>) -> Rc<Type> {
		let key = key_of(&func);
		if let Some(t) = self.delegates.borrow().get(&key) {
			return t.clone();
		}
		let t = Rc::new(Type::Delegate(func));
		self.delegates.borrow_mut().insert(key, t.clone());
		t
	}
}

impl Type {
	/// Byte size where statically knowable; `None` for types whose size
	/// depends on target pointer width or the referenced declaration. Used
	/// to size a read/write buffer for scalar locations.
	pub fn fixed_size(&self) -> Option<u32> {
		match self {
			Type::Void => Some(0),
			Type::Int { bits, .. } => Some(*bits as u32 / 8),
			Type::Bool | Type::Char8 => Some(1),
			Type::Char16 => Some(2),
			Type::Char32 | Type::Float32 => Some(4),
			Type::Float64 => Some(8),
			Type::Float80 => Some(10),
			Type::Imaginary(w) | Type::Complex(w) => Some(*w as u32 / 8),
			// 32-bit x86 pointer width.
			Type::Pointer(_) => Some(4),
			Type::SArray { element, len } => element.fixed_size().map(|sz| sz * *len as u32),
			Type::Typedef { target, .. } => target.fixed_size(),
			_ => None,
		}
	}

	pub fn is_float_like(&self) -> bool {
		matches!(self, Type::Float32 | Type::Float64 | Type::Float80 | Type::Imaginary(_) | Type::Complex(_))
	}

	pub fn is_integral(&self) -> bool {
		matches!(self, Type::Int { .. } | Type::Bool | Type::Char8 | Type::Char16 | Type::Char32)
	}

	pub fn is_signed(&self) -> bool {
		matches!(self, Type::Int { signed: true, .. })
	}

	pub fn is_pointer(&self) -> bool {
		matches!(self, Type::Pointer(_))
	}

	/// The Value Binder's "scalar" bucket: anything with a
	/// single-slot numeric representation. D-arrays, associative arrays and
	/// delegates are deliberately excluded — they are multi-field and get
	/// their own decode/encode path.
	pub fn is_scalar(&self) -> bool {
		self.is_pointer() || self.is_integral() || self.is_float_like()
	}

	/// Follows a chain of `Typedef` wrappers down to the first non-typedef
	/// type.
	pub fn unwrap_typedef(&self) -> &Type {
		match self {
			Type::Typedef { target, .. } => target.unwrap_typedef(),
			other => other,
		}
	}
}
