//! Declaration: the handle-independent symbol/type facade the evaluator
//! binds names and values against. A `General` declaration wraps a
//! data/function symbol; a `Type` declaration wraps a UDT/enum type and
//! additionally knows how to look up a member and resolve an enum's backing
//! integer type.
//!
//! Reference-counted rather than arena-allocated: a declaration must be able
//! to outlive a single evaluation while never outliving its owning context,
//! which this crate gets from `Rc` plus a `Weak` back-reference (see
//! DESIGN.md for the tradeoff).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use derivative::Derivative;

use crate::context::ExpressionContext;
use crate::handle::{SymHandle, TypeHandle};
use crate::session::{DataKind, LocationType, SymTag, Variant};
use crate::types::Type;

#[derive(Debug)]
enum DeclKind {
	/// A data symbol, function, or typedef target:
	/// anything that isn't itself a UDT/enum type declaration.
	General {
		sym: SymHandle,
		data_kind: Option<DataKind>,
		location: Option<LocationType>,
		offset: Option<i32>,
		value: Option<Variant>,
		ty: Option<Rc<Type>>,
	},
	/// A UDT or enum type declaration.
	Type { handle: TypeHandle, sym_tag: SymTag, backing: Option<Rc<Type>> },
	/// A typedef that didn't elide to its target's own declaration (its name
	/// differs from the target's — elision only happens on an exact byte
	/// match). Carries no `TypeHandle` of its own since the session
	/// models typedefs as symbols, not members of the type space.
	Typedef { target: Rc<Type> },
}

/// `ctx` and `name_cache` are omitted from `Debug`: a `Weak` back-reference
/// prints nothing useful, and the lazily-filled name cache is redundant with
/// `raw_name`.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Declaration {
	#[derivative(Debug = "ignore")]
	ctx: Weak<ExpressionContext>,
	raw_name: Option<Vec<u16>>,
	#[derivative(Debug = "ignore")]
	name_cache: RefCell<Option<Rc<str>>>,
	kind: DeclKind,
}

impl Declaration {
	pub(crate) fn new_general(
		ctx: &Rc<ExpressionContext>,
		sym: SymHandle,
		raw_name: Option<Vec<u16>>,
		data_kind: Option<DataKind>,
		location: Option<LocationType>,
		offset: Option<i32>,
		value: Option<Variant>,
		ty: Option<Rc<Type>>,
	) -> Rc<Declaration> {
		Rc::new(Declaration {
			ctx: Rc::downgrade(ctx),
			raw_name,
			name_cache: RefCell::new(None),
			kind: DeclKind::General { sym, data_kind, location, offset, value, ty },
		})
	}

	pub(crate) fn new_type(
		ctx: &Rc<ExpressionContext>,
		handle: TypeHandle,
		raw_name: Option<Vec<u16>>,
		sym_tag: SymTag,
		backing: Option<Rc<Type>>,
	) -> Rc<Declaration> {
		Rc::new(Declaration {
			ctx: Rc::downgrade(ctx),
			raw_name,
			name_cache: RefCell::new(None),
			kind: DeclKind::Type { handle, sym_tag, backing },
		})
	}

	pub(crate) fn new_typedef(ctx: &Rc<ExpressionContext>, raw_name: Option<Vec<u16>>, target: Rc<Type>) -> Rc<Declaration> {
		Rc::new(Declaration {
			ctx: Rc::downgrade(ctx),
			raw_name,
			name_cache: RefCell::new(None),
			kind: DeclKind::Typedef { target },
		})
	}

	/// The owning expression context, if it hasn't already been torn down.
	pub fn context(&self) -> Option<Rc<ExpressionContext>> {
		self.ctx.upgrade()
	}

	/// Lazily converts and caches the UTF-16 name.
	pub fn name(&self) -> Option<Rc<str>> {
		if let Some(cached) = self.name_cache.borrow().as_ref() {
			return Some(cached.clone());
		}
		let raw = self.raw_name.as_ref()?;
		let name: Rc<str> = Rc::from(String::from_utf16_lossy(raw));
		*self.name_cache.borrow_mut() = Some(name.clone());
		Some(name)
	}

	pub fn sym_handle(&self) -> Option<SymHandle> {
		match &self.kind {
			DeclKind::General { sym, .. } => Some(*sym),
			DeclKind::Type { .. } | DeclKind::Typedef { .. } => None,
		}
	}

	pub fn type_handle(&self) -> Option<TypeHandle> {
		match &self.kind {
			DeclKind::Type { handle, .. } => Some(*handle),
			DeclKind::General { .. } | DeclKind::Typedef { .. } => None,
		}
	}

	pub fn location(&self) -> Option<LocationType> {
		match &self.kind {
			DeclKind::General { location, .. } => *location,
			DeclKind::Type { .. } | DeclKind::Typedef { .. } => None,
		}
	}

	pub fn value(&self) -> Option<Variant> {
		match &self.kind {
			DeclKind::General { value, .. } => *value,
			DeclKind::Type { .. } | DeclKind::Typedef { .. } => None,
		}
	}

	pub fn ty(&self) -> Option<Rc<Type>> {
		match &self.kind {
			DeclKind::General { ty, .. } => ty.clone(),
			DeclKind::Typedef { target } => Some(target.clone()),
			DeclKind::Type { .. } => None,
		}
	}

	/// A field's byte offset within its enclosing UDT.
	pub fn offset(&self) -> Option<i32> {
		match &self.kind {
			DeclKind::General { offset, .. } => *offset,
			DeclKind::Type { .. } | DeclKind::Typedef { .. } => None,
		}
	}

	/// `true` for a UDT member field.
	pub fn is_field(&self) -> bool {
		matches!(&self.kind, DeclKind::General { data_kind: Some(DataKind::Member), .. })
	}

	/// `true` for anything with a storage location a debugger can read —
	/// locals, statics, globals, static members, parameters.
	pub fn is_var(&self) -> bool {
		matches!(
			&self.kind,
			DeclKind::General {
				data_kind: Some(
					DataKind::Local
						| DataKind::StaticLocal | DataKind::Param
						| DataKind::ObjectPtr | DataKind::FileStatic
						| DataKind::Global | DataKind::StaticMember
				),
				..
			}
		)
	}

	pub fn is_constant(&self) -> bool {
		matches!(&self.kind, DeclKind::General { data_kind: Some(DataKind::Constant), .. })
	}

	pub fn is_type(&self) -> bool {
		matches!(&self.kind, DeclKind::Type { .. } | DeclKind::Typedef { .. })
	}

	pub fn is_enum(&self) -> bool {
		matches!(&self.kind, DeclKind::Type { sym_tag: SymTag::Enum, .. })
	}

	pub fn is_udt(&self) -> bool {
		matches!(&self.kind, DeclKind::Type { sym_tag: SymTag::Udt, .. })
	}

	/// An enum declaration's underlying integer type, resolved through the
	/// Basic Type Map at construction time by the declaration factory.
	pub fn backing_type(&self) -> Option<Rc<Type>> {
		match &self.kind {
			DeclKind::Type { backing, .. } => backing.clone(),
			DeclKind::General { .. } | DeclKind::Typedef { .. } => None,
		}
	}

	/// Member lookup is a case-specific operation. Only a `Type` declaration
	/// (a UDT or enum) can have members; anything else reports `NotFound`.
	pub fn find_object(self: &Rc<Self>, name: &str) -> crate::error::CoreResult<Rc<Declaration>> {
		match &self.kind {
			DeclKind::Type { .. } => {
				let ctx = self.ctx.upgrade().ok_or(crate::error::CoreError::NotFound)?;
				let session = ctx.session()?;
				crate::symbol_locator::find_member(&ctx, session.as_ref(), self, name)
			}
			DeclKind::General { .. } | DeclKind::Typedef { .. } => Err(crate::error::CoreError::NotFound),
		}
	}
}
