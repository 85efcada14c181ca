//! Symbol Locator: resolves a textual identifier to a symbol by
//! walking the current block and then the global symbol heaps, and resolves
//! a member of a UDT/enum by walking its field list (chasing the leading
//! `BaseClass` entry through single inheritance when a name isn't found
//! directly).

use std::rc::Rc;

use crate::context::ExpressionContext;
use crate::declaration::Declaration;
use crate::declaration_factory;
use crate::error::{CoreError, CoreResult};
use crate::handle::SymHandle;
use crate::session::{SymTag, SymbolSession};

/// `FindObject`: local lookup against the current block,
/// falling back to the global symbol heaps.
pub fn find_object(ctx: &Rc<ExpressionContext>, session: &dyn SymbolSession, name: &str) -> CoreResult<Rc<Declaration>> {
	let name_bytes = name.as_bytes();

	let handle = match find_local(session, ctx.block(), name_bytes) {
		Some(h) => h,
		None => find_global(session, name_bytes).ok_or(CoreError::NotFound)?,
	};

	declaration_factory::decl_of_sym(ctx, session, ctx.types(), handle, 0)
}

/// `FindLocalSymbol`: queries only the
/// immediate block. The TODO to walk outward through enclosing lexical
/// scopes is preserved, not implemented — this is intentional, current
/// behavior, not an oversight.
fn find_local(session: &dyn SymbolSession, block: SymHandle, name: &[u8]) -> Option<SymHandle> {
	// TODO: walk outward through enclosing lexical blocks once the session
	// exposes a parent-block query; for now only the innermost block is
	// consulted.
	session.find_child_symbol(block, name)
}

/// `FindGlobalSymbol`: iterates all symbol heaps in order and
/// takes the first hit; no overload resolution is performed here.
fn find_global(session: &dyn SymbolSession, name: &[u8]) -> Option<SymHandle> {
	for heap in 0..crate::session::SYM_HEAP_COUNT {
		if let Some(cursor) = session.find_first_symbol(heap, name) {
			if let Some(handle) = session.get_current_symbol(cursor) {
				return Some(handle);
			}
		}
	}
	None
}

/// `GetThis`: child lookup of the literal name `this` in the
/// current block.
pub fn get_this(ctx: &Rc<ExpressionContext>, session: &dyn SymbolSession) -> CoreResult<Rc<Declaration>> {
	let handle = session.find_child_symbol(ctx.block(), b"this").ok_or(CoreError::NotFound)?;
	declaration_factory::decl_of_sym(ctx, session, ctx.types(), handle, 0)
}

/// Member lookup within a UDT/enum.
/// `owner` must be a `Declaration::Type` variant (a UDT or enum); anything
/// else fails with `NotFound`.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(ctx, session, owner)))]
pub fn find_member(ctx: &Rc<ExpressionContext>, session: &dyn SymbolSession, owner: &Rc<Declaration>, name: &str) -> CoreResult<Rc<Declaration>> {
	let owner_handle = owner.type_handle().ok_or(CoreError::NotFound)?;
	let (_, owner_view) = session.get_type_info(owner_handle).ok_or(CoreError::NotFound)?;
	let mut field_list_idx = owner_view.field_list().ok_or(CoreError::NotFound)?;
	let name_bytes = name.as_bytes();

	let hit = loop {
		let field_list_handle = session.get_type_from_type_index(field_list_idx).ok_or(CoreError::NotFound)?;

		if let Some(found) = session.find_child_type(field_list_handle, name_bytes) {
			break found;
		}

		// Not found directly: base classes are guaranteed first in the
		// field list. Follow that chain one link and
		// retry against the base's own field list.
		let scope = session.set_child_type_scope(field_list_handle);
		let base_handle = *scope.first().ok_or(CoreError::NotFound)?;
		let (_, base_view) = session.get_type_info(base_handle).ok_or(CoreError::NotFound)?;
		if base_view.sym_tag() != SymTag::BaseClass {
			return Err(CoreError::NotFound);
		}

		let base_class_idx = base_view.ty().ok_or(CoreError::NotFound)?;
		let base_class_handle = session.get_type_from_type_index(base_class_idx).ok_or(CoreError::NotFound)?;
		let (_, base_class_view) = session.get_type_info(base_class_handle).ok_or(CoreError::NotFound)?;
		field_list_idx = base_class_view.field_list().ok_or(CoreError::NotFound)?;
	};

	if owner_view.sym_tag() == SymTag::Enum {
		// The hit is an enum member: its value's type
		// must be the enum, not the underlying integer, so materialize
		// *this* enum's `Type` fresh rather than reconstructing the
		// member's own (absent) type index.
		let enum_ty = ctx.types().new_enum(owner);
		declaration_factory::decl_of_enum_member(ctx, session, enum_ty, hit)
	} else {
		declaration_factory::decl_of_data_type_handle(ctx, session, ctx.types(), hit, 0)
	}
}
