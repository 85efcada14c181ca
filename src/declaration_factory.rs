//! Declaration factory: turns a raw `SymHandle`/`TypeHandle`
//! into a `Declaration`, including typedef elision.

use std::rc::Rc;

use crate::context::ExpressionContext;
use crate::declaration::Declaration;
use crate::error::{CoreError, CoreResult};
use crate::handle::{SymHandle, TypeHandle};
use crate::session::{SymTag, SymbolInfoView, SymbolSession};
use crate::type_reconstructor::{self, basic_id};
use crate::types::TypeEnv;

/// Builds a `Declaration` for a symbol found by the locator. Dispatches on the symbol's tag; typedefs get special handling
/// because they may elide to their target's own declaration.
pub fn decl_of_sym(ctx: &Rc<ExpressionContext>, session: &dyn SymbolSession, env: &TypeEnv, handle: SymHandle, depth: usize) -> CoreResult<Rc<Declaration>> {
	if depth > type_reconstructor::DEFAULT_MAX_DEPTH {
		return Err(CoreError::RecursionLimit);
	}
	let (_, view) = session.get_symbol_info(handle).ok_or(CoreError::NotFound)?;

	match view.sym_tag() {
		SymTag::Typedef => decl_of_typedef_symbol(ctx, session, env, view.as_ref(), depth),
		SymTag::Udt | SymTag::Enum => {
			let type_idx = view.ty().ok_or(CoreError::InvalidState)?;
			let type_handle = session.get_type_from_type_index(type_idx).ok_or(CoreError::NotFound)?;
			decl_of_type_handle(ctx, session, env, type_handle, depth + 1)
		}
		SymTag::Data | SymTag::Function => decl_of_data_symbol(ctx, session, env, handle, view.as_ref(), depth),
		_ => Err(CoreError::InvalidState),
	}
}

/// Location kinds a data/function symbol is permitted to carry; anything
/// else (notably `Null`) fails here rather than surfacing later at
/// `get_value`/`get_address`.
fn location_permitted(location: Option<crate::session::LocationType>) -> bool {
	matches!(
		location,
		Some(crate::session::LocationType::RegRel { .. })
			| Some(crate::session::LocationType::Static { .. })
			| Some(crate::session::LocationType::Tls { .. })
			| Some(crate::session::LocationType::Constant)
			| Some(crate::session::LocationType::Enregistered { .. })
			| Some(crate::session::LocationType::BitField)
			| Some(crate::session::LocationType::ThisRel)
	)
}

fn decl_of_data_symbol(
	ctx: &Rc<ExpressionContext>,
	session: &dyn SymbolSession,
	env: &TypeEnv,
	handle: SymHandle,
	view: &dyn SymbolInfoView,
	depth: usize,
) -> CoreResult<Rc<Declaration>> {
	if !location_permitted(view.location()) {
		return Err(CoreError::InvalidState);
	}
	let ty = match view.ty() {
		Some(idx) => Some(type_reconstructor::type_of(ctx, session, env, idx, depth + 1)?),
		None => None,
	};
	let offset = match view.location() {
		Some(crate::session::LocationType::RegRel { offset, .. }) => Some(offset),
		_ => view.offset(),
	};
	Ok(Declaration::new_general(ctx, handle, view.name(), view.data_kind(), view.location(), offset, view.value(), ty))
}

fn decl_of_typedef_symbol(
	ctx: &Rc<ExpressionContext>,
	session: &dyn SymbolSession,
	env: &TypeEnv,
	view: &dyn SymbolInfoView,
	depth: usize,
) -> CoreResult<Rc<Declaration>> {
	let target_idx = view.ty().ok_or(CoreError::InvalidState)?;
	let target_handle = session.get_type_from_type_index(target_idx).ok_or(CoreError::NotFound)?;
	let (_, target_view) = session.get_type_info(target_handle).ok_or(CoreError::NotFound)?;

	// Elision: a typedef whose name is byte-identical
	// to its target's own name is transparent — return the target's
	// declaration directly rather than wrapping it.
	if matches!(target_view.sym_tag(), SymTag::Udt | SymTag::Enum) && names_match(&view.name(), &target_view.name()) {
		return decl_of_type_handle(ctx, session, env, target_handle, depth + 1);
	}

	let target_ty = type_reconstructor::type_of_handle(ctx, session, env, target_handle, depth + 1)?;
	Ok(Declaration::new_typedef(ctx, view.name(), target_ty))
}

fn names_match(a: &Option<Vec<u16>>, b: &Option<Vec<u16>>) -> bool {
	matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Builds a `Declaration` for a UDT/enum type handle. Used both
/// by [`decl_of_sym`] and directly by the type reconstructor when it needs
/// a `Udt`/`Enum` type node's owning declaration.
pub fn decl_of_type_handle(ctx: &Rc<ExpressionContext>, session: &dyn SymbolSession, env: &TypeEnv, handle: TypeHandle, depth: usize) -> CoreResult<Rc<Declaration>> {
	if depth > type_reconstructor::DEFAULT_MAX_DEPTH {
		return Err(CoreError::RecursionLimit);
	}
	let (_, view) = session.get_type_info(handle).ok_or(CoreError::NotFound)?;
	let sym_tag = view.sym_tag();
	if !matches!(sym_tag, SymTag::Udt | SymTag::Enum) {
		return Err(CoreError::InvalidState);
	}

	let backing = if sym_tag == SymTag::Enum {
		let basic = view.basic_type().ok_or(CoreError::InvalidState)?;
		let size = view.length().ok_or(CoreError::InvalidState)?;
		Some(env.get_basic_type(basic, size, || basic_type_fallback(basic, size)))
	} else {
		None
	};

	Ok(Declaration::new_type(ctx, handle, view.name(), sym_tag, backing))
}

fn basic_type_fallback(basic: u32, size: u32) -> crate::types::Type {
	match basic {
		basic_id::SIGNED_INT => crate::types::Type::Int { bits: (size * 8) as u8, signed: true },
		basic_id::UNSIGNED_INT => crate::types::Type::Int { bits: (size * 8) as u8, signed: false },
		_ => crate::types::Type::Int { bits: 32, signed: true },
	}
}

/// Projects a field-list entry that is itself a plain data
/// field (a nested struct/union/class member, not an enum member) into a
/// `General` declaration, reconstructing its type from its own type index.
/// Only a `Data`-tagged type handle is accepted; anything else fails.
pub fn decl_of_data_type_handle(ctx: &Rc<ExpressionContext>, session: &dyn SymbolSession, env: &TypeEnv, handle: TypeHandle, depth: usize) -> CoreResult<Rc<Declaration>> {
	if depth > type_reconstructor::DEFAULT_MAX_DEPTH {
		return Err(CoreError::RecursionLimit);
	}
	let (_, view) = session.get_type_info(handle).ok_or(CoreError::NotFound)?;
	if view.sym_tag() != SymTag::Data {
		return Err(CoreError::InvalidState);
	}
	if !location_permitted(view.location()) {
		return Err(CoreError::InvalidState);
	}

	let ty = match view.ty() {
		Some(idx) => Some(type_reconstructor::type_of(ctx, session, env, idx, depth + 1)?),
		None => None,
	};
	let offset = match view.location() {
		Some(crate::session::LocationType::RegRel { offset, .. }) => Some(offset),
		_ => view.offset(),
	};
	Ok(Declaration::new_general(ctx, SymHandle::default(), view.name(), view.data_kind(), view.location(), offset, view.value(), ty))
}

/// Projects an enum member (an `LF_ENUMERATE`-shaped field-list entry,
/// reached only via a `TypeHandle`) into a `General` declaration whose type
/// is the *owning enum's* type, not the member's own (absent) type index.
/// Carries the member's literal value as a `Constant` location so
/// `GetValue` reads it without a memory access.
pub fn decl_of_enum_member(ctx: &Rc<ExpressionContext>, session: &dyn SymbolSession, enum_ty: Rc<crate::types::Type>, handle: TypeHandle) -> CoreResult<Rc<Declaration>> {
	let (_, view) = session.get_type_info(handle).ok_or(CoreError::NotFound)?;
	if view.sym_tag() != SymTag::Data {
		return Err(CoreError::InvalidState);
	}
	let value = view.value().ok_or(CoreError::InvalidState)?;
	Ok(Declaration::new_general(
		ctx,
		SymHandle::default(),
		view.name(),
		Some(crate::session::DataKind::Constant),
		Some(crate::session::LocationType::Constant),
		None,
		Some(value),
		Some(enum_ty),
	))
}
