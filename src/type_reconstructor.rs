//! Type reconstructor: turns a `TypeIndex`/`TypeHandle` from the
//! symbol session into a shared [`Type`] node, recursing through pointers,
//! arrays, function signatures, and OEM-encoded aggregates.

use std::rc::Rc;

use crate::context::ExpressionContext;
use crate::error::{CoreError, CoreResult};
use crate::handle::{TypeHandle, TypeIndex};
use crate::session::{SymTag, SymbolSession};
use crate::types::{Type, TypeEnv};

/// Bounds the worst case of a self- or mutually-referential type graph
/// (e.g. a linked-list node typedef'd through itself) so reconstruction
/// always terminates.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Basic Type Map ids: `(basic_id, size)` selects a scalar
/// `Type` variant. Chosen densely rather than mirroring CodeView's sparse
/// `T_*` constants, since the raw CodeView encoding is the session's
/// concern, not this crate's.
pub mod basic_id {
	pub const VOID: u32 = 0;
	pub const BOOL: u32 = 1;
	pub const CHAR: u32 = 2;
	pub const SIGNED_INT: u32 = 3;
	pub const UNSIGNED_INT: u32 = 4;
	pub const FLOAT: u32 = 5;
	pub const IMAGINARY: u32 = 6;
	pub const COMPLEX: u32 = 7;
}

/// OEM vendor id for D-specific custom types: dynamic array, associative
/// array, and delegate encodings.
pub const OEM_VENDOR_ID: u32 = 0x42;
pub const OEM_SUB_DARRAY: u32 = 1;
pub const OEM_SUB_AARRAY: u32 = 2;
pub const OEM_SUB_DELEGATE: u32 = 3;

pub(crate) fn basic_type_for(basic: u32, size: u32) -> Option<Type> {
	match basic {
		basic_id::VOID => Some(Type::Void),
		basic_id::BOOL => Some(Type::Bool),
		basic_id::CHAR => match size {
			1 => Some(Type::Char8),
			2 => Some(Type::Char16),
			4 => Some(Type::Char32),
			_ => None,
		},
		basic_id::SIGNED_INT => Some(Type::Int { bits: (size * 8) as u8, signed: true }),
		basic_id::UNSIGNED_INT => Some(Type::Int { bits: (size * 8) as u8, signed: false }),
		basic_id::FLOAT => match size {
			4 => Some(Type::Float32),
			8 => Some(Type::Float64),
			10 => Some(Type::Float80),
			_ => None,
		},
		basic_id::IMAGINARY => Some(Type::Imaginary((size * 8) as u8)),
		basic_id::COMPLEX => Some(Type::Complex((size * 8) as u8)),
		_ => None,
	}
}

/// Resolves a `TypeIndex` to a shared `Type`.
pub fn type_of(ctx: &Rc<ExpressionContext>, session: &dyn SymbolSession, env: &TypeEnv, index: TypeIndex, depth: usize) -> CoreResult<Rc<Type>> {
	let handle = session.get_type_from_type_index(index).ok_or(CoreError::NotFound)?;
	type_of_handle(ctx, session, env, handle, depth)
}

/// Resolves an already-looked-up `TypeHandle`; used internally
/// once a symbol's type handle is already on hand, to avoid a redundant
/// index round-trip.
pub fn type_of_handle(ctx: &Rc<ExpressionContext>, session: &dyn SymbolSession, env: &TypeEnv, handle: TypeHandle, depth: usize) -> CoreResult<Rc<Type>> {
	if depth > DEFAULT_MAX_DEPTH {
		return Err(CoreError::RecursionLimit);
	}
	let (_, view) = session.get_type_info(handle).ok_or(CoreError::NotFound)?;

	match view.sym_tag() {
		SymTag::BaseType => {
			let basic = view.basic_type().ok_or(CoreError::InvalidState)?;
			let size = view.length().ok_or(CoreError::InvalidState)?;
			let resolved = basic_type_for(basic, size).ok_or(CoreError::NotFound)?;
			Ok(env.get_basic_type(basic, size, || resolved))
		}

		SymTag::PointerType => {
			let pointee = match view.ty() {
				Some(idx) => type_of(ctx, session, env, idx, depth + 1)?,
				None => return Ok(env.get_void_pointer_type()),
			};
			Ok(env.new_pointer(pointee))
		}

		SymTag::ArrayType => {
			let elem_idx = view.ty().ok_or(CoreError::InvalidState)?;
			let element = type_of(ctx, session, env, elem_idx, depth + 1)?;
			let count = view.count().ok_or(CoreError::InvalidState)? as u64;
			Ok(env.new_sarray(element, count))
		}

		SymTag::FunctionType => {
			let ret_idx = view.ty().ok_or(CoreError::InvalidState)?;
			let ret = type_of(ctx, session, env, ret_idx, depth + 1)?;
			let params = resolve_param_types(ctx, session, env, &view, depth)?;
			Ok(env.new_function(ret, params))
		}

		SymTag::Udt => {
			let decl = crate::declaration_factory::decl_of_type_handle(ctx, session, env, handle, depth + 1)?;
			Ok(env.new_udt(&decl))
		}

		SymTag::Enum => {
			let decl = crate::declaration_factory::decl_of_type_handle(ctx, session, env, handle, depth + 1)?;
			Ok(env.new_enum(&decl))
		}

		SymTag::Typedef => {
			// Typedef elision happens in the
			// declaration factory, which compares names before it ever
			// calls here; by the time we're reconstructing a `Typedef`
			// node directly we keep it, since `Type::Typedef` on its own
			// carries no declaration identity to elide against.
			let name = view.name().map(|raw| ctx.names().intern(&raw).to_string()).unwrap_or_default();
			let target_idx = view.ty().ok_or(CoreError::InvalidState)?;
			let target = type_of(ctx, session, env, target_idx, depth + 1)?;
			Ok(env.new_typedef(name, target))
		}

		SymTag::CustomType => {
			if view.oem_id() != Some(OEM_VENDOR_ID) {
				return Err(CoreError::InvalidState);
			}
			let refs = view.types().ok_or(CoreError::InvalidState)?;
			match view.oem_symbol_id() {
				Some(OEM_SUB_DARRAY) => {
					let elem_idx = *refs.first().ok_or(CoreError::InvalidState)?;
					let element = type_of(ctx, session, env, elem_idx, depth + 1)?;
					Ok(env.new_darray(element))
				}
				Some(OEM_SUB_AARRAY) => {
					let value_idx = *refs.first().ok_or(CoreError::InvalidState)?;
					let key_idx = *refs.get(1).ok_or(CoreError::InvalidState)?;
					let value = type_of(ctx, session, env, value_idx, depth + 1)?;
					let key = type_of(ctx, session, env, key_idx, depth + 1)?;
					Ok(env.new_aarray(value, key))
				}
				Some(OEM_SUB_DELEGATE) => {
					let func_idx = *refs.first().ok_or(CoreError::InvalidState)?;
					let func = type_of(ctx, session, env, func_idx, depth + 1)?;
					Ok(env.new_delegate(func))
				}
				_ => Err(CoreError::InvalidState),
			}
		}

		_ => Err(CoreError::InvalidState),
	}
}

fn resolve_param_types(
	ctx: &Rc<ExpressionContext>,
	session: &dyn SymbolSession,
	env: &TypeEnv,
	view: &Box<dyn crate::session::SymbolInfoView>,
	depth: usize,
) -> CoreResult<Vec<Rc<Type>>> {
	let Some(param_list_idx) = view.param_list() else {
		return Ok(Vec::new());
	};
	let param_list_handle = session.get_type_from_type_index(param_list_idx).ok_or(CoreError::NotFound)?;
	let (_, arglist_view) = session.get_type_info(param_list_handle).ok_or(CoreError::NotFound)?;
	let indices = arglist_view.types().unwrap_or_default();
	indices.into_iter().map(|idx| type_of(ctx, session, env, idx, depth + 1)).collect()
}
