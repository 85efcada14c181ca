//! Value Binder: resolves a declaration's effective address from
//! its location kind, then performs a typed read/write via the Memory
//! Bridge or Register Map, including the TEB-walking TLS path.

use std::convert::TryInto;

use crate::context::ExpressionContext;
use crate::declaration::Declaration;
use crate::error::{CoreError, CoreResult};
use crate::memory;
use crate::register::{self, RegReadout};
use crate::session::{LocationType, Variant};
use crate::types::Type;
use crate::value::DataValue;

/// 32-bit x86 pointer width, reused for D-array/associative-array/delegate
/// field sizing.
pub const PTR_SIZE: usize = 4;
const LENGTH_SIZE: usize = 4;

/// The largest scalar payload this crate ever reads/writes in one shot is a
/// pair of 80-bit floats; every address-based read/write clamps to this
/// width.
const MAX_DATAVALUE_BYTES: usize = 20;

/// Windows 32-bit TEB field offsets.
const TEB_TLS_POINTER_OFFSET: u64 = 0x2C;
const TEB_TLS_SLOTS_OFFSET: u64 = 0xE10;

/// `GetAddress`: resolves a declaration's effective address from
/// its location kind. Only `RegRel`, `Static`, and `TLS` are evaluable here.
pub fn address_of(ctx: &ExpressionContext, decl: &Declaration) -> CoreResult<u64> {
	let loc = decl.location().ok_or(CoreError::InvalidState)?;
	match loc {
		LocationType::RegRel { register, offset } => {
			let base = match register::read_register(ctx.registers(), register)? {
				RegReadout::UInt64(v) => v,
				RegReadout::Float80(_) => return Err(CoreError::InvalidState),
			};
			Ok((base as i64).wrapping_add(offset as i64) as u64)
		}
		LocationType::Static { section, offset } => {
			let session = ctx.session()?;
			let va = session.get_va_from_sec_offset(section, offset);
			if va == 0 {
				return Err(CoreError::InvalidState);
			}
			Ok(va)
		}
		LocationType::Tls { offset } => resolve_tls(ctx, offset),
		_ => Err(CoreError::InvalidState),
	}
}

/// Walks the thread's TEB to find TLS slot 0's buffer: read `*(TEB + ThreadLocalStoragePointer)`; if that's null or
/// self-referential, fall back to `TEB + TlsSlots`; read slot 0 from
/// whichever array address was settled on.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(ctx)))]
fn resolve_tls(ctx: &ExpressionContext, offset: u32) -> CoreResult<u64> {
	let thread = ctx.thread();
	let proxy = thread.debugger_proxy();
	let process = ctx.process();
	let teb = thread.teb_base();

	let tls_ptr_addr = teb + TEB_TLS_POINTER_OFFSET;
	let bytes = memory::read(proxy.as_ref(), process, tls_ptr_addr, 4)?;
	let tls_array_addr = read_u32_le(&bytes)? as u64;

	let tls_array_addr = if tls_array_addr == 0 || tls_array_addr == tls_ptr_addr {
		teb + TEB_TLS_SLOTS_OFFSET
	} else {
		tls_array_addr
	};

	// Only TLS slot 0 is supported.
	let bytes = memory::read(proxy.as_ref(), process, tls_array_addr, 4)?;
	let tls_buf_addr = read_u32_le(&bytes)? as u64;

	Ok(tls_buf_addr + offset as u64)
}

fn read_u32_le(bytes: &[u8]) -> CoreResult<u32> {
	let arr: [u8; 4] = bytes.try_into().map_err(|_| CoreError::InvalidArgument)?;
	Ok(u32::from_le_bytes(arr))
}

/// `GetValue(decl)`: dispatches on location kind.
pub fn get_value(ctx: &ExpressionContext, decl: &Declaration) -> CoreResult<DataValue> {
	let loc = decl.location().ok_or(CoreError::InvalidState)?;
	match loc {
		LocationType::RegRel { .. } | LocationType::Static { .. } | LocationType::Tls { .. } => {
			let addr = address_of(ctx, decl)?;
			let ty = decl.ty().ok_or(CoreError::InvalidState)?;
			get_value_at(ctx, addr, &ty)
		}
		LocationType::Constant => {
			let variant = decl.value().ok_or(CoreError::InvalidState)?;
			Ok(variant_to_data_value(variant))
		}
		LocationType::Enregistered { register } => match register::read_register(ctx.registers(), register)? {
			RegReadout::UInt64(v) => Ok(DataValue::Int(v)),
			RegReadout::Float80(f) => Ok(DataValue::Float80(f)),
		},
		// Not the right entry point for ThisRel/BitField.
		LocationType::ThisRel | LocationType::BitField | LocationType::Null => Err(CoreError::InvalidState),
	}
}

fn variant_to_data_value(v: Variant) -> DataValue {
	match v {
		Variant::I64(i) => DataValue::Int(i as u64),
		Variant::U64(u) => DataValue::Int(u),
		Variant::F64(f) => DataValue::Float80(memory::f64_to_f80(f)),
	}
}

/// `GetValue(addr, type)`: the address-based read shared by
/// `GetValue(decl)`'s `RegRel`/`Static`/`TLS` path and the public
/// `ExpressionContext::get_value_at`.
pub fn get_value_at(ctx: &ExpressionContext, addr: u64, ty: &Type) -> CoreResult<DataValue> {
	let ty = ty.unwrap_typedef();
	let process = ctx.process();
	let proxy = ctx.thread().debugger_proxy();

	match ty {
		Type::DArray(_) => {
			let bytes = memory::read(proxy.as_ref(), process, addr, LENGTH_SIZE + PTR_SIZE)?;
			let length = memory::decode_int(&bytes[..LENGTH_SIZE], LENGTH_SIZE, false)?;
			let array_addr = memory::decode_int(&bytes[LENGTH_SIZE..], PTR_SIZE, false)?;
			Ok(DataValue::DArray { length, addr: array_addr })
		}
		Type::Delegate(_) => {
			let bytes = memory::read(proxy.as_ref(), process, addr, PTR_SIZE * 2)?;
			let context_addr = memory::decode_int(&bytes[..PTR_SIZE], PTR_SIZE, false)?;
			let func_addr = memory::decode_int(&bytes[PTR_SIZE..], PTR_SIZE, false)?;
			Ok(DataValue::Delegate { context_addr, func_addr })
		}
		Type::AArray { .. } => {
			let bytes = memory::read(proxy.as_ref(), process, addr, PTR_SIZE)?;
			let v = memory::decode_int(&bytes, PTR_SIZE, false)?;
			Ok(DataValue::Addr(v))
		}
		_ if !ty.is_scalar() => Ok(DataValue::Aggregate),
		Type::Pointer(_) => {
			let size = ty.fixed_size().ok_or(CoreError::InvalidState)? as usize;
			let bytes = memory::read(proxy.as_ref(), process, addr, size.min(MAX_DATAVALUE_BYTES))?;
			let v = memory::decode_int(&bytes, size, false)?;
			Ok(DataValue::Addr(v))
		}
		Type::Complex(width) => {
			let part_size = (*width as usize / 8) / 2;
			let bytes = memory::read(proxy.as_ref(), process, addr, (part_size * 2).min(MAX_DATAVALUE_BYTES))?;
			let real = memory::decode_float(&bytes[..part_size], part_size)?;
			let imag = memory::decode_float(&bytes[part_size..part_size * 2], part_size)?;
			Ok(DataValue::Complex80 { real, imag })
		}
		_ if ty.is_float_like() => {
			let size = ty.fixed_size().ok_or(CoreError::InvalidState)? as usize;
			let bytes = memory::read(proxy.as_ref(), process, addr, size.min(MAX_DATAVALUE_BYTES))?;
			Ok(DataValue::Float80(memory::decode_float(&bytes, size)?))
		}
		_ if ty.is_integral() => {
			let size = ty.fixed_size().ok_or(CoreError::InvalidState)? as usize;
			let bytes = memory::read(proxy.as_ref(), process, addr, size.min(MAX_DATAVALUE_BYTES))?;
			let v = memory::decode_int(&bytes, size, ty.is_signed())?;
			Ok(DataValue::Int(v))
		}
		_ => Err(CoreError::InvalidState),
	}
}

/// `SetValue(decl, value)`: symmetric inverse of [`get_value`].
pub fn set_value(ctx: &ExpressionContext, decl: &Declaration, value: &DataValue) -> CoreResult<()> {
	let loc = decl.location().ok_or(CoreError::InvalidState)?;
	match loc {
		LocationType::RegRel { .. } | LocationType::Static { .. } | LocationType::Tls { .. } => {
			let addr = address_of(ctx, decl)?;
			let ty = decl.ty().ok_or(CoreError::InvalidState)?;
			set_value_at(ctx, addr, &ty, value)
		}
		// Writing to registers is deliberately not implemented.
		LocationType::Enregistered { .. } => Err(CoreError::NotImplemented),
		// Can't write to a constant, and SetValue isn't the right entry
		// point for ThisRel/BitField.
		LocationType::Constant | LocationType::ThisRel | LocationType::BitField | LocationType::Null => Err(CoreError::InvalidState),
	}
}

/// `SetValue(addr, type, value)`: symmetric inverse of
/// [`get_value_at`]. Writing to an aggregate type succeeds as a no-op;
/// partial writes surface as [`CoreError::PartialCopy`] from the Memory
/// Bridge.
pub fn set_value_at(ctx: &ExpressionContext, addr: u64, ty: &Type, value: &DataValue) -> CoreResult<()> {
	let ty = ty.unwrap_typedef();
	let process = ctx.process();
	let proxy = ctx.thread().debugger_proxy();

	match ty {
		Type::DArray(_) => {
			let (length, array_addr) = match value {
				DataValue::DArray { length, addr } => (*length, *addr),
				_ => return Err(CoreError::InvalidArgument),
			};
			let mut bytes = memory::encode_int(length, LENGTH_SIZE)?;
			bytes.extend(memory::encode_int(array_addr, PTR_SIZE)?);
			memory::write(proxy.as_ref(), process, addr, &bytes)
		}
		Type::Delegate(_) => {
			let (context_addr, func_addr) = match value {
				DataValue::Delegate { context_addr, func_addr } => (*context_addr, *func_addr),
				_ => return Err(CoreError::InvalidArgument),
			};
			let mut bytes = memory::encode_int(context_addr, PTR_SIZE)?;
			bytes.extend(memory::encode_int(func_addr, PTR_SIZE)?);
			memory::write(proxy.as_ref(), process, addr, &bytes)
		}
		Type::AArray { .. } => {
			let v = match value {
				DataValue::Addr(v) => *v,
				_ => return Err(CoreError::InvalidArgument),
			};
			let bytes = memory::encode_int(v, PTR_SIZE)?;
			memory::write(proxy.as_ref(), process, addr, &bytes)
		}
		_ if !ty.is_scalar() => Ok(()),
		Type::Pointer(_) => {
			let v = match value {
				DataValue::Addr(v) => *v,
				_ => return Err(CoreError::InvalidArgument),
			};
			let size = ty.fixed_size().ok_or(CoreError::InvalidState)? as usize;
			let bytes = memory::encode_int(v, size)?;
			memory::write(proxy.as_ref(), process, addr, &bytes)
		}
		Type::Complex(width) => {
			let (real, imag) = match value {
				DataValue::Complex80 { real, imag } => (*real, *imag),
				_ => return Err(CoreError::InvalidArgument),
			};
			let part_size = (*width as usize / 8) / 2;
			let mut bytes = memory::encode_float(real, part_size)?;
			bytes.extend(memory::encode_float(imag, part_size)?);
			memory::write(proxy.as_ref(), process, addr, &bytes)
		}
		_ if ty.is_float_like() => {
			let f = match value {
				DataValue::Float80(f) => *f,
				_ => return Err(CoreError::InvalidArgument),
			};
			let size = ty.fixed_size().ok_or(CoreError::InvalidState)? as usize;
			let bytes = memory::encode_float(f, size)?;
			memory::write(proxy.as_ref(), process, addr, &bytes)
		}
		_ if ty.is_integral() => {
			let v = match value {
				DataValue::Int(v) => *v,
				_ => return Err(CoreError::InvalidArgument),
			};
			let size = ty.fixed_size().ok_or(CoreError::InvalidState)? as usize;
			let bytes = memory::encode_int(v, size)?;
			memory::write(proxy.as_ref(), process, addr, &bytes)
		}
		_ => Err(CoreError::InvalidState),
	}
}
