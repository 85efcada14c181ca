//! Register Map: maps debug-info register numbers to an
//! architecture-neutral register id, and the external register-bank
//! capability.

use crate::error::{CoreError, CoreResult};

/// An architecture register id. `0` means "unsupported".
/// Named constants mirror the x86 register set; only the ones this crate's
/// tests exercise are spelled out, the rest are plain numbers so the table
/// below can still be dense and exhaustive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct ArchReg(pub u16);

impl ArchReg {
	pub const NONE: ArchReg = ArchReg(0);
	pub const EAX: ArchReg = ArchReg(17);
	pub const ECX: ArchReg = ArchReg(18);
	pub const EDX: ArchReg = ArchReg(19);
	pub const EBX: ArchReg = ArchReg(20);
	pub const ESP: ArchReg = ArchReg(21);
	pub const EBP: ArchReg = ArchReg(22);
	pub const ESI: ArchReg = ArchReg(23);
	pub const EDI: ArchReg = ArchReg(24);
}

/// The width/kind a register bank reports a value as.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RegType {
	Int8,
	Int16,
	Int32,
	Int64,
	Float32,
	Float64,
	Float80,
}

#[derive(Debug, Copy, Clone)]
pub enum RegBits {
	I8(u8),
	I16(u16),
	I32(u32),
	I64(u64),
	F32(f32),
	F64(f64),
	F80([u8; 10]),
}

#[derive(Debug, Copy, Clone)]
pub struct RegisterValue {
	pub ty: RegType,
	pub bits: RegBits,
}

/// The external register snapshot for a stopped frame.
pub trait RegisterBank {
	fn get_value(&self, reg: ArchReg) -> CoreResult<RegisterValue>;
}

/// The debug-info register number that denotes the synthetic EDX:EAX pair.
/// Chosen arbitrarily by the CodeView producer, outside the dense x86
/// register block.
pub const CV_REG_EDXEAX: u32 = 1000;

/// Cardinality asserted at compile time.
pub const REG_MAP_LEN: usize = 252;

/// Dense table indexed by debug-info register number. Entries at indexes
/// the CodeView producer never emits (floating slots, reserved control
/// registers, …) are `ArchReg::NONE`, meaning "unsupported".
/// The concrete mapping for a handful of general-purpose 32-bit registers
/// is filled in so `RegRel`/`Enregistered` locations against EBP/ESP/etc.
/// resolve; unmapped entries fail lookup the same way.
pub static REG_MAP_X86: [ArchReg; REG_MAP_LEN] = build_reg_map();

const fn build_reg_map() -> [ArchReg; REG_MAP_LEN] {
	let mut table = [ArchReg::NONE; REG_MAP_LEN];
	// CodeView x86 register numbers (CV_REG_E*): ..., EAX=17, ECX=18,
	// EDX=19, EBX=20, ESP=21, EBP=22, ESI=23, EDI=24.
	table[17] = ArchReg::EAX;
	table[18] = ArchReg::ECX;
	table[19] = ArchReg::EDX;
	table[20] = ArchReg::EBX;
	table[21] = ArchReg::ESP;
	table[22] = ArchReg::EBP;
	table[23] = ArchReg::ESI;
	table[24] = ArchReg::EDI;
	table
}

const _: () = assert!(REG_MAP_X86.len() == 252);

/// A decoded register read, widened on read: integers widen to 64
/// bits, 32/64-bit floats widen to 80-bit extended, 80-bit floats pass
/// through verbatim. `Int64`/`UInt64` distinguishes signedness only for
/// the `RegRel` address path, which requires an integral register value.
#[derive(Debug, Copy, Clone)]
pub enum RegReadout {
	UInt64(u64),
	Float80([u8; 10]),
}

/// Reads register `cv_reg` and applies the widening rules above,
/// including the synthetic EDX:EAX pair.
pub fn read_register(bank: &dyn RegisterBank, cv_reg: u32) -> CoreResult<RegReadout> {
	if cv_reg == CV_REG_EDXEAX {
		let edx = bank.get_value(ArchReg::EDX)?;
		let eax = bank.get_value(ArchReg::EAX)?;
		let edx_bits = match edx.bits {
			RegBits::I32(v) => v as u64,
			_ => return Err(CoreError::InvalidState),
		};
		let eax_bits = match eax.bits {
			RegBits::I32(v) => v as u64,
			_ => return Err(CoreError::InvalidState),
		};
		return Ok(RegReadout::UInt64((edx_bits << 32) | eax_bits));
	}

	let idx = cv_reg as usize;
	if idx >= REG_MAP_X86.len() {
		return Err(CoreError::InvalidState);
	}
	let reg = REG_MAP_X86[idx];
	if reg == ArchReg::NONE {
		return Err(CoreError::InvalidState);
	}

	let value = bank.get_value(reg)?;
	match (value.ty, value.bits) {
		(RegType::Int8, RegBits::I8(v)) => Ok(RegReadout::UInt64(v as u64)),
		(RegType::Int16, RegBits::I16(v)) => Ok(RegReadout::UInt64(v as u64)),
		(RegType::Int32, RegBits::I32(v)) => Ok(RegReadout::UInt64(v as u64)),
		(RegType::Int64, RegBits::I64(v)) => Ok(RegReadout::UInt64(v)),
		(RegType::Float32, RegBits::F32(v)) => Ok(RegReadout::Float80(crate::memory::f32_to_f80(v))),
		(RegType::Float64, RegBits::F64(v)) => Ok(RegReadout::Float80(crate::memory::f64_to_f80(v))),
		(RegType::Float80, RegBits::F80(v)) => Ok(RegReadout::Float80(v)),
		_ => Err(CoreError::InvalidState),
	}
}
