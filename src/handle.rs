//! Opaque keys into the external symbol session.
//!
//! The core never interprets the bits of a [`SymHandle`]/[`TypeHandle`]; it
//! only carries them back to the session. A real backend might encode a
//! table index, a byte offset into a PDB stream, or a pointer-sized cookie.

use std::fmt::{Debug, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct SymHandle(pub u64);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TypeHandle(pub u64);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TypeIndex(pub u32);

impl Debug for SymHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "SymHandle({:#x})", self.0)
	}
}

impl Debug for TypeHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "TypeHandle({:#x})", self.0)
	}
}

impl Debug for TypeIndex {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "TypeIndex({:#x})", self.0)
	}
}

/// A copy of a small, session-owned value record.
/// The core never inspects its bytes, only round-trips it back to the
/// session via `CopySymbolInfo`.
#[derive(Copy, Clone)]
pub struct SymInfoData(pub [u8; 32]);

impl Default for SymInfoData {
	fn default() -> Self {
		SymInfoData([0u8; 32])
	}
}

impl Debug for SymInfoData {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "SymInfoData(..)")
	}
}
