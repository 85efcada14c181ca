//! `DataValue`: the tagged union the Value Binder decodes target
//! bytes into, and encodes back from, on a typed read/write.

/// A decoded or to-be-encoded value for a scalar, dynamic-array, associative
/// -array, or delegate declaration. `Aggregate` stands in for the
/// union's unused state when a type has no scalar representation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DataValue {
	/// A 64-bit integer; signedness is carried by the declaration's type,
	/// not by this value.
	Int(u64),
	/// A pointer or associative-array handle, unsigned.
	Addr(u64),
	/// Canonical 80-bit extended float.
	Float80([u8; 10]),
	Complex80 {
		real: [u8; 10],
		imag: [u8; 10],
	},
	/// D's dynamic array: `{length, ptr}`.
	DArray {
		length: u64,
		addr: u64,
	},
	/// D's delegate: `{context, funcptr}`.
	Delegate {
		context_addr: u64,
		func_addr: u64,
	},
	/// The no-op result for a non-scalar, non-D-array, non-A-array,
	/// non-delegate type.
	Aggregate,
}
