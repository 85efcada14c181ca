//! Symbol-resolution and value-binding core for a CodeView-backed native
//! debugger's expression evaluator. Given a stopped frame and a register
//! snapshot, this crate resolves a textual identifier to a typed
//! [`Declaration`](declaration::Declaration) by walking the program's
//! debug-info symbol tables, reconstructs the declaration's language-level
//! [`Type`](types::Type) from the debug-info type graph, and reads or writes
//! its live value in the target process's memory, thread-local storage, or
//! registers.
//!
//! Everything this crate talks to — process control, breakpoints, the
//! expression parser, raw CodeView/PDB decoding — lives outside it, behind
//! the trait boundaries in [`session`] and [`target`]. [`ExpressionContext`]
//! is the single object a parser/evaluator holds: it aggregates a frame
//! (module, thread, function, block, PC, registers) and exposes `find_object`
//! / `get_this` / `get_address` / `get_value` / `set_value` / `read_memory`.

pub mod context;
pub mod declaration;
pub mod declaration_factory;
pub mod error;
pub mod handle;
pub mod memory;
pub mod name_table;
pub mod register;
pub mod session;
pub mod symbol_locator;
pub mod target;
pub mod type_reconstructor;
pub mod types;
pub mod value;
pub mod value_binder;

#[cfg(test)]
mod testutil;

pub use context::ExpressionContext;
pub use declaration::Declaration;
pub use error::{CoreError, CoreResult};
pub use types::Type;
pub use value::DataValue;
