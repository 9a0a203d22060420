//! LLVM IR construction on top of inkwell.
//!
//! Lowering writes straight into an inkwell [`Module`](inkwell::module::Module);
//! [`IrModule`] carries the context, the target layout and the bits of
//! source-level information LLVM does not keep (struct field names, string
//! literal globals). Verification and the textual dump are LLVM's own.

pub mod layout;
pub mod module;
pub mod types;

pub use layout::StructLayout;
pub use module::{IrModule, StructDef, VerifyError};
pub use types::{IrType, Value};
