//! Item lowering.
//!
//! These are the hooks the scheduler calls: `declare_struct` computes a
//! struct layout, `declare_function` creates a function signature, and
//! `emit_function_body` lowers a queued body.

pub mod functions;
pub mod structs;
