use cppl_ast::{IntLit, StrLit};
use inkwell::AddressSpace;

use crate::codegen::CodeGen;
use crate::diagnostics::{DiagnosticResult, SemanticError};
use crate::ir::Value;

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    pub(super) fn lower_int_lit(&self, lit: &IntLit) -> DiagnosticResult<Value<'ctx>> {
        if i32::try_from(lit.value).is_err() {
            return Err(SemanticError::mismatch(format!(
                "integer literal `{}` does not fit in `i32`",
                lit.value
            ))
            .at(lit.span.clone()));
        }
        let value = self.context.i32_type().const_int(lit.value as u64, true);
        Ok(Value::Basic(value.into()))
    }

    pub(super) fn lower_bool_lit(&self, value: bool) -> Value<'ctx> {
        Value::Basic(self.context.bool_type().const_int(value as u64, false).into())
    }

    /// `{ data, length }` with the raw byte length, not the character count.
    pub(super) fn lower_str_lit(&mut self, lit: &StrLit) -> Value<'ctx> {
        let bytes = lit.value.as_bytes();
        let global = self.program.ir.intern_string(bytes);
        let data = global
            .as_pointer_value()
            .const_cast(self.context.i8_type().ptr_type(AddressSpace::default()));
        let length = self.program.ir.size_type().const_int(bytes.len() as u64, false);
        let string = self
            .program
            .builtin
            .string
            .const_named_struct(&[data.into(), length.into()]);
        Value::Basic(string.into())
    }
}
