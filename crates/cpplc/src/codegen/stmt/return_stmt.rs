use cppl_ast::ReturnStmt;
use inkwell::values::BasicValue;

use crate::codegen::{CodeGen, Usage};
use crate::diagnostics::{DiagnosticResult, SemanticError};

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    pub(super) fn lower_return(&mut self, ret: &ReturnStmt) -> DiagnosticResult<()> {
        let value = match &ret.value {
            Some(expr) => {
                let raw = self.lower_expr(expr, Usage::Value)?;
                // The operand itself may diverge: `return if c { return 1 } else { return 2 }`.
                if self.is_terminated() {
                    return Ok(());
                }
                let value = self.expect_value(raw, expr)?;
                Some((value, expr))
            }
            None => None,
        };

        match (&value, self.ret_ty.is_void()) {
            (None, true) => {}
            (Some((value, _)), false) => {
                let ret_ty = self.ret_ty;
                self.check_type(&ret_ty, &value.ty(), "the returned value", ret.span.clone())?;
            }
            (Some(_), true) => {
                return Err(SemanticError::mismatch(format!(
                    "`{}` returns `void` but a value is returned",
                    self.fn_name
                ))
                .at(ret.span.clone()));
            }
            (None, false) => {
                return Err(SemanticError::mismatch(format!(
                    "`{}` must return a value of type `{}`",
                    self.fn_name,
                    self.type_name(&self.ret_ty)
                ))
                .at(ret.span.clone()));
            }
        }
        match value {
            Some((value, expr)) => {
                let value = self.expect_basic(value, expr)?;
                self.builder.build_return(Some(&value as &dyn BasicValue<'ctx>))?;
            }
            None => {
                self.builder.build_return(None)?;
            }
        }
        Ok(())
    }
}
