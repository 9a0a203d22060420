use cppl_ast::{BinaryOp, InfixExpr};
use inkwell::values::BasicValueEnum;

use crate::codegen::CodeGen;
use crate::diagnostics::{DiagnosticResult, SemanticError};
use crate::ir::Value;

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    pub(super) fn lower_infix_expr(
        &mut self,
        infix: &InfixExpr,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        let Some(lhs) = self.lower_operand(&infix.lhs)? else {
            return Ok(None);
        };
        let Some(rhs) = self.lower_operand(&infix.rhs)? else {
            return Ok(None);
        };

        if !lhs.ty().is_numeric() {
            return Err(SemanticError::mismatch(format!(
                "cannot apply `{}` to a value of type `{}`",
                infix.op,
                self.type_name(&lhs.ty())
            ))
            .at(infix.lhs.span()));
        }
        self.check_type(
            &lhs.ty(),
            &rhs.ty(),
            &format!("the right operand of `{}`", infix.op),
            infix.rhs.span(),
        )?;

        let lhs = self.expect_basic(lhs, &infix.lhs)?;
        let rhs = self.expect_basic(rhs, &infix.rhs)?;
        let value = self.build_arith(infix.op, lhs, rhs)?;
        Ok(Some(Value::Basic(value)))
    }

    /// Integer division and remainder are unsigned; the language has no
    /// signed arithmetic yet.
    fn build_arith(
        &self,
        op: BinaryOp,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
    ) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        let b = &self.builder;
        let value: BasicValueEnum<'ctx> = match (lhs, rhs) {
            (BasicValueEnum::IntValue(l), BasicValueEnum::IntValue(r)) => {
                let int = match op {
                    BinaryOp::Add => b.build_int_add(l, r, "add")?,
                    BinaryOp::Sub => b.build_int_sub(l, r, "sub")?,
                    BinaryOp::Mul => b.build_int_mul(l, r, "mul")?,
                    BinaryOp::Div => b.build_int_unsigned_div(l, r, "udiv")?,
                    BinaryOp::Mod => b.build_int_unsigned_rem(l, r, "urem")?,
                };
                int.into()
            }
            (BasicValueEnum::FloatValue(l), BasicValueEnum::FloatValue(r)) => {
                let float = match op {
                    BinaryOp::Add => b.build_float_add(l, r, "fadd")?,
                    BinaryOp::Sub => b.build_float_sub(l, r, "fsub")?,
                    BinaryOp::Mul => b.build_float_mul(l, r, "fmul")?,
                    BinaryOp::Div => b.build_float_div(l, r, "fdiv")?,
                    BinaryOp::Mod => b.build_float_rem(l, r, "frem")?,
                };
                float.into()
            }
            _ => {
                return Err(SemanticError::mismatch(format!(
                    "cannot apply `{}` to these operands",
                    op
                ))
                .into())
            }
        };
        Ok(value)
    }
}
