//! Expression lowering
//!
//! Conventions used throughout this module:
//! - Operands (call arguments, infix sides, conditions, initializers) are
//!   lowered with [`Usage::Value`] and must yield a value; a missing one is
//!   an `ExpectedValue` error. An operand whose every path returns yields
//!   nothing, and the enclosing expression stops lowering there.
//! - Named locals are stack slots, so reading an identifier is a `load`.
//!   Functions are referenced directly as callable values.
//! - Integer literals are `i32`; string literals are constant `string`
//!   structs pointing at a deduplicated module global.

pub mod binary_ops;
pub mod calls;
pub mod control_flow_expr;
pub mod ident;
pub mod literals;
pub mod member_access;

use cppl_ast::Expr;

use super::{CodeGen, Usage};
use crate::diagnostics::DiagnosticResult;
use crate::ir::Value;

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    /// Main expression lowering function. Returns the value the expression
    /// yields, or `None` for void calls, value-less `if`s and expressions
    /// that never complete.
    pub fn lower_expr(
        &mut self,
        expr: &Expr,
        usage: Usage,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        match expr {
            Expr::Int(lit) => self.lower_int_lit(lit).map(Some),
            Expr::Bool(lit) => Ok(Some(self.lower_bool_lit(lit.value))),
            Expr::Str(lit) => Ok(Some(self.lower_str_lit(lit))),
            Expr::Ident(ident) => self.lower_ident_expr(ident).map(Some),
            Expr::Call(call) => self.lower_call_expr(call),
            Expr::MethodCall(call) => self.lower_method_call_expr(call),
            Expr::Member(member) => self.lower_member_expr(member),
            Expr::Infix(infix) => self.lower_infix_expr(infix),
            Expr::Make(make) => self.lower_make_expr(make),
            Expr::If(if_expr) => self.lower_if_expr(if_expr, usage),
        }
    }

    /// Lowers an operand that must produce a value. `None` means control
    /// left through a `return` inside the operand.
    pub(crate) fn lower_operand(&mut self, expr: &Expr) -> DiagnosticResult<Option<Value<'ctx>>> {
        let value = self.lower_expr(expr, Usage::Value)?;
        if self.is_terminated() {
            return Ok(None);
        }
        self.expect_value(value, expr).map(Some)
    }
}
