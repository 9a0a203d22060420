//! Statement lowering
//!
//! A block yields the value of its last statement; every earlier statement
//! is lowered in discard context. Statements that follow a terminator are
//! lowered into a fresh block with no predecessors.

pub mod decl;
pub mod return_stmt;

use cppl_ast::Stmt;

use super::{CodeGen, Usage};
use crate::diagnostics::DiagnosticResult;
use crate::ir::Value;

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    pub fn lower_block(
        &mut self,
        stmts: &[Stmt],
        usage: Usage,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        let mut last = None;
        for (idx, stmt) in stmts.iter().enumerate() {
            if self.is_terminated() {
                self.open_dead_block();
            }
            let stmt_usage = if idx + 1 == stmts.len() {
                usage
            } else {
                Usage::Discard
            };
            last = self.lower_stmt(stmt, stmt_usage)?;
        }
        Ok(last)
    }

    pub fn lower_stmt(
        &mut self,
        stmt: &Stmt,
        usage: Usage,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        match stmt {
            Stmt::Declaration(decl) => {
                self.lower_declaration(decl)?;
                Ok(None)
            }
            Stmt::Expr(s) => self.lower_expr(&s.expr, usage),
            Stmt::Return(ret) => {
                self.lower_return(ret)?;
                Ok(None)
            }
            Stmt::Empty(_) => Ok(None),
        }
    }
}
