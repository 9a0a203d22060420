//! Top-level codegen module
//!
//! [`CodeGen`] is the context for lowering one function body: the
//! [`Program`] it reads names from and writes IR into, an inkwell
//! [`Builder`] positioned in the function, the current scope and the
//! declared return type. The pipeline is organized across submodules:
//! - `emit` : item lowering (struct layouts, function signatures and bodies)
//! - `expr` : expression lowering
//! - `stmt` : statement lowering
//!
//! Lowering returns `Option<Value>`: the value an expression or statement
//! yields, if any. Whether a value is needed is decided by the caller
//! through [`Usage`].

use cppl_ast::Span;
use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::types::BasicTypeEnum;
use inkwell::values::{FunctionValue, InstructionOpcode, PointerValue};

use crate::diagnostics::{DiagnosticResult, SemanticError};
use crate::ir::{IrType, Value};
use crate::program::{Program, ScopeId};

pub mod emit;
pub mod expr;
pub mod stmt;

/// How the result of a lowered expression or statement is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Usage {
    /// The value is consumed: an operand, an initializer, the tail of a
    /// non-void function body, or an arm of an `if` in such a position.
    Value,
    /// The value, if any, is dropped.
    Discard,
}

pub struct CodeGen<'p, 'ctx> {
    pub program: &'p mut Program<'ctx>,
    pub context: &'ctx Context,
    pub builder: Builder<'ctx>,
    pub function: FunctionValue<'ctx>,
    pub scope: ScopeId,
    /// Source name of the function being lowered.
    pub fn_name: String,
    pub ret_ty: IrType<'ctx>,
    /// Blocks opened for statements after a terminator.
    dead_blocks: Vec<BasicBlock<'ctx>>,
}

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    pub fn new(
        program: &'p mut Program<'ctx>,
        function: FunctionValue<'ctx>,
        scope: ScopeId,
        fn_name: impl Into<String>,
        ret_ty: IrType<'ctx>,
    ) -> Self {
        let context = program.context;
        CodeGen {
            program,
            context,
            builder: context.create_builder(),
            function,
            scope,
            fn_name: fn_name.into(),
            ret_ty,
            dead_blocks: Vec::new(),
        }
    }

    pub fn type_name(&self, ty: &IrType<'ctx>) -> String {
        self.program.ir.type_name(ty)
    }

    pub fn append_block(&mut self, name: &str) -> BasicBlock<'ctx> {
        log::trace!("`{}`: new block `{}`", self.fn_name, name);
        self.context.append_basic_block(self.function, name)
    }

    pub fn position_at_end(&mut self, block: BasicBlock<'ctx>) {
        self.builder.position_at_end(block);
    }

    pub fn current_block(&self) -> Option<BasicBlock<'ctx>> {
        self.builder.get_insert_block()
    }

    /// Whether control can no longer reach the insertion point.
    pub fn is_terminated(&self) -> bool {
        self.current_block()
            .and_then(|block| block.get_terminator())
            .is_some()
    }

    /// Continues lowering in a fresh block nothing branches to.
    pub fn open_dead_block(&mut self) {
        let dead = self.append_block("dead");
        self.dead_blocks.push(dead);
        self.position_at_end(dead);
    }

    /// Whether the insertion point is in a block opened by
    /// [`open_dead_block`](Self::open_dead_block).
    pub fn in_dead_block(&self) -> bool {
        self.current_block()
            .is_some_and(|block| self.dead_blocks.contains(&block))
    }

    /// Allocates a stack slot after the other slots at the top of the entry
    /// block, so every slot dominates all of its uses.
    pub fn build_entry_alloca(
        &self,
        ty: BasicTypeEnum<'ctx>,
        name: &str,
    ) -> DiagnosticResult<PointerValue<'ctx>> {
        let entry = self.function.get_first_basic_block().ok_or_else(|| {
            Box::new(crate::diagnostics::Diagnostic::error(format!(
                "`{}` has no entry block",
                self.fn_name
            )))
        })?;
        let mut next = entry.get_first_instruction();
        while let Some(inst) = next {
            if inst.get_opcode() != InstructionOpcode::Alloca {
                break;
            }
            next = inst.get_next_instruction();
        }
        let alloca_builder = self.context.create_builder();
        match next {
            Some(inst) => alloca_builder.position_before(&inst),
            None => alloca_builder.position_at_end(entry),
        }
        Ok(alloca_builder.build_alloca(ty, name)?)
    }

    /// Opens a child scope of the current one. Returns the scope to
    /// restore afterwards.
    pub fn push_scope(&mut self) -> ScopeId {
        let saved = self.scope;
        self.scope = self.program.new_scope(saved);
        saved
    }

    pub fn pop_scope(&mut self, saved: ScopeId) {
        self.scope = saved;
    }

    /// Requires that lowering produced a value.
    pub fn expect_value(
        &self,
        value: Option<Value<'ctx>>,
        expr: &cppl_ast::Expr,
    ) -> DiagnosticResult<Value<'ctx>> {
        value.ok_or_else(|| {
            SemanticError::ExpectedValue {
                expr: expr.to_string(),
            }
            .at(expr.span())
        })
    }

    /// Requires a storable value: not a function referenced by name.
    pub fn expect_basic(
        &self,
        value: Value<'ctx>,
        expr: &cppl_ast::Expr,
    ) -> DiagnosticResult<inkwell::values::BasicValueEnum<'ctx>> {
        value.as_basic().ok_or_else(|| {
            SemanticError::mismatch(format!(
                "function `{}` cannot be used as a value",
                expr
            ))
            .at(expr.span())
        })
    }

    /// Reports `expected` vs `found` as an `ArityOrTypeMismatch`.
    pub fn check_type(
        &self,
        expected: &IrType<'ctx>,
        found: &IrType<'ctx>,
        what: &str,
        span: Span,
    ) -> DiagnosticResult<()> {
        if expected == found {
            return Ok(());
        }
        Err(SemanticError::mismatch(format!(
            "{} has type `{}`, expected `{}`",
            what,
            self.type_name(found),
            self.type_name(expected)
        ))
        .at(span))
    }
}
