//! `if` / `else if` / `else` chains.
//!
//! A conditional branch lowers to a `then` block, an `alt` block holding
//! the rest of the chain, and a `join` block. The terminal `else` is
//! lowered straight into the enclosing `alt` block. Arms that end in a
//! terminator (a `return`) diverge: they add no edge to the join and do not
//! take part in the value merge.

use cppl_ast::{Branch, IfExpr, Span};
use inkwell::basic_block::BasicBlock;
use inkwell::values::{BasicValue, BasicValueEnum, IntValue};

use crate::codegen::{CodeGen, Usage};
use crate::diagnostics::{DiagnosticResult, SemanticError};
use crate::ir::{IrType, Value};

/// Outcome of lowering one arm or the rest of a chain.
#[derive(Debug)]
enum Arm<'ctx> {
    /// Control never falls out of the arm.
    Diverged,
    /// Control reaches the end of the arm, possibly with a value.
    Yield(Option<Value<'ctx>>),
}

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    pub(super) fn lower_if_expr(
        &mut self,
        if_expr: &IfExpr,
        usage: Usage,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        if usage == Usage::Value && !if_expr.has_else() {
            return Err(SemanticError::branch_mismatch(
                "`if` without an `else` cannot produce a value",
            )
            .at(if_expr.span.clone()));
        }
        match self.lower_branches(&if_expr.branches, usage, &if_expr.span)? {
            Arm::Diverged => Ok(None),
            Arm::Yield(value) => Ok(value),
        }
    }

    /// Lowers a branch body in its own scope.
    fn lower_arm(&mut self, branch: &Branch, usage: Usage) -> DiagnosticResult<Arm<'ctx>> {
        let saved = self.push_scope();
        let value = self.lower_block(&branch.body, usage);
        self.pop_scope(saved);
        let value = value?;
        if self.is_terminated() {
            Ok(Arm::Diverged)
        } else {
            Ok(Arm::Yield(value))
        }
    }

    fn lower_branches(
        &mut self,
        branches: &[Branch],
        usage: Usage,
        span: &Span,
    ) -> DiagnosticResult<Arm<'ctx>> {
        let (first, rest) = match branches.split_first() {
            Some(split) => split,
            None => return Ok(Arm::Yield(None)),
        };
        let cond_expr = match &first.cond {
            Some(cond) => cond,
            None => return self.lower_arm(first, usage),
        };

        let Some(cond) = self.lower_operand(cond_expr)? else {
            return Ok(Arm::Diverged);
        };
        let bool_ty = IrType::Basic(self.context.bool_type().into());
        self.check_type(&bool_ty, &cond.ty(), "the condition", cond_expr.span())?;
        let cond: IntValue<'ctx> = match cond.as_basic() {
            Some(BasicValueEnum::IntValue(cond)) => cond,
            _ => {
                return Err(
                    SemanticError::mismatch("the condition is not a `bool`").at(cond_expr.span())
                )
            }
        };

        let then_block = self.append_block("then");
        let alt_block = self.append_block("alt");
        let join_block = self.append_block("join");
        self.builder.build_conditional_branch(cond, then_block, alt_block)?;

        self.position_at_end(then_block);
        let then_arm = self.lower_arm(first, usage)?;
        let then_end = self.close_arm(&then_arm, join_block)?;

        self.position_at_end(alt_block);
        let alt_arm = self.lower_branches(rest, usage, span)?;
        let alt_end = self.close_arm(&alt_arm, join_block)?;

        self.position_at_end(join_block);
        let arms = [(then_arm, then_end), (alt_arm, alt_end)];
        let reaching: Vec<(Option<Value<'ctx>>, BasicBlock<'ctx>)> = arms
            .into_iter()
            .filter_map(|(arm, end)| match (arm, end) {
                (Arm::Yield(value), Some(end)) => Some((value, end)),
                _ => None,
            })
            .collect();

        if reaching.is_empty() {
            self.builder.build_unreachable()?;
            return Ok(Arm::Diverged);
        }
        if usage == Usage::Discard {
            return Ok(Arm::Yield(None));
        }
        self.merge(reaching, span).map(Arm::Yield)
    }

    /// Branches from the end of a non-diverging arm to `join`. Returns the
    /// block the edge leaves from.
    fn close_arm(
        &mut self,
        arm: &Arm<'ctx>,
        join: BasicBlock<'ctx>,
    ) -> DiagnosticResult<Option<BasicBlock<'ctx>>> {
        match arm {
            Arm::Diverged => Ok(None),
            Arm::Yield(_) => {
                let end = self.current_block();
                self.builder.build_unconditional_branch(join)?;
                Ok(end)
            }
        }
    }

    /// Emits the phi for the arms reaching the join block. All of them must
    /// yield a value of one type, or none of them may.
    fn merge(
        &mut self,
        reaching: Vec<(Option<Value<'ctx>>, BasicBlock<'ctx>)>,
        span: &Span,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        let with_value = reaching.iter().filter(|(v, _)| v.is_some()).count();
        if with_value == 0 {
            return Ok(None);
        }
        if with_value != reaching.len() {
            return Err(SemanticError::branch_mismatch(
                "one branch of this `if` produces a value and another does not",
            )
            .at(span.clone()));
        }

        let incoming: Vec<(Value<'ctx>, BasicBlock<'ctx>)> = reaching
            .into_iter()
            .filter_map(|(v, block)| v.map(|v| (v, block)))
            .collect();
        let ty = incoming[0].0.ty();
        if let Some((other, _)) = incoming.iter().find(|(v, _)| v.ty() != ty) {
            return Err(SemanticError::branch_mismatch(format!(
                "`if` branches have incompatible types `{}` and `{}`",
                self.type_name(&ty),
                self.type_name(&other.ty())
            ))
            .at(span.clone()));
        }

        let (Some(phi_ty), Some(values)) = (
            ty.as_basic(),
            incoming
                .iter()
                .map(|(v, block)| v.as_basic().map(|v| (v, *block)))
                .collect::<Option<Vec<(BasicValueEnum<'ctx>, BasicBlock<'ctx>)>>>(),
        ) else {
            return Err(SemanticError::branch_mismatch(
                "`if` branches cannot produce a function",
            )
            .at(span.clone()));
        };
        let phi = self.builder.build_phi(phi_ty, "if")?;
        let edges: Vec<(&dyn BasicValue<'ctx>, BasicBlock<'ctx>)> = values
            .iter()
            .map(|(v, block)| (v as &dyn BasicValue<'ctx>, *block))
            .collect();
        phi.add_incoming(&edges);
        Ok(Some(Value::Basic(phi.as_basic_value())))
    }
}
