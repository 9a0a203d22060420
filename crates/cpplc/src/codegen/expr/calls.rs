use cppl_ast::{CallExpr, Expr, MethodCallExpr, Span};
use inkwell::values::{BasicMetadataValueEnum, FunctionValue};

use crate::codegen::CodeGen;
use crate::diagnostics::{DiagnosticResult, SemanticError};
use crate::ir::{IrType, Value};

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    pub(super) fn lower_call_expr(
        &mut self,
        call: &CallExpr,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        let Some(callee) = self.lower_operand(&call.callee)? else {
            return Ok(None);
        };
        let args: Vec<&Expr> = call.args.iter().collect();
        self.lower_call(callee, &call.callee.to_string(), &args, call.span.clone())
    }

    /// `obj.method(args)` is a plain call of `method` with `obj` prepended
    /// to the arguments.
    pub(super) fn lower_method_call_expr(
        &mut self,
        call: &MethodCallExpr,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        let callee = self.lower_ident_expr(&call.method)?;
        let mut args: Vec<&Expr> = Vec::with_capacity(call.args.len() + 1);
        args.push(&call.object);
        args.extend(call.args.iter());
        self.lower_call(callee, &call.method.sym, &args, call.span.clone())
    }

    fn lower_call(
        &mut self,
        callee: Value<'ctx>,
        callee_name: &str,
        args: &[&Expr],
        span: Span,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        let function: FunctionValue<'ctx> = match callee.as_function() {
            Some(function) => function,
            None => {
                return Err(SemanticError::NotCallable {
                    callee: callee_name.to_string(),
                    ty: self.type_name(&callee.ty()),
                }
                .at(span))
            }
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            match self.lower_operand(arg)? {
                Some(value) => values.push(value),
                None => return Ok(None),
            }
        }

        let params: Vec<IrType<'ctx>> = function
            .get_params()
            .iter()
            .map(|param| IrType::Basic(param.get_type()))
            .collect();
        if values.len() != params.len() {
            return Err(SemanticError::mismatch(format!(
                "`{}` takes {} argument(s) but {} were supplied",
                callee_name,
                params.len(),
                values.len()
            ))
            .at(span));
        }
        let mut call_args: Vec<BasicMetadataValueEnum<'ctx>> = Vec::with_capacity(values.len());
        for (idx, ((value, param), arg)) in values.iter().zip(&params).zip(args).enumerate() {
            self.check_type(
                param,
                &value.ty(),
                &format!("argument {} of `{}`", idx + 1, callee_name),
                arg.span(),
            )?;
            call_args.push(self.expect_basic(*value, arg)?.into());
        }

        let call = self.builder.build_call(function, &call_args, "call")?;
        Ok(call.try_as_basic_value().left().map(Value::Basic))
    }
}
