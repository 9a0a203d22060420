use cppl_ast::{FunctionDecl, FunctionProto};
use inkwell::values::{BasicValue, FunctionValue};

use crate::codegen::{CodeGen, Usage};
use crate::diagnostics::{DiagnosticResult, SemanticError};
use crate::ir::IrType;
use crate::program::{Program, Thing, ThingId, ThingKind};

impl<'ctx> Program<'ctx> {
    /// Creates the IR signature of a function or foreign function and
    /// stores the callable value in its thing. Parameters are named after
    /// the source arguments.
    pub(crate) fn declare_function(
        &mut self,
        id: ThingId,
        proto: &FunctionProto,
    ) -> DiagnosticResult<()> {
        let global = self.global_scope();
        let mut params = Vec::with_capacity(proto.args.len());
        let mut names: Vec<&str> = Vec::with_capacity(proto.args.len());
        for arg in &proto.args {
            if names.contains(&arg.name.sym.as_str()) {
                return Err(SemanticError::Redefinition {
                    name: arg.name.sym.clone(),
                }
                .at(arg.name.span.clone()));
            }
            let ty = self.resolve_type(global, &arg.ty)?;
            let ty = ty.as_basic().ok_or_else(|| {
                SemanticError::mismatch(format!(
                    "parameter `{}` of `{}` cannot have type `void`",
                    arg.name, proto.name
                ))
                .at(arg.ty.span())
            })?;
            params.push(ty);
            names.push(arg.name.sym.as_str());
        }
        let ret = self.resolve_type(global, &proto.return_type)?;

        if self.ir.module.get_function(&proto.name.sym).is_some() {
            return Err(SemanticError::Redefinition {
                name: proto.name.sym.clone(),
            }
            .at(proto.name.span.clone()));
        }
        let fn_type = self.ir.function_type(&params, ret);
        let function = self.ir.module.add_function(&proto.name.sym, fn_type, None);
        for (param, name) in function.get_param_iter().zip(&names) {
            param.set_name(name);
        }

        match &mut self.thing_mut(id).kind {
            ThingKind::Function { value, .. } | ThingKind::ForeignFunction { value, .. } => {
                *value = Some(function);
            }
            _ => {}
        }
        Ok(())
    }

    /// Lowers the body of a function whose signature is built. On failure
    /// the partial body is dropped so the module keeps only a declaration.
    pub(crate) fn emit_function_body(&mut self, id: ThingId) -> DiagnosticResult<()> {
        let (decl, function) = match &self.thing(id).kind {
            ThingKind::Function {
                decl,
                value: Some(function),
            } => (decl.clone(), *function),
            _ => return Ok(()),
        };
        log::debug!("lowering body of `{}`", decl.proto.name);

        let mut result = lower_body(self, function, &decl);
        if result.is_ok() && self.config.verify_each_function {
            result = self.ir.verify_function(function).map_err(|err| {
                SemanticError::InvalidIr {
                    function: err.function,
                    message: err.message,
                }
                .at(decl.span.clone())
            });
        }
        if result.is_err() {
            self.ir.clear_body(function);
        }
        result
    }
}

fn lower_body<'ctx>(
    program: &mut Program<'ctx>,
    function: FunctionValue<'ctx>,
    decl: &FunctionDecl,
) -> DiagnosticResult<()> {
    let ret_ty = IrType::from(function.get_type().get_return_type());
    let global = program.global_scope();
    let scope = program.new_scope(global);
    let mut cg = CodeGen::new(program, function, scope, decl.proto.name.sym.clone(), ret_ty);

    let entry = cg.append_block("entry");
    cg.position_at_end(entry);

    // Parameters live in stack slots like any other local.
    for (arg, param) in decl.proto.args.iter().zip(function.get_param_iter()) {
        let ty = param.get_type();
        let slot = cg.build_entry_alloca(ty, &format!("{}.addr", arg.name.sym))?;
        cg.builder.build_store(slot, param)?;
        let local = cg.program.add_thing(Thing::new(
            arg.name.sym.clone(),
            ThingKind::Local { ptr: slot, ty },
        ));
        cg.program
            .bind(scope, &arg.name.sym, local)
            .map_err(|e| e.at(arg.name.span.clone()))?;
    }

    let usage = if ret_ty.is_void() {
        Usage::Discard
    } else {
        Usage::Value
    };
    let tail = cg.lower_block(&decl.body, usage)?;

    if cg.is_terminated() {
        return Ok(());
    }
    if ret_ty.is_void() {
        cg.builder.build_return(None)?;
        return Ok(());
    }
    match tail {
        Some(value) => {
            let span = decl
                .body
                .last()
                .map(|s| s.span())
                .unwrap_or_else(|| decl.span.clone());
            cg.check_type(&ret_ty, &value.ty(), "the final expression", span)?;
            let value = value.as_basic().ok_or_else(|| {
                SemanticError::mismatch("the final expression is a function, not a value")
                    .at(decl.span.clone())
            })?;
            cg.builder
                .build_return(Some(&value as &dyn BasicValue<'ctx>))?;
        }
        None if cg.in_dead_block() => {
            cg.builder.build_unreachable()?;
        }
        None => {
            return Err(SemanticError::MissingReturn {
                name: decl.proto.name.sym.clone(),
            }
            .at(decl.span.clone()));
        }
    }
    Ok(())
}
