use cppl_ast::Declaration;

use crate::codegen::{CodeGen, Usage};
use crate::diagnostics::{DiagnosticResult, SemanticError};
use crate::program::{Thing, ThingKind};

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    /// `let name: ty = value`: allocate, initialize, then bind. The name is
    /// bound after the initializer is lowered, so the initializer still
    /// sees any outer binding it shadows.
    ///
    /// An initializer that always returns leaves the slot uninitialized;
    /// everything after it is unreachable but still gets lowered.
    pub(super) fn lower_declaration(&mut self, decl: &Declaration) -> DiagnosticResult<()> {
        let scope = self.scope;
        let resolved = self.program.resolve_type(scope, &decl.ty)?;
        let ty = resolved.as_basic().ok_or_else(|| {
            SemanticError::mismatch(format!(
                "variable `{}` cannot have type `void`",
                decl.name
            ))
            .at(decl.ty.span())
        })?;

        let raw = self.lower_expr(&decl.value, Usage::Value)?;
        let slot = self.build_entry_alloca(ty, &decl.name.sym)?;
        if !self.is_terminated() {
            let value = self.expect_value(raw, &decl.value)?;
            self.check_type(
                &resolved,
                &value.ty(),
                &format!("the initializer of `{}`", decl.name),
                decl.value.span(),
            )?;
            let value = self.expect_basic(value, &decl.value)?;
            self.builder.build_store(slot, value)?;
        }

        let local = self.program.add_thing(Thing::new(
            decl.name.sym.clone(),
            ThingKind::Local { ptr: slot, ty },
        ));
        self.program
            .bind(scope, &decl.name.sym, local)
            .map_err(|e| e.at(decl.name.span.clone()))
    }
}
