use std::collections::HashSet;

use cppl_ast::StructDecl;

use crate::diagnostics::{DiagnosticResult, SemanticError};
use crate::ir::IrType;
use crate::program::{Program, ThingId, ThingKind};

impl<'ctx> Program<'ctx> {
    /// Resolves the field types of a struct and adds it to the module.
    /// Field types that are structs are materialized recursively, which is
    /// where layout cycles are detected.
    pub(crate) fn declare_struct(&mut self, id: ThingId, decl: &StructDecl) -> DiagnosticResult<()> {
        let global = self.global_scope();
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            if !seen.insert(field.name.sym.as_str()) {
                return Err(SemanticError::Redefinition {
                    name: field.name.sym.clone(),
                }
                .at(field.name.span.clone()));
            }
            let ty = self.resolve_type(global, &field.ty)?;
            let ty = ty.as_basic().ok_or_else(|| {
                SemanticError::mismatch(format!(
                    "field `{}` of `{}` cannot have type `void`",
                    field.name, decl.name
                ))
                .at(field.ty.span())
            })?;
            fields.push((field.name.sym.clone(), ty));
        }

        let struct_ty = self.ir.add_struct(&decl.name.sym, fields);
        if let Some(def) = self.ir.struct_def(struct_ty) {
            log::debug!("laid out `{}`: {} bytes", decl.name, def.layout.size);
        }
        if let ThingKind::Struct { ty, .. } = &mut self.thing_mut(id).kind {
            *ty = Some(IrType::Basic(struct_ty.into()));
        }
        Ok(())
    }
}
