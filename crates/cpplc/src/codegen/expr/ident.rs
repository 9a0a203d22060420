use cppl_ast::Ident;

use crate::codegen::CodeGen;
use crate::diagnostics::{DiagnosticResult, SemanticError};
use crate::ir::Value;
use crate::program::{located, ThingKind};

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    /// Looks the identifier up through the scope chain. An unbuilt item is
    /// materialized on the spot; a local is read with a `load`.
    pub(super) fn lower_ident_expr(&mut self, ident: &Ident) -> DiagnosticResult<Value<'ctx>> {
        let resolved = self
            .program
            .resolve_value(self.scope, &ident.sym)
            .map_err(|d| located(d, ident.span.clone()))?;
        let (id, value) = match resolved {
            Some(found) => found,
            None => {
                return Err(SemanticError::ExpectedValue {
                    expr: ident.sym.clone(),
                }
                .at(ident.span.clone()))
            }
        };

        if let ThingKind::Local { ptr, .. } = self.program.thing(id).kind {
            let loaded = self.builder.build_load(ptr, &ident.sym)?;
            return Ok(Value::Basic(loaded));
        }
        Ok(value)
    }
}
