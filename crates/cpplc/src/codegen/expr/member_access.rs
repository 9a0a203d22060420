use cppl_ast::{MakeExpr, MemberExpr};
use inkwell::types::BasicTypeEnum;
use inkwell::values::BasicValueEnum;

use crate::codegen::CodeGen;
use crate::diagnostics::{DiagnosticResult, SemanticError};
use crate::ir::{IrType, Value};

impl<'p, 'ctx> CodeGen<'p, 'ctx> {
    /// `object.field` on a struct value, lowered to `extractvalue`.
    pub(super) fn lower_member_expr(
        &mut self,
        member: &MemberExpr,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        let Some(object) = self.lower_operand(&member.object)? else {
            return Ok(None);
        };
        let object = match object.as_basic() {
            Some(BasicValueEnum::StructValue(object)) => object,
            _ => {
                return Err(SemanticError::mismatch(format!(
                    "`{}` has type `{}`, which has no fields",
                    member.object,
                    self.type_name(&object.ty())
                ))
                .at(member.object.span()))
            }
        };

        let def = self.program.ir.struct_def(object.get_type()).ok_or_else(|| {
            SemanticError::mismatch(format!("`{}` has no fields", member.object))
                .at(member.object.span())
        })?;
        let index = def.field_index(&member.field.sym).ok_or_else(|| {
            SemanticError::mismatch(format!(
                "no field `{}` on type `{}`",
                member.field, def.name
            ))
            .at(member.field.span.clone())
        })?;

        let value = self
            .builder
            .build_extract_value(object, index, &member.field.sym)?;
        Ok(Some(Value::Basic(value)))
    }

    /// `make T { a, b }`: one value per field, in declaration order, folded
    /// into an `insertvalue` chain starting from `undef`.
    pub(super) fn lower_make_expr(
        &mut self,
        make: &MakeExpr,
    ) -> DiagnosticResult<Option<Value<'ctx>>> {
        let scope = self.scope;
        let ty = self.program.resolve_type(scope, &make.ty)?;
        let def = match ty {
            IrType::Basic(BasicTypeEnum::StructType(st)) => self.program.ir.struct_def(st).cloned(),
            _ => None,
        };
        let def = def.ok_or_else(|| {
            SemanticError::mismatch(format!(
                "`make` requires a struct type, found `{}`",
                self.type_name(&ty)
            ))
            .at(make.ty.span())
        })?;

        if def.fields.len() != make.fields.len() {
            return Err(SemanticError::mismatch(format!(
                "`{}` has {} field(s) but {} were supplied",
                make.ty,
                def.fields.len(),
                make.fields.len()
            ))
            .at(make.span.clone()));
        }

        let mut aggregate = def.ty.get_undef();
        for (idx, (field_name, expr)) in def.fields.iter().zip(&make.fields).enumerate() {
            let Some(value) = self.lower_operand(expr)? else {
                return Ok(None);
            };
            let field_ty = IrType::from(def.field_type(idx as u32));
            self.check_type(
                &field_ty,
                &value.ty(),
                &format!("field `{}` of `{}`", field_name, make.ty),
                expr.span(),
            )?;
            let value = self.expect_basic(value, expr)?;
            aggregate = self
                .builder
                .build_insert_value(aggregate, value, idx as u32, "make")?
                .into_struct_value();
        }
        Ok(Some(Value::Basic(aggregate.into())))
    }
}
