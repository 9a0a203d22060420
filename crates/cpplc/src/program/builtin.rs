//! Builtin types exposed to every program.

use inkwell::types::StructType;
use inkwell::AddressSpace;

use crate::ir::{IrModule, IrType};

use super::thing::{Thing, ThingId, ThingKind};

/// The builtin types lowering needs to reach directly.
#[derive(Clone, Copy, Debug)]
pub struct Builtin<'ctx> {
    /// `{ data: i8*, length: i<pointer width> }`
    pub string: StructType<'ctx>,
}

impl<'ctx> Builtin<'ctx> {
    /// Creates the builtin things. Returns them with the names they are
    /// exposed under in the global scope.
    pub fn init(
        things: &mut Vec<Thing<'ctx>>,
        ir: &mut IrModule<'ctx>,
    ) -> (Builtin<'ctx>, Vec<(String, ThingId)>) {
        let context = ir.context;
        let size_ty = ir.size_type();
        let string = ir.add_struct(
            "string",
            vec![
                (
                    "data".to_string(),
                    context.i8_type().ptr_type(AddressSpace::default()).into(),
                ),
                ("length".to_string(), size_ty.into()),
            ],
        );

        let types: [(&str, IrType<'ctx>); 10] = [
            ("i8", IrType::Basic(context.i8_type().into())),
            ("i16", IrType::Basic(context.i16_type().into())),
            ("i32", IrType::Basic(context.i32_type().into())),
            ("i64", IrType::Basic(context.i64_type().into())),
            ("f16", IrType::Basic(context.f16_type().into())),
            ("f32", IrType::Basic(context.f32_type().into())),
            ("f64", IrType::Basic(context.f64_type().into())),
            ("bool", IrType::Basic(context.bool_type().into())),
            ("string", IrType::Basic(string.into())),
            ("void", IrType::Void),
        ];
        let exposed = types
            .into_iter()
            .map(|(name, ty)| {
                let id = ThingId(things.len() as u32);
                things.push(Thing::new(name, ThingKind::Builtin { ty }));
                (name.to_string(), id)
            })
            .collect();
        (Builtin { string }, exposed)
    }
}
