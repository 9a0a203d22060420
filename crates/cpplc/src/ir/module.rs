//! The LLVM module being built, plus what lowering needs to know about it
//! that LLVM itself does not keep: struct field names and layouts, and the
//! globals already backing string literals.

use std::collections::HashMap;

use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::targets::TargetData;
use inkwell::types::{
    AnyType, BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType, IntType, StructType,
};
use inkwell::values::{FunctionValue, GlobalValue};

use super::layout::{self, StructLayout};
use super::types::IrType;

/// A named struct type with its field names and layout.
#[derive(Clone, Debug)]
pub struct StructDef<'ctx> {
    pub name: String,
    pub ty: StructType<'ctx>,
    pub fields: Vec<String>,
    pub layout: StructLayout,
}

impl<'ctx> StructDef<'ctx> {
    pub fn field_index(&self, name: &str) -> Option<u32> {
        self.fields
            .iter()
            .position(|field| field == name)
            .map(|i| i as u32)
    }

    pub fn field_type(&self, index: u32) -> Option<BasicTypeEnum<'ctx>> {
        self.ty.get_field_type_at_index(index)
    }
}

/// Structural verification failure reported by LLVM.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("verify error in `{function}`: {message}")]
pub struct VerifyError {
    pub function: String,
    pub message: String,
}

pub struct IrModule<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub pointer_width: u32,
    target: TargetData,
    structs: Vec<StructDef<'ctx>>,
    strings: HashMap<Vec<u8>, GlobalValue<'ctx>>,
}

impl<'ctx> IrModule<'ctx> {
    pub fn new(context: &'ctx Context, name: &str, pointer_width: u32) -> Self {
        let module = context.create_module(name);
        let target = TargetData::create(&layout::data_layout(pointer_width));
        module.set_data_layout(&target.get_data_layout());
        IrModule {
            context,
            module,
            pointer_width,
            target,
            structs: Vec::new(),
            strings: HashMap::new(),
        }
    }

    /// The integer type used for string lengths.
    pub fn size_type(&self) -> IntType<'ctx> {
        self.context.custom_width_int_type(self.pointer_width)
    }

    /// Creates a named struct type and records its layout.
    pub fn add_struct(
        &mut self,
        name: &str,
        fields: Vec<(String, BasicTypeEnum<'ctx>)>,
    ) -> StructType<'ctx> {
        let ty = self.context.opaque_struct_type(name);
        let (names, types): (Vec<String>, Vec<BasicTypeEnum<'ctx>>) = fields.into_iter().unzip();
        ty.set_body(&types, false);
        let layout = StructLayout::of(&self.target, &ty);
        self.structs.push(StructDef {
            name: name.to_string(),
            ty,
            fields: names,
            layout,
        });
        ty
    }

    pub fn struct_def(&self, ty: StructType<'ctx>) -> Option<&StructDef<'ctx>> {
        self.structs.iter().find(|def| def.ty == ty)
    }

    pub fn struct_named(&self, name: &str) -> Option<&StructDef<'ctx>> {
        self.structs.iter().find(|def| def.name == name)
    }

    /// Signature for a function taking `params` and returning `ret`.
    pub fn function_type(&self, params: &[BasicTypeEnum<'ctx>], ret: IrType<'ctx>) -> FunctionType<'ctx> {
        let params: Vec<BasicMetadataTypeEnum<'ctx>> = params.iter().map(|ty| (*ty).into()).collect();
        match ret.as_basic() {
            Some(ret) => ret.fn_type(&params, false),
            None => self.context.void_type().fn_type(&params, false),
        }
    }

    /// Returns the private constant holding `bytes`, creating it on first
    /// use. The bytes are not NUL-terminated.
    pub fn intern_string(&mut self, bytes: &[u8]) -> GlobalValue<'ctx> {
        if let Some(global) = self.strings.get(bytes) {
            return *global;
        }
        let init = self.context.const_string(bytes, false);
        // `.str` cannot collide with a cppl identifier, so foreign
        // functions keep their exact symbol names.
        let global = self.module.add_global(init.get_type(), None, ".str");
        global.set_initializer(&init);
        global.set_constant(true);
        global.set_linkage(Linkage::Private);
        global.set_unnamed_addr(true);
        self.strings.insert(bytes.to_vec(), global);
        global
    }

    /// Source-level rendering of a type, for diagnostics.
    pub fn type_name(&self, ty: &IrType<'ctx>) -> String {
        match ty {
            IrType::Void => "void".to_string(),
            IrType::Basic(BasicTypeEnum::IntType(int)) => match int.get_bit_width() {
                1 => "bool".to_string(),
                bits => format!("i{}", bits),
            },
            IrType::Basic(BasicTypeEnum::FloatType(float)) => {
                if *float == self.context.f16_type() {
                    "f16".to_string()
                } else if *float == self.context.f32_type() {
                    "f32".to_string()
                } else {
                    "f64".to_string()
                }
            }
            IrType::Basic(BasicTypeEnum::StructType(st)) => match self.struct_def(*st) {
                Some(def) => def.name.clone(),
                None => st.print_to_string().to_string(),
            },
            IrType::Basic(other) => other.print_to_string().to_string(),
            IrType::Function(function) => function.print_to_string().to_string(),
        }
    }

    /// Runs the LLVM verifier over one function.
    pub fn verify_function(&self, function: FunctionValue<'ctx>) -> Result<(), VerifyError> {
        if function.verify(false) {
            return Ok(());
        }
        // The per-function entry point only answers yes or no; the module
        // verifier carries the message.
        let message = match self.module.verify() {
            Err(message) => message.to_string(),
            Ok(()) => "function failed verification".to_string(),
        };
        Err(VerifyError {
            function: function.get_name().to_string_lossy().into_owned(),
            message,
        })
    }

    /// Runs the LLVM verifier over the whole module.
    pub fn verify(&self) -> Result<(), VerifyError> {
        self.module.verify().map_err(|message| VerifyError {
            function: self.module.get_name().to_string_lossy().into_owned(),
            message: message.to_string(),
        })
    }

    /// Deletes the body of a partially lowered function so that only its
    /// declaration stays in the module.
    pub fn clear_body(&self, function: FunctionValue<'ctx>) {
        let blocks = function.get_basic_blocks();
        // Terminators produce no values; once they are gone nothing refers
        // to the blocks except phis.
        for block in &blocks {
            if let Some(terminator) = block.get_terminator() {
                terminator.erase_from_basic_block();
            }
        }
        // The remaining instructions only use each other and the body has
        // no loops, so erasing unused ones until none is left empties it.
        loop {
            let mut erased = false;
            for block in &blocks {
                let mut next = block.get_first_instruction();
                while let Some(inst) = next {
                    next = inst.get_next_instruction();
                    if inst.get_first_use().is_none() {
                        inst.erase_from_basic_block();
                        erased = true;
                    }
                }
            }
            if !erased {
                break;
            }
        }
        for block in blocks {
            // SAFETY: the block is empty and no instruction refers to it.
            let _ = unsafe { block.delete() };
        }
    }

    pub fn print_to_string(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub fn into_module(self) -> Module<'ctx> {
        self.module
    }
}
