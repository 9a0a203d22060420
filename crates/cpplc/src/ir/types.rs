//! Resolved types and lowered values.
//!
//! LLVM has no first-class `void` value type and keeps functions apart from
//! the basic (storable) values, so lowering works with these two small
//! wrappers around the inkwell enums.

use inkwell::types::{BasicTypeEnum, FunctionType};
use inkwell::values::{BasicValueEnum, FunctionValue};

/// The type of a resolved name or a lowered expression.
///
/// Struct types are nominal: two named LLVM structs with identical bodies
/// are still different types, so plain equality is type identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrType<'ctx> {
    Void,
    Basic(BasicTypeEnum<'ctx>),
    Function(FunctionType<'ctx>),
}

impl<'ctx> IrType<'ctx> {
    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }

    /// Types the arithmetic instructions accept. `i1` is excluded.
    pub fn is_numeric(&self) -> bool {
        match self {
            IrType::Basic(BasicTypeEnum::IntType(int)) => int.get_bit_width() > 1,
            IrType::Basic(BasicTypeEnum::FloatType(_)) => true,
            _ => false,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, IrType::Basic(BasicTypeEnum::FloatType(_)))
    }

    pub fn as_basic(&self) -> Option<BasicTypeEnum<'ctx>> {
        match self {
            IrType::Basic(ty) => Some(*ty),
            _ => None,
        }
    }
}

impl<'ctx> From<BasicTypeEnum<'ctx>> for IrType<'ctx> {
    fn from(ty: BasicTypeEnum<'ctx>) -> Self {
        IrType::Basic(ty)
    }
}

impl<'ctx> From<Option<BasicTypeEnum<'ctx>>> for IrType<'ctx> {
    /// A missing return type is `void`.
    fn from(ty: Option<BasicTypeEnum<'ctx>>) -> Self {
        ty.map_or(IrType::Void, IrType::Basic)
    }
}

/// A lowered expression: an SSA value, or a function referenced by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Value<'ctx> {
    Basic(BasicValueEnum<'ctx>),
    Function(FunctionValue<'ctx>),
}

impl<'ctx> Value<'ctx> {
    pub fn ty(&self) -> IrType<'ctx> {
        match self {
            Value::Basic(value) => IrType::Basic(value.get_type()),
            Value::Function(function) => IrType::Function(function.get_type()),
        }
    }

    pub fn as_basic(&self) -> Option<BasicValueEnum<'ctx>> {
        match self {
            Value::Basic(value) => Some(*value),
            Value::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<FunctionValue<'ctx>> {
        match self {
            Value::Function(function) => Some(*function),
            Value::Basic(_) => None,
        }
    }
}

impl<'ctx> From<BasicValueEnum<'ctx>> for Value<'ctx> {
    fn from(value: BasicValueEnum<'ctx>) -> Self {
        Value::Basic(value)
    }
}
