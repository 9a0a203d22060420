//! Symbol table entries.

use std::fmt;
use std::rc::Rc;

use cppl_ast::{FFIFunctionDecl, FunctionDecl, StructDecl};

use inkwell::types::BasicTypeEnum;
use inkwell::values::{FunctionValue, PointerValue};

use crate::ir::{IrType, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThingId(pub u32);

/// Where a thing is in its lazy build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildState {
    /// Registered, nothing resolved yet.
    Pending,
    /// Currently resolving its signature or layout.
    InProgress,
    Built,
    Failed,
}

#[derive(Clone, Debug)]
pub enum ThingKind<'ctx> {
    /// A primitive type registered at program start.
    Builtin { ty: IrType<'ctx> },
    /// A user struct; `ty` is set once its layout is built.
    Struct {
        decl: Rc<StructDecl>,
        ty: Option<IrType<'ctx>>,
    },
    /// A function with a body; `value` is set once its signature is built.
    Function {
        decl: Rc<FunctionDecl>,
        value: Option<FunctionValue<'ctx>>,
    },
    /// An externally linked function.
    ForeignFunction {
        decl: Rc<FFIFunctionDecl>,
        value: Option<FunctionValue<'ctx>>,
    },
    /// Stack slot for a parameter or a declared variable.
    Local {
        ptr: PointerValue<'ctx>,
        ty: BasicTypeEnum<'ctx>,
    },
}

/// A symbol table entry: a type, a value, or both.
#[derive(Clone, Debug)]
pub struct Thing<'ctx> {
    pub name: String,
    pub kind: ThingKind<'ctx>,
    pub state: BuildState,
}

impl<'ctx> Thing<'ctx> {
    pub fn new(name: impl Into<String>, kind: ThingKind<'ctx>) -> Self {
        let state = match kind {
            ThingKind::Builtin { .. } | ThingKind::Local { .. } => BuildState::Built,
            _ => BuildState::Pending,
        };
        Thing {
            name: name.into(),
            kind,
            state,
        }
    }

    /// Whether this thing names a type, built or not.
    pub fn is_type(&self) -> bool {
        matches!(
            self.kind,
            ThingKind::Builtin { .. } | ThingKind::Struct { .. }
        )
    }

    /// Whether this thing denotes a value, built or not.
    pub fn is_value(&self) -> bool {
        matches!(
            self.kind,
            ThingKind::Function { .. } | ThingKind::ForeignFunction { .. } | ThingKind::Local { .. }
        )
    }

    /// Top-level declarations the scheduler is responsible for.
    pub fn is_item(&self) -> bool {
        matches!(
            self.kind,
            ThingKind::Struct { .. } | ThingKind::Function { .. } | ThingKind::ForeignFunction { .. }
        )
    }

    pub fn is_built(&self) -> bool {
        self.state == BuildState::Built
    }

    /// The resolved type, once built.
    pub fn as_type(&self) -> Option<&IrType<'ctx>> {
        match &self.kind {
            ThingKind::Builtin { ty } => Some(ty),
            ThingKind::Struct { ty, .. } => ty.as_ref(),
            _ => None,
        }
    }

    /// The resolved value, once built. For locals this is the storage
    /// pointer, not its contents.
    pub fn as_value(&self) -> Option<Value<'ctx>> {
        match &self.kind {
            ThingKind::Function { value, .. } | ThingKind::ForeignFunction { value, .. } => {
                value.map(Value::Function)
            }
            ThingKind::Local { ptr, .. } => Some(Value::Basic((*ptr).into())),
            _ => None,
        }
    }
}

impl fmt::Display for Thing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ThingKind::Builtin { .. } => write!(f, "builtin type {}", self.name),
            ThingKind::Struct { decl, .. } => write!(f, "{}", cppl_ast::Item::Struct((**decl).clone())),
            ThingKind::Function { decl, .. } => write!(f, "{}", decl.proto),
            ThingKind::ForeignFunction { decl, .. } => write!(f, "ffi {}", decl.proto),
            ThingKind::Local { .. } => write!(f, "local {}", self.name),
        }?;
        match self.state {
            BuildState::Pending => f.write_str(" (pending)"),
            BuildState::InProgress => f.write_str(" (in progress)"),
            BuildState::Failed => f.write_str(" (failed)"),
            BuildState::Built => Ok(()),
        }
    }
}
