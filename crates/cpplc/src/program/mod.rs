//! The program: symbol table, builtins and the lazy build scheduler.
//!
//! A [`Program`] owns every [`Thing`] and [`Scope`] in arenas, the
//! [`IrModule`] being built, and the worklist of pending build jobs. Items are
//! registered without generating any code; they are materialized the first
//! time something refers to them, or by [`Program::finalize`].

mod builtin;
mod scheduler;
mod scope;
mod thing;

use std::collections::VecDeque;

use cppl_ast::Type;
use inkwell::context::Context;
use inkwell::module::Module;

pub use builtin::Builtin;
pub use scope::{Scope, ScopeArena, ScopeId};
pub use thing::{BuildState, Thing, ThingId, ThingKind};

use crate::config::CompilerConfig;
use crate::diagnostics::{Diagnostic, DiagnosticResult, SemanticError};
use crate::ir::{IrModule, IrType, Value};

/// Deferred work drained by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Job {
    /// Resolve an item's signature or layout.
    Materialize(ThingId),
    /// Lower a function body whose signature is already built.
    Body(ThingId),
}

pub struct Program<'ctx> {
    pub config: CompilerConfig,
    pub context: &'ctx Context,
    pub ir: IrModule<'ctx>,
    pub builtin: Builtin<'ctx>,
    things: Vec<Thing<'ctx>>,
    scopes: ScopeArena,
    global: ScopeId,
    worklist: VecDeque<Job>,
    diagnostics: Vec<Diagnostic>,
    build_log: Vec<String>,
    aborted: bool,
}

impl<'ctx> Program<'ctx> {
    /// Creates an empty program with the builtin types bound in the global
    /// scope.
    pub fn new(context: &'ctx Context, config: CompilerConfig) -> Self {
        let mut ir = IrModule::new(context, &config.module_name, config.pointer_width);
        let mut things = Vec::new();
        let (builtin, exposed) = Builtin::init(&mut things, &mut ir);

        let mut scopes = ScopeArena::default();
        let global = scopes.new_scope(None);
        for (name, id) in exposed {
            // Builtin names are distinct, so binding cannot fail.
            let _ = scopes.bind(global, &name, id);
        }

        Program {
            config,
            context,
            ir,
            builtin,
            things,
            scopes,
            global,
            worklist: VecDeque::new(),
            diagnostics: Vec::new(),
            build_log: Vec::new(),
            aborted: false,
        }
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    pub fn thing(&self, id: ThingId) -> &Thing<'ctx> {
        &self.things[id.0 as usize]
    }

    pub(crate) fn thing_mut(&mut self, id: ThingId) -> &mut Thing<'ctx> {
        &mut self.things[id.0 as usize]
    }

    pub fn things(&self) -> impl Iterator<Item = (ThingId, &Thing<'ctx>)> {
        self.things
            .iter()
            .enumerate()
            .map(|(i, t)| (ThingId(i as u32), t))
    }

    pub(crate) fn add_thing(&mut self, thing: Thing<'ctx>) -> ThingId {
        let id = ThingId(self.things.len() as u32);
        self.things.push(thing);
        id
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    pub fn new_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.new_scope(Some(parent))
    }

    /// Looks `name` up in the global scope.
    pub fn lookup(&self, name: &str) -> Option<ThingId> {
        self.scopes.lookup(self.global, name)
    }

    pub fn lookup_in(&self, scope: ScopeId, name: &str) -> Option<ThingId> {
        self.scopes.lookup(scope, name)
    }

    pub fn bind(&mut self, scope: ScopeId, name: &str, thing: ThingId) -> Result<(), SemanticError> {
        self.scopes.bind(scope, name, thing)
    }

    /// Resolves a type name, building a struct type on first use.
    pub fn resolve_type(&mut self, scope: ScopeId, ty: &Type) -> DiagnosticResult<IrType<'ctx>> {
        let name = ty.name();
        let id = self.lookup_in(scope, name).ok_or_else(|| {
            SemanticError::UndefinedSymbol {
                name: name.to_string(),
            }
            .at(ty.span())
        })?;
        if !self.thing(id).is_type() {
            return Err(SemanticError::UnknownType {
                name: name.to_string(),
            }
            .at(ty.span()));
        }
        if let Some(resolved) = self.thing(id).as_type() {
            return Ok(*resolved);
        }
        self.materialize(id).map_err(|d| located(d, ty.span()))?;
        self.thing(id).as_type().copied().ok_or_else(|| {
            SemanticError::UndefinedSymbol {
                name: name.to_string(),
            }
            .at(ty.span())
        })
    }

    /// Resolves `name` to a value-capable thing, materializing it first if
    /// it has not been built yet. A type name yields `None`.
    pub fn resolve_value(
        &mut self,
        scope: ScopeId,
        name: &str,
    ) -> DiagnosticResult<Option<(ThingId, Value<'ctx>)>> {
        let id = self.lookup_in(scope, name).ok_or_else(|| {
            Box::new(Diagnostic::from(SemanticError::UndefinedSymbol {
                name: name.to_string(),
            }))
        })?;
        if !self.thing(id).is_value() {
            return Ok(None);
        }
        if let Some(value) = self.thing(id).as_value() {
            return Ok(Some((id, value)));
        }
        self.materialize(id)?;
        match self.thing(id).as_value() {
            Some(value) => Ok(Some((id, value))),
            None => Err(SemanticError::UndefinedSymbol {
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// Names of materialized items, in the order they were built.
    pub fn build_log(&self) -> &[String] {
        &self.build_log
    }

    /// Every diagnostic recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn module(&self) -> &Module<'ctx> {
        &self.ir.module
    }

    pub fn into_module(self) -> Module<'ctx> {
        self.ir.into_module()
    }
}

/// Attaches `span` to a diagnostic that does not carry one yet.
pub(crate) fn located(mut d: Box<Diagnostic>, span: cppl_ast::Span) -> Box<Diagnostic> {
    if d.span.is_none() {
        d.span = Some(span);
    }
    d
}
