//! The lazy build scheduler.
//!
//! Items are materialized at most once. Materializing a function only builds
//! its signature and queues its body, so a body always sees the signatures
//! of everything it calls (including itself), and mutual recursion needs no
//! special handling. Struct layouts are resolved eagerly and recursively;
//! re-entering a struct that is still being laid out is a cycle.

use std::rc::Rc;

use cppl_ast::Item;
use inkwell::module::Module;
use log::{debug, trace, warn};

use super::{BuildState, Job, Program, Thing, ThingId, ThingKind};
use crate::config::ErrorMode;
use crate::diagnostics::{CompileErrors, Diagnostic, DiagnosticResult, SemanticError, Severity};

/// Returned to whoever depends on an item that already failed. The item's
/// own error was reported when it failed, so this is only a note.
fn failed_dependency(name: &str) -> Box<Diagnostic> {
    Diagnostic::simple_boxed(Severity::Note, format!("`{}` could not be built", name))
}

impl<'ctx> Program<'ctx> {
    /// Registers one item in the global scope without generating code.
    pub fn add_item(&mut self, item: Item) -> DiagnosticResult<Option<ThingId>> {
        let (name, kind) = match item {
            Item::Function(f) => (
                f.proto.name.clone(),
                ThingKind::Function {
                    decl: Rc::new(f),
                    value: None,
                },
            ),
            Item::FFIFunction(f) => (
                f.proto.name.clone(),
                ThingKind::ForeignFunction {
                    decl: Rc::new(f),
                    value: None,
                },
            ),
            Item::Struct(s) => (
                s.name.clone(),
                ThingKind::Struct {
                    decl: Rc::new(s),
                    ty: None,
                },
            ),
            Item::Empty(_) => return Ok(None),
        };

        let global = self.global_scope();
        if self.scopes().get(global).get(&name.sym).is_some() {
            return Err(SemanticError::Redefinition {
                name: name.sym.clone(),
            }
            .at(name.span.clone()));
        }
        let id = self.add_thing(Thing::new(name.sym.clone(), kind));
        self.bind(global, &name.sym, id)
            .map_err(|e| e.at(name.span.clone()))?;
        debug!("registered `{}`", name.sym);
        Ok(Some(id))
    }

    /// Registers every item, recording a diagnostic for each one rejected.
    pub fn add_items(&mut self, items: Vec<Item>) {
        for item in items {
            if self.aborted {
                break;
            }
            let name = item.name().map(|n| n.sym.clone());
            if let Err(d) = self.add_item(item) {
                let d = match name {
                    Some(name) => d.with_item(name),
                    None => *d,
                };
                self.record(d);
            }
        }
    }

    /// Records a diagnostic. Notes about failed dependencies are dropped
    /// since the failing item already reported its own error.
    pub(crate) fn record(&mut self, d: Diagnostic) {
        if !d.is_error() {
            debug!("{}", d);
            return;
        }
        warn!("{}", d);
        self.diagnostics.push(d);
        if self.config.error_mode == ErrorMode::Abort {
            self.aborted = true;
            self.worklist.clear();
        }
    }

    /// Builds the signature or layout of a thing if it has not been built.
    ///
    /// A failure is recorded against the thing itself; the caller gets a
    /// note saying its dependency could not be built.
    pub fn materialize(&mut self, id: ThingId) -> DiagnosticResult<()> {
        let thing = self.thing(id);
        match thing.state {
            BuildState::Built => return Ok(()),
            BuildState::Failed => return Err(failed_dependency(&thing.name)),
            BuildState::InProgress => {
                return Err(SemanticError::CyclicDependency {
                    name: thing.name.clone(),
                }
                .into())
            }
            BuildState::Pending => {}
        }

        let name = thing.name.clone();
        let kind = thing.kind.clone();
        debug!("materializing `{}`", name);
        self.thing_mut(id).state = BuildState::InProgress;

        let result = match kind {
            ThingKind::Struct { decl, .. } => self.declare_struct(id, &decl),
            ThingKind::Function { decl, .. } => {
                let result = self.declare_function(id, &decl.proto);
                if result.is_ok() {
                    trace!("queueing body of `{}`", name);
                    self.worklist.push_back(Job::Body(id));
                }
                result
            }
            ThingKind::ForeignFunction { decl, .. } => self.declare_function(id, &decl.proto),
            ThingKind::Builtin { .. } | ThingKind::Local { .. } => Ok(()),
        };

        match result {
            Ok(()) => {
                self.thing_mut(id).state = BuildState::Built;
                self.build_log.push(name);
                Ok(())
            }
            Err(d) => {
                self.thing_mut(id).state = BuildState::Failed;
                self.record(d.with_item(name.clone()));
                Err(failed_dependency(&name))
            }
        }
    }

    fn drain(&mut self) {
        while let Some(job) = self.worklist.pop_front() {
            trace!("worklist: {:?} ({} left)", job, self.worklist.len());
            match job {
                Job::Materialize(id) => {
                    // Failures are recorded by `materialize` itself.
                    let _ = self.materialize(id);
                }
                Job::Body(id) => {
                    if let Err(d) = self.emit_function_body(id) {
                        let name = self.thing(id).name.clone();
                        self.thing_mut(id).state = BuildState::Failed;
                        self.record(d.with_item(name));
                    }
                }
            }
            if self.aborted {
                self.worklist.clear();
            }
        }
    }

    /// Materializes one item by name along with everything it transitively
    /// references, leaving unrelated items unbuilt.
    pub fn build(&mut self, name: &str) -> Result<(), CompileErrors> {
        let id = match self.lookup(name) {
            Some(id) => id,
            None => {
                return Err(CompileErrors {
                    diagnostics: vec![SemanticError::UndefinedSymbol {
                        name: name.to_string(),
                    }
                    .into()],
                })
            }
        };
        let before = self.diagnostics.len();
        let direct = self.materialize(id);
        self.drain();

        let mut new: Vec<Diagnostic> = self.diagnostics[before..].to_vec();
        if new.is_empty() && self.thing(id).state == BuildState::Failed {
            if let Err(d) = direct {
                new.push(*d);
            } else {
                new.push(*failed_dependency(name));
            }
        }
        if new.is_empty() {
            Ok(())
        } else {
            Err(CompileErrors { diagnostics: new })
        }
    }

    /// Materializes every registered item, then verifies the module.
    pub fn finalize(&mut self) -> Result<&Module<'ctx>, CompileErrors> {
        let pending: Vec<ThingId> = self
            .things()
            .filter(|(_, t)| t.is_item() && t.state == BuildState::Pending)
            .map(|(id, _)| id)
            .collect();
        debug!("finalizing {} pending item(s)", pending.len());
        if !self.aborted {
            self.worklist.extend(pending.into_iter().map(Job::Materialize));
            self.drain();
        }

        if !self.has_errors() {
            if let Err(err) = self.ir.verify() {
                self.record(
                    SemanticError::InvalidIr {
                        function: err.function,
                        message: err.message,
                    }
                    .into(),
                );
            }
        }

        if self.has_errors() {
            Err(CompileErrors {
                diagnostics: self.diagnostics.clone(),
            })
        } else {
            Ok(&self.ir.module)
        }
    }
}
