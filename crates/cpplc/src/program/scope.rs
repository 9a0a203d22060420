//! Lexical scopes.
//!
//! Scopes live in an arena owned by the [`Program`](super::Program) and
//! refer to their parent and to [`Thing`](super::Thing)s by index, so
//! discarding a scope never invalidates anything it pointed at.

use std::collections::HashMap;

use super::ThingId;
use crate::diagnostics::SemanticError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Clone, Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    bindings: HashMap<String, ThingId>,
}

impl Scope {
    /// Binding in this scope only, ignoring parents.
    pub fn get(&self, name: &str) -> Option<ThingId> {
        self.bindings.get(name).copied()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            bindings: HashMap::new(),
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// Nearest binding of `name`, walking from `scope` up to the root.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<ThingId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.get(id);
            if let Some(thing) = scope.get(name) {
                return Some(thing);
            }
            current = scope.parent;
        }
        None
    }

    /// Binds `name` in `scope`. Shadowing a parent's binding is fine;
    /// binding the same name twice in one scope is not.
    pub fn bind(&mut self, scope: ScopeId, name: &str, thing: ThingId) -> Result<(), SemanticError> {
        let bindings = &mut self.scopes[scope.0 as usize].bindings;
        if bindings.contains_key(name) {
            return Err(SemanticError::Redefinition {
                name: name.to_string(),
            });
        }
        bindings.insert(name.to_string(), thing);
        Ok(())
    }
}
