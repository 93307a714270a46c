//! Scope stack and identifier resolution.
//!
//! A scope holds an identifier map, an assumption set and resource limits.
//! Scopes nest lexically: lookup walks leaf to root, first match wins;
//! pushing copies the parent's limits and assumptions. The recursion limit
//! is enforced at scope push.

use crate::assumptions::AssumptionSet;
use crate::registry::Definition;
use rustc_hash::FxHashMap;
use std::time::Duration;
use sym_ir::{EngineError, EngineResult, Name};

/// Resource limits carried by a scope.
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    /// Wall-clock budget of a top-level operation; `None` = unlimited.
    pub time_limit: Option<Duration>,
    /// Rewrite budget of fixed-point loops.
    pub iteration_limit: u32,
    /// Maximum scope-stack depth.
    pub recursion_limit: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            time_limit: None,
            iteration_limit: 1024,
            recursion_limit: 256,
        }
    }
}

/// One lexical frame.
#[derive(Clone, Default)]
pub struct Scope {
    idents: FxHashMap<Name, Definition>,
    /// Assumed predicates, copied from the parent at push.
    pub assumptions: AssumptionSet,
    /// Limits, copied from the parent at push.
    pub limits: Limits,
}

impl Scope {
    fn child(&self) -> Scope {
        Scope {
            idents: FxHashMap::default(),
            assumptions: self.assumptions.clone(),
            limits: self.limits,
        }
    }
}

/// The engine's scope stack. Never empty: the root scope is created with
/// the stack and cannot be popped.
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// Stack holding only the root scope.
    pub fn new(limits: Limits) -> Self {
        ScopeStack {
            scopes: vec![Scope {
                idents: FxHashMap::default(),
                assumptions: AssumptionSet::new(),
                limits,
            }],
        }
    }

    /// Current depth (1 = root only).
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The current (leaf) scope.
    pub fn current(&self) -> &Scope {
        // The stack is never empty; the root scope cannot be popped.
        #[allow(clippy::unwrap_used)]
        self.scopes.last().unwrap()
    }

    /// The current (leaf) scope, mutably.
    pub fn current_mut(&mut self) -> &mut Scope {
        #[allow(clippy::unwrap_used)]
        self.scopes.last_mut().unwrap()
    }

    /// Push a child scope. Fails when the recursion limit is reached.
    pub fn push(&mut self) -> EngineResult<()> {
        let limit = self.current().limits.recursion_limit;
        if self.scopes.len() >= limit as usize {
            return Err(EngineError::RecursionLimit { limit });
        }
        let child = self.current().child();
        self.scopes.push(child);
        Ok(())
    }

    /// Pop the current scope. The root scope stays.
    pub fn pop(&mut self) -> EngineResult<()> {
        if self.scopes.len() <= 1 {
            return Err(EngineError::MissingScope {
                context: "pop_scope",
            });
        }
        self.scopes.pop();
        Ok(())
    }

    /// Resolve a name, walking leaf to root.
    pub fn lookup(&self, name: Name) -> Option<&Definition> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.idents.get(&name))
    }

    /// Insert a definition into the current scope, replacing any same-name
    /// definition in that scope (shadowing outer scopes is always allowed).
    pub fn define(&mut self, name: Name, definition: Definition) {
        self.current_mut().idents.insert(name, definition);
    }

    /// The definition of `name` in the *current* scope only.
    pub fn local(&self, name: Name) -> Option<&Definition> {
        self.current().idents.get(&name)
    }

    /// Update the innermost definition of `name` in place.
    pub fn update<F: FnOnce(&mut Definition)>(&mut self, name: Name, f: F) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(def) = scope.idents.get_mut(&name) {
                f(def);
                return true;
            }
        }
        false
    }
}
