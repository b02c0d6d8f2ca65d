//! The lexically scoped identifier table.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::ident::{Direction, Identifier, Location};

/// Name-resolution failure. The parser attaches the offending name and
/// line when reporting these through the diagnostic sink.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NameError {
    /// `global` declarations are only legal at program depth.
    #[error("global name must be declared at program scope")]
    GlobalTooDeep,

    /// The name already exists in the scope it would be added to.
    #[error("name already declared at this scope")]
    Duplicate,

    /// The name was found in neither the innermost nor the global
    /// scope.
    #[error("not declared in this scope")]
    Undeclared,
}

/// A stack of scopes with owner tags.
///
/// Scope 0 is global and always present. Lookup deliberately skips
/// intermediate scopes: the language has no closure over enclosing
/// procedures, so only the innermost scope and scope 0 are searched.
pub struct IdentTable {
    scopes: Vec<FxHashMap<String, Identifier>>,
    /// Owner name per scope; `None` tags the global scope. The owner
    /// identifier is resolved in its own scope on demand.
    owners: Vec<Option<String>>,
}

impl IdentTable {
    /// Creates a table holding only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
            owners: vec![None],
        }
    }

    /// Number of scopes currently on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Opens a scope owned by the named program or procedure.
    pub fn push_scope(&mut self, owner: impl Into<String>) {
        self.scopes.push(FxHashMap::default());
        self.owners.push(Some(owner.into()));
    }

    /// Closes the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
            self.owners.pop();
        }
    }

    /// Adds an identifier to the innermost scope, or to the global
    /// scope when `is_global` is set.
    ///
    /// Global adds are restricted: they are legal only while at most
    /// the program scope is open, and the name must be new to both
    /// scope 0 and scope 1. Local adds only require the name to be new
    /// within the innermost scope.
    pub fn add(&mut self, id: Identifier, is_global: bool) -> Result<(), NameError> {
        if is_global {
            if self.scopes.len() > 2 {
                return Err(NameError::GlobalTooDeep);
            }
            let in_program_scope =
                self.scopes.len() > 1 && self.scopes[1].contains_key(&id.name);
            if self.scopes[0].contains_key(&id.name) || in_program_scope {
                return Err(NameError::Duplicate);
            }
            self.scopes[0].insert(id.name.clone(), id);
        } else {
            let innermost = self.scopes.len() - 1;
            let scope = &mut self.scopes[innermost];
            if scope.contains_key(&id.name) {
                return Err(NameError::Duplicate);
            }
            scope.insert(id.name.clone(), id);
        }
        Ok(())
    }

    /// Resolves a name against the innermost scope, falling back to
    /// the global scope. Intermediate scopes are invisible.
    pub fn find(&self, name: &str) -> Result<Identifier, NameError> {
        if let Some(id) = self.scopes[self.scopes.len() - 1].get(name) {
            return Ok(id.clone());
        }
        if let Some(id) = self.scopes[0].get(name) {
            return Ok(id.clone());
        }
        Err(NameError::Undeclared)
    }

    /// Classifies how a resolvable name is addressed: globally, as a
    /// parameter of the current owner, or as a local.
    pub fn location(&self, name: &str) -> Location {
        if self.scopes[0].contains_key(name) {
            Location::Global
        } else if self.is_param(name) {
            Location::Param
        } else {
            Location::Local
        }
    }

    /// Direction of the named parameter of the current scope's owner,
    /// or `None` when the name is not one of its parameters.
    pub fn param_direction(&self, name: &str) -> Option<Direction> {
        let owner = self.current_owner()?;
        let params = owner.params?;
        params
            .iter()
            .find(|p| p.id.name == name)
            .map(|p| p.direction)
    }

    /// The identifier owning the innermost scope, or `None` at global
    /// scope. The owner is looked up in its own scope.
    pub fn current_owner(&self) -> Option<Identifier> {
        let owner_name = self.owners.last()?.as_deref()?;
        self.scopes[self.scopes.len() - 1].get(owner_name).cloned()
    }

    fn is_param(&self, name: &str) -> bool {
        let Some(owner) = self.current_owner() else {
            return false;
        };
        let Some(params) = owner.params else {
            return false;
        };
        params.iter().any(|p| p.id.name == name)
    }
}

impl Default for IdentTable {
    fn default() -> Self {
        Self::new()
    }
}
