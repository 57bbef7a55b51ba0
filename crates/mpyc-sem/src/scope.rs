//! Name resolution for miniPy.
//!
//! Functions and variables live in two disjoint namespaces. Functions
//! are declared once, flat, at whatever point in the program they're
//! defined, and are visible everywhere (miniPy has no nested function
//! definitions and no forward-declaration problem to solve). Variables
//! live on a stack of frames, one per function body or the module
//! top level; lookup walks the stack from the innermost frame
//! outward, so an inner assignment shadows an outer one without
//! touching it.

use mpyc_par::ast::FunctionDef;
use mpyc_util::{FxHashMap, Symbol};

use crate::types::Type;

pub struct SymbolTable {
    functions: FxHashMap<Symbol, FunctionDef>,
    scopes: Vec<FxHashMap<Symbol, Type>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { functions: FxHashMap::default(), scopes: vec![FxHashMap::default()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// The module-level frame is never popped.
    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the module scope");
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Returns `false` if a function with this name was already declared.
    pub fn declare_function(&mut self, def: FunctionDef) -> bool {
        if self.functions.contains_key(&def.name) {
            return false;
        }
        self.functions.insert(def.name, def);
        true
    }

    pub fn lookup_function(&self, name: Symbol) -> Option<&FunctionDef> {
        self.functions.get(&name)
    }

    /// Declares or reassigns `name` in the innermost frame.
    pub fn declare_variable(&mut self, name: Symbol, ty: Type) {
        self.scopes.last_mut().expect("scope stack is never empty").insert(name, ty);
    }

    pub fn lookup_variable(&self, name: Symbol) -> Option<Type> {
        self.scopes.iter().rev().find_map(|frame| frame.get(&name).copied())
    }

    pub fn check_variable(&self, name: Symbol) -> bool {
        self.lookup_variable(name).is_some()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpyc_util::Interner;

    #[test]
    fn inner_scope_shadows_outer_without_clobbering_it() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut table = SymbolTable::new();
        table.declare_variable(x, Type::Int);
        table.push_scope();
        table.declare_variable(x, Type::Str);
        assert_eq!(table.lookup_variable(x), Some(Type::Str));
        table.pop_scope();
        assert_eq!(table.lookup_variable(x), Some(Type::Int));
    }

    #[test]
    fn undeclared_variable_is_not_found() {
        let mut interner = Interner::new();
        let y = interner.intern("y");
        let table = SymbolTable::new();
        assert!(!table.check_variable(y));
    }

    #[test]
    fn popping_the_module_scope_is_a_no_op() {
        let mut table = SymbolTable::new();
        table.pop_scope();
        table.push_scope();
        assert_eq!(table.scopes.len(), 2);
    }
}
