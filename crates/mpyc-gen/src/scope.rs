//! Tracks which Java variable names are already declared in the
//! enclosing block, and with what type, so [`crate::TargetGen`] knows
//! whether an assignment needs a leading type or is a plain re-assign.
//!
//! A block opened by `if`/`while`/a function body pushes a frame; its
//! matching `end` pops one. The outermost frame (module level, inside
//! `main`) is never popped.

use mpyc_util::FxHashMap;

pub struct VarScope {
    frames: Vec<FxHashMap<String, String>>,
}

impl VarScope {
    pub fn new() -> Self {
        Self { frames: vec![FxHashMap::default()] }
    }

    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        debug_assert!(self.frames.len() > 1, "popped the module-level scope");
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn declare(&mut self, name: &str, java_type: &str) {
        self.frames.last_mut().expect("at least one frame").insert(name.to_string(), java_type.to_string());
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|f| f.contains_key(name))
    }

    /// Falls back to `Object` for a name this pass never saw declared -
    /// a function parameter referenced before any assignment inside
    /// its body would otherwise have no recorded type.
    pub fn type_of(&self, name: &str) -> String {
        self.frames.iter().rev().find_map(|f| f.get(name).cloned()).unwrap_or_else(|| "Object".to_string())
    }
}

impl Default for VarScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_frame_shadows_without_losing_the_outer_declaration() {
        let mut scope = VarScope::new();
        scope.declare("x", "int");
        scope.push();
        scope.declare("x", "String");
        assert_eq!(scope.type_of("x"), "String");
        scope.pop();
        assert_eq!(scope.type_of("x"), "int");
    }

    #[test]
    fn undeclared_name_falls_back_to_object() {
        let scope = VarScope::new();
        assert_eq!(scope.type_of("mystery"), "Object");
        assert!(!scope.is_declared("mystery"));
    }

    #[test]
    fn popping_the_module_frame_is_a_no_op() {
        let mut scope = VarScope::new();
        assert_eq!(scope.depth(), 1);
        scope.pop();
        assert_eq!(scope.depth(), 1);
    }
}
