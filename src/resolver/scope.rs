use std::collections::HashMap;

/// A stack of lexical scopes mapping names to `T`.
///
/// Lookups walk from the innermost scope outward, so inner declarations
/// shadow outer ones. The stack remembers the deepest nesting it reached
/// and the module imports in effect for every scope it holds.
#[derive(Debug)]
pub struct ScopeStack<T> {
    scopes: Vec<HashMap<String, T>>,
    imports: Vec<String>,
    max_depth: usize,
}

impl<T> Default for ScopeStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScopeStack<T> {
    pub fn new() -> Self {
        Self::with_imports(vec![])
    }

    pub fn with_imports(imports: Vec<String>) -> Self {
        ScopeStack {
            scopes: vec![],
            imports,
            max_depth: 0,
        }
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
        self.max_depth = self.max_depth.max(self.scopes.len());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Binds `name` in the innermost scope, replacing any binding it already
    /// had there. Does nothing when no scope is open.
    pub fn declare(&mut self, name: &str, value: T) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Every name visible from the innermost scope, innermost binding first,
    /// sorted by name.
    pub fn visible(&self) -> Vec<(&str, &T)> {
        let mut seen: HashMap<&str, &T> = HashMap::new();
        for scope in self.scopes.iter().rev() {
            for (name, value) in scope {
                seen.entry(name.as_str()).or_insert(value);
            }
        }

        let mut visible: Vec<(&str, &T)> = seen.into_iter().collect();
        visible.sort_by(|a, b| a.0.cmp(b.0));
        visible
    }
}
