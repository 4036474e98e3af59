use std::{fmt::Display, rc::Rc};

use crate::{
    ast::ast::{ClassId, FnId, Program},
    Span,
};

use super::builtins::{builtin_member_kind, builtin_members, is_builtin_module};

/// The package a module was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackageOrigin {
    /// The project being compiled.
    Root(String),
    /// A materialised dependency under `.magolor/packages/<name>/src`.
    Dependency(String),
    Builtin,
}

impl PackageOrigin {
    pub fn name(&self) -> &str {
        match self {
            PackageOrigin::Root(name) | PackageOrigin::Dependency(name) => name,
            PackageOrigin::Builtin => "Std",
        }
    }
}

impl Display for PackageOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageOrigin::Root(name) => write!(f, "package {}", name),
            PackageOrigin::Dependency(name) => write!(f, "dependency {}", name),
            PackageOrigin::Builtin => write!(f, "built-in library"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Class,
    Variable,
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Class => write!(f, "class"),
            SymbolKind::Variable => write!(f, "variable"),
        }
    }
}

/// Where a symbol's declaration lives inside its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclRef {
    Function(FnId),
    Class(ClassId),
    /// A member of a built-in namespace, which has no declaration tree.
    Builtin,
}

/// A top-level name exported (or kept private) by a module.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub module: String,
    pub decl: DeclRef,
    pub is_public: bool,
    pub span: Span,
}

/// One logical compilation unit, possibly merged from several files.
#[derive(Debug, Clone)]
pub struct Module {
    pub path: String,
    pub package: PackageOrigin,
    pub program: Program,
    /// Filled in by import resolution, in `using` order.
    pub resolved_imports: Vec<String>,
    /// The first `using` path, as written, that did not resolve.
    pub failed_import: Option<String>,
    pub files: Vec<Rc<String>>,
    symbols: Vec<Symbol>,
}

impl Module {
    pub fn new(path: &str, package: PackageOrigin, program: Program, file: Rc<String>) -> Self {
        let mut module = Module {
            path: path.to_string(),
            package,
            program,
            resolved_imports: vec![],
            failed_import: None,
            files: vec![file],
            symbols: vec![],
        };
        module.derive_symbols();
        module
    }

    /// An empty module standing in for a built-in namespace.
    pub fn builtin(path: &str) -> Self {
        let mut module = Module {
            path: path.to_string(),
            package: PackageOrigin::Builtin,
            program: Program::default(),
            resolved_imports: vec![],
            failed_import: None,
            files: vec![],
            symbols: vec![],
        };
        module.derive_symbols();
        module
    }

    pub fn import_failed(&self) -> bool {
        self.failed_import.is_some()
    }

    pub fn is_builtin(&self) -> bool {
        self.package == PackageOrigin::Builtin
    }

    /// The last segment of the dotted path, used as the namespace alias.
    pub fn short_name(&self) -> &str {
        short_name(&self.path)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn public_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_public)
    }

    /// Folds another file of the same module into this one. Declarations are
    /// appended so existing `FnId`/`ClassId` handles stay valid, and `using`
    /// directives already present are dropped.
    pub fn merge(&mut self, other: Module) {
        let Module { program, files, .. } = other;

        for using in program.usings {
            if !self.program.usings.iter().any(|u| u.path == using.path) {
                self.program.usings.push(using);
            }
        }
        self.program.functions.extend(program.functions);
        self.program.classes.extend(program.classes);

        for file in files {
            if !self.files.contains(&file) {
                self.files.push(file);
            }
        }

        self.derive_symbols();
    }

    fn derive_symbols(&mut self) {
        let mut symbols = vec![];

        if is_builtin_module(&self.path) && self.is_builtin() {
            for member in builtin_members(&self.path).unwrap_or_default() {
                symbols.push(Symbol {
                    name: member.to_string(),
                    kind: builtin_member_kind(member),
                    module: self.path.clone(),
                    decl: DeclRef::Builtin,
                    is_public: true,
                    span: Span::null(),
                });
            }
        }

        for (index, function) in self.program.functions.iter().enumerate() {
            symbols.push(Symbol {
                name: function.name.clone(),
                kind: SymbolKind::Function,
                module: self.path.clone(),
                decl: DeclRef::Function(FnId(index)),
                is_public: function.is_public,
                span: function.name_span.clone(),
            });
        }

        for (index, class) in self.program.classes.iter().enumerate() {
            symbols.push(Symbol {
                name: class.name.clone(),
                kind: SymbolKind::Class,
                module: self.path.clone(),
                decl: DeclRef::Class(ClassId(index)),
                is_public: class.is_public,
                span: class.name_span.clone(),
            });
        }

        self.symbols = symbols;
    }
}

pub fn short_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}
