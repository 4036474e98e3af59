use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use crate::{
    ast::{
        ast::{ClassDecl, ClassId, FnDecl, FnId, NodeId, Param},
        expressions::{Expr, ExprKind, InterpolationPart},
        statements::{Block, Pattern, Stmt},
    },
    errors::errors::{Error, ErrorImpl},
    module::{
        builtins::{BUILTIN_ROOT, INTRINSICS},
        module::{DeclRef, Module},
        registry::ModuleRegistry,
    },
    Span,
};

use super::scope::ScopeStack;

/// What an identifier refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Function { module: String, id: FnId },
    Class { module: String, id: ClassId },
    /// A field or method of the enclosing class, used by its bare name.
    Member {
        module: String,
        class: ClassId,
        name: String,
    },
    /// An imported module's short name, or `Std`.
    Namespace { path: String },
    /// A member of a built-in namespace brought in by `using`.
    Builtin { namespace: String, name: String },
    Intrinsic { name: String },
    Local { name: String, span: Span },
}

/// Where an identifier occurs. Modules only export functions and classes, so
/// only a callee or a member receiver can name something a failed import
/// would have provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Usage {
    Value,
    Callee,
    Receiver,
}

/// One resolved identifier occurrence.
#[derive(Debug, Clone)]
pub struct Reference {
    pub name: String,
    pub node: NodeId,
    pub span: Span,
    pub binding: Binding,
}

/// Output of resolving one module.
#[derive(Debug, Default)]
pub struct NameResolution {
    pub module: String,
    pub errors: Vec<Error>,
    pub references: Vec<Reference>,
    by_node: HashMap<NodeId, usize>,
    /// Imports in effect at the module root, in `using` order.
    pub imports: Vec<String>,
    pub max_scope_depth: usize,
    /// Depth of the scope stack once the walk finished. Always zero.
    pub final_scope_depth: usize,
}

impl NameResolution {
    pub fn binding(&self, node: NodeId) -> Option<&Binding> {
        self.by_node.get(&node).map(|index| &self.references[*index].binding)
    }

    /// The occurrence whose span covers `offset` in `file`, innermost first.
    pub fn reference_at(&self, file: &str, offset: u32) -> Option<&Reference> {
        self.references
            .iter()
            .filter(|r| r.span.contains(file, offset))
            .min_by_key(|r| r.span.end.0 - r.span.start.0)
    }
}

pub struct NameResolver<'a> {
    module: &'a Module,
    scopes: ScopeStack<Binding>,
    /// Private symbols of imported modules, name to owning module.
    private_imports: HashMap<String, String>,
    errors: Vec<Error>,
    references: Vec<Reference>,
    by_node: HashMap<NodeId, usize>,
}

impl<'a> NameResolver<'a> {
    pub fn new(registry: &'a ModuleRegistry, module: &'a Module) -> Self {
        NameResolver {
            module,
            scopes: root_scope(registry, module),
            private_imports: private_imports(registry, module),
            errors: vec![],
            references: vec![],
            by_node: HashMap::new(),
        }
    }

    fn record(&mut self, node: NodeId, name: &str, span: &Span, binding: Binding) {
        trace!(%name, %node, ?binding, "bound identifier");
        self.by_node.insert(node, self.references.len());
        self.references.push(Reference {
            name: name.to_string(),
            node,
            span: span.clone(),
            binding,
        });
    }

    fn lookup(&mut self, node: NodeId, name: &str, span: &Span, usage: Usage) {
        if let Some(binding) = self.scopes.lookup(name).cloned() {
            self.record(node, name, span, binding);
            return;
        }

        if let Some(owner) = self.private_imports.get(name) {
            self.errors.push(Error::new(
                ErrorImpl::VisibilityViolation {
                    name: name.to_string(),
                    module: owner.clone(),
                },
                span.clone(),
            ));
        } else if self.module.import_failed() && usage != Usage::Value {
            trace!(%name, "unresolved name may come from a failed import");
        } else {
            self.errors.push(Error::new(
                ErrorImpl::UndefinedIdentifier {
                    name: name.to_string(),
                },
                span.clone(),
            ));
        }
    }

    fn declare_params(&mut self, params: &[Param]) {
        for param in params {
            self.scopes.declare(
                &param.name,
                Binding::Local {
                    name: param.name.clone(),
                    span: param.span.clone(),
                },
            );
        }
    }
}

/// Builds the module-level scope for `module`.
///
/// Later groups shadow earlier ones: imported public symbols and namespace
/// aliases, then intrinsics and `Std`, then the module's own declarations.
pub fn root_scope(registry: &ModuleRegistry, module: &Module) -> ScopeStack<Binding> {
    let mut scopes = ScopeStack::with_imports(module.resolved_imports.clone());
    scopes.push();

    for path in &module.resolved_imports {
        let Some(imported) = registry.find(path) else {
            continue;
        };

        for symbol in imported.public_symbols() {
            let binding = match symbol.decl {
                DeclRef::Function(id) => Binding::Function {
                    module: imported.path.clone(),
                    id,
                },
                DeclRef::Class(id) => Binding::Class {
                    module: imported.path.clone(),
                    id,
                },
                DeclRef::Builtin => Binding::Builtin {
                    namespace: imported.path.clone(),
                    name: symbol.name.clone(),
                },
            };
            scopes.declare(&symbol.name, binding);
        }

        scopes.declare(
            imported.short_name(),
            Binding::Namespace {
                path: imported.path.clone(),
            },
        );
    }

    for name in INTRINSICS {
        scopes.declare(
            name,
            Binding::Intrinsic {
                name: name.to_string(),
            },
        );
    }
    scopes.declare(
        BUILTIN_ROOT,
        Binding::Namespace {
            path: BUILTIN_ROOT.to_string(),
        },
    );

    for (index, function) in module.program.functions.iter().enumerate() {
        scopes.declare(
            &function.name,
            Binding::Function {
                module: module.path.clone(),
                id: FnId(index),
            },
        );
    }
    for (index, class) in module.program.classes.iter().enumerate() {
        scopes.declare(
            &class.name,
            Binding::Class {
                module: module.path.clone(),
                id: ClassId(index),
            },
        );
    }

    scopes
}

fn private_imports(registry: &ModuleRegistry, module: &Module) -> HashMap<String, String> {
    let mut private = HashMap::new();

    for path in &module.resolved_imports {
        let Some(imported) = registry.find(path) else {
            continue;
        };
        for symbol in imported.symbols().iter().filter(|s| !s.is_public) {
            private.insert(symbol.name.clone(), imported.path.clone());
        }
    }

    private
}

/// Binds every identifier in the module at `module_path`.
///
/// # Arguments
///
/// * `registry` - The registry, with imports already resolved
/// * `module_path` - Canonical path of the module to resolve
///
/// # Returns
///
/// * `NameResolution` - Accumulated errors and every resolved occurrence
#[instrument(skip(registry))]
pub fn resolve_names(registry: &ModuleRegistry, module_path: &str) -> NameResolution {
    let Some(module) = registry.find(module_path) else {
        return NameResolution {
            module: module_path.to_string(),
            ..Default::default()
        };
    };

    let mut resolver = NameResolver::new(registry, module);

    for (index, class) in module.program.classes.iter().enumerate() {
        resolve_class(&mut resolver, ClassId(index), class);
    }
    for function in &module.program.functions {
        resolve_function(&mut resolver, function);
    }

    resolver.scopes.pop();

    debug!(
        errors = resolver.errors.len(),
        references = resolver.references.len(),
        max_depth = resolver.scopes.max_depth(),
        "name resolution finished"
    );

    NameResolution {
        module: module_path.to_string(),
        errors: resolver.errors,
        references: resolver.references,
        by_node: resolver.by_node,
        imports: resolver.scopes.imports().to_vec(),
        max_scope_depth: resolver.scopes.max_depth(),
        final_scope_depth: resolver.scopes.depth(),
    }
}

fn resolve_class(resolver: &mut NameResolver, id: ClassId, class: &ClassDecl) {
    resolver.scopes.push();

    let module = resolver.module.path.clone();
    let members = class
        .fields
        .iter()
        .map(|f| &f.name)
        .chain(class.methods.iter().map(|m| &m.name));
    for name in members {
        resolver.scopes.declare(
            name,
            Binding::Member {
                module: module.clone(),
                class: id,
                name: name.clone(),
            },
        );
    }

    for field in &class.fields {
        if let Some(initializer) = &field.initializer {
            resolve_expr(resolver, initializer);
        }
    }
    for method in &class.methods {
        resolve_function(resolver, method);
    }

    resolver.scopes.pop();
}

fn resolve_function(resolver: &mut NameResolver, function: &FnDecl) {
    resolver.scopes.push();
    resolver.declare_params(&function.params);
    resolve_block(resolver, &function.body);
    resolver.scopes.pop();
}

pub fn resolve_block(resolver: &mut NameResolver, block: &Block) {
    resolver.scopes.push();
    for stmt in &block.stmts {
        resolve_stmt(resolver, stmt);
    }
    resolver.scopes.pop();
}

pub fn resolve_stmt(resolver: &mut NameResolver, stmt: &Stmt) {
    match stmt {
        Stmt::Let {
            name,
            value,
            name_span,
            ..
        } => {
            resolve_expr(resolver, value);
            resolver.scopes.declare(
                name,
                Binding::Local {
                    name: name.clone(),
                    span: name_span.clone(),
                },
            );
        }
        Stmt::Return { value, .. } => {
            if let Some(value) = value {
                resolve_expr(resolver, value);
            }
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            resolve_expr(resolver, condition);
            resolve_block(resolver, then_branch);
            if let Some(else_branch) = else_branch {
                resolve_stmt(resolver, else_branch);
            }
        }
        Stmt::While {
            condition, body, ..
        } => {
            resolve_expr(resolver, condition);
            resolve_block(resolver, body);
        }
        Stmt::For {
            variable,
            variable_span,
            iterable,
            body,
            ..
        } => {
            resolve_expr(resolver, iterable);

            resolver.scopes.push();
            resolver.scopes.declare(
                variable,
                Binding::Local {
                    name: variable.clone(),
                    span: variable_span.clone(),
                },
            );
            resolve_block(resolver, body);
            resolver.scopes.pop();
        }
        Stmt::Match {
            scrutinee, arms, ..
        } => {
            resolve_expr(resolver, scrutinee);

            for arm in arms {
                resolver.scopes.push();
                if let Pattern::Some { binding, span } = &arm.pattern {
                    resolver.scopes.declare(
                        binding,
                        Binding::Local {
                            name: binding.clone(),
                            span: span.clone(),
                        },
                    );
                }
                resolve_block(resolver, &arm.body);
                resolver.scopes.pop();
            }
        }
        Stmt::Block(block) => resolve_block(resolver, block),
        Stmt::Expr(expr) => resolve_expr(resolver, expr),
    }
}

pub fn resolve_expr(resolver: &mut NameResolver, expr: &Expr) {
    match &expr.kind {
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::This
        | ExprKind::NoneLit => {}
        ExprKind::Interpolated(parts) => {
            for part in parts {
                if let InterpolationPart::Hole(hole) = part {
                    resolve_expr(resolver, hole);
                }
            }
        }
        ExprKind::Ident(name) => resolver.lookup(expr.id, name, &expr.span, Usage::Value),
        ExprKind::Some(inner) => resolve_expr(resolver, inner),
        ExprKind::Binary { left, right, .. } => {
            resolve_expr(resolver, left);
            resolve_expr(resolver, right);
        }
        ExprKind::Unary { operand, .. } => resolve_expr(resolver, operand),
        ExprKind::Assign { target, value } => {
            resolve_expr(resolver, target);
            resolve_expr(resolver, value);
        }
        ExprKind::Call { callee, args } => {
            resolve_operand(resolver, callee, Usage::Callee);
            for arg in args {
                resolve_expr(resolver, arg);
            }
        }
        // Member names are looked up against the receiver by the checker.
        ExprKind::Member { object, .. } => resolve_operand(resolver, object, Usage::Receiver),
        ExprKind::Index { object, index } => {
            resolve_expr(resolver, object);
            resolve_expr(resolver, index);
        }
        ExprKind::New {
            class,
            class_span,
            args,
        } => {
            if let Some(binding @ Binding::Class { .. }) = resolver.scopes.lookup(class).cloned() {
                resolver.record(expr.id, class, class_span, binding);
            }
            for arg in args {
                resolve_expr(resolver, arg);
            }
        }
        ExprKind::Array(elements) => {
            for element in elements {
                resolve_expr(resolver, element);
            }
        }
        ExprKind::Lambda { params, body, .. } => {
            resolver.scopes.push();
            resolver.declare_params(params);
            resolve_block(resolver, body);
            resolver.scopes.pop();
        }
    }
}

fn resolve_operand(resolver: &mut NameResolver, expr: &Expr, usage: Usage) {
    match &expr.kind {
        ExprKind::Ident(name) => resolver.lookup(expr.id, name, &expr.span, usage),
        _ => resolve_expr(resolver, expr),
    }
}
