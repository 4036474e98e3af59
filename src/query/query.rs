use tracing::trace;

use crate::{
    ast::ast::Member,
    module::{
        module::{Symbol, SymbolKind},
        registry::ModuleRegistry,
    },
    resolver::names::{root_scope, Binding, NameResolution, Reference},
    Span,
};

/// Where a name is declared.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub kind: SymbolKind,
    pub module: String,
    pub span: Span,
}

/// A name that may be typed at module level.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub name: String,
    pub binding: Binding,
}

/// Every top-level symbol declared in source, in module path order.
pub fn symbols(registry: &ModuleRegistry) -> Vec<&Symbol> {
    registry
        .source_modules()
        .flat_map(|module| module.symbols().iter())
        .collect()
}

/// The declaration a binding found in module `from` refers to.
///
/// Built-in members, intrinsics and namespaces have no declaration in source
/// and yield `None`.
pub fn definition_of(registry: &ModuleRegistry, from: &str, binding: &Binding) -> Option<Definition> {
    match binding {
        Binding::Function { module, id } => {
            let function = registry.find(module)?.program.function(*id);
            Some(Definition {
                name: function.name.clone(),
                kind: SymbolKind::Function,
                module: module.clone(),
                span: function.name_span.clone(),
            })
        }
        Binding::Class { module, id } => {
            let class = registry.find(module)?.program.class(*id);
            Some(Definition {
                name: class.name.clone(),
                kind: SymbolKind::Class,
                module: module.clone(),
                span: class.name_span.clone(),
            })
        }
        Binding::Member {
            module,
            class,
            name,
        } => {
            let class = registry.find(module)?.program.class(*class);
            let (kind, span) = match class.member(name)? {
                Member::Field(field) => (SymbolKind::Variable, field.span.clone()),
                Member::Method(method) => (SymbolKind::Function, method.name_span.clone()),
            };
            Some(Definition {
                name: name.clone(),
                kind,
                module: module.clone(),
                span,
            })
        }
        Binding::Local { name, span } => Some(Definition {
            name: name.clone(),
            kind: SymbolKind::Variable,
            module: from.to_string(),
            span: span.clone(),
        }),
        Binding::Namespace { .. } | Binding::Builtin { .. } | Binding::Intrinsic { .. } => None,
    }
}

/// Go-to-definition for the identifier under `offset` in `file`.
///
/// # Arguments
///
/// * `registry` - The registry the resolution was computed against
/// * `resolution` - Name resolution of the module that owns `file`
/// * `file` - File name as recorded in spans
/// * `offset` - Byte offset of the cursor
///
/// # Returns
///
/// * `Option<Definition>` - The declaration, if the cursor is on an
///   identifier bound to something declared in source
pub fn definition_at(
    registry: &ModuleRegistry,
    resolution: &NameResolution,
    file: &str,
    offset: u32,
) -> Option<Definition> {
    let reference = resolution.reference_at(file, offset)?;
    trace!(name = %reference.name, "definition lookup");
    definition_of(registry, &resolution.module, &reference.binding)
}

/// Every occurrence in `resolution` bound to `target`, in source order.
pub fn references_to<'a>(resolution: &'a NameResolution, target: &Binding) -> Vec<&'a Reference> {
    let mut references: Vec<&Reference> = resolution
        .references
        .iter()
        .filter(|r| &r.binding == target)
        .collect();
    references.sort_by(|a, b| {
        (a.span.file(), a.span.start.0).cmp(&(b.span.file(), b.span.start.0))
    });
    references
}

/// Module-level names visible in `module_path` that start with `prefix`,
/// sorted by name.
///
/// Covers the module's own declarations, public symbols of its resolved
/// imports with their namespace aliases, intrinsics and `Std`.
pub fn completions(registry: &ModuleRegistry, module_path: &str, prefix: &str) -> Vec<Completion> {
    let Some(module) = registry.find(module_path) else {
        return vec![];
    };

    root_scope(registry, module)
        .visible()
        .into_iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, binding)| Completion {
            name: name.to_string(),
            binding: binding.clone(),
        })
        .collect()
}
