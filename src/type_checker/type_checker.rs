use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::{
    ast::{
        ast::{ClassDecl, ClassId, FnDecl, NodeId, Param},
        expressions::{BinaryOp, Expr, ExprKind, InterpolationPart, UnaryOp},
        statements::{Block, Pattern, Stmt},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    module::{
        builtins::is_builtin_module,
        module::{DeclRef, Module, SymbolKind},
        registry::ModuleRegistry,
    },
    resolver::{
        names::{Binding, NameResolution},
        scope::ScopeStack,
    },
    Span,
};

/// Output of checking one module.
#[derive(Debug, Default)]
pub struct TypeCheckResult {
    pub errors: Vec<Error>,
    pub expr_types: HashMap<NodeId, Type>,
}

impl TypeCheckResult {
    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.expr_types.get(&node)
    }
}

/// The class whose body is being checked.
#[derive(Debug, Clone)]
struct ClassContext {
    module: String,
    id: ClassId,
    name: String,
}

pub struct TypeChecker<'a> {
    registry: &'a ModuleRegistry,
    resolution: &'a NameResolution,
    module: &'a Module,
    locals: ScopeStack<Type>,
    current_return: Option<Type>,
    current_class: Option<ClassContext>,
    errors: Vec<Error>,
    expr_types: HashMap<NodeId, Type>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        registry: &'a ModuleRegistry,
        resolution: &'a NameResolution,
        module: &'a Module,
    ) -> Self {
        TypeChecker {
            registry,
            resolution,
            module,
            locals: ScopeStack::new(),
            current_return: None,
            current_class: None,
            errors: vec![],
            expr_types: HashMap::new(),
        }
    }

    fn error(&mut self, error: ErrorImpl, span: &Span) {
        self.errors.push(Error::new(error, span.clone()));
    }

    fn mismatch(&mut self, expected: &Type, received: &Type, span: &Span) {
        self.error(
            ErrorImpl::TypeMismatch {
                expected: expected.to_string(),
                received: received.to_string(),
            },
            span,
        );
    }

    /// Reports a mismatch unless `received` can be stored in `expected`.
    fn expect_assignable(&mut self, received: &Type, expected: &Type, span: &Span) {
        if !is_assignable(received, expected) {
            self.mismatch(expected, received, span);
        }
    }

    /// Reports an unknown class name, unless a failed import may have
    /// declared it.
    fn undefined_class(&mut self, name: &str, span: &Span) {
        if !self.module.import_failed() {
            self.error(
                ErrorImpl::UndefinedClass {
                    name: name.to_string(),
                },
                span,
            );
        }
    }

    fn class_decl(&self, name: &str) -> Option<(&'a Module, &'a ClassDecl)> {
        let registry: &'a ModuleRegistry = self.registry;
        registry.class_decl(name, &self.module.path)
    }

    /// Checks that every class named in `ty` exists.
    fn check_annotation(&mut self, ty: &Type, span: &Span) {
        match ty {
            Type::Class { name } => {
                if self.class_decl(name).is_none() {
                    self.undefined_class(name, span);
                }
            }
            Type::Option(inner) | Type::Array(inner) => self.check_annotation(inner, span),
            Type::Function { params, ret } => {
                for param in params {
                    self.check_annotation(param, span);
                }
                self.check_annotation(ret, span);
            }
            _ => {}
        }
    }

    fn declare_params(&mut self, params: &[Param]) {
        for param in params {
            self.check_annotation(&param.ty, &param.span);
            self.locals.declare(&param.name, param.ty.clone());
        }
    }
}

/// The type both operands can be used at: identical types, or `float` when
/// one side is `int` and the other `float`.
pub fn common_type(left: &Type, right: &Type) -> Option<Type> {
    match (left, right) {
        (Type::Unknown, other) | (other, Type::Unknown) => Some(other.clone()),
        (Type::Int, Type::Float) | (Type::Float, Type::Int) => Some(Type::Float),
        (Type::Option(a), Type::Option(b)) => common_type(a, b).map(Type::option),
        (Type::Array(a), Type::Array(b)) => common_type(a, b).map(Type::array),
        _ if left == right => Some(left.clone()),
        _ => None,
    }
}

/// Whether a value of type `from` can be stored where `to` is expected.
/// `int` widens to `float`, never the other way.
pub fn is_assignable(from: &Type, to: &Type) -> bool {
    match (from, to) {
        (Type::Unknown, _) | (_, Type::Unknown) => true,
        (Type::Int, Type::Float) => true,
        (Type::Option(a), Type::Option(b)) => is_assignable(a, b),
        (Type::Array(a), Type::Array(b)) => is_assignable(a, b),
        (
            Type::Function {
                params: from_params,
                ret: from_ret,
            },
            Type::Function {
                params: to_params,
                ret: to_ret,
            },
        ) => {
            from_params.len() == to_params.len()
                && from_params
                    .iter()
                    .zip(to_params)
                    .all(|(f, t)| is_assignable(t, f))
                && is_assignable(from_ret, to_ret)
        }
        _ => from == to,
    }
}

/// Type-checks the module at `resolution.module`.
///
/// # Arguments
///
/// * `registry` - The registry, consulted for classes and functions of
///   other modules
/// * `resolution` - The module's name resolution, which says what every
///   identifier refers to
///
/// # Returns
///
/// * `TypeCheckResult` - Accumulated errors and the type of every expression
#[instrument(skip_all, fields(module = %resolution.module))]
pub fn check_module(registry: &ModuleRegistry, resolution: &NameResolution) -> TypeCheckResult {
    let Some(module) = registry.find(&resolution.module) else {
        return TypeCheckResult::default();
    };

    let mut checker = TypeChecker::new(registry, resolution, module);
    checker.locals.push();

    for (index, class) in module.program.classes.iter().enumerate() {
        check_class(&mut checker, ClassId(index), class);
    }
    for function in &module.program.functions {
        check_function(&mut checker, function);
    }

    checker.locals.pop();

    debug!(errors = checker.errors.len(), "type check finished");

    TypeCheckResult {
        errors: checker.errors,
        expr_types: checker.expr_types,
    }
}

pub fn check_class(checker: &mut TypeChecker, id: ClassId, class: &ClassDecl) {
    let previous = checker.current_class.replace(ClassContext {
        module: checker.module.path.clone(),
        id,
        name: class.name.clone(),
    });

    for field in &class.fields {
        checker.check_annotation(&field.ty, &field.span);
        if let Some(initializer) = &field.initializer {
            let ty = check_expr(checker, initializer);
            checker.expect_assignable(&ty, &field.ty, &initializer.span);
        }
    }
    for method in &class.methods {
        check_function(checker, method);
    }

    checker.current_class = previous;
}

pub fn check_function(checker: &mut TypeChecker, function: &FnDecl) {
    let previous = checker.current_return.replace(function.return_type.clone());
    checker.check_annotation(&function.return_type, &function.name_span);

    checker.locals.push();
    checker.declare_params(&function.params);
    check_block(checker, &function.body);
    checker.locals.pop();

    checker.current_return = previous;
}

pub fn check_block(checker: &mut TypeChecker, block: &Block) {
    checker.locals.push();
    for stmt in &block.stmts {
        check_stmt(checker, stmt);
    }
    checker.locals.pop();
}

fn check_condition(checker: &mut TypeChecker, condition: &Expr) {
    let ty = check_expr(checker, condition);
    checker.expect_assignable(&ty, &Type::Bool, &condition.span);
}

pub fn check_stmt(checker: &mut TypeChecker, stmt: &Stmt) {
    match stmt {
        Stmt::Let {
            name,
            ty,
            value,
            name_span,
            ..
        } => {
            let value_type = check_expr(checker, value);
            let declared = match ty {
                Some(annotation) => {
                    checker.check_annotation(annotation, name_span);
                    checker.expect_assignable(&value_type, annotation, &value.span);
                    annotation.clone()
                }
                None => value_type,
            };
            checker.locals.declare(name, declared);
        }
        Stmt::Return { value, span } => {
            let returned = match value {
                Some(value) => check_expr(checker, value),
                None => Type::Void,
            };
            if let Some(expected) = checker.current_return.clone() {
                let span = value.as_ref().map(|v| &v.span).unwrap_or(span);
                checker.expect_assignable(&returned, &expected, span);
            }
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            check_condition(checker, condition);
            check_block(checker, then_branch);
            if let Some(else_branch) = else_branch {
                check_stmt(checker, else_branch);
            }
        }
        Stmt::While {
            condition, body, ..
        } => {
            check_condition(checker, condition);
            check_block(checker, body);
        }
        Stmt::For {
            variable,
            iterable,
            body,
            ..
        } => {
            let iterable_type = check_expr(checker, iterable);
            let element = match iterable_type {
                Type::Array(inner) => *inner,
                Type::Unknown => Type::Unknown,
                other => {
                    checker.mismatch(&Type::array(Type::Unknown), &other, &iterable.span);
                    Type::Unknown
                }
            };

            checker.locals.push();
            checker.locals.declare(variable, element);
            check_block(checker, body);
            checker.locals.pop();
        }
        Stmt::Match {
            scrutinee, arms, ..
        } => {
            let scrutinee_type = check_expr(checker, scrutinee);

            for arm in arms {
                checker.locals.push();
                match &arm.pattern {
                    Pattern::Some { binding, .. } => {
                        let inner = match &scrutinee_type {
                            Type::Option(inner) => (**inner).clone(),
                            Type::Unknown => Type::Unknown,
                            other => {
                                checker.mismatch(&Type::option(Type::Unknown), other, &arm.span);
                                Type::Unknown
                            }
                        };
                        checker.locals.declare(binding, inner);
                    }
                    Pattern::None => {
                        if !matches!(scrutinee_type, Type::Option(_) | Type::Unknown) {
                            checker.mismatch(&Type::option(Type::Unknown), &scrutinee_type, &arm.span);
                        }
                    }
                    Pattern::Wildcard => {}
                }
                check_block(checker, &arm.body);
                checker.locals.pop();
            }
        }
        Stmt::Block(block) => check_block(checker, block),
        Stmt::Expr(expr) => {
            check_expr(checker, expr);
        }
    }
}

/// Computes the type of `expr`, records it and returns it.
pub fn check_expr(checker: &mut TypeChecker, expr: &Expr) -> Type {
    let ty = compute_expr_type(checker, expr);
    checker.expr_types.insert(expr.id, ty.clone());
    ty
}

fn compute_expr_type(checker: &mut TypeChecker, expr: &Expr) -> Type {
    match &expr.kind {
        ExprKind::Int(_) => Type::Int,
        ExprKind::Float(_) => Type::Float,
        ExprKind::Str(_) => Type::String,
        ExprKind::Bool(_) => Type::Bool,
        ExprKind::Interpolated(parts) => {
            for part in parts {
                if let InterpolationPart::Hole(hole) = part {
                    check_expr(checker, hole);
                }
            }
            Type::String
        }
        ExprKind::NoneLit => Type::option(Type::Unknown),
        ExprKind::Some(inner) => Type::option(check_expr(checker, inner)),
        ExprKind::This => match &checker.current_class {
            Some(class) => Type::class(&class.name),
            None => Type::Unknown,
        },
        ExprKind::Ident(name) => check_ident(checker, expr.id, name),
        ExprKind::Binary { op, left, right } => check_binary(checker, *op, left, right, &expr.span),
        ExprKind::Unary { op, operand } => {
            let ty = check_expr(checker, operand);
            match op {
                UnaryOp::Negate if ty.is_numeric() => ty,
                UnaryOp::Negate => {
                    checker.mismatch(&Type::Float, &ty, &operand.span);
                    Type::Unknown
                }
                UnaryOp::Not => {
                    checker.expect_assignable(&ty, &Type::Bool, &operand.span);
                    Type::Bool
                }
            }
        }
        ExprKind::Assign { target, value } => {
            let target_type = check_expr(checker, target);
            let value_type = check_expr(checker, value);
            checker.expect_assignable(&value_type, &target_type, &value.span);
            target_type
        }
        ExprKind::Call { callee, args } => check_call(checker, expr, callee, args),
        ExprKind::Member {
            object,
            member,
            member_span,
        } => check_member(checker, object, member, member_span),
        ExprKind::Index { object, index } => {
            let object_type = check_expr(checker, object);
            let index_type = check_expr(checker, index);
            checker.expect_assignable(&index_type, &Type::Int, &index.span);

            match object_type {
                Type::Array(inner) => *inner,
                Type::String => Type::String,
                Type::Unknown => Type::Unknown,
                other => {
                    checker.mismatch(&Type::array(Type::Unknown), &other, &object.span);
                    Type::Unknown
                }
            }
        }
        ExprKind::New {
            class,
            class_span,
            args,
        } => {
            for arg in args {
                check_expr(checker, arg);
            }

            match checker.class_decl(class) {
                Some((owner, decl)) => {
                    if !decl.is_public && owner.path != checker.module.path {
                        checker.error(
                            ErrorImpl::VisibilityViolation {
                                name: class.clone(),
                                module: owner.path.clone(),
                            },
                            class_span,
                        );
                    }
                    Type::class(class)
                }
                None => {
                    checker.undefined_class(class, class_span);
                    Type::Unknown
                }
            }
        }
        ExprKind::Array(elements) => {
            let mut element_type = Type::Unknown;
            for element in elements {
                let ty = check_expr(checker, element);
                match common_type(&element_type, &ty) {
                    Some(common) => element_type = common,
                    None => checker.mismatch(&element_type, &ty, &element.span),
                }
            }
            Type::array(element_type)
        }
        ExprKind::Lambda {
            params,
            return_type,
            body,
        } => {
            let previous = checker.current_return.replace(return_type.clone());
            checker.locals.push();
            checker.declare_params(params);
            check_block(checker, body);
            checker.locals.pop();
            checker.current_return = previous;

            Type::Function {
                params: params.iter().map(|p| p.ty.clone()).collect(),
                ret: Box::new(return_type.clone()),
            }
        }
    }
}

/// Identifiers name resolution could not bind were already reported there.
fn check_ident(checker: &mut TypeChecker, node: NodeId, name: &str) -> Type {
    let Some(binding) = checker.resolution.binding(node) else {
        return Type::Unknown;
    };

    match binding {
        Binding::Local { .. } => checker.locals.lookup(name).cloned().unwrap_or(Type::Unknown),
        Binding::Function { module, id } => checker
            .registry
            .find(module)
            .map(|m| m.program.function(*id).signature())
            .unwrap_or(Type::Unknown),
        Binding::Class { module, id } => checker
            .registry
            .find(module)
            .map(|m| Type::class(&m.program.class(*id).name))
            .unwrap_or(Type::Unknown),
        Binding::Member {
            module,
            class,
            name: member,
        } => checker
            .registry
            .find(module)
            .and_then(|m| m.program.class(*class).member(member).map(|found| found.ty()))
            .unwrap_or(Type::Unknown),
        Binding::Namespace { .. } | Binding::Builtin { .. } | Binding::Intrinsic { .. } => {
            Type::Unknown
        }
    }
}

fn check_binary(
    checker: &mut TypeChecker,
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    span: &Span,
) -> Type {
    let left_type = check_expr(checker, left);
    let right_type = check_expr(checker, right);

    if op.is_logical() {
        checker.expect_assignable(&left_type, &Type::Bool, &left.span);
        checker.expect_assignable(&right_type, &Type::Bool, &right.span);
        return Type::Bool;
    }

    let Some(common) = common_type(&left_type, &right_type) else {
        checker.mismatch(&left_type, &right_type, span);
        return if op.is_comparison() {
            Type::Bool
        } else {
            Type::Unknown
        };
    };

    if op.is_comparison() {
        return Type::Bool;
    }

    match common {
        ty if ty.is_numeric() => ty,
        Type::String if op == BinaryOp::Add => Type::String,
        other => {
            checker.mismatch(&Type::Float, &other, span);
            Type::Unknown
        }
    }
}

fn check_args(checker: &mut TypeChecker, args: &[Expr]) {
    for arg in args {
        check_expr(checker, arg);
    }
}

fn check_call(checker: &mut TypeChecker, call: &Expr, callee: &Expr, args: &[Expr]) -> Type {
    if let ExprKind::Ident(name) = &callee.kind {
        if let Some(Binding::Intrinsic { .. }) = checker.resolution.binding(callee.id) {
            checker.expr_types.insert(callee.id, Type::Unknown);
            check_args(checker, args);
            return if name == "readLine" {
                Type::String
            } else {
                Type::Void
            };
        }
    }

    let callee_type = check_expr(checker, callee);

    let (params, ret) = match callee_type {
        Type::Function { params, ret } => (params, *ret),
        Type::Unknown => {
            check_args(checker, args);
            return Type::Unknown;
        }
        other => {
            check_args(checker, args);
            checker.error(
                ErrorImpl::TypeMismatch {
                    expected: String::from("function"),
                    received: other.to_string(),
                },
                &callee.span,
            );
            return Type::Unknown;
        }
    };

    if params.len() != args.len() {
        checker.error(
            ErrorImpl::ArityMismatch {
                name: callee.callee_name(),
                expected: params.len(),
                received: args.len(),
            },
            &call.span,
        );
    }

    for (index, arg) in args.iter().enumerate() {
        let arg_type = check_expr(checker, arg);
        if let Some(param) = params.get(index) {
            checker.expect_assignable(&arg_type, param, &arg.span);
        }
    }

    ret
}

/// Whether `object` names a class itself rather than an instance.
fn static_receiver(checker: &TypeChecker, object: &Expr) -> bool {
    match &object.kind {
        ExprKind::Ident(_) => matches!(
            checker.resolution.binding(object.id),
            Some(Binding::Class { .. })
        ),
        ExprKind::Member {
            object: inner,
            member,
            ..
        } => module_alias(checker, inner)
            .and_then(|path| checker.registry.find(&path))
            .and_then(|module| module.symbol(member))
            .is_some_and(|symbol| symbol.kind == SymbolKind::Class),
        _ => false,
    }
}

/// Whether `object` is, or sits under, a built-in namespace. Members of
/// those are not checked.
fn is_builtin_namespace(checker: &TypeChecker, object: &Expr) -> bool {
    match &object.kind {
        ExprKind::Ident(_) => match checker.resolution.binding(object.id) {
            Some(Binding::Namespace { path }) => is_builtin_module(path),
            Some(Binding::Builtin { .. }) => true,
            _ => false,
        },
        ExprKind::Member { object, .. } => is_builtin_namespace(checker, object),
        _ => false,
    }
}

/// The source module `object` names through its short-name alias.
fn module_alias(checker: &TypeChecker, object: &Expr) -> Option<String> {
    if !matches!(object.kind, ExprKind::Ident(_)) {
        return None;
    }

    match checker.resolution.binding(object.id) {
        Some(Binding::Namespace { path }) if !is_builtin_module(path) => Some(path.clone()),
        _ => None,
    }
}

fn check_member(checker: &mut TypeChecker, object: &Expr, member: &str, span: &Span) -> Type {
    if is_builtin_namespace(checker, object) {
        checker.expr_types.insert(object.id, Type::Unknown);
        return Type::Unknown;
    }

    if let Some(path) = module_alias(checker, object) {
        checker.expr_types.insert(object.id, Type::Unknown);
        return check_module_member(checker, &path, member, span);
    }

    let is_static = static_receiver(checker, object);
    let object_type = check_expr(checker, object);

    match &object_type {
        Type::Class { name } => check_class_member(checker, name, member, is_static, span),
        Type::Unknown => Type::Unknown,
        other => match builtin_member_type(other, member) {
            Some(ty) => ty,
            None => {
                checker.error(
                    ErrorImpl::UnknownMember {
                        type_: other.to_string(),
                        member: member.to_string(),
                    },
                    span,
                );
                Type::Unknown
            }
        },
    }
}

/// A top-level function or class of module `path`, reached as
/// `alias.member`.
fn check_module_member(checker: &mut TypeChecker, path: &str, member: &str, span: &Span) -> Type {
    let registry = checker.registry;
    let Some(module) = registry.find(path) else {
        return Type::Unknown;
    };

    let Some(symbol) = module.symbol(member) else {
        checker.error(
            ErrorImpl::UnknownMember {
                type_: path.to_string(),
                member: member.to_string(),
            },
            span,
        );
        return Type::Unknown;
    };

    if !symbol.is_public && module.path != checker.module.path {
        checker.error(
            ErrorImpl::VisibilityViolation {
                name: member.to_string(),
                module: module.path.clone(),
            },
            span,
        );
    }

    match symbol.decl {
        DeclRef::Function(id) => module.program.function(id).signature(),
        DeclRef::Class(id) => Type::class(&module.program.class(id).name),
        DeclRef::Builtin => Type::Unknown,
    }
}

fn check_class_member(
    checker: &mut TypeChecker,
    class_name: &str,
    member_name: &str,
    is_static: bool,
    span: &Span,
) -> Type {
    let registry = checker.registry;
    let Some((owner, class_id)) = registry.find_class(class_name, &checker.module.path) else {
        checker.undefined_class(class_name, span);
        return Type::Unknown;
    };
    let class = owner.program.class(class_id);

    let unknown = ErrorImpl::UnknownMember {
        type_: class_name.to_string(),
        member: member_name.to_string(),
    };

    let Some(member) = class.member(member_name) else {
        checker.error(unknown, span);
        return Type::Unknown;
    };

    if is_static && !member.is_static() {
        checker.error(unknown, span);
        return Type::Unknown;
    }

    let inside_class = checker
        .current_class
        .as_ref()
        .is_some_and(|c| c.module == owner.path && c.id == class_id);
    if !member.is_public() && owner.path != checker.module.path && !inside_class {
        checker.error(
            ErrorImpl::VisibilityViolation {
                name: format!("{}.{}", class_name, member_name),
                module: owner.path.clone(),
            },
            span,
        );
    }

    member.ty()
}

/// Members every array, string and optional value has.
fn builtin_member_type(receiver: &Type, member: &str) -> Option<Type> {
    let method = |params: Vec<Type>, ret: Type| Type::Function {
        params,
        ret: Box::new(ret),
    };

    match (receiver, member) {
        (Type::Array(_) | Type::String, "length" | "len") => Some(method(vec![], Type::Int)),
        (Type::Array(_) | Type::String, "isEmpty") => Some(method(vec![], Type::Bool)),
        (Type::Array(inner), "push") => Some(method(vec![(**inner).clone()], Type::Void)),
        (Type::Array(inner), "pop") => Some(method(vec![], Type::option((**inner).clone()))),
        (Type::Array(inner), "contains") => Some(method(vec![(**inner).clone()], Type::Bool)),
        (Type::String, "contains" | "startsWith" | "endsWith") => {
            Some(method(vec![Type::String], Type::Bool))
        }
        (Type::String, "trim" | "toLower" | "toUpper") => Some(method(vec![], Type::String)),
        (Type::Option(_), "isSome" | "isNone") => Some(method(vec![], Type::Bool)),
        (Type::Option(inner), "unwrap") => Some(method(vec![], (**inner).clone())),
        (Type::Option(inner), "unwrapOr") => {
            Some(method(vec![(**inner).clone()], (**inner).clone()))
        }
        _ => None,
    }
}
