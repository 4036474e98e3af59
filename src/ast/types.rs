//! The Magolor type language.
//!
//! Type annotations are parsed straight into [`Type`]; a class name stays a
//! `Class { name }` until the checker looks it up in the registry.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    String,
    Bool,
    Void,
    Function { params: Vec<Type>, ret: Box<Type> },
    Class { name: String },
    Option(Box<Type>),
    Array(Box<Type>),
    /// Not nameable in source. Stands in where a type could not be
    /// determined (already-reported errors, built-in library members) and is
    /// compatible with everything.
    Unknown,
}

impl Type {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::Unknown)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn option(inner: Type) -> Type {
        Type::Option(Box::new(inner))
    }

    pub fn array(inner: Type) -> Type {
        Type::Array(Box::new(inner))
    }

    pub fn class(name: &str) -> Type {
        Type::Class {
            name: name.to_string(),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::Void => write!(f, "void"),
            Type::Function { params, ret } => {
                let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
                write!(f, "fn({}) -> {}", params.join(", "), ret)
            }
            Type::Class { name } => write!(f, "{}", name),
            Type::Option(inner) => write!(f, "Option<{}>", inner),
            Type::Array(inner) => write!(f, "{}[]", inner),
            Type::Unknown => write!(f, "?"),
        }
    }
}
