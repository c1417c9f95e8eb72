use std::fmt;

use serde::Serialize;

/// Concrete value types. `Unknown` is the internal poison produced after a
/// reported diagnostic so analysis can continue: it never unifies, is never
/// printed in an "expected" position, and suppresses follow-on operator
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Number,
    String,
    Boolean,
    Void,
    Unknown,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Number => write!(f, "number"),
            Type::String => write!(f, "string"),
            Type::Boolean => write!(f, "boolean"),
            Type::Void => write!(f, "void"),
            Type::Unknown => write!(f, "unknown"),
        }
    }
}

/// A type as it appears in a signature: either concrete or a reference to an
/// enclosing type parameter. Doubles as the expression-type lattice during
/// checking, where `Param` marks a value whose type is opaque inside a
/// generic body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeScheme {
    Concrete(Type),
    Param(String),
}

impl TypeScheme {
    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeScheme::Concrete(Type::Unknown))
    }

    /// Concrete, settled type: not a parameter reference and not the poison.
    pub fn as_settled(&self) -> Option<Type> {
        match self {
            TypeScheme::Concrete(Type::Unknown) => None,
            TypeScheme::Concrete(ty) => Some(*ty),
            TypeScheme::Param(_) => None,
        }
    }
}

impl fmt::Display for TypeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeScheme::Concrete(ty) => write!(f, "{ty}"),
            TypeScheme::Param(name) => write!(f, "{name}"),
        }
    }
}

/// Signature of a callable binding. A non-generic function is the degenerate
/// case with no type parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FnSig {
    pub type_params: Vec<String>,
    pub params: Vec<TypeScheme>,
    pub ret: TypeScheme,
}

impl FnSig {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// Resolve a written type name against the builtin types and the type
/// parameters in scope. `None` means the name resolves to nothing.
pub fn resolve_type_name(name: &str, type_params: &[String]) -> Option<TypeScheme> {
    match name {
        "number" => Some(TypeScheme::Concrete(Type::Number)),
        "string" => Some(TypeScheme::Concrete(Type::String)),
        "boolean" => Some(TypeScheme::Concrete(Type::Boolean)),
        "void" => Some(TypeScheme::Concrete(Type::Void)),
        _ if type_params.iter().any(|tp| tp == name) => {
            Some(TypeScheme::Param(name.to_string()))
        }
        _ => None,
    }
}
