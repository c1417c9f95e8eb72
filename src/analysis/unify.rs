use std::collections::HashMap;

use super::types::{Type, TypeScheme};

/// Per-call-site bindings for a signature's type parameters. Built fresh for
/// every call so one call's inference never leaks into another.
#[derive(Debug, Default)]
pub struct ParamEnv {
    bindings: HashMap<String, Type>,
}

impl ParamEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, ty: Type) {
        self.bindings.insert(name.into(), ty);
    }

    pub fn lookup(&self, name: &str) -> Option<Type> {
        self.bindings.get(name).copied()
    }

    /// Map a signature component through the current bindings. `None` means
    /// the scheme mentions a type parameter that no argument pinned down.
    pub fn apply(&self, scheme: &TypeScheme) -> Option<Type> {
        match scheme {
            TypeScheme::Concrete(ty) => Some(*ty),
            TypeScheme::Param(name) => self.lookup(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnifyError {
    pub expected: Type,
    pub actual: Type,
}

/// Unify one declared parameter against the type of the argument supplied
/// for it. Type parameters bind on first use and must match thereafter.
/// `Unknown` on either side unifies with anything and binds nothing, so an
/// earlier error does not cascade through the rest of the call.
pub fn unify(scheme: &TypeScheme, actual: Type, env: &mut ParamEnv) -> Result<(), UnifyError> {
    if actual == Type::Unknown {
        return Ok(());
    }
    match scheme {
        TypeScheme::Concrete(Type::Unknown) => Ok(()),
        TypeScheme::Concrete(expected) => {
            if *expected == actual {
                Ok(())
            } else {
                Err(UnifyError { expected: *expected, actual })
            }
        }
        TypeScheme::Param(name) => match env.lookup(name) {
            None => {
                env.bind(name.clone(), actual);
                Ok(())
            }
            Some(bound) if bound == actual => Ok(()),
            Some(bound) => Err(UnifyError { expected: bound, actual }),
        },
    }
}
