use crate::diagnostics::DiagnosticKind;

use super::types::{FnSig, Type, TypeScheme};
use super::unify::{unify, ParamEnv};

/// A failed instantiation. `arg` is the zero-based value-argument position
/// when one argument is at fault, so the caller can point the diagnostic at
/// that argument instead of the whole call.
#[derive(Debug)]
pub struct InstantiateError {
    pub kind: DiagnosticKind,
    pub arg: Option<usize>,
    pub message: String,
}

impl InstantiateError {
    fn call(kind: DiagnosticKind, message: String) -> Self {
        Self { kind, arg: None, message }
    }
}

/// Resolve one call site against a declared signature. A fresh environment is
/// built per call, explicit type arguments first, then each argument unifies
/// left to right against its parameter, fail-fast. Explicit type arguments do
/// not exempt arguments from checking. Non-generic signatures take the same
/// path with nothing to bind.
///
/// `Type::Unknown` among the arguments or type arguments marks poison from an
/// already-reported diagnostic: it binds nothing, and inference gaps it
/// causes resolve to `Unknown` silently instead of a second report.
pub fn instantiate(
    name: &str,
    sig: &FnSig,
    type_args: Option<&[Type]>,
    args: &[Type],
) -> Result<Type, InstantiateError> {
    if type_args.is_some() && !sig.is_generic() {
        return Err(InstantiateError::call(
            DiagnosticKind::TypeMismatch,
            format!("function '{name}' is not generic and does not accept type arguments"),
        ));
    }

    if args.len() != sig.params.len() {
        return Err(InstantiateError::call(
            DiagnosticKind::TypeMismatch,
            format!(
                "function '{name}' expects {} arguments, got {}",
                sig.params.len(),
                args.len()
            ),
        ));
    }

    let mut env = ParamEnv::new();
    let mut poisoned = args.contains(&Type::Unknown);

    if let Some(type_args) = type_args {
        if type_args.len() != sig.type_params.len() {
            return Err(InstantiateError::call(
                DiagnosticKind::TypeMismatch,
                format!(
                    "function '{name}' expects {} type arguments, got {}",
                    sig.type_params.len(),
                    type_args.len()
                ),
            ));
        }
        for (param, ty) in sig.type_params.iter().zip(type_args) {
            if *ty == Type::Unknown {
                poisoned = true;
            } else {
                env.bind(param.clone(), *ty);
            }
        }
    }

    for (i, (scheme, arg)) in sig.params.iter().zip(args).enumerate() {
        if let Err(err) = unify(scheme, *arg, &mut env) {
            return Err(InstantiateError {
                kind: DiagnosticKind::TypeMismatch,
                arg: Some(i),
                message: format!(
                    "argument {} of '{name}': expected {}, found {}",
                    i + 1,
                    err.expected,
                    err.actual
                ),
            });
        }
    }

    if !poisoned {
        for param in &sig.type_params {
            if env.lookup(param).is_none() {
                return Err(InstantiateError::call(
                    DiagnosticKind::UnresolvedTypeParameter,
                    format!("cannot infer type parameter '{param}' for '{name}'"),
                ));
            }
        }
    }

    Ok(env.apply(&sig.ret).unwrap_or(Type::Unknown))
}
