//! Generic function expressions: per-call-site binding, explicit type
//! arguments, and inference failures.

mod common;
use common::{call_types, errors, messages};
use tycho::analysis::types::Type;

#[test]
fn identity_resolves_separately_per_call_site() {
    let src = "function main() {\n    let id = <T>(x: T): T => x;\n    print(id(1));\n    print(id(\"s\"));\n}\n";
    let msgs = messages(src);
    assert!(msgs.is_empty(), "got: {msgs:?}");
    assert_eq!(
        call_types(src),
        vec![Type::Void, Type::Number, Type::Void, Type::String]
    );
}

#[test]
fn conflicting_bindings_report_at_the_offending_argument() {
    assert_eq!(
        errors(
            "function main() {\n    let equal = <T>(lhs: T, rhs: T): boolean => lhs === rhs;\n    print(equal(1, \"asd\"));\n}\n",
        ),
        vec!["argument 2 of 'equal': expected number, found string"]
    );
}

#[test]
fn explicit_type_arguments_bind_and_validate() {
    let ok = messages(
        "function main() {\n    let equal = <T>(lhs: T, rhs: T): boolean => lhs === rhs;\n    print(equal<number>(1, 2));\n}\n",
    );
    assert!(ok.is_empty(), "got: {ok:?}");

    assert_eq!(
        errors(
            "function main() {\n    let equal = <T>(lhs: T, rhs: T): boolean => lhs === rhs;\n    print(equal<number>(\"a\", \"b\"));\n}\n",
        ),
        vec!["argument 1 of 'equal': expected number, found string"]
    );
}

#[test]
fn explicit_type_argument_count_is_checked() {
    assert_eq!(
        errors(
            "function main() {\n    let equal = <T>(lhs: T, rhs: T): boolean => lhs === rhs;\n    print(equal<number, string>(1, 2));\n}\n",
        ),
        vec!["function 'equal' expects 1 type arguments, got 2"]
    );
}

#[test]
fn type_arguments_on_non_generic_function_rejected() {
    assert_eq!(
        errors(
            "function main() {\n    let id = (x: number): number => x;\n    print(id<number>(1));\n}\n",
        ),
        vec!["function 'id' is not generic and does not accept type arguments"]
    );
}

#[test]
fn unused_type_parameter_cannot_be_inferred() {
    assert_eq!(
        errors(
            "function main() {\n    let f = <T, R>(x: T): boolean => true;\n    print(f(1));\n}\n",
        ),
        vec!["cannot infer type parameter 'R' for 'f'"]
    );
}

#[test]
fn generic_return_follows_the_bound_parameter() {
    let src = "function main() {\n    let pick = <T, R>(a: T, b: R): R => b;\n    let x: string = pick(1, \"s\");\n    print(x);\n}\n";
    let msgs = messages(src);
    assert!(msgs.is_empty(), "got: {msgs:?}");
    assert!(call_types(src).contains(&Type::String));
}

#[test]
fn unknown_arguments_poison_inference_without_cascading() {
    let src = "function main() {\n    let id = <T>(x: T): T => x;\n    print(id(missing));\n}\n";
    assert_eq!(errors(src), vec!["undefined variable 'missing'"]);
    // The unresolved call site is omitted rather than reported again.
    assert_eq!(call_types(src), vec![Type::Void]);
}

#[test]
fn unknown_arguments_keep_concrete_returns() {
    let src = "function main() {\n    let cmp = <T>(a: T, b: T): boolean => a === b;\n    print(cmp(missing, 2));\n}\n";
    assert_eq!(errors(src), vec!["undefined variable 'missing'"]);
    assert_eq!(call_types(src), vec![Type::Void, Type::Boolean]);
}

#[test]
fn type_parameters_are_usable_in_body_annotations() {
    let msgs = messages(
        "function main() {\n    let f = <T>(x: T): T {\n        let y: T = x;\n        return y;\n    };\n    print(f(1));\n}\n",
    );
    assert!(msgs.is_empty(), "got: {msgs:?}");
}

#[test]
fn unknown_explicit_type_argument_reports_only_the_name() {
    assert_eq!(
        messages(
            "function main() {\n    let id = <T>(x: T): T => x;\n    print(id<banana>(1));\n}\n",
        ),
        vec!["unknown type 'banana'"]
    );
}

#[test]
fn environments_are_fresh_for_every_call_site() {
    let src = "function main() {\n    let equal = <T>(lhs: T, rhs: T): boolean => lhs === rhs;\n    print(equal(1, 2));\n    print(equal(\"a\", \"b\"));\n}\n";
    let msgs = messages(src);
    assert!(msgs.is_empty(), "got: {msgs:?}");
    let booleans = call_types(src)
        .into_iter()
        .filter(|t| *t == Type::Boolean)
        .count();
    assert_eq!(booleans, 2);
}

#[test]
fn nested_generic_calls_resolve_inside_out() {
    let src = "function main() {\n    let id = <T>(x: T): T => x;\n    print(id(id(1)));\n}\n";
    let msgs = messages(src);
    assert!(msgs.is_empty(), "got: {msgs:?}");
    assert_eq!(call_types(src), vec![Type::Void, Type::Number, Type::Number]);
}
