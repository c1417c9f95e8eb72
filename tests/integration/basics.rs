//! Front-end checks for the non-generic language core: literals, operators,
//! statements, and calls to top-level functions.

mod common;
use common::{call_types, errors, messages};
use tycho::analysis::types::Type;

#[test]
fn clean_unit_has_no_diagnostics() {
    let msgs = messages(
        "function add(a: number, b: number): number {\n    return a + b;\n}\n\nfunction main() {\n    print(add(1, 2));\n}\n",
    );
    assert!(msgs.is_empty(), "got: {msgs:?}");
}

#[test]
fn call_sites_resolve_declared_return_types() {
    let types = call_types(
        "function add(a: number, b: number): number {\n    return a + b;\n}\n\nfunction main() {\n    print(add(1, 2));\n}\n",
    );
    // The print call spans the whole expression, so it sorts first.
    assert_eq!(types, vec![Type::Void, Type::Number]);
}

#[test]
fn forward_references_between_top_level_functions_resolve() {
    let msgs = messages(
        "function main() {\n    print(later(1));\n}\n\nfunction later(x: number): number {\n    return x;\n}\n",
    );
    assert!(msgs.is_empty(), "got: {msgs:?}");
}

#[test]
fn mutually_recursive_top_level_functions_resolve() {
    let msgs = messages(
        "function even(n: number): boolean {\n    if (n === 0) {\n        return true;\n    }\n    return odd(n - 1);\n}\n\nfunction odd(n: number): boolean {\n    if (n === 0) {\n        return false;\n    }\n    return even(n - 1);\n}\n",
    );
    assert!(msgs.is_empty(), "got: {msgs:?}");
}

#[test]
fn undefined_variable_is_reported() {
    assert_eq!(
        errors("function main() {\n    print(missing);\n}\n"),
        vec!["undefined variable 'missing'"]
    );
}

#[test]
fn undefined_function_is_reported_and_arguments_still_checked() {
    assert_eq!(
        messages("function main() {\n    let x = 1;\n    missing(x);\n}\n"),
        vec!["undefined function 'missing'"]
    );
}

#[test]
fn calling_a_non_function_value_is_reported() {
    assert_eq!(
        messages("function main() {\n    let x = 1;\n    x(2);\n}\n"),
        vec!["'x' is not a function"]
    );
}

#[test]
fn let_annotation_mismatch_is_reported_once() {
    assert_eq!(
        messages("function main() {\n    let x: number = \"asd\";\n    print(x);\n}\n"),
        vec!["type mismatch: expected number, found string"]
    );
}

#[test]
fn let_initializer_cannot_see_its_own_binding() {
    assert_eq!(
        errors("function main() {\n    let x = x;\n    print(x);\n}\n"),
        vec!["undefined variable 'x'"]
    );
}

#[test]
fn condition_must_be_boolean() {
    assert_eq!(
        errors("function main() {\n    if (1) {\n        print(1);\n    }\n}\n"),
        vec!["condition must be boolean, found number"]
    );
}

#[test]
fn return_type_mismatch_against_annotation() {
    assert_eq!(
        errors("function wrong(): number {\n    return \"a\";\n}\n"),
        vec!["return type mismatch: expected number, found string"]
    );
}

#[test]
fn bare_return_against_value_annotation_is_reported() {
    assert_eq!(
        errors("function wrong(): number {\n    return;\n}\n"),
        vec!["return type mismatch: expected number, found void"]
    );
}

#[test]
fn unannotated_returns_are_not_checked() {
    let msgs = messages("function loose() {\n    return 1;\n}\n");
    assert!(msgs.is_empty(), "got: {msgs:?}");
}

#[test]
fn string_concatenation_is_allowed_and_subtraction_is_not() {
    let ok = messages("function main() {\n    let s = \"a\" + \"b\";\n    print(s);\n}\n");
    assert!(ok.is_empty(), "got: {ok:?}");

    assert_eq!(
        errors("function main() {\n    let s = 1 - \"b\";\n    print(s);\n}\n"),
        vec!["operand type mismatch: number vs string"]
    );
}

#[test]
fn arithmetic_rejects_booleans() {
    assert_eq!(
        errors("function main() {\n    let x = true + false;\n    print(x);\n}\n"),
        vec!["operator not supported for type boolean"]
    );
}

#[test]
fn comparisons_yield_boolean() {
    let msgs = messages(
        "function main() {\n    let b = 1 < 2;\n    print(b);\n    if (2 >= 1) {\n        print(\"yes\");\n    }\n}\n",
    );
    assert!(msgs.is_empty(), "got: {msgs:?}");
}

#[test]
fn comparisons_reject_strings() {
    assert_eq!(
        errors("function main() {\n    let b = \"a\" < \"b\";\n    print(b);\n}\n"),
        vec!["comparison not supported for type string"]
    );
}

#[test]
fn equality_is_defined_for_any_operand_types() {
    let msgs = messages(
        "function main() {\n    let b = 1 === \"asd\";\n    print(b);\n    print(true !== 0);\n}\n",
    );
    assert!(msgs.is_empty(), "got: {msgs:?}");
}

#[test]
fn unary_operators_check_their_operand() {
    assert_eq!(
        errors("function main() {\n    let x = -true;\n    print(x);\n}\n"),
        vec!["cannot apply '-' to type boolean"]
    );
    assert_eq!(
        errors("function main() {\n    let x = !1;\n    print(x);\n}\n"),
        vec!["cannot apply '!' to type number"]
    );
}

#[test]
fn print_checks_arity() {
    assert_eq!(
        errors("function main() {\n    print(1, 2);\n}\n"),
        vec!["print() expects 1 argument, got 2"]
    );
}

#[test]
fn print_rejects_void_arguments() {
    assert_eq!(
        errors("function main() {\n    print(print(1));\n}\n"),
        vec!["print() expects a value, found void"]
    );
}

#[test]
fn nested_blocks_shadow_and_resolve_innermost() {
    let msgs = messages(
        "function main() {\n    let x = 1;\n    {\n        let x = \"inner\";\n        let y = x + \"!\";\n        print(y);\n    }\n    print(x + 1);\n}\n",
    );
    assert!(msgs.is_empty(), "got: {msgs:?}");
}

#[test]
fn function_arity_is_checked() {
    assert_eq!(
        errors(
            "function add(a: number, b: number): number {\n    return a + b;\n}\n\nfunction main() {\n    print(add(1));\n}\n",
        ),
        vec!["function 'add' expects 2 arguments, got 1"]
    );
}

#[test]
fn argument_types_are_checked_against_annotations() {
    assert_eq!(
        errors(
            "function add(a: number, b: number): number {\n    return a + b;\n}\n\nfunction main() {\n    print(add(1, \"two\"));\n}\n",
        ),
        vec!["argument 2 of 'add': expected number, found string"]
    );
}
