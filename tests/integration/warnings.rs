mod common;
use common::{analyze, errors, warnings};
use tycho::diagnostics::Severity;

#[test]
fn unused_let_variable_warns() {
    let warnings = warnings("function main() {\n    let x = 42;\n}\n");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("unused variable 'x'"));
}

#[test]
fn used_variable_no_warning() {
    let warnings = warnings("function main() {\n    let x = 42;\n    print(x);\n}\n");
    assert!(warnings.is_empty(), "expected no warnings, got: {warnings:?}");
}

#[test]
fn underscore_prefix_suppresses() {
    let warnings = warnings("function main() {\n    let _x = 42;\n}\n");
    assert!(warnings.is_empty(), "expected no warnings for _-prefixed var, got: {warnings:?}");
}

#[test]
fn function_param_not_warned() {
    let warnings = warnings(
        "function foo(x: number) {\n    let y = 1;\n    print(y);\n}\n\nfunction main() {\n    foo(42);\n}\n",
    );
    assert!(warnings.is_empty(), "expected no warnings, got: {warnings:?}");
}

#[test]
fn closure_params_not_warned() {
    let warnings = warnings(
        "function main() {\n    let f = (x: number): number => 1;\n    print(f(5));\n}\n",
    );
    assert!(warnings.is_empty(), "expected no warnings, got: {warnings:?}");
}

#[test]
fn multiple_unused_variables_warn_in_declaration_order() {
    let warnings = warnings(
        "function main() {\n    let a = 1;\n    let b = 2;\n    let c = 3;\n}\n",
    );
    assert_eq!(warnings.len(), 3);
    assert!(warnings[0].contains("unused variable 'a'"));
    assert!(warnings[1].contains("unused variable 'b'"));
    assert!(warnings[2].contains("unused variable 'c'"));
}

#[test]
fn variable_written_but_never_read() {
    let warnings = warnings("function main() {\n    let x = 1;\n    let y = x + 1;\n}\n");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("unused variable 'y'"));
}

#[test]
fn variables_in_different_scopes() {
    let warnings = warnings(
        "function main() {\n    let x = 1;\n    if (true) {\n        let y = 2;\n        print(y);\n    }\n}\n",
    );
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("unused variable 'x'"));
}

#[test]
fn shadowed_binding_that_was_never_read_still_warns() {
    let warnings = warnings(
        "function main() {\n    let x = 1;\n    let x = 2;\n    print(x);\n}\n",
    );
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("unused variable 'x'"));
}

#[test]
fn capture_by_a_closure_counts_as_a_use() {
    let warnings = warnings(
        "function main() {\n    let a = 1;\n    let f = (): number => a;\n    print(f());\n}\n",
    );
    assert!(warnings.is_empty(), "expected no warnings, got: {warnings:?}");
}

#[test]
fn unused_closure_binding_warns() {
    let warnings = warnings(
        "function main() {\n    let f = (): number => 1;\n    print(1);\n}\n",
    );
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("unused variable 'f'"));
}

#[test]
fn warnings_do_not_block_analysis() {
    let src = "function main() {\n    let x = 42;\n}\n";
    let analysis = analyze(src);
    assert_eq!(analysis.diagnostics.len(), 1);
    assert_eq!(analysis.diagnostics[0].severity(), Severity::Warning);
    assert!(errors(src).is_empty());
}
