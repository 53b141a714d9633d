// Integration tests for error recovery on broken input

use enscript::parser::ast::*;
use enscript::parser::{parse, ParseOutput, ParserConfig, Severity};

fn run(source: &str, config: &ParserConfig) -> ParseOutput {
    parse("file:///broken.c", source, 1, config)
}

fn strict() -> ParserConfig {
    ParserConfig::default()
}

fn lenient() -> ParserConfig {
    ParserConfig {
        lenient_semicolons: true,
        ..ParserConfig::default()
    }
}

fn names(output: &ParseOutput) -> Vec<&str> {
    output.file.body.iter().map(|d| d.name()).collect()
}

#[test]
fn test_missing_semicolon_between_declarations() {
    let source = "int x = 1 class Y {}";

    let output = run(source, &strict());
    assert_eq!(names(&output), ["x", "Y"]);
    assert_eq!(output.errors().count(), 1);
    assert!(output.diagnostics[0].message.contains("';'"));

    let output = run(source, &lenient());
    assert_eq!(names(&output), ["x", "Y"]);
    assert!(!output.has_errors());
    assert_eq!(output.handled.len(), 1);
}

#[test]
fn test_unclosed_class_keeps_members() {
    let output = run("class A { int x;", &strict());

    assert_eq!(names(&output), ["A"]);
    let class = output.file.body[0].as_class().expect("class");
    assert_eq!(class.members.len(), 1);
    assert_eq!(class.members[0].name(), "x");

    assert_eq!(output.diagnostics.len(), 1);
    assert!(output.diagnostics[0].message.contains("'}'"), "{}", output.diagnostics[0]);
    assert_eq!(output.diagnostics[0].severity, Severity::Error);
}

#[test]
fn test_partial_declaration_then_next_class() {
    let output = run("class Broken extends\nclass Good {}", &strict());

    assert_eq!(names(&output), ["Broken", "Good"]);
    assert_eq!(output.errors().count(), 1);
    assert!(output.file.body[0].as_class().is_some_and(|c| c.members.is_empty()));
}

#[test]
fn test_bad_statement_does_not_lose_the_rest_of_the_body() {
    let output = run("void f() { int x = ; Print(1); }", &strict());

    assert_eq!(output.errors().count(), 1);
    let func = output.file.body[0].as_function().expect("function");
    let statements = &func.body.as_ref().expect("body").statements;
    assert_eq!(statements.len(), 1);
    assert!(matches!(
        &statements[0],
        Statement::Expression { expression: Expression::Call { .. }, .. }
    ));
}

#[test]
fn test_orphaned_else_is_reported_and_skipped() {
    let output = run("void f() { else Print(1); }", &strict());

    assert_eq!(output.diagnostics.len(), 1);
    assert!(output.diagnostics[0].message.contains("else"));
    let func = output.file.body[0].as_function().expect("function");
    assert_eq!(func.body.as_ref().expect("body").statements.len(), 1);
}

#[test]
fn test_stray_semicolon_in_class_body() {
    let source = "class A { ; int x; }";

    let output = run(source, &strict());
    assert_eq!(output.warnings().count(), 1);
    assert!(!output.has_errors());

    let quiet = ParserConfig {
        suppress_stylistic_warnings: true,
        ..ParserConfig::default()
    };
    let output = run(source, &quiet);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.handled.len(), 1);
    assert_eq!(output.file.body[0].as_class().map(|c| c.members.len()), Some(1));
}

#[test]
fn test_unclosed_conditional_warns() {
    let output = run("#ifdef EDITOR\nint a;\n", &strict());

    assert!(output.file.body.is_empty());
    assert_eq!(output.warnings().count(), 1);
    assert!(output.diagnostics[0].message.contains("#ifdef EDITOR"));
}

#[test]
fn test_without_recovery_first_error_wins() {
    let config = ParserConfig {
        error_recovery: false,
        ..ParserConfig::default()
    };
    let output = run("class A { int x = ; }\nclass B {}", &config);

    assert_eq!(output.errors().count(), 1);
    assert!(output.file.body.is_empty());
}

#[test]
fn test_garbage_never_panics() {
    for source in ["}}}}", "class", "class A<", "void f(", "enum E { = }", "typedef", "[", "int a[", "x.y.;"] {
        let output = run(source, &strict());
        assert!(output.has_errors(), "{:?}", source);
    }
}

fn reports_deep_nesting(output: &ParseOutput) -> bool {
    output
        .errors()
        .any(|e| e.message.contains("nested too deeply"))
}

#[test]
fn test_deeply_nested_classes() {
    let source = format!("{}{}", "class C { ".repeat(200), "}".repeat(200));
    let output = run(&source, &strict());

    assert!(reports_deep_nesting(&output));
    assert_eq!(names(&output), ["C"]);
}

#[test]
fn test_deeply_nested_generic_arguments() {
    let source = format!("{}int{} x;\nint y;", "array<".repeat(200), ">".repeat(200));
    let output = run(&source, &strict());

    assert!(reports_deep_nesting(&output));
    assert_eq!(output.file.body.last().map(|d| d.name()), Some("y"));
}
