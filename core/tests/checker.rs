//! Symbol table and diagnostics for whole programs.

use minijava_core::lexer::tokenize;
use minijava_core::parser::parse;
use minijava_core::types::{ScopeName, SemanticReport, check};

fn analyze(code: &str) -> SemanticReport {
    let statements = parse(tokenize(code)).expect("Parsing failed");
    check(&statements)
}

#[test]
fn test_well_formed_main_has_no_main_diagnostics() {
    let report = analyze(
        r#"
public class Main {
    public static void main(String[] args) {
        int edad = 20;
        double altura = 1.75;
        String nombre = "Ana";
        boolean activo = true;
    }
}
"#,
    );

    assert!(report.is_clean(), "{:?}", report.messages());
    let scope = report.symbol_table.scope("Main").expect("Main scope");
    assert_eq!(scope.variables.len(), 4);
    assert_eq!(scope.methods["main"].return_type, "void");
    assert_eq!(scope.methods["main"].signature(), "String[] args");
}

#[test]
fn test_each_type_rejects_malformed_values() {
    let cases = [
        ("int", "int n = 3.5;"),
        ("double", "double d = \"x\";"),
        ("String", "String s = 42;"),
        ("boolean", "boolean b = si;"),
    ];

    for (type_name, code) in cases {
        let report = analyze(code);
        assert!(
            report.messages().iter().any(|m| m.contains(type_name)),
            "{} -> {:?}",
            code,
            report.messages()
        );
    }
}

#[test]
fn test_redeclaration_reported_once() {
    let report = analyze("int x = 1;\nint x = 2;");

    let redeclared: Vec<String> = report
        .messages()
        .into_iter()
        .filter(|m| m.contains("ya declarada"))
        .collect();
    assert_eq!(redeclared, vec!["Error en línea 2: Variable 'x' ya declarada"]);
}

#[test]
fn test_loop_variable_redeclaration_is_tolerated() {
    let report = analyze(
        "for (int i = 0; i < 3; i++) {\n}\nfor (int i = 5; i > 0; i--) {\n}\nint i = 1;",
    );

    assert!(
        report.messages().iter().all(|m| !m.contains("ya declarada")),
        "{:?}",
        report.messages()
    );
}

#[test]
fn test_loop_colliding_with_plain_variable() {
    let report = analyze("int i = 0;\nfor (int i = 0; i < 3; i++) {\n}");

    assert_eq!(
        report.messages(),
        vec!["Error en línea 2: Variable 'i' ya declarada"]
    );
}

#[test]
fn test_checking_continues_after_errors() {
    let report = analyze(
        "public class A {\n public void main() {\n int x = \"no\";\n float f = 1;\n int x = 3;\n }\n}",
    );

    assert_eq!(
        report.messages(),
        vec![
            "Error en línea 2: El método main debe ser static",
            "Error en línea 3: El valor '\"no\"' no es válido para tipo int, debe ser un número entero",
            "Error en línea 4: Tipo de dato 'float' no válido",
            "Error en línea 5: Variable 'x' ya declarada",
        ]
    );
}

#[test]
fn test_scopes_follow_class_headers() {
    let report = analyze("int suelto = 1;\nclass A {\n int a = 1;\n}\nclass B {\n int b = 2;\n}");

    let names: Vec<&ScopeName> = report
        .symbol_table
        .scopes()
        .iter()
        .map(|s| &s.class)
        .collect();
    assert_eq!(
        names,
        vec![
            &ScopeName::Unscoped,
            &ScopeName::Class("A".to_string()),
            &ScopeName::Class("B".to_string()),
        ]
    );
    assert!(report.symbol_table.scope("B").unwrap().variables.contains_key("b"));
}

#[test]
fn test_while_condition_uses_if_rules() {
    let report = analyze("while (x) {\n}\nwhile (x < ) {\n}");

    assert_eq!(report.diagnostics.len(), 2);
    assert!(report.messages()[0].contains("while"));
    assert!(report.messages()[1].contains("dos operandos"));
}

#[test]
fn test_for_missing_segments() {
    let report = analyze("for (;;) {\n}");

    assert_eq!(report.diagnostics.len(), 3);
}
