//! The four stages run together on one source text.

use minijava_core::config::{InterpreterConfig, PipelineConfig};
use minijava_core::{compile, compile_with};

const PROGRAM: &str = r#"
public class Main {
    public static void main(String[] args) {
        int x = 5;
        int y = x + 3;
        System.out.println("y = " + y);
        for (int i = 0; i < 3; i++) {
            System.out.println(i);
        }
    }
}
"#;

#[test]
fn test_all_sections_are_filled() {
    let report = compile(PROGRAM);

    // Only the token right after `=` is validated against the declared type
    assert_eq!(
        report.semantic.messages(),
        vec!["Error en línea 5: El valor 'x' no es válido para tipo int, debe ser un número entero"]
    );
    assert!(!report.tokens.is_empty());
    assert!(report.rejected.is_empty());
    assert_eq!(report.syntax_tree.len(), 6);
    assert!(report.syntax_error.is_none());
    assert_eq!(report.execution.console, "y = 8\n0\n1\n2\n");
    assert!(report.semantic.symbol_table.scope("Main").is_some());
}

#[test]
fn test_syntax_error_empties_tree() {
    let report = compile("public class A {\n if (x > 1 {\n }\n}");

    assert!(report.syntax_tree.is_empty());
    assert_eq!(report.syntax_error.as_ref().map(|e| e.line), Some(2));
    assert!(report.semantic.is_clean());
    assert!(report.execution.failed);
    assert!(!report.tokens.is_empty());
}

#[test]
fn test_diagnostics_do_not_stop_execution() {
    let report = compile("int x = 1;\nint x = 2;\nprint(x);");

    assert_eq!(report.semantic.diagnostics.len(), 1);
    assert_eq!(report.execution.console, "2\n");
    assert!(!report.is_success());
}

#[test]
fn test_runtime_error_is_error_shaped() {
    let report = compile("print(\"antes\");\nz = 3;");

    assert!(report.execution.failed);
    assert_eq!(
        report.execution.console,
        "Error en tiempo de ejecución: Variable z no declarada en línea 2"
    );
}

#[test]
fn test_config_reaches_interpreter() {
    let config = PipelineConfig::default()
        .with_interpreter(InterpreterConfig::default().with_max_loop_iterations(2));

    let report = compile_with(PROGRAM, &config);

    assert!(report.execution.failed);
    assert!(report.execution.console.contains("infinito"));
}

#[test]
fn test_json_shape() {
    let report = compile(PROGRAM);
    let json = report.to_json().expect("Serialization failed");
    let value: serde_json::Value = serde_json::from_str(&json).expect("Invalid JSON");

    assert!(value["tokens"].is_array());
    assert_eq!(value["tokens"][0]["kind"], "keyword");
    assert_eq!(value["tokens"][0]["text"], "public");
    assert_eq!(value["syntax_tree"][0]["node"], "class_declaration");
    assert_eq!(value["syntax_tree"][0]["name"], "Main");
    assert!(value["syntax_error"].is_null());
    assert_eq!(value["semantic"]["diagnostics"][0]["line"], 5);
    assert_eq!(value["execution"]["console"], "y = 8\n0\n1\n2\n");
    assert_eq!(value["execution"]["failed"], false);
}

#[test]
fn test_deep_nesting_is_reported_not_fatal() {
    let unary = format!("int x = {}1;\nprint(\"listo\");", "- ".repeat(5_000));
    let report = compile(&unary);
    assert!(report.syntax_error.is_none());
    assert_eq!(report.execution.console, "listo\n");

    let ifs = format!("int x = 1;\n{}print(x);", "if (x > 0) ".repeat(3_000));
    let report = compile(&ifs);
    assert!(report.syntax_error.is_some());
    assert!(report.execution.failed);
}
