//! Argument parsing, report rendering and the file runner.

use clap::Parser as ClapParser;
use minijava_core::compile;
use minijava_repl::{report, run_file, Cli, ReplError, Repl};
use std::io::Write;
use std::path::PathBuf;

const PROGRAM: &str = "public class Main {\n    public static void main(String[] args) {\n        int x = 5;\n        System.out.println(\"x = \" + x);\n    }\n}\n";

#[test]
fn cli_parse_no_args() {
    let cli = Cli::try_parse_from(["minijava"]).unwrap();

    assert_eq!(cli.file, None);
    assert_eq!(cli.eval, None);
    assert!(!cli.json);
    assert!(cli.is_interactive());
    assert_eq!(cli.pipeline_config().interpreter.max_loop_iterations, 1000);
}

#[test]
fn cli_parse_file_and_flags() {
    let cli = Cli::try_parse_from([
        "minijava",
        "Main.java",
        "--json",
        "--max-iterations",
        "50",
        "--max-loops",
        "3",
    ])
    .unwrap();

    assert_eq!(cli.file, Some(PathBuf::from("Main.java")));
    assert!(cli.json);
    assert!(!cli.is_interactive());

    let config = cli.pipeline_config();
    assert_eq!(config.interpreter.max_loop_iterations, 50);
    assert_eq!(config.interpreter.max_loop_constructs, 3);
}

#[test]
fn cli_parse_eval_short() {
    let cli = Cli::try_parse_from(["minijava", "-e", "print(1);"]).unwrap();

    assert_eq!(cli.eval.as_deref(), Some("print(1);"));
}

#[test]
fn cli_rejects_file_with_eval() {
    assert!(Cli::try_parse_from(["minijava", "a.java", "--eval", "print(1);"]).is_err());
}

#[test]
fn cli_rejects_non_numeric_limit() {
    assert!(Cli::try_parse_from(["minijava", "--max-iterations", "muchas"]).is_err());
}

#[test]
fn text_report_has_every_section() {
    let text = report::render_text(&compile(PROGRAM));

    assert!(text.contains("=== Tokens ==="));
    assert!(text.contains("Palabra clave del lenguaje Java"));
    assert!(text.contains("└─ clase: Main (línea 1)"));
    assert!(text.contains("Ámbito: Main"));
    assert!(text.contains("variable x: int = 5 (línea 3)"));
    assert!(text.contains("método public static main(String[] args): void (línea 2)"));
    assert!(text.contains("Sin errores semánticos"));
    assert!(text.contains("Declarando variable x de tipo int con valor 5"));
    assert!(text.ends_with("=== Salida de consola ===\nx = 5\n"));
}

#[test]
fn text_report_shows_syntax_error_and_rejected_input() {
    let text = report::render_text(&compile("int a = 1; #\nif (a > 1 {\n}"));

    assert!(text.contains("Entrada no reconocida en línea 1: '#'"));
    assert!(text.contains("Error de sintaxis en línea 2"));
    assert!(text.contains("Error en tiempo de ejecución"));
}

#[test]
fn json_render_is_valid() {
    let json = report::render(&compile(PROGRAM), true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["execution"]["console"], "x = 5\n");
}

#[test]
fn run_file_reads_source() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PROGRAM.as_bytes()).unwrap();

    let result = run_file(file.path(), &Cli::try_parse_from(["minijava"]).unwrap().pipeline_config())
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.execution.console, "x = 5\n");
}

#[test]
fn run_file_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no_existe.java");

    let err = run_file(&missing, &Default::default()).unwrap_err();

    assert!(matches!(err, ReplError::ReadFile { .. }));
    assert!(err.to_string().contains("no_existe.java"));
}

#[test]
fn repl_accumulates_until_braces_balance() {
    let mut repl = Repl::new();

    assert_eq!(repl.feed_line(""), None);
    assert_eq!(repl.feed_line("for (int i = 0; i < 2; i++) {"), None);
    assert_eq!(repl.feed_line("    print(i);"), None);
    let chunk = repl.feed_line("}").expect("chunk should be complete");

    assert_eq!(chunk, "for (int i = 0; i < 2; i++) {\n    print(i);\n}\n");
    assert!(repl.input_buffer.is_empty());
    assert_eq!(repl.evaluate(&chunk).unwrap(), "0\n1\n");
}

#[test]
fn repl_evaluate_shows_diagnostics_before_output() {
    let repl = Repl::new();

    let out = repl.evaluate("int x = 1;\nint x = 2;\nprint(x);").unwrap();

    assert_eq!(out, "Error en línea 2: Variable 'x' ya declarada\n2\n");
}

#[test]
fn repl_settings() {
    let mut repl = Repl::new();

    repl.dispatch(":set max_iterations=2").unwrap();
    assert_eq!(repl.config().interpreter.max_loop_iterations, 2);
    let out = repl
        .evaluate("for (int i = 0; i < 5; i++) {\n print(i);\n}")
        .unwrap();
    assert!(out.contains("infinito"));

    repl.dispatch(":json on").unwrap();
    assert_eq!(repl.get_var("json"), "true");
    assert!(repl.evaluate("print(1);").unwrap().trim_start().starts_with('{'));

    assert!(repl.dispatch(":set colores=si").is_err());
    assert!(repl.dispatch(":debug quizas").is_err());
    assert!(repl.dispatch(":desconocido").is_err());

    repl.dispatch("exit").unwrap();
    assert!(repl.is_exiting());
}
