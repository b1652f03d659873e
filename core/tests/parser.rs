//! Syntax tree construction over complete programs.

use minijava_core::ast::{Expr, Statement};
use minijava_core::lexer::tokenize;
use minijava_core::parser::{Parser, parse};

fn parse_program(code: &str) -> Vec<Statement> {
    let mut parser = Parser::new(tokenize(code));
    parser.parse().expect("Parsing failed")
}

fn labels(statements: &[Statement]) -> Vec<String> {
    statements.iter().map(|s| s.label()).collect()
}

#[test]
fn test_flat_program_order() {
    let code = r#"
public class Calculadora {
    public static void main(String[] args) {
        int a = 10;
        int b = 3;
        a = a + b;
        System.out.println(a);
    }
}
"#;

    let statements = parse_program(code);

    assert_eq!(
        labels(&statements),
        vec![
            "clase: Calculadora",
            "metodo: main",
            "variable: a",
            "variable: b",
            "asignacion: a",
            "print",
        ]
    );
    assert_eq!(statements[2].line(), 4);
}

#[test]
fn test_nested_bodies_belong_to_control_nodes() {
    let code = r#"
for (int i = 0; i < 2; i++) {
    if (i == 1) {
        print("uno");
    }
    print(i);
}
print("fin");
"#;

    let statements = parse_program(code);

    assert_eq!(statements.len(), 2);
    let children = statements[0].children();
    assert_eq!(children.len(), 2);
    assert!(matches!(children[0], Statement::If { .. }));
    assert_eq!(children[0].children().len(), 1);
}

#[test]
fn test_else_if_chain() {
    let code = r#"
if (x > 10) {
    print("grande");
} else if (x > 5) {
    print("mediano");
} else {
    print("chico");
}
"#;

    let statements = parse_program(code);

    match &statements[0] {
        Statement::If {
            has_else,
            else_branch,
            ..
        } => {
            assert!(*has_else);
            assert!(matches!(
                else_branch.as_slice(),
                [Statement::If { has_else: true, .. }]
            ));
        }
        other => panic!("Expected if statement, got {:?}", other),
    }
}

#[test]
fn test_single_statement_bodies() {
    let statements = parse_program("if (x < 1) print(\"a\"); else print(\"b\");\nprint(\"c\");");

    assert_eq!(statements.len(), 2);
    match &statements[0] {
        Statement::If {
            then_branch,
            else_branch,
            ..
        } => {
            assert_eq!(then_branch.len(), 1);
            assert_eq!(else_branch.len(), 1);
        }
        other => panic!("Expected if statement, got {:?}", other),
    }
}

#[test]
fn test_while_and_unknown_statements() {
    let statements = parse_program("while (n > 0) {\n print(n);\n}\nreturn;\nbreak;");

    assert!(matches!(statements[0], Statement::While { .. }));
    assert!(matches!(
        &statements[1],
        Statement::VariableDeclaration { declared_type, name: None, .. } if declared_type == "return"
    ));
}

#[test]
fn test_parameters_and_modifiers() {
    let statements = parse_program("private static int sumar(int a, int b) {\n}");

    match &statements[0] {
        Statement::MethodDeclaration {
            modifier,
            is_static,
            return_type,
            parameters,
            ..
        } => {
            assert_eq!(modifier, "private");
            assert!(*is_static);
            assert_eq!(return_type.as_deref(), Some("int"));
            assert_eq!(parameters.len(), 2);
            assert_eq!(parameters[1].name, "b");
        }
        other => panic!("Expected method, got {:?}", other),
    }
}

#[test]
fn test_field_declaration_with_modifier() {
    let statements = parse_program("public class A {\n private int total = 0;\n}");

    assert!(matches!(
        &statements[1],
        Statement::VariableDeclaration { declared_type, name: Some(name), .. }
            if declared_type == "int" && name == "total"
    ));
}

#[test]
fn test_structural_errors_report_line() {
    let err = parse(tokenize("int x = 1;\nif (x > 1 {\n print(x);\n")).unwrap_err();
    assert_eq!(err.line, 2);

    let err = parse(tokenize("\n\nfor (int i = 0; i < 3 i++) {\n}")).unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(
        err.to_string(),
        "Error de sintaxis en línea 3: Se esperaba ';' en la cabecera del for"
    );
}

#[test]
fn test_condition_keeps_raw_text_and_expression() {
    let statements = parse_program("if ((a + 1) != -2) {\n}");

    match &statements[0] {
        Statement::If { condition, .. } => {
            assert_eq!(condition.text(), "(a+1)!=-2");
            assert_eq!(
                condition.expr.as_ref().map(Expr::to_string).as_deref(),
                Some("(a + 1) != -2")
            );
        }
        other => panic!("Expected if statement, got {:?}", other),
    }
}
