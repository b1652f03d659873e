//! Text and JSON rendering of a [`CompilationReport`].
//!
//! The text form has four sections, one per stage: a token table, the
//! syntax tree, the symbol table with diagnostics, and the execution
//! trace followed by the console output.

use crate::error::Result;
use minijava_core::ast::Statement;
use minijava_core::types::SymbolTable;
use minijava_core::CompilationReport;

pub fn render(report: &CompilationReport, json: bool) -> Result<String> {
    if json {
        let mut out = report.to_json()?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(render_text(report))
    }
}

pub fn render_text(report: &CompilationReport) -> String {
    [
        render_tokens(report),
        render_syntax(report),
        render_semantics(report),
        render_execution(report),
    ]
    .join("\n")
}

fn heading(title: &str) -> String {
    format!("=== {} ===\n", title)
}

pub fn render_tokens(report: &CompilationReport) -> String {
    let mut out = heading("Tokens");
    out.push_str(&format!(
        "{:<6} {:<20} {:<18} {}\n",
        "Línea", "Lexema", "Tipo", "Descripción"
    ));
    for token in &report.tokens {
        out.push_str(&format!(
            "{:<6} {:<20} {:<18} {}\n",
            token.line,
            token.text,
            token.kind.to_string(),
            token.description()
        ));
    }
    for rejected in &report.rejected {
        out.push_str(&format!(
            "Entrada no reconocida en línea {}: '{}'\n",
            rejected.line, rejected.text
        ));
    }
    out
}

pub fn render_syntax(report: &CompilationReport) -> String {
    let mut out = heading("Árbol sintáctico");
    if let Some(error) = &report.syntax_error {
        out.push_str(&format!("{}\n", error));
        return out;
    }
    let roots: Vec<&Statement> = report.syntax_tree.iter().collect();
    if roots.is_empty() {
        out.push_str("(vacío)\n");
    }
    write_tree(&roots, "", &mut out);
    out
}

fn write_tree(statements: &[&Statement], prefix: &str, out: &mut String) {
    for (i, statement) in statements.iter().enumerate() {
        let last = i + 1 == statements.len();
        let branch = if last { "└─ " } else { "├─ " };
        out.push_str(&format!(
            "{}{}{} (línea {})\n",
            prefix,
            branch,
            statement.label(),
            statement.line()
        ));

        let child_prefix = format!("{}{}", prefix, if last { "   " } else { "│  " });
        write_tree(&statement.children(), &child_prefix, out);
    }
}

pub fn render_semantics(report: &CompilationReport) -> String {
    let mut out = heading("Tabla de símbolos");
    out.push_str(&render_symbol_table(&report.semantic.symbol_table));

    out.push_str(&heading("Errores semánticos"));
    if report.semantic.is_clean() {
        out.push_str("Sin errores semánticos\n");
    }
    for message in report.semantic.messages() {
        out.push_str(&format!("{}\n", message));
    }
    out
}

fn render_symbol_table(table: &SymbolTable) -> String {
    if table.is_empty() {
        return "(vacía)\n".to_string();
    }

    let mut out = String::new();
    for scope in table.scopes() {
        out.push_str(&format!("Ámbito: {}\n", scope.class));
        for (name, variable) in &scope.variables {
            let value = variable.initial_value.as_deref().unwrap_or("-");
            let origin = if variable.is_loop_variable { ", bucle" } else { "" };
            out.push_str(&format!(
                "  variable {}: {} = {} (línea {}{})\n",
                name, variable.var_type, value, variable.line, origin
            ));
        }
        for (name, method) in &scope.methods {
            let flavour = if method.is_static { " static" } else { "" };
            out.push_str(&format!(
                "  método {}{} {}({}): {} (línea {})\n",
                method.modifier,
                flavour,
                name,
                method.signature(),
                method.return_type,
                method.line
            ));
        }
    }
    out
}

pub fn render_execution(report: &CompilationReport) -> String {
    let mut out = heading("Traza de ejecución");
    push_block(&mut out, &report.execution.trace);
    out.push_str(&heading("Salida de consola"));
    push_block(&mut out, &report.execution.console);
    out
}

fn push_block(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.is_empty() && !text.ends_with('\n') {
        out.push('\n');
    }
}
