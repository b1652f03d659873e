use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::symbol_table::{MethodSymbol, SymbolTable, VariableSymbol};
use crate::ast::{Condition, ForHeader, Parameter, Statement};
use crate::lexer::{Token, TokenKind};

static INT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("int pattern compiles"));
static DOUBLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d*\.?\d+$").expect("double pattern compiles"));
static STRING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^".*"$"#).expect("string pattern compiles"));
static BOOLEAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(true|false)$").expect("boolean pattern compiles"));

/// The value types a declaration may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Int,
    Double,
    String,
    Boolean,
}

impl DeclaredType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(DeclaredType::Int),
            "double" => Some(DeclaredType::Double),
            "String" => Some(DeclaredType::String),
            "boolean" => Some(DeclaredType::Boolean),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeclaredType::Int => "int",
            DeclaredType::Double => "double",
            DeclaredType::String => "String",
            DeclaredType::Boolean => "boolean",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            DeclaredType::Int => &*INT_PATTERN,
            DeclaredType::Double => &*DOUBLE_PATTERN,
            DeclaredType::String => &*STRING_PATTERN,
            DeclaredType::Boolean => &*BOOLEAN_PATTERN,
        }
    }

    fn requirement(&self) -> &'static str {
        match self {
            DeclaredType::Int => "debe ser un número entero",
            DeclaredType::Double => "debe ser un número decimal",
            DeclaredType::String => "debe ser una cadena entre comillas dobles",
            DeclaredType::Boolean => "debe ser true o false",
        }
    }

    /// Check an initial value against the type's format rule. Surrounding
    /// quotes are ignored for every type except `String`.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        let candidate = match self {
            DeclaredType::String => value,
            _ => value.trim_matches('"'),
        };

        if !self.pattern().is_match(candidate) {
            return Err(format!(
                "El valor '{}' no es válido para tipo {}, {}",
                value,
                self.name(),
                self.requirement()
            ));
        }

        if *self == DeclaredType::Int && candidate.parse::<i64>().is_err() {
            return Err("El valor está fuera del rango permitido para int".to_string());
        }

        Ok(())
    }
}

impl Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error en línea {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SemanticReport {
    pub symbol_table: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl SemanticReport {
    /// Diagnostics rendered as display strings, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[derive(Default)]
pub struct SemanticChecker {
    table: SymbolTable,
    diagnostics: Vec<Diagnostic>,
}

impl SemanticChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the statements in order. Never aborts: every problem becomes a
    /// diagnostic and checking continues to the end.
    pub fn check(&mut self, statements: &[Statement]) -> SemanticReport {
        self.table = SymbolTable::new();
        self.diagnostics.clear();

        for statement in statements {
            self.check_statement(statement);
        }

        tracing::debug!(
            scopes = self.table.scopes().len(),
            diagnostics = self.diagnostics.len(),
            "Semantic check completed"
        );

        SemanticReport {
            symbol_table: std::mem::take(&mut self.table),
            diagnostics: std::mem::take(&mut self.diagnostics),
        }
    }

    fn check_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::ClassDeclaration { name, .. } => match name {
                Some(name) => self.table.open_class(name),
                None => tracing::debug!("Ignoring class header without a name"),
            },
            Statement::MethodDeclaration {
                modifier,
                is_static,
                return_type,
                name,
                parameters,
                line,
            } => self.check_method(
                modifier,
                *is_static,
                return_type.as_deref(),
                name.as_deref(),
                parameters,
                *line,
            ),
            Statement::VariableDeclaration {
                declared_type,
                name: Some(name),
                initial_value,
                line,
                ..
            } => self.check_variable(declared_type, name, initial_value.as_deref(), *line),
            Statement::VariableDeclaration { name: None, .. } => {}
            Statement::If {
                condition,
                then_branch,
                else_branch,
                line,
                ..
            } => {
                self.check_condition("if", condition, *line);
                self.check_body(then_branch);
                self.check_body(else_branch);
            }
            Statement::While {
                condition,
                body,
                line,
            } => {
                self.check_condition("while", condition, *line);
                self.check_body(body);
            }
            Statement::For { header, body, line } => {
                self.check_for(header, *line);
                self.check_body(body);
            }
            Statement::Assignment { .. } | Statement::Print { .. } => {}
        }
    }

    fn check_body(&mut self, body: &[Statement]) {
        for statement in body {
            self.check_statement(statement);
        }
    }

    fn report(&mut self, line: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            line,
            message: message.into(),
        };
        tracing::debug!(%diagnostic, "Semantic diagnostic");
        self.diagnostics.push(diagnostic);
    }

    fn check_method(
        &mut self,
        modifier: &str,
        is_static: bool,
        return_type: Option<&str>,
        name: Option<&str>,
        parameters: &[Parameter],
        line: usize,
    ) {
        let Some(name) = name else {
            return;
        };

        if name == "main" {
            if !is_static {
                self.report(line, "El método main debe ser static");
            }
            if return_type != Some("void") {
                self.report(line, "El método main debe retornar void");
            }
        }

        self.table.insert_method(
            name,
            MethodSymbol {
                modifier: modifier.to_string(),
                return_type: return_type.unwrap_or("void").to_string(),
                parameters: parameters.to_vec(),
                is_static,
                line,
            },
        );
    }

    fn check_variable(
        &mut self,
        declared_type: &str,
        name: &str,
        initial_value: Option<&str>,
        line: usize,
    ) {
        if self
            .table
            .lookup_variable(name)
            .is_some_and(|existing| !existing.is_loop_variable)
        {
            self.report(line, format!("Variable '{}' ya declarada", name));
            return;
        }

        let Some(ty) = DeclaredType::from_name(declared_type) else {
            self.report(line, format!("Tipo de dato '{}' no válido", declared_type));
            return;
        };

        if let Some(value) = initial_value {
            if let Err(message) = ty.validate(value) {
                self.report(line, message);
            }
        }

        // Registered even when the value was rejected
        self.table.insert_variable(
            name,
            VariableSymbol {
                var_type: declared_type.to_string(),
                initial_value: initial_value.map(str::to_string),
                line,
                is_loop_variable: false,
            },
        );
    }

    fn check_condition(&mut self, construct: &str, condition: &Condition, line: usize) {
        let tokens = &condition.segment.tokens;
        if tokens.is_empty() {
            self.report(line, format!("La condición del {} está vacía", construct));
            return;
        }

        let operators: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_comparison())
            .map(|(i, _)| i)
            .collect();

        let position = match operators.as_slice() {
            [] => {
                self.report(
                    line,
                    format!(
                        "La condición del {} no contiene un operador de comparación válido",
                        construct
                    ),
                );
                return;
            }
            [position] => *position,
            _ => {
                self.report(
                    line,
                    format!(
                        "La condición del {} contiene más de un operador de comparación",
                        construct
                    ),
                );
                return;
            }
        };

        let (left, right) = (&tokens[..position], &tokens[position + 1..]);
        if left.is_empty() || right.is_empty() {
            self.report(
                line,
                format!(
                    "La condición del {} debe tener exactamente dos operandos",
                    construct
                ),
            );
        }

        for side in [left, right] {
            if !side.is_empty() && !is_operand(side) {
                self.report(
                    line,
                    format!(
                        "Operando '{}' no válido en la condición del {}",
                        joined(side),
                        construct
                    ),
                );
            }
        }
    }

    fn check_for(&mut self, header: &ForHeader, line: usize) {
        let mut missing = false;
        for (segment_empty, part) in [
            (header.init.is_empty(), "inicialización"),
            (header.condition.segment.is_empty(), "condición"),
            (header.increment.is_empty(), "incremento"),
        ] {
            if segment_empty {
                self.report(line, format!("Falta la {} en la cabecera del for", part));
                missing = true;
            }
        }
        if missing {
            return;
        }

        let init = match header.init.tokens.as_slice() {
            [ty, name, assign, rest @ ..]
                if matches!(ty.kind, TokenKind::Keyword | TokenKind::Identifier)
                    && name.is_identifier()
                    && assign.is_operator("=")
                    && !rest.is_empty() =>
            {
                Some((ty.text.clone(), name.text.clone(), joined(rest)))
            }
            _ => None,
        };
        if init.is_none() {
            self.report(
                line,
                format!(
                    "Inicialización del for no válida: '{}'",
                    header.init.spaced()
                ),
            );
        }

        let condition_ok = match header.condition.segment.tokens.as_slice() {
            [name, op, rest @ ..] => {
                name.is_identifier() && op.is_comparison() && is_integer(rest)
            }
            _ => false,
        };
        if !condition_ok {
            self.report(
                line,
                format!(
                    "Condición del for no válida: '{}'",
                    header.condition.segment.spaced()
                ),
            );
        }

        let increment_ok = is_increment(&header.increment.tokens);
        if !increment_ok {
            self.report(
                line,
                format!(
                    "Incremento del for no válido: '{}'",
                    header.increment.spaced()
                ),
            );
        }

        let Some((var_type, name, initial_value)) = init else {
            return;
        };
        if !condition_ok || !increment_ok {
            return;
        }

        if self
            .table
            .lookup_variable(&name)
            .is_some_and(|existing| !existing.is_loop_variable)
        {
            self.report(line, format!("Variable '{}' ya declarada", name));
            return;
        }

        self.table.insert_variable(
            name,
            VariableSymbol {
                var_type,
                initial_value: Some(initial_value),
                line,
                is_loop_variable: true,
            },
        );
    }
}

fn joined(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// An identifier or a possibly negative integer literal.
fn is_operand(tokens: &[Token]) -> bool {
    match tokens {
        [token] => token.is_identifier() || token.kind == TokenKind::IntegerLiteral,
        _ => is_integer(tokens),
    }
}

fn is_integer(tokens: &[Token]) -> bool {
    match tokens {
        [token] => token.kind == TokenKind::IntegerLiteral,
        [sign, token] => sign.is_operator("-") && token.kind == TokenKind::IntegerLiteral,
        _ => false,
    }
}

/// `i++`, `i += n`, `i = i + n` and their decrement mirrors.
fn is_increment(tokens: &[Token]) -> bool {
    match tokens {
        [name, op] => {
            name.is_identifier() && (op.is_operator("++") || op.is_operator("--"))
        }
        [name, op, rest @ ..] if op.is_operator("+=") || op.is_operator("-=") => {
            name.is_identifier() && is_integer(rest)
        }
        [name, assign, source, op, rest @ ..] => {
            name.is_identifier()
                && assign.is_operator("=")
                && source.text == name.text
                && (op.is_operator("+") || op.is_operator("-"))
                && is_integer(rest)
        }
        _ => false,
    }
}

/// Convenience wrapper for `SemanticChecker::new().check(statements)`.
pub fn check(statements: &[Statement]) -> SemanticReport {
    SemanticChecker::new().check(statements)
}
