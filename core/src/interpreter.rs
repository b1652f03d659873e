pub mod arithmetic;
pub mod scope;
pub mod value;

pub use scope::{StoredVariable, VariableStore};
pub use value::Value;

use std::fmt::Display;

use serde::Serialize;

use crate::ast::{
    BinaryOperator, Condition, Expr, ForHeader, Literal, Segment, Statement, UnaryOperator,
};
use crate::config::InterpreterConfig;
use crate::error::{Result, RuntimeError};
use crate::lexer::{Token, TokenKind, tokenize};
use crate::parser::{Parser, parse_expression_tokens};

type RunResult<T> = std::result::Result<T, RuntimeError>;

/// Types a `for` initializer may declare.
const LOOP_VARIABLE_TYPES: &[&str] = &["int", "double", "float", "long"];

/// Trace and simulated console of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionOutput {
    pub trace: String,
    pub console: String,
    pub failed: bool,
}

impl ExecutionOutput {
    /// Error-shaped result carrying the same message in both fields.
    pub fn failure(message: impl Display) -> Self {
        Self {
            trace: format!("Error: {}", message),
            console: format!("Error en tiempo de ejecución: {}", message),
            failed: true,
        }
    }

    pub fn trace_lines(&self) -> Vec<&str> {
        self.trace.lines().collect()
    }

    pub fn console_lines(&self) -> Vec<&str> {
        self.console.lines().collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Block {
    TopLevel,
    Then,
    Else,
    For,
    While,
}

impl Block {
    fn trace_suffix(self) -> &'static str {
        match self {
            Block::TopLevel => "",
            Block::Then => " dentro de if",
            Block::Else => " dentro de else",
            Block::For => " dentro de for",
            Block::While => " dentro de while",
        }
    }
}

/// A parsed `for` step: `name op amount`.
struct LoopStep<'a> {
    name: &'a str,
    operator: BinaryOperator,
    amount: i64,
    explicit: bool,
}

pub struct Interpreter {
    config: InterpreterConfig,
    variables: VariableStore,
    trace: String,
    console: String,
    loop_constructs: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Self {
            config,
            variables: VariableStore::new(),
            trace: String::new(),
            console: String::new(),
            loop_constructs: 0,
        }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Variables left after the most recent run.
    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// Lex, parse and run `source`.
    pub fn execute(&mut self, source: &str) -> Result<ExecutionOutput> {
        let statements = Parser::new(tokenize(source)).parse()?;
        Ok(self.run(&statements)?)
    }

    /// Like [`execute`](Self::execute), but failures become an error-shaped
    /// output instead of an `Err`.
    pub fn compile(&mut self, source: &str) -> ExecutionOutput {
        match self.execute(source) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, "Run failed");
                ExecutionOutput::failure(e)
            }
        }
    }

    /// Run an already parsed program, reporting failures in the output.
    pub fn compile_statements(&mut self, statements: &[Statement]) -> ExecutionOutput {
        match self.run(statements) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, "Run failed");
                ExecutionOutput::failure(e)
            }
        }
    }

    /// Run a program from a fresh state.
    pub fn run(&mut self, statements: &[Statement]) -> RunResult<ExecutionOutput> {
        let span = tracing::debug_span!("run", statements = statements.len());
        let _enter = span.enter();

        self.variables.clear();
        self.trace.clear();
        self.console.clear();
        self.loop_constructs = 0;

        for statement in statements {
            self.execute_statement(statement)?;
        }

        Ok(ExecutionOutput {
            trace: std::mem::take(&mut self.trace),
            console: std::mem::take(&mut self.console),
            failed: false,
        })
    }

    fn log(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        tracing::trace!(trace = %line);
        self.trace.push_str(line);
        self.trace.push('\n');
    }

    fn execute_statement(&mut self, statement: &Statement) -> RunResult<()> {
        match statement {
            Statement::ClassDeclaration { name, .. } => {
                if let Some(name) = name {
                    self.log(format!("Declarando clase: {}", name));
                }
            }
            Statement::MethodDeclaration { name, .. } => {
                if name.as_deref() == Some("main") {
                    self.log("Iniciando método main");
                }
            }
            Statement::VariableDeclaration {
                declared_type,
                name,
                initial_value,
                initializer,
                ..
            } => {
                if let Some(name) = name {
                    self.declare(
                        declared_type,
                        name,
                        initial_value.as_deref(),
                        initializer.as_ref(),
                    )?;
                }
            }
            Statement::Assignment { name, value, line } => self.assign(name, value, *line)?,
            Statement::Print {
                argument, newline, ..
            } => self.print(argument.as_ref(), *newline, Block::TopLevel)?,
            Statement::If {
                condition,
                then_branch,
                else_branch,
                has_else,
                ..
            } => {
                let result = self.evaluate_condition(condition)?;
                self.log(format!(
                    "Evaluando condición if: {} = {}",
                    condition.segment.spaced(),
                    result
                ));

                if result {
                    self.run_body(then_branch, Block::Then)?;
                } else if *has_else {
                    self.run_body(else_branch, Block::Else)?;
                }
            }
            Statement::For { header, body, line } => self.run_for(header, body, *line)?,
            Statement::While {
                condition,
                body,
                line,
            } => self.run_while(condition, body, *line)?,
        }

        Ok(())
    }

    /// Block bodies run their print statements only. `while` bodies also
    /// apply assignments so the loop can reach its exit.
    fn run_body(&mut self, body: &[Statement], block: Block) -> RunResult<()> {
        for statement in body {
            match statement {
                Statement::Print {
                    argument, newline, ..
                } => self.print(argument.as_ref(), *newline, block)?,
                Statement::Assignment { name, value, line } if matches!(block, Block::While) => {
                    self.assign(name, value, *line)?
                }
                other => {
                    tracing::debug!(
                        node = %other.label(),
                        line = other.line(),
                        "Skipping non-print statement in block"
                    )
                }
            }
        }
        Ok(())
    }

    fn declare(
        &mut self,
        declared_type: &str,
        name: &str,
        initial_value: Option<&str>,
        initializer: Option<&Expr>,
    ) -> RunResult<()> {
        let Some(default) = Value::default_for(declared_type) else {
            tracing::debug!(declared_type, name, "Skipping declaration without a value type");
            return Ok(());
        };

        let value = match (initializer, initial_value) {
            (Some(expr), _) => self.evaluate(expr)?,
            (None, Some(text)) => Value::Raw(text.to_string()),
            (None, None) => default,
        };

        self.log(format!(
            "Declarando variable {} de tipo {} con valor {}",
            name, declared_type, value
        ));
        self.variables.declare(name, declared_type, value);
        Ok(())
    }

    fn assign(&mut self, name: &str, value: &Expr, line: usize) -> RunResult<()> {
        if !self.variables.contains(name) {
            return Err(RuntimeError::UndeclaredVariable {
                name: name.to_string(),
                line,
            });
        }

        let value = self.evaluate(value)?;
        self.log(format!("Asignando valor {} a {}", value, name));
        self.variables.assign(name, value)
    }

    fn print(&mut self, argument: Option<&Expr>, newline: bool, block: Block) -> RunResult<()> {
        let content = match argument {
            Some(expr) => self.evaluate_print(expr)?,
            None => String::new(),
        };

        let method = if newline { "println" } else { "print" };
        self.log(format!(
            "Ejecutando System.out.{}(){}",
            method,
            block.trace_suffix()
        ));

        self.console.push_str(&content);
        if newline {
            self.console.push('\n');
        }
        Ok(())
    }

    fn evaluate_print(&self, expr: &Expr) -> RunResult<String> {
        match expr {
            Expr::Literal {
                value: Literal::String(text),
            } => return Ok(text.clone()),
            Expr::Identifier { name } => {
                if let Some(value) = self.variables.get(name) {
                    return Ok(value.to_string());
                }
            }
            _ => {}
        }

        // A top-level `+` chain always joins its parts, even numeric ones
        let parts = expr.concatenation_parts();
        if parts.len() > 1 {
            let mut content = String::new();
            for part in parts {
                let text = self.evaluate_part(part).map_err(|e| {
                    tracing::debug!(error = %e, part = %part, "Concatenation part failed");
                    RuntimeError::InvalidConcatenation {
                        part: part.to_string(),
                    }
                })?;
                content.push_str(&text);
            }
            return Ok(content);
        }

        Ok(self.evaluate(expr)?.to_string())
    }

    fn evaluate_part(&self, part: &Expr) -> RunResult<String> {
        match part {
            Expr::Literal {
                value: Literal::String(text),
            } => Ok(text.clone()),
            _ => Ok(self.evaluate(part)?.to_string()),
        }
    }

    fn evaluate(&self, expr: &Expr) -> RunResult<Value> {
        match expr {
            Expr::Literal { value } => Ok(match value {
                Literal::Integer(n) => Value::Int(*n),
                Literal::Decimal(d) => Value::Double(*d),
                Literal::String(s) => Value::Str(s.clone()),
                Literal::Char(c) => Value::Char(*c),
                Literal::Boolean(b) => Value::Bool(*b),
                Literal::Null => Value::Null,
            }),
            Expr::Identifier { name } => {
                self.variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UnknownVariable { name: name.clone() })
            }
            Expr::Grouping { inner } => self.evaluate(inner),
            Expr::Unary {
                operator: UnaryOperator::Negate,
                operand,
            } => arithmetic::negate(&self.evaluate(operand)?, &expr.to_string()),
            Expr::Unary {
                operator: UnaryOperator::Not,
                operand,
            } => match self.evaluate(operand)? {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                _ => Err(RuntimeError::InvalidArithmetic {
                    expression: expr.to_string(),
                }),
            },
            Expr::BinaryOp {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;

                if operator.is_comparison() {
                    let result = match (&left, &right, operator) {
                        (Value::Str(a), Value::Str(b), BinaryOperator::EqualEqual) => a == b,
                        (Value::Str(a), Value::Str(b), BinaryOperator::NotEqual) => a != b,
                        _ => compare(left.coerce_int(), *operator, right.coerce_int()),
                    };
                    return Ok(Value::Bool(result));
                }

                if *operator == BinaryOperator::Add && (left.is_text() || right.is_text()) {
                    return Ok(Value::Str(format!("{}{}", left, right)));
                }

                arithmetic::apply(&left, *operator, &right, &expr.to_string())
            }
        }
    }

    /// Compare both sides of the condition as integers. Anything other than a
    /// single comparison is false.
    fn evaluate_condition(&self, condition: &Condition) -> RunResult<bool> {
        let Some(expr) = &condition.expr else {
            tracing::debug!(condition = %condition.text(), "Condition is not an expression");
            return Ok(false);
        };

        match expr.ungrouped() {
            Expr::BinaryOp {
                left,
                operator,
                right,
            } if operator.is_comparison() => {
                let left = self.condition_operand(left)?;
                let right = self.condition_operand(right)?;
                Ok(compare(left, *operator, right))
            }
            _ => Ok(false),
        }
    }

    fn condition_operand(&self, expr: &Expr) -> RunResult<i64> {
        if let Expr::Identifier { name } = expr.ungrouped() {
            // Unknown names compare as 0
            return Ok(self.variables.get(name).map(Value::coerce_int).unwrap_or(0));
        }
        Ok(self.evaluate(expr)?.coerce_int())
    }

    fn enter_loop_construct(&mut self) -> RunResult<()> {
        self.loop_constructs += 1;
        if self.loop_constructs > self.config.max_loop_constructs {
            return Err(RuntimeError::TooManyLoops);
        }
        Ok(())
    }

    fn run_for(&mut self, header: &ForHeader, body: &[Statement], line: usize) -> RunResult<()> {
        let span = tracing::debug_span!("for_loop", line);
        let _enter = span.enter();

        self.enter_loop_construct()?;
        self.initialize_loop(&header.init, line)?;

        if !is_simple_comparison(&header.condition) {
            return Err(RuntimeError::InvalidLoopCondition {
                condition: header.condition.segment.spaced(),
                line,
            });
        }

        let mut iterations = 0;
        while self.evaluate_condition(&header.condition)? {
            iterations += 1;
            if iterations > self.config.max_loop_iterations {
                return Err(RuntimeError::InfiniteLoop {
                    construct: "for",
                    line,
                });
            }

            self.run_body(body, Block::For)?;
            self.step_loop(&header.increment)?;
        }

        tracing::debug!(iterations, "Loop finished");
        self.variables.purge_loop_variables();
        Ok(())
    }

    fn initialize_loop(&mut self, init: &Segment, line: usize) -> RunResult<()> {
        match init.tokens.as_slice() {
            [] => Ok(()),
            [var_type, name, assign, rest @ ..]
                if LOOP_VARIABLE_TYPES.contains(&var_type.text.as_str())
                    && name.is_identifier()
                    && assign.is_operator("=") =>
            {
                let value = self.loop_start(rest, line)?;
                self.log(format!(
                    "Inicializando variable de for {} = {}",
                    name.text, value
                ));
                self.variables
                    .declare_loop_variable(&name.text, &var_type.text, value);
                Ok(())
            }
            [name, assign, rest @ ..] if name.is_identifier() && assign.is_operator("=") => {
                if !self.variables.contains(&name.text) {
                    return Err(RuntimeError::UndeclaredVariable {
                        name: name.text.clone(),
                        line,
                    });
                }
                let value = self.loop_start(rest, line)?;
                self.log(format!("Asignando valor {} a {}", value, name.text));
                self.variables.assign(&name.text, value)
            }
            _ => {
                tracing::debug!(init = %init.spaced(), "Unsupported for initialization");
                Ok(())
            }
        }
    }

    fn loop_start(&self, tokens: &[Token], line: usize) -> RunResult<Value> {
        let expr = parse_expression_tokens(tokens)
            .filter(Expr::is_arithmetic)
            .ok_or(RuntimeError::NonNumericLoopStart { line })?;

        let value = arithmetic::evaluate(&expr, &|name: &str| self.variables.get(name).cloned())?;
        if !value.is_numeric() {
            return Err(RuntimeError::NonNumericLoopStart { line });
        }
        Ok(value)
    }

    fn step_loop(&mut self, increment: &Segment) -> RunResult<()> {
        let Some(step) = parse_step(&increment.tokens) else {
            tracing::debug!(increment = %increment.spaced(), "Unsupported for increment");
            return Ok(());
        };
        let Some(current) = self.variables.get(step.name).cloned() else {
            return Ok(());
        };

        let value = arithmetic::apply(
            &current,
            step.operator,
            &Value::Int(step.amount),
            &increment.spaced(),
        )?;

        let verb = match step.operator {
            BinaryOperator::Subtract => "Decrementando",
            _ => "Incrementando",
        };
        if step.explicit {
            self.log(format!(
                "{} {} en {} a {}",
                verb, step.name, step.amount, value
            ));
        } else {
            self.log(format!("{} {} a {}", verb, step.name, value));
        }

        self.variables.assign(step.name, value)
    }

    fn run_while(
        &mut self,
        condition: &Condition,
        body: &[Statement],
        line: usize,
    ) -> RunResult<()> {
        let span = tracing::debug_span!("while_loop", line);
        let _enter = span.enter();

        self.enter_loop_construct()?;
        self.log(format!(
            "Evaluando bucle while: {}",
            condition.segment.spaced()
        ));

        let mut iterations = 0;
        while self.evaluate_condition(condition)? {
            iterations += 1;
            if iterations > self.config.max_loop_iterations {
                return Err(RuntimeError::InfiniteLoop {
                    construct: "while",
                    line,
                });
            }
            self.run_body(body, Block::While)?;
        }

        Ok(())
    }
}

fn compare(left: i64, operator: BinaryOperator, right: i64) -> bool {
    match operator {
        BinaryOperator::EqualEqual => left == right,
        BinaryOperator::NotEqual => left != right,
        BinaryOperator::Less => left < right,
        BinaryOperator::LessEq => left <= right,
        BinaryOperator::Greater => left > right,
        BinaryOperator::GreaterEq => left >= right,
        _ => false,
    }
}

/// A comparison between two names or integer literals.
fn is_simple_comparison(condition: &Condition) -> bool {
    fn is_operand(expr: &Expr) -> bool {
        match expr {
            Expr::Identifier { .. }
            | Expr::Literal {
                value: Literal::Integer(_),
            } => true,
            Expr::Unary {
                operator: UnaryOperator::Negate,
                operand,
            } => matches!(
                operand.as_ref(),
                Expr::Literal {
                    value: Literal::Integer(_)
                }
            ),
            _ => false,
        }
    }

    match condition.expr.as_ref().map(Expr::ungrouped) {
        Some(Expr::BinaryOp {
            left,
            operator,
            right,
        }) => operator.is_comparison() && is_operand(left) && is_operand(right),
        _ => false,
    }
}

fn parse_step(tokens: &[Token]) -> Option<LoopStep<'_>> {
    fn amount(tokens: &[Token]) -> Option<i64> {
        match tokens {
            [token] if token.kind == TokenKind::IntegerLiteral => token.text.parse().ok(),
            _ => None,
        }
    }

    let additive = |op: &Token| {
        if op.is_operator("+") || op.is_operator("+=") {
            Some(BinaryOperator::Add)
        } else if op.is_operator("-") || op.is_operator("-=") {
            Some(BinaryOperator::Subtract)
        } else {
            None
        }
    };

    match tokens {
        [name, op] if name.is_identifier() && (op.is_operator("++") || op.is_operator("--")) => {
            Some(LoopStep {
                name: &name.text,
                operator: if op.is_operator("++") {
                    BinaryOperator::Add
                } else {
                    BinaryOperator::Subtract
                },
                amount: 1,
                explicit: false,
            })
        }
        [name, op, rest @ ..]
            if name.is_identifier() && (op.is_operator("+=") || op.is_operator("-=")) =>
        {
            Some(LoopStep {
                name: &name.text,
                operator: additive(op)?,
                amount: amount(rest)?,
                explicit: true,
            })
        }
        [name, assign, source, op, rest @ ..]
            if name.is_identifier() && assign.is_operator("=") && source.text == name.text =>
        {
            Some(LoopStep {
                name: &name.text,
                operator: additive(op)?,
                amount: amount(rest)?,
                explicit: true,
            })
        }
        _ => None,
    }
}
