use serde::Serialize;
use thiserror::Error;

/// A structural expectation of the syntax-tree builder was violated.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Error de sintaxis en línea {line}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// Evaluation failures that abort a run of the interpreter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Variable {name} no declarada en línea {line}")]
    UndeclaredVariable { name: String, line: usize },

    #[error("Variable {name} no encontrada")]
    UnknownVariable { name: String },

    #[error("Error al evaluar la expresión aritmética: {expression}")]
    InvalidArithmetic { expression: String },

    #[error("División por cero en la expresión: {expression}")]
    DivisionByZero { expression: String },

    #[error("Error al evaluar la expresión: {part}")]
    InvalidConcatenation { part: String },

    #[error("El valor inicial del for debe ser numérico (línea {line})")]
    NonNumericLoopStart { line: usize },

    #[error("Condición de for inválida: {condition} (línea {line})")]
    InvalidLoopCondition { condition: String, line: usize },

    #[error("Bucle {construct} infinito detectado en línea {line}")]
    InfiniteLoop { construct: &'static str, line: usize },

    #[error("Demasiadas iteraciones del bucle for")]
    TooManyLoops,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MiniJavaError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub type Result<T> = std::result::Result<T, MiniJavaError>;
