pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod types;

pub use config::{InterpreterConfig, PipelineConfig};
pub use error::{MiniJavaError, Result, RuntimeError, SyntaxError};
pub use pipeline::{CompilationReport, compile, compile_with};
