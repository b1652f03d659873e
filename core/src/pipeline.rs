use serde::Serialize;

use crate::ast::Statement;
use crate::config::PipelineConfig;
use crate::error::SyntaxError;
use crate::interpreter::{ExecutionOutput, Interpreter};
use crate::lexer::{Lexer, RejectedLexeme, Token};
use crate::parser::Parser;
use crate::types::{SemanticChecker, SemanticReport};

/// Everything the four stages produce for one source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompilationReport {
    pub tokens: Vec<Token>,
    pub rejected: Vec<RejectedLexeme>,
    pub syntax_tree: Vec<Statement>,
    pub syntax_error: Option<SyntaxError>,
    pub semantic: SemanticReport,
    pub execution: ExecutionOutput,
}

impl CompilationReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// True when no stage reported a problem.
    pub fn is_success(&self) -> bool {
        self.syntax_error.is_none() && self.semantic.is_clean() && !self.execution.failed
    }
}

/// Run the whole pipeline with default limits.
pub fn compile(source: &str) -> CompilationReport {
    compile_with(source, &PipelineConfig::default())
}

pub fn compile_with(source: &str, config: &PipelineConfig) -> CompilationReport {
    let span = tracing::debug_span!("compile", bytes = source.len());
    let _enter = span.enter();

    let stream = Lexer::new(source).tokenize_with_rejects();

    let (syntax_tree, syntax_error) = match Parser::new(stream.tokens.clone()).parse() {
        Ok(statements) => (statements, None),
        Err(e) => {
            tracing::debug!(error = %e, "Syntax tree discarded");
            (Vec::new(), Some(e))
        }
    };

    let semantic = SemanticChecker::new().check(&syntax_tree);

    let execution = match &syntax_error {
        Some(e) => ExecutionOutput::failure(e),
        None => Interpreter::with_config(config.interpreter).compile_statements(&syntax_tree),
    };

    CompilationReport {
        tokens: stream.tokens,
        rejected: stream.rejected,
        syntax_tree,
        syntax_error,
        semantic,
        execution,
    }
}
