use serde::Serialize;

/// Limits applied while executing a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterpreterConfig {
    /// Iterations a single loop may run before it is reported as infinite.
    pub max_loop_iterations: usize,
    /// Loop statements a single run may start.
    pub max_loop_constructs: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_loop_iterations: 1000,
            max_loop_constructs: 1000,
        }
    }
}

impl InterpreterConfig {
    pub fn with_max_loop_iterations(mut self, limit: usize) -> Self {
        self.max_loop_iterations = limit;
        self
    }

    pub fn with_max_loop_constructs(mut self, limit: usize) -> Self {
        self.max_loop_constructs = limit;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    pub interpreter: InterpreterConfig,
}

impl PipelineConfig {
    pub fn with_interpreter(mut self, interpreter: InterpreterConfig) -> Self {
        self.interpreter = interpreter;
        self
    }
}
