use clap::Parser as ClapParser;
use minijava_core::config::{InterpreterConfig, PipelineConfig};
use std::path::PathBuf;

/// Command line arguments for the `minijava` executable.
#[derive(ClapParser, Debug)]
#[command(name = "minijava", version, about = "Analizador e intérprete de un subconjunto de Java")]
pub struct Cli {
    /// Source file to compile and run
    pub file: Option<PathBuf>,

    /// Compile and run inline source instead of a file
    #[arg(short, long, value_name = "CODE", conflicts_with = "file")]
    pub eval: Option<String>,

    /// Print the whole result as JSON
    #[arg(long)]
    pub json: bool,

    /// Iterations a loop may run before it is reported as infinite
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Loop statements a single run may start
    #[arg(long, value_name = "N")]
    pub max_loops: Option<usize>,
}

impl Cli {
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut interpreter = InterpreterConfig::default();
        if let Some(limit) = self.max_iterations {
            interpreter = interpreter.with_max_loop_iterations(limit);
        }
        if let Some(limit) = self.max_loops {
            interpreter = interpreter.with_max_loop_constructs(limit);
        }
        PipelineConfig::default().with_interpreter(interpreter)
    }

    /// True when neither a file nor inline code was given.
    pub fn is_interactive(&self) -> bool {
        self.file.is_none() && self.eval.is_none()
    }
}
