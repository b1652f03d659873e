use crate::error::ReplError;
use crate::report;
use minijava_core::compile_with;
use minijava_core::config::PipelineConfig;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use std::collections::HashMap;

type CommandFn = fn(&mut Repl, &[&str]) -> anyhow::Result<()>;

/// Commands that also work without the leading ':'.
const BARE_COMMANDS: [&str; 5] = ["help", "history", "exit", "quit", "clear"];

pub struct Repl {
    config: PipelineConfig,
    pub commands: HashMap<String, CommandFn>,
    pub history: Vec<String>,
    pub input_buffer: String,
    open_braces: i64,
    variables: HashMap<String, String>,
    line_number: usize,
    exiting: bool,
}

impl Repl {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        let mut commands = HashMap::new();
        commands.insert("help".to_string(), Self::cmd_help as CommandFn);
        commands.insert("exit".to_string(), Self::cmd_exit as CommandFn);
        commands.insert("quit".to_string(), Self::cmd_exit as CommandFn);
        commands.insert("history".to_string(), Self::show_history as CommandFn);
        commands.insert("clear".to_string(), Self::cmd_clear as CommandFn);
        commands.insert("set".to_string(), Self::cmd_set as CommandFn);
        commands.insert("debug".to_string(), Self::cmd_debug as CommandFn);
        commands.insert("json".to_string(), Self::cmd_json as CommandFn);
        commands.insert("report".to_string(), Self::cmd_report as CommandFn);

        let mut variables = HashMap::new();
        variables.insert("debug".to_string(), "false".to_string());
        variables.insert("json".to_string(), "false".to_string());
        variables.insert("report".to_string(), "false".to_string());

        Self {
            config,
            commands,
            history: Vec::new(),
            input_buffer: String::new(),
            open_braces: 0,
            variables,
            line_number: 1,
            exiting: false,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let span = tracing::debug_span!("repl run");
        let _enter = span.enter();
        let mut editor = Reedline::create();

        println!("MiniJava REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Escribe ':help' para ver los comandos, ':exit' para salir.");

        loop {
            let prompt = self.make_prompt();
            let line = match editor.read_line(&prompt) {
                Ok(Signal::Success(input)) => input,
                Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => break,
                Err(e) => {
                    println!("Error de entrada: {e}");
                    continue;
                }
            };

            let trimmed = line.trim();
            if self.input_buffer.is_empty() && self.is_command(trimmed) {
                if let Err(e) = self.dispatch(trimmed) {
                    println!("\x1B[31mError: {e}\x1B[0m");
                }
                if self.exiting {
                    break;
                }
                continue;
            }

            if let Some(chunk) = self.feed_line(&line) {
                self.evaluate_and_print(&chunk);
                self.history.push(chunk);
                self.line_number += 1;
            }
        }

        println!("¡Hasta luego!");
        Ok(())
    }

    fn make_prompt(&self) -> DefaultPrompt {
        let text = if self.open_braces > 0 {
            format!("...{} ", "  ".repeat(self.open_braces as usize))
        } else {
            format!("minijava[{}]> ", self.line_number)
        };
        DefaultPrompt::new(DefaultPromptSegment::Basic(text), DefaultPromptSegment::Empty)
    }

    fn is_command(&self, input: &str) -> bool {
        input.starts_with(':') || BARE_COMMANDS.contains(&input)
    }

    /// Run a `:command arg...` line.
    pub fn dispatch(&mut self, input: &str) -> anyhow::Result<()> {
        let mut parts = input.trim_start_matches(':').split_whitespace();
        let Some(cmd) = parts.next() else {
            return Ok(());
        };
        let args: Vec<&str> = parts.collect();
        match self.commands.get(cmd) {
            Some(handler) => handler(self, &args),
            None => anyhow::bail!("Comando desconocido: {cmd}"),
        }
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Buffer one input line. Returns the accumulated chunk once every
    /// opened brace has been closed.
    pub fn feed_line(&mut self, line: &str) -> Option<String> {
        if self.input_buffer.is_empty() && line.trim().is_empty() {
            return None;
        }

        self.input_buffer.push_str(line);
        self.input_buffer.push('\n');
        self.open_braces += brace_delta(line);

        if self.open_braces > 0 {
            return None;
        }
        self.open_braces = 0;
        Some(std::mem::take(&mut self.input_buffer))
    }

    fn evaluate_and_print(&self, code: &str) {
        if self.get_var("debug") == "true" {
            println!("DEBUG: Evaluando:\n{}", code);
        }
        match self.evaluate(code) {
            Ok(out) => print!("{out}"),
            Err(e) => println!("\x1B[31m{e}\x1B[0m"),
        }
    }

    /// Compile a chunk and render it according to the session settings.
    pub fn evaluate(&self, code: &str) -> crate::Result<String> {
        let result = compile_with(code, &self.config);

        if self.get_var("json") == "true" {
            return report::render(&result, true);
        }
        if self.get_var("report") == "true" {
            return report::render(&result, false);
        }

        let mut out = String::new();
        if let Some(error) = &result.syntax_error {
            out.push_str(&format!("{}\n", error));
        }
        for message in result.semantic.messages() {
            out.push_str(&format!("{}\n", message));
        }
        out.push_str(&result.execution.console);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }

    pub fn set_setting(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let invalid = || ReplError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "max_iterations" => {
                let limit = value.parse::<usize>().map_err(|_| invalid())?;
                self.config.interpreter = self.config.interpreter.with_max_loop_iterations(limit);
            }
            "max_loops" => {
                let limit = value.parse::<usize>().map_err(|_| invalid())?;
                self.config.interpreter = self.config.interpreter.with_max_loop_constructs(limit);
            }
            "debug" | "json" | "report" => {
                let flag = parse_flag(value).ok_or_else(invalid)?;
                self.variables.insert(key.to_string(), flag.to_string());
            }
            _ => return Err(ReplError::UnknownSetting(key.to_string())),
        }
        tracing::debug!(key, value, "Setting updated");
        Ok(())
    }

    pub fn get_var(&self, key: &str) -> &str {
        self.variables.get(key).map(String::as_str).unwrap_or("")
    }

    fn cmd_help(&mut self, _args: &[&str]) -> anyhow::Result<()> {
        let mut names: Vec<&String> = self.commands.keys().collect();
        names.sort();
        println!("Comandos disponibles:");
        for name in names {
            println!("  :{name}");
        }
        println!("  :set clave=valor   (max_iterations, max_loops, debug, json, report)");
        println!("El código se evalúa cuando todas las llaves abiertas se han cerrado.");
        Ok(())
    }

    fn cmd_exit(&mut self, _args: &[&str]) -> anyhow::Result<()> {
        self.exiting = true;
        Ok(())
    }

    fn cmd_clear(&mut self, _args: &[&str]) -> anyhow::Result<()> {
        print!("\x1B[2J\x1B[1;1H");
        Ok(())
    }

    fn show_history(&mut self, _args: &[&str]) -> anyhow::Result<()> {
        if self.history.is_empty() {
            println!("Sin historial.");
        }
        for (i, chunk) in self.history.iter().enumerate() {
            println!("{}: {}", i + 1, chunk.trim_end());
        }
        Ok(())
    }

    fn cmd_set(&mut self, args: &[&str]) -> anyhow::Result<()> {
        let joined = args.join("");
        let Some((key, value)) = joined.split_once('=') else {
            anyhow::bail!("Uso: :set clave=valor");
        };
        self.set_setting(key.trim(), value.trim())?;
        println!("{} = {}", key.trim(), value.trim());
        Ok(())
    }

    fn cmd_debug(&mut self, args: &[&str]) -> anyhow::Result<()> {
        self.toggle("debug", args)
    }

    fn cmd_json(&mut self, args: &[&str]) -> anyhow::Result<()> {
        self.toggle("json", args)
    }

    fn cmd_report(&mut self, args: &[&str]) -> anyhow::Result<()> {
        self.toggle("report", args)
    }

    fn toggle(&mut self, key: &str, args: &[&str]) -> anyhow::Result<()> {
        match args.first() {
            Some(value) => self.set_setting(key, value)?,
            None => println!("{} = {}", key, self.get_var(key)),
        }
        Ok(())
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Net braces opened by a line, ignoring braces inside quotes.
pub fn brace_delta(line: &str) -> i64 {
    let mut delta = 0;
    let mut quote: Option<char> = None;
    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '{' => delta += 1,
                '}' => delta -= 1,
                _ => {}
            },
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_delta_skips_literals() {
        assert_eq!(brace_delta("if (x > 1) {"), 1);
        assert_eq!(brace_delta("print(\"{{\");"), 0);
        assert_eq!(brace_delta("char c = '}'; }"), -1);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("on"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("tal vez"), None);
    }
}
