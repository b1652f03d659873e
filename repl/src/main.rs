use clap::Parser as ClapParser;
use minijava_core::compile_with;
use minijava_repl::{report, run_file, Cli, Repl};

fn main() -> anyhow::Result<()> {
    // Program console output goes to stdout, logs to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = cli.pipeline_config();

    let result = if let Some(path) = &cli.file {
        run_file(path, &config)?
    } else if let Some(code) = &cli.eval {
        compile_with(code, &config)
    } else {
        let mut repl = Repl::with_config(config);
        if cli.json {
            repl.set_setting("json", "on")?;
        }
        return repl.run();
    };

    print!("{}", report::render(&result, cli.json)?);

    if result.syntax_error.is_some() || result.execution.failed {
        std::process::exit(1);
    }
    Ok(())
}
