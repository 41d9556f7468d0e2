//! Beeflang CLI
//!
//! Main entry point for the `beeflang` command.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use beeflang::diagnostics::{Reporter, RunError, SourceFile};
use beeflang::interp::Interpreter;
use beeflang::lexer::Token;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "beeflang")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run a Beeflang program", long_about = None)]
struct Cli {
    /// Program to run
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Print the token stream instead of running
    #[arg(long)]
    dump_tokens: bool,

    /// Print the parsed AST as JSON instead of running
    #[arg(long)]
    dump_ast: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with program output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(err, cli.verbose);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), RunError> {
    let input = cli.input.as_path();
    tracing::info!("Running {:?}", input);

    let source = std::fs::read_to_string(input).map_err(|source| RunError::Io {
        path: input.display().to_string(),
        source,
    })?;

    // Lex
    let tokens = beeflang::lexer::lex(&source);
    if cli.dump_tokens {
        dump_tokens(input, &tokens);
        return Ok(());
    }

    // Parse
    let (program, errors) = beeflang::parser::parse(&tokens);
    if !errors.is_empty() {
        let mut reporter = Reporter::new(SourceFile::new(file_name(input), source));
        reporter.extend(errors);
        eprintln!("Parser errors:");
        for message in reporter.messages() {
            eprintln!("  {}", message);
        }
        if cli.verbose {
            reporter.emit_all();
        }
        return Err(RunError::Syntax {
            errors: reporter.errors().to_vec(),
        });
    }

    if cli.dump_ast {
        match serde_json::to_string_pretty(&program) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("Failed to serialize AST: {}", e),
        }
        return Ok(());
    }

    // Evaluate
    let mut interpreter = Interpreter::new().with_file(file_name(input));
    let result = interpreter.run(&program)?;
    tracing::debug!("Entry point served {}", result);
    Ok(())
}

/// Print a failure the way the user expects to see it on stderr
fn report(err: RunError, verbose: bool) {
    match err {
        // Already listed one per line while parsing
        RunError::Syntax { .. } => {}
        // Runtime errors carry their own `Error ...` prefix
        RunError::Runtime(e) => eprintln!("{}", e),
        err @ RunError::Io { .. } if verbose => eprintln!("{:?}", miette::Report::new(err)),
        RunError::Io { path, source } => eprintln!("Error: failed to read `{}`: {}", path, source),
        other => eprintln!("Error: {}", other),
    }
}

fn dump_tokens(input: &Path, tokens: &[Token]) {
    println!("Tokens for {}:", input.display());
    println!("---");
    for token in tokens {
        println!(
            "{:<15} {:<10} (line {}, col {})",
            token.kind.to_string(),
            token.literal,
            token.line,
            token.column
        );
    }
}

fn file_name(path: &Path) -> String {
    path.display().to_string()
}
