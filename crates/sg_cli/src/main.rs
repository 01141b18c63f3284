use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sg_ast::{target, SyntaxFlags};
use sg_codegen::{emit_program, Config};
use sg_desugar::desugar_program;
use sg_parser::parse_program_in;
use swc_common::{sync::Lrc, SourceMap, Span};

#[derive(Parser)]
#[command(name = "sgc", about = "sugarc: C with tagged enums, patterns, range loops and defer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, lower, and emit plain C.
    Desugar {
        /// Input source file.
        input: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Spaces per indentation level in the output.
        #[arg(long, default_value_t = 4)]
        indent: usize,
        #[command(flatten)]
        syntax: SyntaxArgs,
        #[arg(long, value_enum, default_value_t = ErrorFormat::Human)]
        error_format: ErrorFormat,
    },
    /// Parse and lower the file, reporting the first error.
    Check {
        input: PathBuf,
        #[command(flatten)]
        syntax: SyntaxArgs,
        #[arg(long, value_enum, default_value_t = ErrorFormat::Human)]
        error_format: ErrorFormat,
    },
    /// Parse and dump the syntax tree.
    Parse {
        input: PathBuf,
        /// Print JSON instead of the debug representation.
        #[arg(long)]
        ast: bool,
        #[command(flatten)]
        syntax: SyntaxArgs,
    },
}

/// Switches for the individual language extensions.
#[derive(Args)]
struct SyntaxArgs {
    /// Disable tagged enums and `T::V(x)` constructors.
    #[arg(long)]
    no_adt: bool,
    /// Disable `if let` and `match`.
    #[arg(long)]
    no_match: bool,
    /// Disable `for i in A to B`.
    #[arg(long)]
    no_range_for: bool,
    /// Disable `defer`.
    #[arg(long)]
    no_defer: bool,
}

impl SyntaxArgs {
    fn flags(&self) -> SyntaxFlags {
        SyntaxFlags {
            adt: !self.no_adt,
            patterns: !self.no_match,
            range_for: !self.no_range_for,
            defer: !self.no_defer,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ErrorFormat {
    Human,
    Json,
}

/// A parse or lowering failure resolved to a source position.
#[derive(Debug, Serialize)]
struct Diagnostic {
    file: String,
    line: Option<usize>,
    column: Option<usize>,
    kind: String,
    message: String,
}

impl Diagnostic {
    fn new(cm: &SourceMap, file: &str, span: Span, kind: &str, message: String) -> Self {
        let (line, column) = if span.is_dummy() {
            (None, None)
        } else {
            let loc = cm.lookup_char_pos(span.lo);
            (Some(loc.line), Some(loc.col.0 + 1))
        };
        Self {
            file: file.to_string(),
            line,
            column,
            kind: kind.to_string(),
            message,
        }
    }

    fn report(&self, format: ErrorFormat) -> Result<()> {
        match format {
            ErrorFormat::Human => match (self.line, self.column) {
                (Some(line), Some(col)) => eprintln!(
                    "{}:{line}:{col}: error[{}]: {}",
                    self.file, self.kind, self.message
                ),
                _ => eprintln!("{}: error[{}]: {}", self.file, self.kind, self.message),
            },
            ErrorFormat::Json => eprintln!("{}", serde_json::to_string(self)?),
        }
        Ok(())
    }
}

static TRACING_INIT: Once = Once::new();

/// Log to stderr when `RUST_LOG` is set, e.g. `RUST_LOG=sg_desugar=debug`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// Parse and lower `input`. On failure the diagnostic has already been
/// printed and `None` is returned.
fn lower_file(
    input: &Path,
    syntax: &SyntaxFlags,
    format: ErrorFormat,
) -> Result<Option<target::Program>> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let filename = input.display().to_string();
    let cm: Lrc<SourceMap> = Default::default();

    let program = match parse_program_in(&cm, &source, &filename, syntax) {
        Ok(program) => program,
        Err(err) => {
            Diagnostic::new(&cm, &filename, err.span, "SyntaxError", err.message).report(format)?;
            return Ok(None);
        }
    };
    match desugar_program(program) {
        Ok(lowered) => Ok(Some(lowered)),
        Err(err) => {
            tracing::debug!(kind = err.kind.as_str(), "lowering failed");
            Diagnostic::new(&cm, &filename, err.span, err.kind.as_str(), err.message)
                .report(format)?;
            Ok(None)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Desugar {
            input,
            output,
            indent,
            syntax,
            error_format,
        } => {
            let Some(program) = lower_file(&input, &syntax.flags(), error_format)? else {
                return Ok(ExitCode::FAILURE);
            };
            let code = emit_program(&program, &Config::default().with_indent(indent));
            match &output {
                Some(path) => std::fs::write(path, &code)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{code}"),
            }
        }
        Commands::Check {
            input,
            syntax,
            error_format,
        } => {
            if lower_file(&input, &syntax.flags(), error_format)?.is_none() {
                return Ok(ExitCode::FAILURE);
            }
            eprintln!("OK: {}", input.display());
        }
        Commands::Parse { input, ast, syntax } => {
            let source = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let filename = input.display().to_string();
            let cm: Lrc<SourceMap> = Default::default();
            let program = match parse_program_in(&cm, &source, &filename, &syntax.flags()) {
                Ok(program) => program,
                Err(err) => {
                    Diagnostic::new(&cm, &filename, err.span, "SyntaxError", err.message)
                        .report(ErrorFormat::Human)?;
                    return Ok(ExitCode::FAILURE);
                }
            };

            if ast {
                let json = serde_json::to_string_pretty(&program)?;
                println!("{json}");
            } else {
                println!("{program:#?}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    init_tracing();
    run(Cli::parse())
}
