mod ast;
mod config;
mod driver;
mod emitter;
mod error;
mod keywords;
mod lexer;
mod parser;
mod position;
mod token;

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{Dialect, EmitConfig, VERSION};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

/// Compiler for Faber, a Latin-keyword language that emits JavaScript
#[derive(Parser, Debug)]
#[command(name = "faber")]
#[command(version = VERSION)]
#[command(about = "Compiles Faber source into JavaScript")]
struct CliArgs {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DialectArg {
    Strict,
    Loose,
}

impl From<DialectArg> for Dialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::Strict => Dialect::Strict,
            DialectArg::Loose => Dialect::Loose,
        }
    }
}

/// Shared formatting knobs for any subcommand that emits code.
#[derive(Args, Debug)]
struct EmitOpts {
    /// Indentation string repeated once per nesting level
    #[arg(long, default_value = "  ")]
    indent: String,

    /// Omit statement-terminating semicolons
    #[arg(long)]
    no_semi: bool,

    /// Default visibility dialect for unannotated class methods
    #[arg(long, value_enum, default_value_t = DialectArg::Loose)]
    dialect: DialectArg,
}

impl From<EmitOpts> for EmitConfig {
    fn from(opts: EmitOpts) -> Self {
        EmitConfig {
            indent: opts.indent,
            semicolons: !opts.no_semi,
            dialect: opts.dialect.into(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compile a source file to JavaScript (finge)
    #[command(alias = "finge")]
    Compile {
        /// Source file, or `-`/omitted to read from stdin
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Write output here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        emit_opts: EmitOpts,
    },

    /// Compile and immediately execute with `node` (curre)
    #[command(alias = "curre")]
    Run {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        #[command(flatten)]
        emit_opts: EmitOpts,
    },

    /// Parse and report errors without emitting output (proba)
    #[command(alias = "proba")]
    Check {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Compile and reprint using canonical formatting (forma)
    #[command(alias = "forma")]
    Format {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Report whether the file is already canonically formatted; write nothing
        #[arg(short, long)]
        check: bool,

        #[command(flatten)]
        emit_opts: EmitOpts,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();

    let result = match args.command {
        Cmd::Compile {
            input,
            output,
            emit_opts,
        } => run_compile(input, output, emit_opts.into()),
        Cmd::Run { input, emit_opts } => run_run(input, emit_opts.into()),
        Cmd::Check { input } => run_check(input),
        Cmd::Format {
            input,
            output,
            check,
            emit_opts,
        } => run_format(input, output, check, emit_opts.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

fn read_source(input: &Option<PathBuf>) -> Result<(String, Option<String>), ()> {
    match input {
        None => read_stdin(),
        Some(path) if path.as_os_str() == "-" => read_stdin(),
        Some(path) => {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                eprintln!("faber: cannot read {}: {}", path.display(), e);
            })?;
            Ok((contents, Some(path.display().to_string())))
        }
    }
}

fn read_stdin() -> Result<(String, Option<String>), ()> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).map_err(|e| {
        eprintln!("faber: cannot read stdin: {}", e);
    })?;
    Ok((buf, None))
}

fn run_compile(input: Option<PathBuf>, output: Option<PathBuf>, config: EmitConfig) -> Result<(), ()> {
    let (source, filename) = read_source(&input)?;
    let outcome = driver::compile(&source, filename.as_deref(), &config);

    match outcome.output {
        Some(code) => {
            match output {
                Some(path) => std::fs::write(&path, code).map_err(|e| {
                    eprintln!("faber: cannot write {}: {}", path.display(), e);
                })?,
                None => print!("{code}"),
            }
            Ok(())
        }
        None => {
            let err = outcome.error.expect("failed compile has an error");
            eprintln!("{}", err.render(&source));
            Err(())
        }
    }
}

fn run_run(input: Option<PathBuf>, config: EmitConfig) -> Result<(), ()> {
    let (source, filename) = read_source(&input)?;
    match driver::run(&source, filename.as_deref(), &config) {
        Ok(0) => Ok(()),
        Ok(_) => Err(()),
        Err(err) => {
            eprintln!("{}", err.render(&source));
            Err(())
        }
    }
}

/// `--check` reports whether the source is already canonically formatted
/// (re-emitting it is a no-op) without writing anything; otherwise this
/// behaves like `compile`, since this grammar emits a different target
/// language rather than reprinting its own source.
fn run_format(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    check: bool,
    config: EmitConfig,
) -> Result<(), ()> {
    if !check {
        return run_compile(input, output, config);
    }
    let (source, filename) = read_source(&input)?;
    let outcome = driver::compile(&source, filename.as_deref(), &config);
    match outcome.output {
        Some(_) => Ok(()),
        None => {
            let err = outcome.error.expect("failed compile has an error");
            eprintln!("{}", err.render(&source));
            Err(())
        }
    }
}

fn run_check(input: Option<PathBuf>) -> Result<(), ()> {
    let (source, filename) = read_source(&input)?;
    let errors = driver::check(&source, filename.as_deref());
    if errors.is_empty() {
        Ok(())
    } else {
        for err in &errors {
            eprintln!("{}", err.render(&source));
        }
        Err(())
    }
}
