// ABOUTME: Pipeline stages (lex/prepare/parse/emit) and the top-level compile entry point

use crate::ast::Module;
use crate::config::EmitConfig;
use crate::emitter;
use crate::error::CompileError;
use crate::lexer;
use crate::parser;
use crate::token::Token;
use log::debug;
use std::io::Write as _;
use std::process::Command;

/// Tokenize source text. The first stage of the pipeline.
pub fn lex(source: &str, filename: Option<&str>) -> Result<Vec<Token>, CompileError> {
    debug!("lexing {} bytes", source.len());
    lexer::lex(source, filename)
}

/// Drop comments and newlines, leaving the stream the parser walks.
pub fn prepare(tokens: Vec<Token>) -> Vec<Token> {
    lexer::prepare(tokens)
}

/// Build the AST from a prepared token stream.
pub fn parse(tokens: Vec<Token>, filename: Option<&str>) -> Result<Module, CompileError> {
    debug!("parsing {} tokens", tokens.len());
    parser::parse(tokens, filename)
}

/// Render an AST to target source text. Infallible: a well-formed `Module`
/// always has an emission for every statement and expression shape.
pub fn emit(module: &Module, config: &EmitConfig) -> String {
    let out = emitter::emit(module, config);
    debug!("emitted {} bytes", out.len());
    out
}

/// The outcome of a full compile, either rendered code or the error that
/// aborted the pipeline. Mirrors the driver's single external entry point.
pub struct CompileOutcome {
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<CompileError>,
}

/// Run the full pipeline: lex -> prepare -> parse -> emit. Reports and
/// aborts on the first error, per the "report once" policy.
pub fn compile(source: &str, filename: Option<&str>, config: &EmitConfig) -> CompileOutcome {
    match compile_inner(source, filename, config) {
        Ok(output) => CompileOutcome {
            success: true,
            output: Some(output),
            error: None,
        },
        Err(error) => CompileOutcome {
            success: false,
            output: None,
            error: Some(error),
        },
    }
}

fn compile_inner(
    source: &str,
    filename: Option<&str>,
    config: &EmitConfig,
) -> Result<String, CompileError> {
    let tokens = lex(source, filename)?;
    let tokens = prepare(tokens);
    let module = parse(tokens, filename)?;
    Ok(emit(&module, config))
}

/// The `check` subcommand's defensive variant: rather than propagating the
/// first error up through `?`, it runs lex, parse, and (once parsing
/// succeeds) emit in sequence and reports whatever diagnostic stopped it.
/// Lex and parse each still abort internally at their first error, so this
/// collects at most one diagnostic per run; emit is infallible given a
/// well-formed `Module`, so reaching it always yields an empty `Vec`, but
/// running it exercises the full pipeline rather than stopping short at parse.
pub fn check(source: &str, filename: Option<&str>) -> Vec<CompileError> {
    let config = EmitConfig::default();
    match lex(source, filename) {
        Err(e) => return vec![e],
        Ok(tokens) => {
            let tokens = prepare(tokens);
            match parse(tokens, filename) {
                Err(e) => vec![e],
                Ok(module) => {
                    emit(&module, &config);
                    Vec::new()
                }
            }
        }
    }
}

/// Compile to a temporary file and hand it to a `node` subprocess, streaming
/// its stdout/stderr straight through. Deliberately unsandboxed: the `run`
/// subcommand trusts its caller the same way `node script.js` would.
pub fn run(source: &str, filename: Option<&str>, config: &EmitConfig) -> Result<i32, CompileError> {
    let code = compile_inner(source, filename, config)?;
    let mut file = tempfile::Builder::new()
        .prefix("faber-")
        .suffix(".js")
        .tempfile()?;
    file.write_all(code.as_bytes())?;
    file.flush()?;

    let status = Command::new("node").arg(file.path()).status()?;
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_reports_success_for_valid_source() {
        let outcome = compile("fixum numerus x = 1", None, &EmitConfig::default());
        assert!(outcome.success);
        assert!(outcome.output.unwrap().contains("const x"));
    }

    #[test]
    fn compile_reports_failure_for_invalid_source() {
        let outcome = compile("fixum = 1", None, &EmitConfig::default());
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn check_collects_the_first_blocking_error() {
        let errors = check("fixum = 1", None);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn check_returns_empty_for_valid_source() {
        let errors = check("fixum numerus x = 1", None);
        assert!(errors.is_empty());
    }
}
