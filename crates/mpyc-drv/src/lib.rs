//! mpyc-drv - compiler driver: wires the lex/parse/typecheck/IR/codegen
//! phases into one source-file-in, two-files-out pipeline.
//!
//! [`Config`] holds everything a single invocation needs (there is no
//! multi-file compilation, optimization level, or target triple here -
//! this compiler accepts one miniPy source file and always targets the
//! same output language); [`Session`] runs the pipeline and owns the
//! diagnostic handler and symbol interner for the run's lifetime.

use std::fs;
use std::path::{Path, PathBuf};

use mpyc_gen::TargetGen;
use mpyc_ir::IrGen;
use mpyc_lex::Lexer;
use mpyc_par::Parser;
use mpyc_sem::TypeChecker;
use mpyc_util::{Handler, Interner};
use thiserror::Error;

/// Fixed relative output directory, matching the reference generator's
/// `output/` convention - created if it doesn't already exist.
const OUT_DIR: &str = "output";

#[derive(Debug, Clone)]
pub struct Config {
    pub path: PathBuf,
    pub parse_only: bool,
    pub typecheck_only: bool,
    pub verbose: bool,
}

impl Config {
    /// Parses `FILE [-p|--parse-only] [-t|--typecheck-only] [-v|--verbose]`
    /// from an argument list (excluding argv[0]).
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, CompileError> {
        let mut path = None;
        let mut parse_only = false;
        let mut typecheck_only = false;
        let mut verbose = false;

        for arg in args {
            match arg.as_str() {
                "-p" | "--parse-only" => parse_only = true,
                "-t" | "--typecheck-only" => typecheck_only = true,
                "-v" | "--verbose" => verbose = true,
                other if other.starts_with('-') => {
                    return Err(CompileError::InvalidArguments(format!("unrecognized flag '{other}'")));
                }
                other if path.is_none() => path = Some(PathBuf::from(other)),
                other => {
                    return Err(CompileError::InvalidArguments(format!("unexpected extra argument '{other}'")));
                }
            }
        }

        let path = path.ok_or_else(|| CompileError::InvalidArguments("missing input FILE".to_string()))?;
        Ok(Config { path, parse_only, typecheck_only, verbose })
    }
}

pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the pipeline end to end, stopping early per `-p`/`-t`.
    /// `Err` means a diagnostic was already printed; the caller only
    /// needs to translate it into a process exit code.
    pub fn compile(&self) -> Result<(), CompileError> {
        let source =
            fs::read_to_string(&self.config.path).map_err(|e| CompileError::Io(self.config.path.clone(), e))?;

        let mut handler = Handler::new();
        let mut interner = Interner::new();

        self.log("lexing");
        let tokens = Lexer::new(&source, &mut handler, &mut interner).tokenize();
        self.report_and_bail(&handler)?;

        self.log("parsing");
        let program = Parser::new(tokens, &mut handler).parse_program();
        self.report_and_bail(&handler)?;

        if self.config.parse_only {
            return Ok(());
        }

        self.log("type checking");
        TypeChecker::new(&mut handler).check_program(&program);
        self.report_and_bail(&handler)?;

        if self.config.typecheck_only {
            return Ok(());
        }

        self.log("generating IR");
        let tacs = IrGen::new(&interner).generate(&program);

        let outdir = Path::new(OUT_DIR);
        fs::create_dir_all(outdir).map_err(|e| CompileError::Io(outdir.to_path_buf(), e))?;

        let basename = self.basename()?;
        let ir_path = outdir.join(format!("{basename}_ir.out"));
        let ir_text: String = tacs.iter().map(|tac| format!("{tac}\n")).collect();
        fs::write(&ir_path, ir_text).map_err(|e| CompileError::Io(ir_path.clone(), e))?;

        self.log("generating target source");
        let class_name = capitalize(&basename);
        let java = TargetGen::new().generate_target(&tacs, &class_name);
        let java_path = outdir.join(format!("{class_name}.java"));
        fs::write(&java_path, java).map_err(|e| CompileError::Io(java_path.clone(), e))?;

        Ok(())
    }

    fn log(&self, message: &str) {
        if self.config.verbose {
            eprintln!("{message}");
        }
    }

    fn report_and_bail(&self, handler: &Handler) -> Result<(), CompileError> {
        if !handler.has_errors() {
            return Ok(());
        }
        for diag in handler.diagnostics() {
            eprintln!("{diag}");
        }
        Err(CompileError::CompilationFailed)
    }

    fn basename(&self) -> Result<String, CompileError> {
        self.config
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| CompileError::InvalidArguments(format!("cannot derive a basename from {}", self.config.path.display())))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("io error for {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("compilation failed")]
    CompilationFailed,
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_file_argument_and_every_flag() {
        let config = Config::from_args(
            ["prog.mpy", "-p", "-v"].iter().map(|s| s.to_string()),
        )
        .unwrap();
        assert_eq!(config.path, PathBuf::from("prog.mpy"));
        assert!(config.parse_only);
        assert!(config.verbose);
        assert!(!config.typecheck_only);
    }

    #[test]
    fn missing_file_is_an_argument_error() {
        let err = Config::from_args(["-v".to_string()]).unwrap_err();
        assert!(matches!(err, CompileError::InvalidArguments(_)));
    }

    #[test]
    fn unrecognized_flag_is_an_argument_error() {
        let err = Config::from_args(["prog.mpy".to_string(), "--bogus".to_string()]).unwrap_err();
        assert!(matches!(err, CompileError::InvalidArguments(_)));
    }

    #[test]
    fn capitalize_titlecases_only_the_first_letter() {
        assert_eq!(capitalize("main"), "Main");
        assert_eq!(capitalize(""), "");
    }
}
