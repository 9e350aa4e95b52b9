//! CLI module for the dicon generator
//!
//! ## Commands
//!
//! - `container --descriptors <FILE>` - Generate a dependency-injection container
//! - `mock --descriptors <FILE>` - Generate mocks for interfaces
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.
//! Generated source goes to stdout (or `--output`); everything else goes to stderr.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::normalize::{BuiltinNormalizer, ExternalNormalizer, PassthroughNormalizer, SourceNormalizer};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Render a diagnostic (code, message, help) as the error message.
    pub fn diagnostic<E>(err: E) -> Self
    where
        E: miette::Diagnostic + Send + Sync + 'static,
    {
        Self::failure(format!("{:?}", miette::Report::new(err)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Generate dependency-injection containers and mocks for Go
#[derive(Parser, Debug)]
#[command(name = "dicon")]
#[command(version = VERSION)]
#[command(about = "Generate dependency-injection containers and mocks for Go", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a lazily-initialized, memoizing container
    Container(ContainerArgs),

    /// Generate mock implementations of interfaces
    Mock(MockArgs),
}

/// Options shared by every generating command.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Descriptor document (JSON) produced by type discovery
    #[arg(short, long, value_name = "FILE")]
    pub descriptors: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// How to normalize the generated source
    #[arg(long, value_enum, default_value_t = NormalizerKind::Builtin)]
    pub normalizer: NormalizerKind,
}

#[derive(Args, Debug, Clone)]
pub struct ContainerArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Guard first resolution with a mutex
    #[arg(long)]
    pub synchronized: bool,

    /// Bind arguments to factories by simple name, without graph checks
    #[arg(long)]
    pub lenient: bool,

    /// Name of the generated container struct
    #[arg(long, value_name = "NAME", default_value = "dicontainer")]
    pub container_type: String,

    /// Name of the generated container constructor
    #[arg(long, value_name = "NAME", default_value = "NewDIContainer")]
    pub constructor: String,
}

#[derive(Args, Debug, Clone)]
pub struct MockArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Package to emit the mocks into (default: the document's package, then the first target's)
    #[arg(long, value_name = "PKG")]
    pub package: Option<String>,
}

/// Normalizer selected on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizerKind {
    /// Built-in normalizer (import pruning, whitespace, syntax check)
    Builtin,
    /// `goimports` from PATH
    Goimports,
    /// `gofmt` from PATH
    Gofmt,
    /// Write the raw buffer
    None,
}

impl NormalizerKind {
    pub fn build(self) -> Box<dyn SourceNormalizer> {
        match self {
            NormalizerKind::Builtin => Box::new(BuiltinNormalizer::new()),
            NormalizerKind::Goimports => Box::new(ExternalNormalizer::goimports()),
            NormalizerKind::Gofmt => Box::new(ExternalNormalizer::gofmt()),
            NormalizerKind::None => Box::new(PassthroughNormalizer),
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Container(args) => commands::generate_container(&args),
        Command::Mock(args) => commands::generate_mocks(&args),
    }
}

// ============================================================================
// Tests
// ============================================================================
