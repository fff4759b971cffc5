use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[error("Invalid TOML syntax in '{file}'")]
#[diagnostic(
    code(dpdm::config_parse_error),
    help("Check the TOML syntax near the highlighted position")
)]
pub struct ConfigParseError {
    pub file: String,
    #[source_code]
    pub source_code: NamedSource<String>,
    #[label("syntax error here")]
    pub span: Option<SourceSpan>,
    #[source]
    pub source: toml::de::Error,
}

#[derive(Error, Debug, Diagnostic)]
#[error("Unrecognized syntax in '{file}': {message}")]
#[diagnostic(
    code(dpdm::syntax_error),
    help("Run without --strict to skip constructs the scanner does not understand")
)]
pub struct SyntaxError {
    pub file: String,
    pub message: String,
    #[source_code]
    pub source_code: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
}

/// Failure to turn a specifier into a module identity
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Cannot find module '{specifier}'")]
    #[diagnostic(
        code(dpdm::resolve::not_found),
        help("Check the path, the --extensions list and the tsconfig paths")
    )]
    NotFound { specifier: String },

    #[error("Module '{specifier}' matches {} candidates", .candidates.len())]
    #[diagnostic(
        code(dpdm::resolve::ambiguous),
        help("Add the file extension to the import or run without --disallow-ambiguous")
    )]
    Ambiguous {
        specifier: String,
        candidates: Vec<PathBuf>,
    },

    #[error("Module '{specifier}' resolved to '{path}' which cannot be read: {reason}")]
    #[diagnostic(
        code(dpdm::resolve::unreadable),
        help("Check the file permissions")
    )]
    Unreadable {
        specifier: String,
        path: PathBuf,
        reason: String,
    },
}

/// Failure to scan a module's references
#[derive(Error, Debug, Diagnostic)]
pub enum ExtractError {
    #[error("Failed to read module '{path}': {reason}")]
    #[diagnostic(
        code(dpdm::extract::read_failure),
        help("Check if the file is readable and valid UTF-8")
    )]
    ReadFailure { path: PathBuf, reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    FatalSyntax(Box<SyntaxError>),
}

/// Error recorded on a single graph node; never aborts the build
#[derive(Error, Debug, Diagnostic)]
pub enum ModuleError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Extract(#[from] ExtractError),
}

/// Errors that abort graph construction as a whole
#[derive(Error, Debug, Diagnostic)]
pub enum BuildError {
    #[error("None of the entry points could be resolved: {}", .entries.join(", "))]
    #[diagnostic(
        code(dpdm::build::no_entry_point),
        help("Pass existing files, directories or glob patterns as entries")
    )]
    NoEntryPointResolved { entries: Vec<String> },

    #[error("Traversal stopped after visiting {limit} modules")]
    #[diagnostic(
        code(dpdm::build::module_limit),
        help("Raise --max-modules or narrow the graph with --exclude / --max-depth")
    )]
    ModuleLimitExceeded { limit: usize },

    #[error("Graph construction was cancelled")]
    #[diagnostic(code(dpdm::build::cancelled))]
    Cancelled,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(Box<SyntaxError>),
}

#[derive(Error, Debug, Diagnostic)]
pub enum DpdmError {
    #[error("Failed to read file '{path}'")]
    #[diagnostic(
        code(dpdm::io_error),
        help("Check if the file exists and you have read permissions")
    )]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    ConfigParseError(Box<ConfigParseError>),

    #[error("Invalid tsconfig '{path}': {message}")]
    #[diagnostic(
        code(dpdm::tsconfig_error),
        help("Check that compilerOptions.paths maps patterns to arrays of strings")
    )]
    TsconfigError { path: PathBuf, message: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    #[diagnostic(
        code(dpdm::pattern_error),
        help("Check the regular expression or glob syntax")
    )]
    InvalidPattern { pattern: String, message: String },

    #[error("JSON serialization error")]
    #[diagnostic(
        code(dpdm::json_error),
        help("This is likely an internal error - please report it")
    )]
    Json(#[from] serde_json::Error),

    #[error("String formatting error")]
    #[diagnostic(
        code(dpdm::fmt_error),
        help("This is likely an internal error - please report it")
    )]
    Fmt(#[from] std::fmt::Error),

    #[error("IO error")]
    #[diagnostic(
        code(dpdm::io_error),
        help("Check file permissions and disk space")
    )]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(dpdm::config_error),
        help("Check your command arguments and configuration")
    )]
    ConfigurationError { message: String },

    #[error("Graph error: {message}")]
    #[diagnostic(
        code(dpdm::graph_error),
        help("This may be an internal error with graph processing")
    )]
    GraphError { message: String },

    #[error("{count} import(s) could not be resolved")]
    #[diagnostic(
        code(dpdm::unresolved),
        help("Fix the imports listed above or run without --fail-on-unresolved")
    )]
    UnresolvedModules { count: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),
}
