//! Common functionality shared across commands

use std::path::PathBuf;

use clap::Args;

use crate::config::{BuildConfig, BuildConfigBuilder, ConfigFile};
use crate::core::ReferenceKind;
use crate::detector::CycleLimits;
use crate::error::DpdmError;

/// Entry points and graph building flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Entry files, directories or glob patterns
    #[arg(value_name = "ENTRIES", required = true)]
    pub entries: Vec<String>,

    /// TOML file with default values for the flags below
    #[arg(long, value_name = "FILE", env = "DPDM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory output paths are shown relative to [default: current directory]
    #[arg(long, value_name = "DIR", env = "DPDM_CONTEXT")]
    pub context: Option<PathBuf>,

    /// Comma separated extensions tried during resolution [default: ts,tsx,mjs,js,jsx,json]
    #[arg(short, long, value_delimiter = ',', env = "DPDM_EXTENSIONS")]
    pub extensions: Option<Vec<String>>,

    /// Comma separated extensions of files scanned for imports [default: ts,tsx,mjs,js,jsx]
    #[arg(long, value_delimiter = ',', env = "DPDM_JS")]
    pub js: Option<Vec<String>>,

    /// Only follow modules whose path matches this regex [default: .*]
    #[arg(long, value_name = "REGEX", env = "DPDM_INCLUDE")]
    pub include: Option<String>,

    /// Do not follow modules whose path matches this regex; empty disables
    /// it [default: node_modules]
    #[arg(long, value_name = "REGEX", env = "DPDM_EXCLUDE")]
    pub exclude: Option<String>,

    /// tsconfig.json whose compilerOptions.paths define import aliases
    #[arg(long, value_name = "FILE", env = "DPDM_TSCONFIG")]
    pub tsconfig: Option<PathBuf>,

    /// Keep packages and Node builtins as graph nodes
    #[arg(long, env = "DPDM_INCLUDE_EXTERNAL")]
    pub include_external: bool,

    /// Do not scan modules this many imports away from an entry point
    #[arg(long, value_name = "N", env = "DPDM_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// Give up once the graph holds this many modules [default: 100000]
    #[arg(long, value_name = "N", env = "DPDM_MAX_MODULES")]
    pub max_modules: Option<usize>,

    /// Fail on source text the scanner does not understand
    #[arg(long, env = "DPDM_STRICT")]
    pub strict: bool,

    /// Comma separated reference syntaxes to recognize [default: all]
    #[arg(long, value_enum, value_delimiter = ',', env = "DPDM_SYNTAX")]
    pub syntax: Option<Vec<ReferenceKind>>,

    /// Ignore `import(...)` expressions
    #[arg(long, env = "DPDM_SKIP_DYNAMIC_IMPORTS")]
    pub skip_dynamic_imports: bool,

    /// Ignore type-only imports and exports
    #[arg(long, env = "DPDM_SKIP_TYPE_IMPORTS")]
    pub skip_type_imports: bool,

    /// Fail resolution when a specifier matches several extensions
    #[arg(long, env = "DPDM_DISALLOW_AMBIGUOUS")]
    pub disallow_ambiguous: bool,
}

/// Common output format arguments
#[derive(Args, Debug, Clone)]
pub struct FormatArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = crate::constants::output::DEFAULT_FORMAT, env = "DPDM_FORMAT")]
    pub format: crate::cli::OutputFormat,
}

/// Common cycle display arguments
#[derive(Args, Debug, Clone, Default)]
pub struct CycleDisplayArgs {
    /// Maximum number of cycles to display (shows all by default)
    #[arg(long, env = "DPDM_MAX_CYCLES")]
    pub max_cycles: Option<usize>,

    /// Ignore cycles longer than this many modules
    #[arg(long, value_name = "N", env = "DPDM_MAX_CYCLE_LENGTH")]
    pub max_cycle_length: Option<usize>,

    /// Stop searching after this many cycles
    #[arg(long, value_name = "N", env = "DPDM_CYCLE_LIMIT")]
    pub cycle_limit: Option<usize>,
}

impl CycleDisplayArgs {
    pub fn limits(&self) -> CycleLimits {
        CycleLimits {
            max_cycles: self.cycle_limit,
            max_length: self.max_cycle_length,
        }
    }
}

impl CommonArgs {
    /// Merge the flags over the config file over the built-in defaults
    pub fn build_config(&self) -> Result<BuildConfig, DpdmError> {
        let mut builder = match &self.config {
            Some(path) => ConfigFile::load(path)?.into_builder(),
            None => BuildConfigBuilder::new(),
        };

        if let Some(context) = &self.context {
            builder = builder.with_context(context.clone());
        }
        if let Some(extensions) = &self.extensions {
            builder = builder.with_extensions(extensions.clone());
        }
        if let Some(js) = &self.js {
            builder = builder.with_js_extensions(js.clone());
        }
        if let Some(include) = &self.include {
            builder = builder.with_include(include.as_str());
        }
        if let Some(exclude) = &self.exclude {
            builder = builder.with_exclude(exclude.as_str());
        }
        if let Some(tsconfig) = &self.tsconfig {
            builder = builder.with_tsconfig(tsconfig.clone());
        }
        if let Some(max_depth) = self.max_depth {
            builder = builder.with_max_depth(max_depth);
        }
        if let Some(max_modules) = self.max_modules {
            builder = builder.with_max_modules(max_modules);
        }
        if let Some(syntax) = &self.syntax {
            builder = builder.with_syntax(syntax.clone());
        }

        // Boolean flags can only switch a behavior on
        if self.include_external {
            builder = builder.with_include_external(true);
        }
        if self.strict {
            builder = builder.with_strict(true);
        }
        if self.skip_dynamic_imports {
            builder = builder.with_skip_dynamic_imports(true);
        }
        if self.skip_type_imports {
            builder = builder.with_skip_type_imports(true);
        }
        if self.disallow_ambiguous {
            builder = builder.with_disallow_ambiguous(true);
        }

        builder.build()
    }
}

/// Generic builder trait for configuration objects
pub trait ConfigBuilder: Sized {
    type Config;

    /// Build the configuration, returning an error if validation fails
    fn build(self) -> Result<Self::Config, DpdmError>;
}

/// Trait for configurations that can be created from CLI commands
/// This trait simplifies command-to-config conversions
pub trait FromCommand: Sized {
    /// The command variant that this config can be created from
    fn from_command(command: crate::cli::Commands) -> Result<Self, DpdmError>;
}

/// Macro to implement `TryFrom<Commands>` using [`FromCommand`] trait
#[macro_export]
macro_rules! impl_try_from_command {
    ($config:ty) => {
        impl std::convert::TryFrom<$crate::cli::Commands> for $config {
            type Error = $crate::error::DpdmError;

            fn try_from(command: $crate::cli::Commands) -> Result<Self, Self::Error> {
                <$config as $crate::common::FromCommand>::from_command(command)
            }
        }
    };
}
