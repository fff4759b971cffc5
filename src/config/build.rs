//! Graph building configuration shared by every command
//!
//! Values come from three layers: explicit command line flags, an optional
//! TOML configuration file, and built-in defaults, in that order of
//! precedence.

use std::fs;
use std::path::{Path, PathBuf};

use miette::{NamedSource, SourceSpan};
use regex::Regex;
use serde::Deserialize;

use crate::constants::build::{
    DEFAULT_EXCLUDE, DEFAULT_EXTENSIONS, DEFAULT_INCLUDE, DEFAULT_JS_EXTENSIONS,
    DEFAULT_MAX_MODULES,
};
use crate::core::ReferenceKind;
use crate::error::{ConfigParseError, DpdmError};

/// Everything the graph builder needs to know
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory output paths are shortened against; files outside it are
    /// external
    pub context: PathBuf,
    /// Extensions tried during resolution, in priority order
    pub extensions: Vec<String>,
    /// Extensions of files that are scanned for references
    pub js_extensions: Vec<String>,
    pub include: Regex,
    /// `None` when the exclude pattern is empty
    pub exclude: Option<Regex>,
    pub tsconfig: Option<PathBuf>,
    pub include_external: bool,
    pub max_depth: Option<usize>,
    pub max_modules: usize,
    pub strict: bool,
    pub syntax: Vec<ReferenceKind>,
    pub skip_dynamic_imports: bool,
    pub skip_type_imports: bool,
    pub disallow_ambiguous: bool,
}

impl BuildConfig {
    pub fn builder() -> BuildConfigBuilder {
        BuildConfigBuilder::new()
    }

    /// The reference kinds the extractor should recognize
    pub fn reference_kinds(&self) -> Vec<ReferenceKind> {
        self.syntax
            .iter()
            .copied()
            .filter(|kind| !(self.skip_dynamic_imports && *kind == ReferenceKind::DynamicImport))
            .collect()
    }

    /// Whether a file passes the include / exclude filters
    pub fn is_included(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.include.is_match(&path) && !self.exclude.as_ref().is_some_and(|re| re.is_match(&path))
    }

    /// Whether a file is scanned for references, judged by its extension
    pub fn is_js(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.js_extensions.iter().any(|js| js == ext))
    }
}

#[derive(Default)]
pub struct BuildConfigBuilder {
    context: Option<PathBuf>,
    extensions: Option<Vec<String>>,
    js_extensions: Option<Vec<String>>,
    include: Option<String>,
    exclude: Option<String>,
    tsconfig: Option<PathBuf>,
    include_external: Option<bool>,
    max_depth: Option<usize>,
    max_modules: Option<usize>,
    strict: Option<bool>,
    syntax: Option<Vec<ReferenceKind>>,
    skip_dynamic_imports: Option<bool>,
    skip_type_imports: Option<bool>,
    disallow_ambiguous: Option<bool>,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: PathBuf) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = Some(extensions);
        self
    }

    pub fn with_js_extensions(mut self, js_extensions: Vec<String>) -> Self {
        self.js_extensions = Some(js_extensions);
        self
    }

    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include = Some(include.into());
        self
    }

    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    pub fn with_tsconfig(mut self, tsconfig: PathBuf) -> Self {
        self.tsconfig = Some(tsconfig);
        self
    }

    pub fn with_include_external(mut self, include_external: bool) -> Self {
        self.include_external = Some(include_external);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_max_modules(mut self, max_modules: usize) -> Self {
        self.max_modules = Some(max_modules);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn with_syntax(mut self, syntax: Vec<ReferenceKind>) -> Self {
        self.syntax = Some(syntax);
        self
    }

    pub fn with_skip_dynamic_imports(mut self, skip: bool) -> Self {
        self.skip_dynamic_imports = Some(skip);
        self
    }

    pub fn with_skip_type_imports(mut self, skip: bool) -> Self {
        self.skip_type_imports = Some(skip);
        self
    }

    pub fn with_disallow_ambiguous(mut self, disallow: bool) -> Self {
        self.disallow_ambiguous = Some(disallow);
        self
    }
}

fn compile(pattern: &str) -> Result<Regex, DpdmError> {
    Regex::new(pattern).map_err(|e| DpdmError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn defaults(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_string())
        .filter(|ext| !ext.is_empty())
        .collect()
}

impl crate::common::ConfigBuilder for BuildConfigBuilder {
    type Config = BuildConfig;

    fn build(self) -> Result<Self::Config, DpdmError> {
        let context = match self.context {
            Some(context) => context,
            None => std::env::current_dir()?,
        };

        let include = compile(self.include.as_deref().unwrap_or(DEFAULT_INCLUDE))?;
        let exclude = match self.exclude.as_deref().unwrap_or(DEFAULT_EXCLUDE) {
            "" => None,
            pattern => Some(compile(pattern)?),
        };

        let max_modules = self.max_modules.unwrap_or(DEFAULT_MAX_MODULES);
        if max_modules == 0 {
            return Err(DpdmError::ConfigurationError {
                message: "max_modules must be at least 1".to_string(),
            });
        }

        let syntax = self.syntax.unwrap_or_else(|| ReferenceKind::ALL.to_vec());
        if syntax.is_empty() {
            return Err(DpdmError::ConfigurationError {
                message: "At least one reference syntax must be enabled".to_string(),
            });
        }

        Ok(BuildConfig {
            context,
            extensions: normalize_extensions(
                self.extensions.unwrap_or_else(|| defaults(DEFAULT_EXTENSIONS)),
            ),
            js_extensions: normalize_extensions(
                self.js_extensions
                    .unwrap_or_else(|| defaults(DEFAULT_JS_EXTENSIONS)),
            ),
            include,
            exclude,
            tsconfig: self.tsconfig,
            include_external: self.include_external.unwrap_or(false),
            max_depth: self.max_depth,
            max_modules,
            strict: self.strict.unwrap_or(false),
            syntax,
            skip_dynamic_imports: self.skip_dynamic_imports.unwrap_or(false),
            skip_type_imports: self.skip_type_imports.unwrap_or(false),
            disallow_ambiguous: self.disallow_ambiguous.unwrap_or(false),
        })
    }
}

/// Contents of a `dpdm.toml` configuration file
///
/// Relative paths are resolved against the directory containing the file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ConfigFile {
    pub context: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
    pub js: Option<Vec<String>>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub tsconfig: Option<PathBuf>,
    pub include_external: Option<bool>,
    pub max_depth: Option<usize>,
    pub max_modules: Option<usize>,
    pub strict: Option<bool>,
    pub syntax: Option<Vec<ReferenceKind>>,
    pub skip_dynamic_imports: Option<bool>,
    pub skip_type_imports: Option<bool>,
    pub disallow_ambiguous: Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, DpdmError> {
        let content = fs::read_to_string(path).map_err(|e| DpdmError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut file: ConfigFile = toml::from_str(&content).map_err(|e| {
            let span = e
                .span()
                .map(|span| SourceSpan::new(span.start.into(), span.end - span.start));

            DpdmError::ConfigParseError(Box::new(ConfigParseError {
                file: path.display().to_string(),
                source_code: NamedSource::new(path.display().to_string(), content.clone()),
                span,
                source: e,
            }))
        })?;

        let base = path.parent().unwrap_or(Path::new("."));
        file.context = file.context.map(|p| base.join(p));
        file.tsconfig = file.tsconfig.map(|p| base.join(p));

        Ok(file)
    }

    /// A builder seeded with the values present in the file
    pub fn into_builder(self) -> BuildConfigBuilder {
        BuildConfigBuilder {
            context: self.context,
            extensions: self.extensions,
            js_extensions: self.js,
            include: self.include,
            exclude: self.exclude,
            tsconfig: self.tsconfig,
            include_external: self.include_external,
            max_depth: self.max_depth,
            max_modules: self.max_modules,
            strict: self.strict,
            syntax: self.syntax,
            skip_dynamic_imports: self.skip_dynamic_imports,
            skip_type_imports: self.skip_type_imports,
            disallow_ambiguous: self.disallow_ambiguous,
        }
    }
}
