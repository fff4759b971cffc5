//! tsconfig `compilerOptions.paths` aliases

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::DpdmError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfig {
    #[serde(default)]
    compiler_options: Option<CompilerOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    paths: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AliasPattern {
    prefix: String,
    /// `None` for exact patterns without `*`
    suffix: Option<String>,
    targets: Vec<String>,
}

impl AliasPattern {
    fn parse(pattern: &str, targets: Vec<String>) -> Self {
        match pattern.split_once('*') {
            Some((prefix, suffix)) => Self {
                prefix: prefix.to_string(),
                suffix: Some(suffix.to_string()),
                targets,
            },
            None => Self {
                prefix: pattern.to_string(),
                suffix: None,
                targets,
            },
        }
    }

    /// The text matched by `*`, or `""` for an exact pattern
    fn capture<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        match &self.suffix {
            None => (specifier == self.prefix).then_some(""),
            Some(suffix) => specifier
                .strip_prefix(self.prefix.as_str())?
                .strip_suffix(suffix.as_str()),
        }
    }
}

/// Path aliases relative to a base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAlias {
    base: PathBuf,
    patterns: Vec<AliasPattern>,
}

impl PathAlias {
    pub fn new(base: impl Into<PathBuf>, paths: HashMap<String, Vec<String>>) -> Self {
        let mut patterns: Vec<AliasPattern> = paths
            .into_iter()
            .map(|(pattern, targets)| AliasPattern::parse(&pattern, targets))
            .collect();

        // Exact patterns first, then longest prefix; ties broken by text so
        // the order never depends on map iteration
        patterns.sort_by(|a, b| {
            a.suffix
                .is_some()
                .cmp(&b.suffix.is_some())
                .then_with(|| b.prefix.len().cmp(&a.prefix.len()))
                .then_with(|| a.prefix.cmp(&b.prefix))
                .then_with(|| a.suffix.cmp(&b.suffix))
        });

        Self {
            base: base.into(),
            patterns,
        }
    }

    /// Load aliases from a tsconfig file. The file may contain comments and
    /// trailing commas.
    pub fn from_tsconfig(path: &Path) -> Result<Self, DpdmError> {
        let content = fs::read_to_string(path).map_err(|e| DpdmError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: TsConfig =
            serde_json::from_str(&strip_json_extensions(&content)).map_err(|e| {
                DpdmError::TsconfigError {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;

        let dir = path.parent().unwrap_or(Path::new("."));
        let options = config.compiler_options;
        let base = match options.as_ref().and_then(|o| o.base_url.as_deref()) {
            Some(base_url) => dir.join(base_url),
            None => dir.to_path_buf(),
        };
        let paths = options.map(|o| o.paths).unwrap_or_default();

        Ok(Self::new(base, paths))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Candidate paths for `specifier` from the best matching pattern, in
    /// the order they are listed in the tsconfig
    pub fn candidates(&self, specifier: &str) -> Vec<PathBuf> {
        self.patterns
            .iter()
            .find_map(|pattern| {
                let captured = pattern.capture(specifier)?;
                Some(
                    pattern
                        .targets
                        .iter()
                        .map(|target| self.base.join(target.replacen('*', captured, 1)))
                        .collect(),
                )
            })
            .unwrap_or_default()
    }
}

/// Remove `//` and `/* */` comments and trailing commas outside of strings
fn strip_json_extensions(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            ',' => {
                let next = chars.clone().find(|next| !next.is_whitespace());
                if !matches!(next, Some('}' | ']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}
