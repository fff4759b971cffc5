//! Core type definitions
//!
//! This module contains the identity and reference types shared by the
//! resolver, the extractor and the graph.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Canonical identity of a module
///
/// Two specifiers that resolve to the same `ModuleId` are the same graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleId {
    /// A source file, identified by its canonical absolute path
    File(PathBuf),
    /// A package kept by name (Node builtins, external packages)
    Package(String),
    /// Placeholder for a reference that could not be resolved
    Unresolved(String),
}

impl ModuleId {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ModuleId::File(path.into())
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ModuleId::File(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, ModuleId::File(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, ModuleId::Unresolved(_))
    }

    /// Render the id relative to `context` when it is a file below it
    pub fn display_relative(&self, context: &Path) -> String {
        match self {
            ModuleId::File(path) => path
                .strip_prefix(context)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/"),
            ModuleId::Package(name) => name.clone(),
            ModuleId::Unresolved(spec) => Path::new(spec)
                .strip_prefix(context)
                .map(|rel| rel.to_string_lossy().replace('\\', "/"))
                .unwrap_or_else(|_| spec.clone()),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleId::File(path) => write!(f, "{}", path.display()),
            ModuleId::Package(name) => write!(f, "{name}"),
            ModuleId::Unresolved(spec) => write!(f, "{spec} (unresolved)"),
        }
    }
}

/// Syntactic form a module reference was written in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    /// `import x from 'y'` and `import 'y'`
    Import,
    /// `export { x } from 'y'` and `export * from 'y'`
    Export,
    /// `import('y')`
    DynamicImport,
    /// `require('y')`
    Require,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::Import,
        ReferenceKind::Export,
        ReferenceKind::DynamicImport,
        ReferenceKind::Require,
    ];
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Import => write!(f, "import"),
            ReferenceKind::Export => write!(f, "export"),
            ReferenceKind::DynamicImport => write!(f, "dynamic-import"),
            ReferenceKind::Require => write!(f, "require"),
        }
    }
}

/// A specifier exactly as it appears in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSpecifier {
    pub specifier: String,
    pub kind: ReferenceKind,
    /// 1-based line of the reference
    pub line: usize,
}

impl RawSpecifier {
    pub fn new(specifier: impl Into<String>, kind: ReferenceKind, line: usize) -> Self {
        Self {
            specifier: specifier.into(),
            kind,
            line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_ordering_is_total() {
        let mut ids = vec![
            ModuleId::Unresolved("./x".to_string()),
            ModuleId::file("/b.ts"),
            ModuleId::Package("node:fs".to_string()),
            ModuleId::file("/a.ts"),
        ];
        ids.sort();

        assert_eq!(ids[0], ModuleId::file("/a.ts"));
        assert_eq!(ids[1], ModuleId::file("/b.ts"));
        assert!(matches!(ids[2], ModuleId::Package(_)));
        assert!(ids[3].is_unresolved());
    }

    #[test]
    fn test_display_relative_strips_context() {
        let id = ModuleId::file("/project/src/a.ts");
        assert_eq!(id.display_relative(Path::new("/project")), "src/a.ts");
        assert_eq!(id.display_relative(Path::new("/other")), "/project/src/a.ts");
        assert_eq!(
            ModuleId::Package("react".to_string()).display_relative(Path::new("/project")),
            "react"
        );
    }

    #[test]
    fn test_reference_kind_display() {
        assert_eq!(ReferenceKind::DynamicImport.to_string(), "dynamic-import");
        assert_eq!(ReferenceKind::Require.to_string(), "require");
    }
}
