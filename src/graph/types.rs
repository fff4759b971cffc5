//! Core graph types
//!
//! This module contains the node and edge weights of the module graph.

use std::fmt;

use crate::core::{ModuleId, RawSpecifier, ReferenceKind};
use crate::error::ModuleError;

/// Why a module was kept as a leaf without being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Filtered out by `--include` / `--exclude`
    Excluded,
    /// Builtin, package, or file outside the context directory
    External,
    /// Reached `--max-depth`
    DepthLimit,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Excluded => write!(f, "excluded"),
            SkipReason::External => write!(f, "external"),
            SkipReason::DepthLimit => write!(f, "depth limit"),
        }
    }
}

#[derive(Debug)]
pub enum ModuleState {
    /// Discovered, waiting on the frontier to be scanned
    Pending,
    Scanned,
    Skipped(SkipReason),
    Errored(ModuleError),
}

impl ModuleState {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ModuleState::Scanned | ModuleState::Skipped(_))
    }

    pub fn error(&self) -> Option<&ModuleError> {
        match self {
            ModuleState::Errored(error) => Some(error),
            _ => None,
        }
    }
}

/// A module in the dependency graph
#[derive(Debug)]
pub struct ModuleNode {
    pub id: ModuleId,
    /// References in textual order, including ones that were elided
    pub specifiers: Vec<RawSpecifier>,
    pub state: ModuleState,
    /// BFS distance from the nearest entry point
    pub depth: usize,
    pub entry: bool,
}

impl ModuleNode {
    pub fn new(id: ModuleId, depth: usize, state: ModuleState) -> Self {
        Self {
            id,
            specifiers: Vec::new(),
            state,
            depth,
            entry: false,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.id.is_unresolved()
    }
}

/// A reference from one module to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdge {
    /// The specifier exactly as written
    pub specifier: String,
    pub kind: ReferenceKind,
    /// Position of the reference among its module's references
    pub order: usize,
}
