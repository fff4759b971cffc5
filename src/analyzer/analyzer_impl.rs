use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::ModuleId;
use crate::error::DpdmError;
use crate::graph::ModuleGraph;

/// JSON output of the analyze command
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeJsonReport {
    /// Requested file mapped to its sorted transitive closure
    pub result: BTreeMap<String, Vec<String>>,
}

/// Queries over a finished module graph
pub struct DependencyAnalysis<'g> {
    graph: &'g ModuleGraph,
}

impl<'g> DependencyAnalysis<'g> {
    pub fn new(graph: &'g ModuleGraph) -> Self {
        Self { graph }
    }

    /// Find the graph node for a file given on the command line
    pub fn locate(&self, file: &Path) -> Option<NodeIndex> {
        let path = match absolutize(file) {
            Ok(path) => path,
            Err(e) => {
                warn!("cannot locate {}: {e}", file.display());
                return None;
            }
        };
        let path = path.canonicalize().unwrap_or(path);
        self.graph.index_of(&ModuleId::File(path))
    }

    /// Every module `file` reaches, sorted and deduplicated
    ///
    /// The file itself is only listed when it is part of a cycle.
    pub fn transitive_dependencies(&self, file: &Path) -> Vec<String> {
        self.closure(file, Direction::Outgoing)
    }

    /// Every module that reaches `file`, sorted and deduplicated
    pub fn transitive_dependents(&self, file: &Path) -> Vec<String> {
        self.closure(file, Direction::Incoming)
    }

    /// Run the query for each file and collect the JSON report
    pub fn analyze(&self, files: &[String], reverse: bool) -> AnalyzeJsonReport {
        let result = files
            .iter()
            .map(|file| {
                let path = Path::new(file);
                let modules = if reverse {
                    self.transitive_dependents(path)
                } else {
                    self.transitive_dependencies(path)
                };
                (file.clone(), modules)
            })
            .collect();

        AnalyzeJsonReport { result }
    }

    /// Files matched by `pattern` that are not part of the graph
    pub fn unused_files(&self, pattern: &str) -> Result<Vec<String>, DpdmError> {
        let pattern = absolutize(Path::new(pattern))?;
        let pattern = pattern.to_string_lossy();
        let paths = glob::glob(&pattern).map_err(|e| DpdmError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let mut unused: Vec<String> = paths
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .map(|path| path.canonicalize().unwrap_or(path))
            .map(ModuleId::File)
            .filter(|id| self.graph.index_of(id).is_none())
            .map(|id| self.graph.display(&id))
            .collect();
        unused.sort();
        unused.dedup();
        Ok(unused)
    }

    fn closure(&self, file: &Path, direction: Direction) -> Vec<String> {
        let Some(start) = self.locate(file) else {
            warn!("{} is not part of the module graph", file.display());
            return Vec::new();
        };

        let inner = self.graph.graph();
        let mut visited = HashSet::new();
        let mut stack: Vec<NodeIndex> = inner.neighbors_directed(start, direction).collect();

        while let Some(idx) = stack.pop() {
            if inner[idx].is_unresolved() || !visited.insert(idx) {
                continue;
            }
            stack.extend(inner.neighbors_directed(idx, direction));
        }

        let mut modules: Vec<String> = visited
            .into_iter()
            .map(|idx| self.graph.display(&inner[idx].id))
            .collect();
        modules.sort();
        modules
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, DpdmError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
