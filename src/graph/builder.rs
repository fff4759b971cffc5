use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::types::{ImportEdge, ModuleNode, ModuleState, SkipReason};
use crate::config::BuildConfig;
use crate::core::{ModuleId, RawSpecifier};
use crate::entries;
use crate::error::{BuildError, DpdmError, ExtractError, ModuleError, ResolveError};
use crate::extractor::ReferenceExtractor;
use crate::progress::ProgressReporter;
use crate::resolver::{ModuleResolver, PathAlias, Resolved, ResolverOptions};

/// Cooperative cancellation flag checked between modules
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A finished module graph
///
/// Only shared accessors are exposed; nothing is added or removed once the
/// builder hands the graph out.
#[derive(Debug)]
pub struct ModuleGraph {
    graph: DiGraph<ModuleNode, ImportEdge>,
    indices: HashMap<ModuleId, NodeIndex>,
    entries: Vec<ModuleId>,
    context: PathBuf,
}

impl ModuleGraph {
    /// Assemble a graph from an already populated petgraph
    pub fn from_parts(
        graph: DiGraph<ModuleNode, ImportEdge>,
        entries: Vec<ModuleId>,
        context: PathBuf,
    ) -> Self {
        let indices = graph
            .node_indices()
            .map(|idx| (graph[idx].id.clone(), idx))
            .collect();

        Self {
            graph,
            indices,
            entries,
            context,
        }
    }

    pub fn graph(&self) -> &DiGraph<ModuleNode, ImportEdge> {
        &self.graph
    }

    pub fn context(&self) -> &Path {
        &self.context
    }

    pub fn entries(&self) -> &[ModuleId] {
        &self.entries
    }

    pub fn module_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn index_of(&self, id: &ModuleId) -> Option<NodeIndex> {
        self.indices.get(id).copied()
    }

    pub fn node(&self, id: &ModuleId) -> Option<&ModuleNode> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    /// Modules in discovery order
    pub fn modules(&self) -> impl Iterator<Item = &ModuleNode> {
        self.graph.node_weights()
    }

    /// Outgoing references of `idx` in the order they appear in the source
    pub fn dependencies(&self, idx: NodeIndex) -> Vec<(NodeIndex, &ImportEdge)> {
        let mut deps: Vec<_> = self
            .graph
            .edges(idx)
            .map(|edge| (edge.target(), edge.weight()))
            .collect();
        deps.sort_by_key(|(_, edge)| edge.order);
        deps
    }

    /// Modules that failed to resolve or to be read
    pub fn errored(&self) -> impl Iterator<Item = &ModuleNode> {
        self.modules()
            .filter(|node| matches!(node.state, ModuleState::Errored(_)))
    }

    pub fn unresolved_count(&self) -> usize {
        self.modules().filter(|node| node.is_unresolved()).count()
    }

    /// Path of `id` relative to the context directory
    pub fn display(&self, id: &ModuleId) -> String {
        id.display_relative(&self.context)
    }
}

/// Builder that discovers every module reachable from a set of entry points
///
/// Traversal is breadth first. Each level is scanned in parallel and merged
/// back sequentially in frontier order, so the resulting graph does not depend
/// on thread scheduling.
pub struct ModuleGraphBuilder {
    config: BuildConfig,
    resolver: ModuleResolver,
    extractor: ReferenceExtractor,
    cancel: CancellationToken,
}

enum ScanOutcome {
    Scanned(Vec<(RawSpecifier, Result<Resolved, ResolveError>)>),
    Failed(ExtractError),
    Cancelled,
}

#[derive(Default)]
struct GraphState {
    graph: DiGraph<ModuleNode, ImportEdge>,
    indices: HashMap<ModuleId, NodeIndex>,
    edge_keys: HashSet<(NodeIndex, NodeIndex, String)>,
}

/// How a reference target was reached
enum Target {
    Resolved { id: ModuleId, external: bool },
    Failed { id: ModuleId, error: ResolveError },
}

impl ModuleGraphBuilder {
    pub fn new(config: BuildConfig) -> Result<Self, DpdmError> {
        let alias = config
            .tsconfig
            .as_deref()
            .map(PathAlias::from_tsconfig)
            .transpose()?;

        let resolver = ModuleResolver::new(ResolverOptions {
            context: config.context.clone(),
            extensions: config.extensions.clone(),
            alias,
            disallow_ambiguous: config.disallow_ambiguous,
        });
        let extractor = ReferenceExtractor::new(
            &config.reference_kinds(),
            config.strict,
            config.skip_type_imports,
        );

        Ok(Self {
            config,
            resolver,
            extractor,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Expand entry arguments (files, directories, globs) into module ids
    ///
    /// Entries that do not resolve are skipped with a warning; it is an error
    /// only when none of them resolve.
    pub fn resolve_entries(&self, patterns: &[String]) -> Result<Vec<ModuleId>, DpdmError> {
        let paths = entries::expand(patterns, &self.config)?;

        let mut ids = Vec::new();
        for path in &paths {
            match self.resolver.resolve_entry(path) {
                Ok(id) if !ids.contains(&id) => ids.push(id),
                Ok(_) => {}
                Err(e) => warn!("skipping entry {}: {e}", path.display()),
            }
        }

        if ids.is_empty() {
            return Err(BuildError::NoEntryPointResolved {
                entries: patterns.to_vec(),
            }
            .into());
        }

        Ok(ids)
    }

    pub fn build(
        &self,
        entries: &[ModuleId],
        progress: Option<&ProgressReporter>,
    ) -> Result<ModuleGraph, BuildError> {
        if entries.is_empty() {
            return Err(BuildError::NoEntryPointResolved {
                entries: Vec::new(),
            });
        }

        let mut state = GraphState::default();
        let mut entry_ids = Vec::new();
        let mut frontier = Vec::new();

        for id in entries {
            let target = Target::Resolved {
                id: id.clone(),
                external: false,
            };
            let (idx, inserted) = self.intern(&mut state, target, 0)?;
            state.graph[idx].entry = true;
            if inserted {
                entry_ids.push(id.clone());
                if matches!(state.graph[idx].state, ModuleState::Pending) {
                    frontier.push(idx);
                }
            }
        }

        let mut scanned = 0;
        while !frontier.is_empty() {
            if self.cancel.is_cancelled() {
                return Err(BuildError::Cancelled);
            }

            let jobs: Vec<(NodeIndex, ModuleId)> = frontier
                .iter()
                .map(|&idx| (idx, state.graph[idx].id.clone()))
                .collect();
            debug!("scanning {} modules", jobs.len());

            let outcomes: Vec<(NodeIndex, ScanOutcome)> = jobs
                .into_par_iter()
                .map(|(idx, id)| (idx, self.scan(&id)))
                .collect();

            let mut next = Vec::new();
            for (idx, outcome) in outcomes {
                self.merge(&mut state, idx, outcome, &mut next)?;
                scanned += 1;
                if let Some(p) = progress {
                    let id = &state.graph[idx].id;
                    p.module_scanned(scanned, id.display_relative(self.resolver.context()));
                }
            }
            frontier = next;
        }

        Ok(ModuleGraph {
            graph: state.graph,
            indices: state.indices,
            entries: entry_ids,
            context: self.resolver.context().to_path_buf(),
        })
    }

    fn scan(&self, id: &ModuleId) -> ScanOutcome {
        if self.cancel.is_cancelled() {
            return ScanOutcome::Cancelled;
        }

        debug!("scanning {id}");
        match self.extractor.extract(id) {
            Ok(references) => ScanOutcome::Scanned(
                references
                    .into_iter()
                    .map(|raw| {
                        let resolved = self.resolver.resolve(&raw.specifier, id);
                        (raw, resolved)
                    })
                    .collect(),
            ),
            Err(e) => ScanOutcome::Failed(e),
        }
    }

    fn merge(
        &self,
        state: &mut GraphState,
        idx: NodeIndex,
        outcome: ScanOutcome,
        next: &mut Vec<NodeIndex>,
    ) -> Result<(), BuildError> {
        let references = match outcome {
            ScanOutcome::Cancelled => return Err(BuildError::Cancelled),
            ScanOutcome::Failed(ExtractError::FatalSyntax(error)) => {
                return Err(BuildError::Syntax(error));
            }
            ScanOutcome::Failed(error) => {
                warn!("{error}");
                state.graph[idx].state = ModuleState::Errored(ModuleError::Extract(error));
                return Ok(());
            }
            ScanOutcome::Scanned(references) => references,
        };

        let from = state.graph[idx].id.clone();
        let depth = state.graph[idx].depth + 1;
        let mut specifiers = Vec::with_capacity(references.len());

        for (order, (raw, resolved)) in references.into_iter().enumerate() {
            let target = match resolved {
                Ok(resolved) if resolved.external && !self.config.include_external => None,
                Ok(resolved) => Some(Target::Resolved {
                    id: resolved.id,
                    external: resolved.external,
                }),
                Err(ResolveError::NotFound { .. })
                    if ModuleResolver::is_bare(&raw.specifier) && !self.config.include_external =>
                {
                    None
                }
                Err(error) => Some(Target::Failed {
                    id: self.resolver.unresolved_id(&raw.specifier, &from),
                    error,
                }),
            };

            if let Some(target) = target {
                let (target_idx, inserted) = self.intern(state, target, depth)?;
                if inserted && matches!(state.graph[target_idx].state, ModuleState::Pending) {
                    next.push(target_idx);
                }

                let key = (idx, target_idx, raw.specifier.clone());
                if state.edge_keys.insert(key) {
                    state.graph.add_edge(
                        idx,
                        target_idx,
                        ImportEdge {
                            specifier: raw.specifier.clone(),
                            kind: raw.kind,
                            order,
                        },
                    );
                }
            }

            specifiers.push(raw);
        }

        let node = &mut state.graph[idx];
        node.specifiers = specifiers;
        node.state = ModuleState::Scanned;
        Ok(())
    }

    /// Insert a node unless it already exists; returns whether it was new
    fn intern(
        &self,
        state: &mut GraphState,
        target: Target,
        depth: usize,
    ) -> Result<(NodeIndex, bool), BuildError> {
        let id = match &target {
            Target::Resolved { id, .. } | Target::Failed { id, .. } => id,
        };
        if let Some(&idx) = state.indices.get(id) {
            return Ok((idx, false));
        }
        if state.graph.node_count() >= self.config.max_modules {
            return Err(BuildError::ModuleLimitExceeded {
                limit: self.config.max_modules,
            });
        }

        let (id, module_state) = match target {
            Target::Failed { id, error } => (id, ModuleState::Errored(ModuleError::Resolve(error))),
            Target::Resolved { id, external } => {
                let module_state = self.classify(&id, depth, external);
                (id, module_state)
            }
        };

        let idx = state
            .graph
            .add_node(ModuleNode::new(id.clone(), depth, module_state));
        state.indices.insert(id, idx);
        Ok((idx, true))
    }

    fn classify(&self, id: &ModuleId, depth: usize, external: bool) -> ModuleState {
        let path = match id {
            ModuleId::File(path) => path,
            ModuleId::Package(_) => return ModuleState::Skipped(SkipReason::External),
            // nothing to scan
            ModuleId::Unresolved(_) => return ModuleState::Scanned,
        };

        if external {
            ModuleState::Skipped(SkipReason::External)
        } else if !self.config.is_included(path) {
            ModuleState::Skipped(SkipReason::Excluded)
        } else if !self.config.is_js(path) {
            ModuleState::Scanned
        } else if depth > 0 && self.config.max_depth.is_some_and(|max| depth >= max) {
            ModuleState::Skipped(SkipReason::DepthLimit)
        } else {
            ModuleState::Pending
        }
    }
}
