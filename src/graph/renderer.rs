use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use super::builder::ModuleGraph;
use super::types::{ModuleState, SkipReason};
use crate::core::ModuleId;
use crate::detector::ModuleCycle;
use crate::error::DpdmError;

// Blue-Orange Accessible Palette - Soothing colors with excellent contrast
mod colors {
    pub const NORMAL_NODE_FILL: &str = "#E3F2FD"; // Light blue
    pub const NORMAL_NODE_STROKE: &str = "#1976D2"; // Medium blue
    pub const CYCLE_NODE_FILL: &str = "#FFF3E0"; // Light orange
    pub const CYCLE_NODE_STROKE: &str = "#F57C00"; // Vibrant orange
    pub const EXTERNAL_NODE_FILL: &str = "#ECEFF1"; // Light blue-grey
    pub const EXTERNAL_NODE_STROKE: &str = "#90A4AE"; // Blue-grey
    pub const UNRESOLVED_NODE_FILL: &str = "#FFEBEE"; // Light red
    pub const UNRESOLVED_NODE_STROKE: &str = "#E53935"; // Red
    pub const NORMAL_EDGE: &str = "#64B5F6"; // Soft blue
    pub const CYCLE_EDGE: &str = "#FF6500"; // Deep orange
}

// Helper macro for write operations that converts IO errors
macro_rules! writeln_out {
    ($dst:expr) => {
        writeln!($dst).map_err(DpdmError::from)
    };
    ($dst:expr, $($arg:tt)*) => {
        writeln!($dst, $($arg)*).map_err(DpdmError::from)
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeStyle {
    Normal,
    Cycle,
    External,
    Unresolved,
}

impl NodeStyle {
    fn colors(self) -> (&'static str, &'static str) {
        match self {
            NodeStyle::Normal => (colors::NORMAL_NODE_FILL, colors::NORMAL_NODE_STROKE),
            NodeStyle::Cycle => (colors::CYCLE_NODE_FILL, colors::CYCLE_NODE_STROKE),
            NodeStyle::External => (colors::EXTERNAL_NODE_FILL, colors::EXTERNAL_NODE_STROKE),
            NodeStyle::Unresolved => (colors::UNRESOLVED_NODE_FILL, colors::UNRESOLVED_NODE_STROKE),
        }
    }
}

/// Modules and hops that take part in at least one cycle
struct CycleMembership<'a> {
    modules: HashSet<&'a ModuleId>,
    hops: HashSet<(&'a ModuleId, &'a ModuleId)>,
}

impl<'a> CycleMembership<'a> {
    fn new(cycles: &'a [ModuleCycle]) -> Self {
        let mut modules = HashSet::new();
        let mut hops = HashSet::new();
        for cycle in cycles {
            modules.extend(cycle.modules());
            hops.extend(cycle.edges().iter().map(|edge| (&edge.from, &edge.to)));
        }
        Self { modules, hops }
    }
}

/// Renders a module graph as Graphviz DOT or Mermaid
///
/// File modules are grouped by the directory they live in, relative to the
/// graph's context directory.
pub struct GraphRenderer {
    highlight_cycles: bool,
}

impl GraphRenderer {
    pub fn new(highlight_cycles: bool) -> Self {
        Self { highlight_cycles }
    }

    pub fn render_mermaid(
        &self,
        graph: &ModuleGraph,
        cycles: &[ModuleCycle],
        output: &mut dyn Write,
    ) -> Result<(), DpdmError> {
        writeln_out!(output, "graph LR")?;

        let membership = CycleMembership::new(cycles);
        let (groups, loose) = self.group_by_directory(graph);

        for (dir, nodes) in &groups {
            writeln_out!(output)?;
            writeln_out!(
                output,
                "    subgraph {}[\"{}\"]",
                self.mermaid_id(&format!("dir_{dir}")),
                dir
            )?;
            for &idx in nodes {
                self.write_mermaid_node(graph, idx, &membership, "        ", output)?;
            }
            writeln_out!(output, "    end")?;
        }

        if !loose.is_empty() {
            writeln_out!(output)?;
        }
        for &idx in &loose {
            self.write_mermaid_node(graph, idx, &membership, "    ", output)?;
        }

        writeln_out!(output)?;

        // Mermaid styles edges by their position in the output
        let mut cycle_links = Vec::new();
        for (position, (source, target, label)) in self.collapsed_edges(graph).iter().enumerate() {
            let from = &graph.graph()[*source].id;
            let to = &graph.graph()[*target].id;
            writeln_out!(
                output,
                "    n{} -->|\"{}\"| n{}",
                source.index(),
                label.replace('"', "'"),
                target.index()
            )?;
            if self.highlight_cycles && membership.hops.contains(&(from, to)) {
                cycle_links.push(position.to_string());
            }
        }

        if !cycle_links.is_empty() {
            writeln_out!(
                output,
                "    linkStyle {} stroke:{},stroke-width:3px",
                cycle_links.join(","),
                colors::CYCLE_EDGE
            )?;
        }

        Ok(())
    }

    fn write_mermaid_node(
        &self,
        graph: &ModuleGraph,
        idx: NodeIndex,
        membership: &CycleMembership<'_>,
        indent: &str,
        output: &mut dyn Write,
    ) -> Result<(), DpdmError> {
        let node = &graph.graph()[idx];
        let label = self.label(graph, idx).replace('"', "'");
        let style = self.style(graph, idx, membership);

        let shape = match style {
            NodeStyle::Cycle => format!("n{}((\"{label}\"))", idx.index()),
            NodeStyle::External => format!("n{}([\"{label}\"])", idx.index()),
            _ => format!("n{}[\"{label}\"]", idx.index()),
        };
        writeln_out!(output, "{indent}{shape}")?;

        let (fill, stroke) = style.colors();
        let width = if style == NodeStyle::Cycle || node.entry {
            3
        } else {
            2
        };
        writeln_out!(
            output,
            "{indent}style n{} fill:{fill},stroke:{stroke},stroke-width:{width}px",
            idx.index()
        )
    }

    pub fn render_dot(
        &self,
        graph: &ModuleGraph,
        cycles: &[ModuleCycle],
        output: &mut dyn Write,
    ) -> Result<(), DpdmError> {
        writeln_out!(output, "digraph module_dependencies {{")?;
        writeln_out!(output, "    rankdir=LR;")?;
        writeln_out!(output, "    node [shape=box, style=rounded];")?;

        let membership = CycleMembership::new(cycles);
        let (groups, loose) = self.group_by_directory(graph);

        for (i, (dir, nodes)) in groups.iter().enumerate() {
            writeln_out!(output)?;
            writeln_out!(output, "    subgraph cluster_{i} {{")?;
            writeln_out!(output, "        label=\"{}\";", self.dot_escape(dir))?;
            writeln_out!(output, "        style=dashed;")?;
            for &idx in nodes {
                self.write_dot_node(graph, idx, &membership, "        ", output)?;
            }
            writeln_out!(output, "    }}")?;
        }

        if !loose.is_empty() {
            writeln_out!(output)?;
        }
        for &idx in &loose {
            self.write_dot_node(graph, idx, &membership, "    ", output)?;
        }

        writeln_out!(output)?;

        for (source, target, label) in self.collapsed_edges(graph) {
            let from = &graph.graph()[source].id;
            let to = &graph.graph()[target].id;

            if self.highlight_cycles && membership.hops.contains(&(from, to)) {
                writeln_out!(
                    output,
                    r#"    n{} -> n{} [label="{}", color="{}", penwidth=3];"#,
                    source.index(),
                    target.index(),
                    self.dot_escape(&label),
                    colors::CYCLE_EDGE
                )?;
            } else {
                writeln_out!(
                    output,
                    r#"    n{} -> n{} [label="{}", color="{}"];"#,
                    source.index(),
                    target.index(),
                    self.dot_escape(&label),
                    colors::NORMAL_EDGE
                )?;
            }
        }

        writeln_out!(output, "}}")?;
        Ok(())
    }

    fn write_dot_node(
        &self,
        graph: &ModuleGraph,
        idx: NodeIndex,
        membership: &CycleMembership<'_>,
        indent: &str,
        output: &mut dyn Write,
    ) -> Result<(), DpdmError> {
        let style = self.style(graph, idx, membership);
        let (fill, stroke) = style.colors();
        let extra = match style {
            NodeStyle::Unresolved => ", style=\"filled,dashed\"",
            _ => ", style=\"filled,rounded\"",
        };
        let width = if graph.graph()[idx].entry { 3 } else { 2 };

        writeln_out!(
            output,
            r#"{indent}n{} [label="{}"{extra}, fillcolor="{fill}", color="{stroke}", penwidth={width}];"#,
            idx.index(),
            self.dot_escape(&self.label(graph, idx)),
        )
    }

    fn style(
        &self,
        graph: &ModuleGraph,
        idx: NodeIndex,
        membership: &CycleMembership<'_>,
    ) -> NodeStyle {
        let node = &graph.graph()[idx];
        if node.is_unresolved() || matches!(node.state, ModuleState::Errored(_)) {
            NodeStyle::Unresolved
        } else if self.highlight_cycles && membership.modules.contains(&node.id) {
            NodeStyle::Cycle
        } else if matches!(node.state, ModuleState::Skipped(SkipReason::External)) {
            NodeStyle::External
        } else {
            NodeStyle::Normal
        }
    }

    /// File name for grouped modules, the full display name otherwise
    fn label(&self, graph: &ModuleGraph, idx: NodeIndex) -> String {
        let id = &graph.graph()[idx].id;
        match id {
            ModuleId::File(path) if self.directory(graph, id).is_some() => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| graph.display(id)),
            _ => graph.display(id),
        }
    }

    /// Directory of a file module relative to the context, if it has one
    fn directory(&self, graph: &ModuleGraph, id: &ModuleId) -> Option<String> {
        if !id.is_file() {
            return None;
        }
        let display = graph.display(id);
        display
            .rsplit_once('/')
            .map(|(dir, _)| dir.to_string())
            .filter(|dir| !dir.is_empty())
    }

    fn group_by_directory(
        &self,
        graph: &ModuleGraph,
    ) -> (BTreeMap<String, Vec<NodeIndex>>, Vec<NodeIndex>) {
        let mut groups: BTreeMap<String, Vec<NodeIndex>> = BTreeMap::new();
        let mut loose = Vec::new();

        for idx in graph.graph().node_indices() {
            match self.directory(graph, &graph.graph()[idx].id) {
                Some(dir) => groups.entry(dir).or_default().push(idx),
                None => loose.push(idx),
            }
        }

        (groups, loose)
    }

    /// One edge per module pair, labelled with every specifier used for it
    fn collapsed_edges(&self, graph: &ModuleGraph) -> Vec<(NodeIndex, NodeIndex, String)> {
        let mut pairs: BTreeMap<(NodeIndex, NodeIndex), Vec<(usize, &str)>> = BTreeMap::new();
        for edge in graph.graph().edge_references() {
            pairs
                .entry((edge.source(), edge.target()))
                .or_default()
                .push((edge.weight().order, &edge.weight().specifier));
        }

        pairs
            .into_iter()
            .map(|((source, target), mut specs)| {
                specs.sort();
                let label = specs
                    .iter()
                    .map(|(_, spec)| *spec)
                    .collect::<Vec<_>>()
                    .join(", ");
                (source, target, label)
            })
            .collect()
    }

    fn mermaid_id(&self, name: &str) -> String {
        // Replace non-alphanumeric characters with underscores for valid Mermaid IDs
        name.chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }

    fn dot_escape(&self, text: &str) -> String {
        text.replace('\\', "\\\\").replace('"', "\\\"")
    }
}
