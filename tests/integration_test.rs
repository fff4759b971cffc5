//! Integration tests for dpdm using the library interface

use std::fs;
use std::path::{Path, PathBuf};

use dpdm::analyzer::DependencyAnalysis;
use dpdm::common::ConfigBuilder;
use dpdm::config::BuildConfig;
use dpdm::core::ModuleId;
use dpdm::detector::{CycleDetector, CycleLimits};
use dpdm::graph::{GraphRenderer, ModuleGraph, ModuleGraphBuilder, ModuleState};
use dpdm::reports::{JsonReportGenerator, ReportGenerator};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Write `files` below a fresh temporary directory
fn create_project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    for (path, content) in files {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    (temp, root)
}

fn build_graph(root: &Path, entries: &[&str]) -> ModuleGraph {
    let config = BuildConfig::builder()
        .with_context(root.to_path_buf())
        .build()
        .unwrap();
    let builder = ModuleGraphBuilder::new(config).unwrap();
    let entries: Vec<String> = entries
        .iter()
        .map(|entry| root.join(entry).display().to_string())
        .collect();
    let ids = builder.resolve_entries(&entries).unwrap();
    builder.build(&ids, None).unwrap()
}

fn detect(graph: &ModuleGraph) -> CycleDetector {
    let mut detector = CycleDetector::new();
    detector.detect_cycles(graph.graph());
    detector
}

fn cycle_names(graph: &ModuleGraph, detector: &CycleDetector) -> Vec<Vec<String>> {
    detector
        .cycles()
        .iter()
        .map(|cycle| cycle.modules().iter().map(|id| graph.display(id)).collect())
        .collect()
}

#[test]
fn test_two_module_cycle() {
    let (_temp, root) = create_project(&[
        ("a.ts", "import { b } from './b';\nexport const a = 1;\n"),
        ("b.ts", "import { a } from './a';\nexport const b = 2;\n"),
    ]);

    let graph = build_graph(&root, &["a.ts"]);
    let detector = detect(&graph);

    assert_eq!(graph.module_count(), 2);
    assert_eq!(cycle_names(&graph, &detector), vec![vec!["a.ts", "b.ts"]]);

    let edges = detector.cycles()[0].edges();
    assert_eq!(edges[0].specifier, "./b");
    assert_eq!(edges[1].specifier, "./a");
}

#[test]
fn test_chain_has_no_cycles() {
    let (_temp, root) = create_project(&[
        ("a.js", "const b = require('./b');"),
        ("b.js", "export * from './c';"),
        ("c.js", "export default 1;"),
    ]);

    let graph = build_graph(&root, &["a.js"]);
    let detector = detect(&graph);

    assert_eq!(graph.module_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert!(!detector.has_cycles());
}

#[test]
fn test_self_import_is_a_cycle() {
    let (_temp, root) = create_project(&[("a.ts", "import './a';")]);

    let graph = build_graph(&root, &["a.ts"]);
    let detector = detect(&graph);

    assert_eq!(cycle_names(&graph, &detector), vec![vec!["a.ts"]]);
    assert_eq!(detector.cycles()[0].closed_path().len(), 2);
}

#[test]
fn test_missing_import_is_recorded_not_fatal() {
    let (_temp, root) = create_project(&[("a.ts", "import './missing';")]);

    let graph = build_graph(&root, &["a.ts"]);

    assert_eq!(graph.module_count(), 2);
    assert_eq!(graph.unresolved_count(), 1);

    let missing = graph.errored().next().unwrap();
    assert!(matches!(missing.state, ModuleState::Errored(_)));
    assert_eq!(graph.display(&missing.id), "missing");
    assert!(!detect(&graph).has_cycles());
}

#[test]
fn test_index_files_and_dynamic_imports() {
    let (_temp, root) = create_project(&[
        ("src/main.ts", "const lazy = () => import('./lib');"),
        ("src/lib/index.ts", "import '../main';"),
    ]);

    let graph = build_graph(&root, &["src/main.ts"]);
    let detector = detect(&graph);

    assert_eq!(
        cycle_names(&graph, &detector),
        vec![vec!["src/lib/index.ts", "src/main.ts"]]
    );
}

#[test]
fn test_tsconfig_paths_are_followed() {
    let (_temp, root) = create_project(&[
        (
            "tsconfig.json",
            r#"{
                // aliases
                "compilerOptions": {
                    "baseUrl": ".",
                    "paths": { "@app/*": ["src/*"] },
                },
            }"#,
        ),
        ("src/a.ts", "import { b } from '@app/b';"),
        ("src/b.ts", "import { a } from '@app/a';"),
    ]);

    let config = BuildConfig::builder()
        .with_context(root.clone())
        .with_tsconfig(root.join("tsconfig.json"))
        .build()
        .unwrap();
    let builder = ModuleGraphBuilder::new(config).unwrap();
    let ids = builder
        .resolve_entries(&[root.join("src/a.ts").display().to_string()])
        .unwrap();
    let graph = builder.build(&ids, None).unwrap();

    assert_eq!(
        cycle_names(&graph, &detect(&graph)),
        vec![vec!["src/a.ts", "src/b.ts"]]
    );
}

#[test]
fn test_alias_named_like_core_module() {
    let (_temp, root) = create_project(&[
        (
            "tsconfig.json",
            r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "util/*": ["src/util/*"] } } }"#,
        ),
        ("src/index.ts", "import { format } from 'util/format';\nimport 'node:util';\n"),
        ("src/util/format.ts", "import { config } from '../index';\nexport const format = 1;\n"),
    ]);

    let config = BuildConfig::builder()
        .with_context(root.clone())
        .with_tsconfig(root.join("tsconfig.json"))
        .build()
        .unwrap();
    let builder = ModuleGraphBuilder::new(config).unwrap();
    let ids = builder
        .resolve_entries(&[root.join("src/index.ts").display().to_string()])
        .unwrap();
    let graph = builder.build(&ids, None).unwrap();

    assert_eq!(
        cycle_names(&graph, &detect(&graph)),
        vec![vec!["src/index.ts", "src/util/format.ts"]]
    );
}

#[test]
fn test_jsx_modules_form_cycle() {
    let (_temp, root) = create_project(&[
        (
            "App.jsx",
            "import Page from './Page';\nexport const Hint = () => <p>Type /* to search</p>;\nexport default () => <Page />;\n",
        ),
        (
            "Page.jsx",
            "import { Hint } from './App';\nexport default (props) => <div title=\"it's\">{props.children}</div>;\n",
        ),
    ]);

    let graph = build_graph(&root, &["App.jsx"]);
    let detector = detect(&graph);

    assert_eq!(cycle_names(&graph, &detector), vec![vec!["App.jsx", "Page.jsx"]]);
}

#[test]
fn test_directory_entry_collects_all_modules() {
    let (_temp, root) = create_project(&[
        ("src/a.ts", ""),
        ("src/b.ts", ""),
        ("src/node_modules/pkg/index.js", ""),
        ("src/readme.md", ""),
    ]);

    let graph = build_graph(&root, &["src"]);

    let mut entries: Vec<String> = graph.entries().iter().map(|id| graph.display(id)).collect();
    entries.sort();
    assert_eq!(entries, vec!["src/a.ts", "src/b.ts"]);
}

#[test]
fn test_cycle_limits_truncate() {
    let (_temp, root) = create_project(&[
        ("a.ts", "import './b'; import './c';"),
        ("b.ts", "import './a'; import './c';"),
        ("c.ts", "import './a'; import './b';"),
    ]);

    let graph = build_graph(&root, &["a.ts"]);

    let mut all = CycleDetector::new();
    all.detect_cycles(graph.graph());
    assert_eq!(all.cycle_count(), 5);
    assert!(!all.is_truncated());

    let mut limited = CycleDetector::with_limits(CycleLimits {
        max_cycles: Some(2),
        max_length: None,
    });
    limited.detect_cycles(graph.graph());
    assert_eq!(limited.cycle_count(), 2);
    assert!(limited.is_truncated());
}

#[test]
fn test_analysis_queries() {
    let (_temp, root) = create_project(&[
        ("a.ts", "import './b';"),
        ("b.ts", "import './c';"),
        ("c.ts", ""),
    ]);

    let graph = build_graph(&root, &["a.ts"]);
    let analysis = DependencyAnalysis::new(&graph);

    assert_eq!(
        analysis.transitive_dependencies(&root.join("a.ts")),
        vec!["b.ts", "c.ts"]
    );
    assert_eq!(
        analysis.transitive_dependents(&root.join("c.ts")),
        vec!["a.ts", "b.ts"]
    );
    assert!(analysis.locate(&root.join("nope.ts")).is_none());
}

#[test]
fn test_reports_and_rendering_agree() {
    let (_temp, root) = create_project(&[
        ("a.ts", "import './b';"),
        ("b.ts", "import './a';"),
    ]);

    let graph = build_graph(&root, &["a.ts"]);
    let detector = detect(&graph);

    let json: serde_json::Value = serde_json::from_str(
        &JsonReportGenerator::new()
            .generate_report(&graph, &detector)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(json["circulars"], serde_json::json!([["a.ts", "b.ts"]]));

    let mut dot = Vec::new();
    GraphRenderer::new(true)
        .render_dot(&graph, detector.cycles(), &mut dot)
        .unwrap();
    let dot = String::from_utf8(dot).unwrap();
    assert!(dot.contains("digraph module_dependencies"));
    assert!(dot.contains("#FF6500"));

    let a = graph.index_of(&ModuleId::file(root.join("a.ts"))).unwrap();
    assert_eq!(graph.dependencies(a).len(), 1);
}
