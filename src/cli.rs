use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::common::{CommonArgs, CycleDisplayArgs, FormatArgs};

#[derive(Parser)]
#[command(
    name = "dpdm",
    about = "🔁 Detect circular imports in JavaScript and TypeScript projects",
    long_about = "dpdm follows import, export-from, dynamic import() and require() references \
                  from one or more entry files, builds the module dependency graph and reports \
                  every circular import chain it contains. Path aliases from tsconfig.json, \
                  package.json entry points and index files are resolved the way bundlers do.",
    subcommand_required = true,
    version
)]
pub struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true, env = "DPDM_VERBOSE", conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, env = "DPDM_QUIET")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find circular imports reachable from the entry points
    ///
    /// Builds the module graph and lists every simple import cycle. Exits
    /// with a non-zero code when cycles are found, so it can gate CI.
    #[command(
        long_about = "Build the module graph from the given entry files, directories or globs \
                      and enumerate every simple import cycle. Strongly connected components are \
                      found with Tarjan's algorithm and the cycles inside each one with Johnson's \
                      circuit search. The exit code is 0 without cycles, 1 (or the value of \
                      --exit-code circular:N) with cycles, and 2 when the analysis fails."
    )]
    Check {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        format: FormatArgs,

        #[command(flatten)]
        cycle_display: CycleDisplayArgs,

        /// Exit code overrides, e.g. `circular:3`
        #[arg(long, value_name = "CASE:CODE", env = "DPDM_EXIT_CODE")]
        exit_code: Option<String>,

        /// Fail when any import cannot be resolved
        #[arg(long, env = "DPDM_FAIL_ON_UNRESOLVED")]
        fail_on_unresolved: bool,

        /// Do not list unresolved imports
        #[arg(long, env = "DPDM_NO_WARNING")]
        no_warning: bool,

        /// Write the report to a file instead of stdout
        #[arg(short, long, env = "DPDM_OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Print the dependency tree of each entry point
    Tree {
        #[command(flatten)]
        common: CommonArgs,

        /// Do not list unresolved imports
        #[arg(long, env = "DPDM_NO_WARNING")]
        no_warning: bool,

        /// Write the tree to a file instead of stdout
        #[arg(short, long, env = "DPDM_OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Render the module graph for Graphviz or Mermaid
    #[command(
        long_about = "Render the module graph as a Graphviz DOT file or a Mermaid diagram. \
                      Modules are grouped by directory, and modules and references that take \
                      part in a cycle are highlighted."
    )]
    Graph {
        #[command(flatten)]
        common: CommonArgs,

        /// Graph format
        #[arg(
            short,
            long,
            value_enum,
            default_value = "dot",
            env = "DPDM_GRAPH_FORMAT"
        )]
        format: GraphFormat,

        /// Write the graph to a file instead of stdout
        #[arg(short, long, env = "DPDM_OUTPUT")]
        output: Option<PathBuf>,

        /// Highlight cycles in the graph
        #[arg(
            long,
            default_value = "true",
            action = clap::ArgAction::Set,
            env = "DPDM_HIGHLIGHT_CYCLES"
        )]
        highlight_cycles: bool,
    },

    /// List the transitive dependencies of specific files as JSON
    Analyze {
        #[command(flatten)]
        common: CommonArgs,

        /// Files to analyze
        #[arg(
            long = "file",
            value_name = "FILE",
            required = true,
            env = "DPDM_ANALYZE_FILES",
            value_delimiter = ','
        )]
        files: Vec<String>,

        /// List the modules that depend on each file instead
        #[arg(long, env = "DPDM_REVERSE")]
        reverse: bool,

        /// Write the JSON result to a file instead of stdout
        #[arg(short, long, env = "DPDM_OUTPUT")]
        output: Option<PathBuf>,
    },

    /// List files that no entry point reaches
    Unused {
        #[command(flatten)]
        common: CommonArgs,

        /// Glob of candidate files, e.g. `src/**/*.ts`
        #[arg(long, value_name = "GLOB", env = "DPDM_UNUSED_FROM")]
        from: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Junit,
    #[value(name = "github")]
    GitHub,
}

#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
pub enum GraphFormat {
    Dot,
    Mermaid,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_command() {
        let cli = Cli::try_parse_from([
            "dpdm",
            "check",
            "src/index.ts",
            "--format",
            "json",
            "--exit-code",
            "circular:3",
            "-e",
            "ts,js",
        ])
        .unwrap();

        match cli.command {
            Commands::Check {
                common,
                format,
                exit_code,
                ..
            } => {
                assert_eq!(common.entries, vec!["src/index.ts"]);
                assert_eq!(format.format, OutputFormat::Json);
                assert_eq!(exit_code.as_deref(), Some("circular:3"));
                assert_eq!(
                    common.extensions,
                    Some(vec!["ts".to_string(), "js".to_string()])
                );
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_parse_graph_command() {
        let cli = Cli::try_parse_from([
            "dpdm",
            "graph",
            "src",
            "--format",
            "mermaid",
            "--highlight-cycles",
            "false",
        ])
        .unwrap();

        match cli.command {
            Commands::Graph {
                format,
                highlight_cycles,
                ..
            } => {
                assert_eq!(format, GraphFormat::Mermaid);
                assert!(!highlight_cycles);
            }
            _ => panic!("expected graph"),
        }
    }

    #[test]
    fn test_entries_are_required() {
        assert!(Cli::try_parse_from(["dpdm", "check"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["dpdm", "-v", "-q", "check", "a.ts"]).is_err());
    }
}
