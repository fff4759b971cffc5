//! Reference extraction
//!
//! Turns the text of one module into the ordered list of specifiers it
//! references. The scan is lexical: a tolerant tokenizer followed by one
//! [`ReferenceSyntax`] matcher per recognized [`ReferenceKind`].

pub mod lexer;
pub mod syntax;

use std::fs;
use std::path::Path;

use miette::NamedSource;
use tracing::debug;

pub use self::syntax::{ReferenceSyntax, SyntaxMatch};
use crate::core::{ModuleId, RawSpecifier, ReferenceKind};
use crate::error::{ExtractError, SyntaxError};

pub struct ReferenceExtractor {
    syntaxes: Vec<Box<dyn ReferenceSyntax>>,
    strict: bool,
    skip_type_imports: bool,
}

impl ReferenceExtractor {
    /// Create an extractor recognizing `kinds`, in the given priority order
    pub fn new(kinds: &[ReferenceKind], strict: bool, skip_type_imports: bool) -> Self {
        let mut seen = Vec::new();
        let syntaxes = kinds
            .iter()
            .filter(|kind| {
                if seen.contains(*kind) {
                    false
                } else {
                    seen.push(**kind);
                    true
                }
            })
            .map(|kind| syntax::syntax_for(*kind))
            .collect();

        Self {
            syntaxes,
            strict,
            skip_type_imports,
        }
    }

    pub fn kinds(&self) -> Vec<ReferenceKind> {
        self.syntaxes.iter().map(|s| s.kind()).collect()
    }

    /// Read and scan a module. Non-file ids have no references.
    pub fn extract(&self, id: &ModuleId) -> Result<Vec<RawSpecifier>, ExtractError> {
        let Some(path) = id.as_path() else {
            return Ok(Vec::new());
        };

        let source = fs::read_to_string(path).map_err(|e| ExtractError::ReadFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        self.extract_source(&path.display().to_string(), &source)
    }

    /// Scan `source`; `name` is only used in diagnostics
    pub fn extract_source(
        &self,
        name: &str,
        source: &str,
    ) -> Result<Vec<RawSpecifier>, ExtractError> {
        let (tokens, issues) = lexer::Lexer::new(source)
            .with_jsx(allows_jsx(name))
            .tokenize();

        if let Some(issue) = issues.first() {
            if self.strict {
                return Err(ExtractError::FatalSyntax(Box::new(SyntaxError {
                    file: name.to_string(),
                    message: issue.message.to_string(),
                    source_code: NamedSource::new(name, source.to_string()),
                    span: (issue.offset, issue.len).into(),
                })));
            }
            debug!(
                "{name}: {} lexical issue(s), first: {}",
                issues.len(),
                issue.message
            );
        }

        let lines = LineIndex::new(source);
        let mut references = Vec::new();

        for at in 0..tokens.len() {
            for syntax in &self.syntaxes {
                let Some(found) = syntax.match_at(&tokens, at) else {
                    continue;
                };
                if !(self.skip_type_imports && found.type_only) {
                    references.push(RawSpecifier::new(
                        found.specifier,
                        syntax.kind(),
                        lines.line_of(found.offset),
                    ));
                }
                break;
            }
        }

        Ok(references)
    }
}

/// `.ts` sources use `<T>expr` for type assertions and cannot hold JSX
fn allows_jsx(name: &str) -> bool {
    !matches!(
        Path::new(name).extension().and_then(|ext| ext.to_str()),
        Some("ts" | "mts" | "cts")
    )
}

struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line containing `offset`
    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn all() -> ReferenceExtractor {
        ReferenceExtractor::new(&ReferenceKind::ALL, false, false)
    }

    fn specs(extractor: &ReferenceExtractor, src: &str) -> Vec<(String, ReferenceKind, usize)> {
        specs_in(extractor, "test.ts", src)
    }

    fn specs_in(
        extractor: &ReferenceExtractor,
        name: &str,
        src: &str,
    ) -> Vec<(String, ReferenceKind, usize)> {
        extractor
            .extract_source(name, src)
            .unwrap()
            .into_iter()
            .map(|r| (r.specifier, r.kind, r.line))
            .collect()
    }

    #[test]
    fn test_references_in_textual_order() {
        let src = r#"
import a from './a';
export * from './b';
const c = require('./c');
async function load() {
    return import('./d');
}
"#;
        assert_eq!(
            specs(&all(), src),
            vec![
                ("./a".to_string(), ReferenceKind::Import, 2),
                ("./b".to_string(), ReferenceKind::Export, 3),
                ("./c".to_string(), ReferenceKind::Require, 4),
                ("./d".to_string(), ReferenceKind::DynamicImport, 6),
            ]
        );
    }

    #[test]
    fn test_references_in_comments_and_strings_are_ignored() {
        let src = r#"
// import x from './commented'
/* require('./block') */
const s = "import y from './in-string'";
const t = `require('./in-template')`;
import real from './real';
"#;
        assert_eq!(
            specs(&all(), src),
            vec![("./real".to_string(), ReferenceKind::Import, 6)]
        );
    }

    #[test]
    fn test_recognized_set_is_configurable() {
        let extractor = ReferenceExtractor::new(&[ReferenceKind::Import], false, false);
        let src = "import a from './a'; require('./b'); import('./c');";
        assert_eq!(
            specs(&extractor, src),
            vec![("./a".to_string(), ReferenceKind::Import, 1)]
        );
    }

    #[test]
    fn test_duplicate_kinds_are_ignored() {
        let extractor = ReferenceExtractor::new(
            &[ReferenceKind::Require, ReferenceKind::Require],
            false,
            false,
        );
        assert_eq!(extractor.kinds(), vec![ReferenceKind::Require]);
    }

    #[test]
    fn test_skip_type_imports() {
        let src = "import type { A } from './types';\nimport { b } from './values';";
        let extractor = ReferenceExtractor::new(&ReferenceKind::ALL, false, true);
        assert_eq!(
            specs(&extractor, src),
            vec![("./values".to_string(), ReferenceKind::Import, 2)]
        );
        assert_eq!(specs(&all(), src).len(), 2);
    }

    #[test]
    fn test_lenient_mode_recovers_from_lexical_problems() {
        let src = "const broken = 'no end\nimport a from './a';";
        assert_eq!(
            specs(&all(), src),
            vec![("./a".to_string(), ReferenceKind::Import, 2)]
        );
    }

    #[test]
    fn test_strict_mode_reports_syntax_error() {
        let extractor = ReferenceExtractor::new(&ReferenceKind::ALL, true, false);
        let result = extractor.extract_source("broken.js", "const s = 'oops\n");

        match result {
            Err(ExtractError::FatalSyntax(error)) => {
                assert_eq!(error.file, "broken.js");
                assert_eq!(error.message, "unterminated string literal");
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_jsx_text_does_not_hide_references() {
        let src = "const Hint = () => <p>Type /* to open a comment</p>;\nexport const Lazy = () => import('./Page');";
        assert_eq!(
            specs_in(&all(), "App.jsx", src),
            vec![("./Page".to_string(), ReferenceKind::DynamicImport, 2)]
        );

        let strict = ReferenceExtractor::new(&ReferenceKind::ALL, true, false);
        assert!(strict.extract_source("App.jsx", src).is_ok());
    }

    #[test]
    fn test_tsx_elements_and_expressions() {
        let src = r#"import { Item } from './Item';
export const List = ({ items }: Props) => (
    <Layout title="it's /* here">
        {items.map((i) => <Item key={i} />)}
    </Layout>
);
const Settings = lazy(() => import('./Settings'));
"#;
        assert_eq!(
            specs_in(&all(), "List.tsx", src),
            vec![
                ("./Item".to_string(), ReferenceKind::Import, 1),
                ("./Settings".to_string(), ReferenceKind::DynamicImport, 7),
            ]
        );
    }

    #[test]
    fn test_type_assertions_in_ts() {
        let src = "const n = <number>value;\nimport { a } from './a';";
        assert_eq!(
            specs_in(&all(), "cast.ts", src),
            vec![("./a".to_string(), ReferenceKind::Import, 2)]
        );
        assert!(!allows_jsx("types.d.ts"));
        assert!(allows_jsx("view.tsx"));
        assert!(allows_jsx("index.mjs"));
    }

    #[test]
    fn test_extract_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.js");
        fs::write(&path, "require('./b')").unwrap();

        let refs = all().extract(&ModuleId::file(&path)).unwrap();
        assert_eq!(refs, vec![RawSpecifier::new("./b", ReferenceKind::Require, 1)]);
    }

    #[test]
    fn test_extract_missing_file_is_read_failure() {
        let temp = TempDir::new().unwrap();
        let result = all().extract(&ModuleId::file(temp.path().join("gone.js")));
        assert!(matches!(result, Err(ExtractError::ReadFailure { .. })));
    }

    #[test]
    fn test_non_file_modules_have_no_references() {
        let refs = all()
            .extract(&ModuleId::Package("react".to_string()))
            .unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("a\nb\n\nc");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(4), 3);
        assert_eq!(index.line_of(5), 4);
    }
}
