//! Token patterns for each reference form
//!
//! Every [`ReferenceSyntax`] looks at a single token position and decides
//! whether a reference of its kind starts there. Matchers never look further
//! back than the previous few tokens, so they can run in one forward pass.

use super::lexer::{Token, TokenKind};
use crate::core::ReferenceKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxMatch {
    pub specifier: String,
    /// Byte offset of the keyword that introduced the reference
    pub offset: usize,
    /// The reference only brings in types and disappears after compilation
    pub type_only: bool,
}

pub trait ReferenceSyntax: Send + Sync {
    fn kind(&self) -> ReferenceKind;

    fn match_at(&self, tokens: &[Token], at: usize) -> Option<SyntaxMatch>;
}

pub fn syntax_for(kind: ReferenceKind) -> Box<dyn ReferenceSyntax> {
    match kind {
        ReferenceKind::Import => Box::new(StaticImport),
        ReferenceKind::Export => Box::new(ReExport),
        ReferenceKind::DynamicImport => Box::new(DynamicImport),
        ReferenceKind::Require => Box::new(Require),
    }
}

/// `import x from 'y'`, `import { a } from 'y'`, `import 'y'`
pub struct StaticImport;

/// `export { a } from 'y'`, `export * from 'y'`, `export * as ns from 'y'`
pub struct ReExport;

/// `import('y')`
pub struct DynamicImport;

/// `require('y')`
pub struct Require;

impl ReferenceSyntax for StaticImport {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::Import
    }

    fn match_at(&self, tokens: &[Token], at: usize) -> Option<SyntaxMatch> {
        if ident(tokens, at) != Some("import") || is_member_access(tokens, at) {
            return None;
        }
        let offset = tokens[at].start;
        let mut k = at + 1;

        if let Some(specifier) = string(tokens, k) {
            return Some(SyntaxMatch {
                specifier: specifier.to_string(),
                offset,
                type_only: false,
            });
        }

        let mut type_only = false;
        if ident(tokens, k) == Some("type") && starts_import_clause(tokens, k + 1) {
            type_only = true;
            k += 1;
        }

        let mut value_bindings = 0;
        let mut typed_names = 0;

        // default binding
        if ident(tokens, k).is_some() && !is_from_clause(tokens, k) {
            value_bindings += 1;
            k += 1;
            if punct(tokens, k) == Some(',') {
                k += 1;
            }
        }

        match punct(tokens, k) {
            Some('*') => {
                if ident(tokens, k + 1) != Some("as") || ident(tokens, k + 2).is_none() {
                    return None;
                }
                value_bindings += 1;
                k += 3;
            }
            Some('{') => {
                let braces = named_bindings(tokens, k)?;
                value_bindings += braces.values;
                typed_names += braces.typed;
                k = braces.end;
            }
            _ => {}
        }

        if !is_from_clause(tokens, k) {
            return None;
        }
        let specifier = string(tokens, k + 1)?;

        Some(SyntaxMatch {
            specifier: specifier.to_string(),
            offset,
            type_only: type_only || (value_bindings == 0 && typed_names > 0),
        })
    }
}

impl ReferenceSyntax for ReExport {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::Export
    }

    fn match_at(&self, tokens: &[Token], at: usize) -> Option<SyntaxMatch> {
        if ident(tokens, at) != Some("export") || is_member_access(tokens, at) {
            return None;
        }
        let offset = tokens[at].start;
        let mut k = at + 1;

        let mut type_only = false;
        if ident(tokens, k) == Some("type") && matches!(punct(tokens, k + 1), Some('{' | '*')) {
            type_only = true;
            k += 1;
        }

        match punct(tokens, k)? {
            '*' => {
                k += 1;
                if ident(tokens, k) == Some("as") {
                    if ident(tokens, k + 1).is_none() && string(tokens, k + 1).is_none() {
                        return None;
                    }
                    k += 2;
                }
            }
            '{' => {
                let braces = named_bindings(tokens, k)?;
                if braces.values == 0 && braces.typed > 0 {
                    type_only = true;
                }
                k = braces.end;
            }
            _ => return None,
        }

        if !is_from_clause(tokens, k) {
            return None;
        }
        let specifier = string(tokens, k + 1)?;

        Some(SyntaxMatch {
            specifier: specifier.to_string(),
            offset,
            type_only,
        })
    }
}

impl ReferenceSyntax for DynamicImport {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::DynamicImport
    }

    fn match_at(&self, tokens: &[Token], at: usize) -> Option<SyntaxMatch> {
        call_with_literal(tokens, at, "import", &[')', ','])
    }
}

impl ReferenceSyntax for Require {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::Require
    }

    fn match_at(&self, tokens: &[Token], at: usize) -> Option<SyntaxMatch> {
        call_with_literal(tokens, at, "require", &[')'])
    }
}

/// `callee(<literal>` followed by one of `closers`
fn call_with_literal(
    tokens: &[Token],
    at: usize,
    callee: &str,
    closers: &[char],
) -> Option<SyntaxMatch> {
    if ident(tokens, at) != Some(callee) || is_member_access(tokens, at) {
        return None;
    }
    if punct(tokens, at + 1) != Some('(') {
        return None;
    }
    let specifier = string(tokens, at + 2)?;
    if !punct(tokens, at + 3).is_some_and(|c| closers.contains(&c)) {
        return None;
    }

    Some(SyntaxMatch {
        specifier: specifier.to_string(),
        offset: tokens[at].start,
        type_only: false,
    })
}

struct NamedBindings {
    values: usize,
    typed: usize,
    /// Index just past the closing brace
    end: usize,
}

/// Parse `{ a, type B, c as d }` starting at the opening brace
fn named_bindings(tokens: &[Token], open: usize) -> Option<NamedBindings> {
    let mut bindings = NamedBindings {
        values: 0,
        typed: 0,
        end: open,
    };
    let mut k = open + 1;
    let mut segment_start = true;

    loop {
        match &tokens.get(k)?.kind {
            TokenKind::Punct('}') => {
                bindings.end = k + 1;
                return Some(bindings);
            }
            TokenKind::Punct(',') => segment_start = true,
            TokenKind::Ident(word) if segment_start => {
                segment_start = false;
                let next_is_name = matches!(
                    tokens.get(k + 1).map(|t| &t.kind),
                    Some(TokenKind::Ident(next)) if next != "as"
                );
                if word == "type" && next_is_name {
                    bindings.typed += 1;
                } else {
                    bindings.values += 1;
                }
            }
            TokenKind::Str(_) if segment_start => {
                segment_start = false;
                bindings.values += 1;
            }
            TokenKind::Ident(_) | TokenKind::Str(_) => {}
            _ => return None,
        }
        k += 1;
    }
}

/// Whether `import type` at `at - 1` is followed by a binding clause
fn starts_import_clause(tokens: &[Token], at: usize) -> bool {
    match tokens.get(at).map(|t| &t.kind) {
        Some(TokenKind::Punct('{' | '*')) => true,
        Some(TokenKind::Ident(_)) => !is_from_clause(tokens, at),
        _ => false,
    }
}

fn is_from_clause(tokens: &[Token], at: usize) -> bool {
    ident(tokens, at) == Some("from") && string(tokens, at + 1).is_some()
}

/// `x.import` or `x?.require`, but not the spread `...require(...)`
fn is_member_access(tokens: &[Token], at: usize) -> bool {
    if at == 0 || punct(tokens, at - 1) != Some('.') {
        return false;
    }
    let spread = at >= 3 && punct(tokens, at - 2) == Some('.') && punct(tokens, at - 3) == Some('.');
    !spread
}

fn ident(tokens: &[Token], at: usize) -> Option<&str> {
    match &tokens.get(at)?.kind {
        TokenKind::Ident(word) => Some(word),
        _ => None,
    }
}

fn punct(tokens: &[Token], at: usize) -> Option<char> {
    match tokens.get(at)?.kind {
        TokenKind::Punct(c) => Some(c),
        _ => None,
    }
}

/// A string literal or a template literal without substitutions
fn string(tokens: &[Token], at: usize) -> Option<&str> {
    match &tokens.get(at)?.kind {
        TokenKind::Str(value) | TokenKind::Template(Some(value)) => Some(value),
        _ => None,
    }
}
