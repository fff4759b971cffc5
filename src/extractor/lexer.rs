//! Tolerant tokenizer for JavaScript and TypeScript sources
//!
//! Context-free tokens come from a [`logos`] lexer. Template literals,
//! regular expressions and JSX depend on what precedes them, so they are
//! scanned by hand on top of it through [`logos::Lexer::remainder`] and
//! [`logos::Lexer::bump`]. Problems are collected as [`LexIssue`]s and
//! lexing always runs to the end of the input.

use std::ops::Range;

use logos::Logos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    /// Template literal; carries its text when it has no substitutions
    Template(Option<String>),
    Number,
    Regex,
    /// A complete JSX element or fragment
    Jsx,
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexIssue {
    pub message: &'static str,
    pub offset: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LexError {
    #[default]
    UnexpectedCharacter,
    UnterminatedString,
    UnterminatedComment,
    UnterminatedTemplate,
    UnterminatedSubstitution,
    UnterminatedRegex,
}

impl LexError {
    pub fn message(self) -> &'static str {
        match self {
            LexError::UnexpectedCharacter => "unexpected character",
            LexError::UnterminatedString => "unterminated string literal",
            LexError::UnterminatedComment => "unterminated block comment",
            LexError::UnterminatedTemplate => "unterminated template literal",
            LexError::UnterminatedSubstitution => "unterminated template substitution",
            LexError::UnterminatedRegex => "unterminated regular expression",
        }
    }
}

/// Context-free tokens
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
enum RawToken {
    #[regex(r"[ \t\r\n\f\x0B]+", logos::skip)]
    Whitespace,

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"[A-Za-z_$\x{80}-\x{10FFFF}][A-Za-z0-9_$\x{80}-\x{10FFFF}]*")]
    Ident,

    #[token("\"", |lex| quoted(lex, '"'))]
    #[token("'", |lex| quoted(lex, '\''))]
    Str(String),

    #[regex(r"[0-9][0-9A-Za-z_.]*")]
    #[regex(r"\.[0-9][0-9A-Za-z_]*")]
    Number,

    #[token("`")]
    Backtick,

    // Division or the start of a regular expression
    #[token("/")]
    Slash,

    #[regex(r"[!#%&()*+,\-.:;<=>?@\[\]^{|}~\\]", |lex| lex.slice().chars().next())]
    Punct(char),
}

fn block_comment(lex: &mut logos::Lexer<RawToken>) -> Result<(), LexError> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => {
            lex.bump(lex.remainder().len());
            Err(LexError::UnterminatedComment)
        }
    }
}

/// Body of a string literal whose opening quote was just matched
fn quoted(lex: &mut logos::Lexer<RawToken>, quote: char) -> Result<String, LexError> {
    let rest = lex.remainder();
    let mut value = String::new();
    let mut chars = rest.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, '\n')) | None => {}
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, escaped)) => value.push(escaped),
            },
            '\n' => {
                lex.bump(i);
                return Err(LexError::UnterminatedString);
            }
            c if c == quote => {
                lex.bump(i + c.len_utf8());
                return Ok(value);
            }
            c => value.push(c),
        }
    }

    lex.bump(rest.len());
    Err(LexError::UnterminatedString)
}

/// Keywords after which a `/` starts a regular expression
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

enum JsxTag {
    Open,
    SelfClosing,
}

struct Checkpoint {
    offset: usize,
    tokens: usize,
    issues: usize,
}

pub struct Lexer<'a> {
    src: &'a str,
    lex: logos::Lexer<'a, RawToken>,
    jsx: bool,
    tokens: Vec<Token>,
    issues: Vec<LexIssue>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            lex: RawToken::lexer(src),
            jsx: true,
            tokens: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Recognize JSX elements in operand position
    ///
    /// Off for `.ts` sources, where `<T>expr` is a type assertion.
    pub fn with_jsx(mut self, jsx: bool) -> Self {
        self.jsx = jsx;
        self
    }

    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexIssue>) {
        self.skip_prelude();
        self.lex_code(false);
        (self.tokens, self.issues)
    }

    fn offset(&self) -> usize {
        self.src.len() - self.lex.remainder().len()
    }

    fn issue(&mut self, error: LexError, offset: usize, len: usize) {
        self.issues.push(LexIssue {
            message: error.message(),
            offset,
            len,
        });
    }

    fn push(&mut self, kind: TokenKind, span: Range<usize>) {
        self.tokens.push(Token {
            kind,
            start: span.start,
            end: span.end,
        });
    }

    /// Push a token running from `start` to the current offset
    fn push_from(&mut self, kind: TokenKind, start: usize) {
        let end = self.offset();
        self.push(kind, start..end);
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            offset: self.offset(),
            tokens: self.tokens.len(),
            issues: self.issues.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.lex = RawToken::lexer(self.src);
        self.lex.bump(checkpoint.offset);
        self.tokens.truncate(checkpoint.tokens);
        self.issues.truncate(checkpoint.issues);
    }

    /// Byte order mark and `#!` line
    fn skip_prelude(&mut self) {
        if self.lex.remainder().starts_with('\u{feff}') {
            self.lex.bump('\u{feff}'.len_utf8());
        }
        let rest = self.lex.remainder();
        if rest.starts_with("#!") {
            self.lex.bump(rest.find('\n').unwrap_or(rest.len()));
        }
    }

    /// Lex code until the input ends or, when `nested`, until the `}` that
    /// closes the enclosing `${` or JSX expression. Returns whether that
    /// brace was found.
    fn lex_code(&mut self, nested: bool) -> bool {
        let mut braces = 0usize;

        while let Some(result) = self.lex.next() {
            let span = self.lex.span();
            let token = match result {
                Ok(token) => token,
                Err(error) => {
                    self.issue(error, span.start, span.len());
                    continue;
                }
            };

            match token {
                RawToken::Whitespace | RawToken::LineComment | RawToken::BlockComment => {}
                RawToken::Ident => {
                    let word = self.lex.slice().to_string();
                    self.push(TokenKind::Ident(word), span);
                }
                RawToken::Str(value) => self.push(TokenKind::Str(value), span),
                RawToken::Number => self.push(TokenKind::Number, span),
                RawToken::Backtick => self.lex_template(span.start),
                RawToken::Slash if self.regex_allowed() => self.lex_regex(span.start),
                RawToken::Slash => self.push(TokenKind::Punct('/'), span),
                RawToken::Punct('{') => {
                    braces += 1;
                    self.push(TokenKind::Punct('{'), span);
                }
                RawToken::Punct('}') if braces == 0 && nested => {
                    self.push(TokenKind::Punct('}'), span);
                    return true;
                }
                RawToken::Punct('}') => {
                    braces = braces.saturating_sub(1);
                    self.push(TokenKind::Punct('}'), span);
                }
                RawToken::Punct('<')
                    if self.jsx
                        && self.regex_allowed()
                        && starts_jsx_tag(self.lex.remainder()) =>
                {
                    // Not every `<` in operand position is JSX; fall back to
                    // plain code when no complete element follows
                    let checkpoint = self.checkpoint();
                    if !self.lex_jsx_element(span.start) {
                        self.restore(checkpoint);
                        self.push(TokenKind::Punct('<'), span);
                    }
                }
                RawToken::Punct(c) => self.push(TokenKind::Punct(c), span),
            }
        }

        false
    }

    fn regex_allowed(&self) -> bool {
        match self.tokens.last().map(|t| &t.kind) {
            None => true,
            Some(TokenKind::Punct(c)) => !matches!(c, ')' | ']'),
            Some(TokenKind::Ident(word)) => REGEX_PREFIX_KEYWORDS.contains(&word.as_str()),
            Some(_) => false,
        }
    }

    /// Scan a template literal whose opening backtick was just consumed
    fn lex_template(&mut self, start: usize) {
        let mut text = String::new();
        let mut substituted = false;

        loop {
            let rest = self.lex.remainder();
            let mut chars = rest.char_indices();
            let mut stop = None;

            while let Some((i, c)) = chars.next() {
                match c {
                    '\\' => {
                        if let Some((_, escaped)) = chars.next() {
                            text.push(escaped);
                        }
                    }
                    '`' => {
                        stop = Some((i, false));
                        break;
                    }
                    '$' if rest[i + 1..].starts_with('{') => {
                        stop = Some((i, true));
                        break;
                    }
                    c => text.push(c),
                }
            }

            match stop {
                Some((i, false)) => {
                    self.lex.bump(i + 1);
                    let kind = if substituted {
                        TokenKind::Template(None)
                    } else {
                        TokenKind::Template(Some(text))
                    };
                    self.push_from(kind, start);
                    return;
                }
                Some((i, true)) => {
                    self.lex.bump(i + 2);
                    if !substituted {
                        self.push_from(TokenKind::Template(None), start);
                        substituted = true;
                    }
                    let open = self.offset() - 1;
                    self.push(TokenKind::Punct('{'), open..open + 1);
                    if !self.lex_code(true) {
                        self.issue(LexError::UnterminatedSubstitution, open, 1);
                        return;
                    }
                }
                None => {
                    self.lex.bump(rest.len());
                    self.issue(LexError::UnterminatedTemplate, start, 1);
                    return;
                }
            }
        }
    }

    /// Scan a regular expression whose opening slash was just consumed
    fn lex_regex(&mut self, start: usize) {
        let rest = self.lex.remainder();
        let mut in_class = false;
        let mut chars = rest.char_indices();

        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '\n' => {
                    self.lex.bump(i);
                    self.issue(LexError::UnterminatedRegex, start, i + 1);
                    return;
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    let flags = &rest[i + 1..];
                    let flags_len = flags
                        .find(|c: char| !c.is_ascii_alphanumeric())
                        .unwrap_or(flags.len());
                    self.lex.bump(i + 1 + flags_len);
                    self.push_from(TokenKind::Regex, start);
                    return;
                }
                _ => {}
            }
        }

        self.lex.bump(rest.len());
        self.issue(LexError::UnterminatedRegex, start, rest.len() + 1);
    }

    /// Scan an element whose `<` was just consumed; returns false when the
    /// input ends before the element is closed
    fn lex_jsx_element(&mut self, start: usize) -> bool {
        let closed = match self.lex_jsx_tag() {
            Some(JsxTag::SelfClosing) => true,
            Some(JsxTag::Open) => self.lex_jsx_children(),
            None => false,
        };
        if closed {
            self.push_from(TokenKind::Jsx, start);
        }
        closed
    }

    /// Name and attributes of an opening tag, up to `>` or `/>`
    fn lex_jsx_tag(&mut self) -> Option<JsxTag> {
        loop {
            let rest = self.lex.remainder();
            match rest.chars().next()? {
                '>' => {
                    self.lex.bump(1);
                    return Some(JsxTag::Open);
                }
                '/' if rest[1..].starts_with('>') => {
                    self.lex.bump(2);
                    return Some(JsxTag::SelfClosing);
                }
                '{' => {
                    self.lex.bump(1);
                    let open = self.offset() - 1;
                    self.push(TokenKind::Punct('{'), open..open + 1);
                    if !self.lex_code(true) {
                        return None;
                    }
                }
                quote @ ('"' | '\'') => {
                    // attribute strings have no escapes
                    let end = rest[1..].find(quote)?;
                    self.lex.bump(end + 2);
                }
                '<' => {
                    let start = self.offset();
                    self.lex.bump(1);
                    if !self.lex_jsx_element(start) {
                        return None;
                    }
                }
                c => self.lex.bump(c.len_utf8()),
            }
        }
    }

    /// Text, expressions and nested elements up to the closing tag
    fn lex_jsx_children(&mut self) -> bool {
        loop {
            let rest = self.lex.remainder();
            let Some(i) = rest.find(['<', '{']) else {
                self.lex.bump(rest.len());
                return false;
            };
            self.lex.bump(i + 1);

            if rest[i..].starts_with('{') {
                let open = self.offset() - 1;
                self.push(TokenKind::Punct('{'), open..open + 1);
                if !self.lex_code(true) {
                    return false;
                }
                continue;
            }

            let after = &rest[i + 1..];
            if after.starts_with('/') {
                let Some(end) = after.find('>') else {
                    self.lex.bump(after.len());
                    return false;
                };
                self.lex.bump(end + 1);
                return true;
            }
            if starts_jsx_tag(after) && !self.lex_jsx_element(self.offset() - 1) {
                return false;
            }
        }
    }
}

/// Whether the text after a `<` in operand position opens an element or a
/// fragment, as opposed to a comparison or a generic arrow like `<T,>`
fn starts_jsx_tag(rest: &str) -> bool {
    let Some(first) = rest.chars().next() else {
        return false;
    };
    if first == '>' {
        return true;
    }
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return false;
    }

    let name_end = rest
        .find(|c: char| !is_jsx_name_char(c))
        .unwrap_or(rest.len());
    rest[name_end..]
        .chars()
        .next()
        .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
}

fn is_jsx_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '-' | '.' | ':')
}

/// Tokenize `src` with JSX enabled, returning the tokens and any lexical
/// problems found
pub fn tokenize(src: &str) -> (Vec<Token>, Vec<LexIssue>) {
    Lexer::new(src).tokenize()
}
